//! Authorization and orchestration on top of the repository traits.
//!
//! Every service is a free function generic over the repository traits it
//! needs, so routes pass a `DieselRepository` and tests pass
//! `MockRepository`.

use thiserror::Error;

use crate::domain::types::{TenantId, UserId};
use crate::models::auth::AuthenticatedUser;
use crate::repository::AccessReader;
use crate::repository::errors::RepositoryError;

pub mod access;
pub mod commissions;
pub mod reconciliation;
pub mod sla;
pub mod work_orders;

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// Rejected input; the message is shown to the caller.
    #[error("{0}")]
    Form(String),

    /// The request conflicts with the current state of the resource.
    #[error("{0}")]
    Conflict(String),

    #[error("type constraint violated: {0}")]
    TypeConstraint(String),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Identity of the caller as validated domain ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub tenant_id: TenantId,
}

impl Actor {
    pub fn from_user(user: &AuthenticatedUser) -> ServiceResult<Self> {
        Ok(Self {
            user_id: user.user_id()?,
            tenant_id: user.tenant_id()?,
        })
    }
}

/// Fails with [`ServiceError::Unauthorized`] unless one of the caller's roles
/// in their current tenant grants `permission`.
pub fn ensure_permission<R>(
    repo: &R,
    user: &AuthenticatedUser,
    permission: &str,
) -> ServiceResult<Actor>
where
    R: AccessReader + ?Sized,
{
    let actor = Actor::from_user(user)?;
    if repo.user_has_permission(actor.user_id, actor.tenant_id, permission)? {
        Ok(actor)
    } else {
        log::warn!(
            "User {} lacks {permission} in tenant {}",
            actor.user_id,
            actor.tenant_id
        );
        Err(ServiceError::Unauthorized)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn permission_check_returns_actor() {
        let repo = repo_granting(&["os.work_order.view"]);

        let actor = ensure_permission(&repo, &user(), "os.work_order.view").expect("granted");

        assert_eq!(actor.user_id.get(), USER);
        assert_eq!(actor.tenant_id.get(), TENANT);
        assert!(matches!(
            ensure_permission(&repo, &user(), "iam.role.update"),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn malformed_subject_is_a_type_error() {
        let repo = repo_granting(&[]);
        let mut user = user();
        user.sub = "abc".to_string();

        assert!(matches!(
            ensure_permission(&repo, &user, "os.work_order.view"),
            Err(ServiceError::TypeConstraint(_))
        ));
    }
}
