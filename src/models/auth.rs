//! Bearer token claims and the request extractor built on them.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, http::header, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::types::{TenantId, TypeConstraintError, UserId};
use crate::models::config::ServerConfig;

/// Lifetime of tokens issued by [`AuthenticatedUser::issue`].
pub const TOKEN_TTL_HOURS: i64 = 12;

/// Claims carried by every bearer token.
///
/// `sub` is the user id and `tenant_id` the tenant the user is acting in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub tenant_id: i32,
    pub exp: usize,
}

impl AuthenticatedUser {
    pub fn new(user_id: UserId, tenant_id: TenantId, email: &str, name: &str) -> Self {
        let exp = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            tenant_id: tenant_id.get(),
            exp: usize::try_from(exp.timestamp()).unwrap_or_default(),
        }
    }

    pub fn user_id(&self) -> Result<UserId, TypeConstraintError> {
        let id = self
            .sub
            .parse::<i32>()
            .map_err(|_| TypeConstraintError::InvalidValue(format!("subject {}", self.sub)))?;
        UserId::new(id)
    }

    pub fn tenant_id(&self) -> Result<TenantId, TypeConstraintError> {
        TenantId::new(self.tenant_id)
    }

    /// Signs the claims with HS256.
    pub fn issue(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Verifies the signature and expiry of `token`.
    pub fn from_token(
        token: &str,
        secret: &str,
        leeway_secs: u64,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
    }
}

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(config) = req.app_data::<web::Data<ServerConfig>>() else {
            log::error!("Server config is not registered; rejecting request");
            return ready(Err(ErrorUnauthorized("unauthorized")));
        };

        let Some(token) = bearer(req) else {
            return ready(Err(ErrorUnauthorized("missing bearer token")));
        };

        let result = AuthenticatedUser::from_token(token, &config.secret, config.jwt_leeway_secs)
            .map_err(|err| {
                log::warn!("Rejected bearer token: {err}");
                ErrorUnauthorized("invalid bearer token")
            });
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let user = AuthenticatedUser::new(
            UserId::new(4).expect("valid id"),
            TenantId::new(1).expect("valid id"),
            "roberto@calibracoes.com.br",
            "Roberto Silva",
        );

        let token = user.issue("secret").expect("signed");
        let decoded = AuthenticatedUser::from_token(&token, "secret", 0).expect("valid token");

        assert_eq!(decoded, user);
        assert_eq!(decoded.user_id().map(UserId::get), Ok(4));
        assert!(AuthenticatedUser::from_token(&token, "other", 0).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut user = AuthenticatedUser::new(
            UserId::new(4).expect("valid id"),
            TenantId::new(1).expect("valid id"),
            "roberto@calibracoes.com.br",
            "Roberto Silva",
        );
        user.exp = 1_000;

        let token = user.issue("secret").expect("signed");

        assert!(AuthenticatedUser::from_token(&token, "secret", 0).is_err());
    }
}
