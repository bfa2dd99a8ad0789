//! Conversions from lower-level errors into [`ServiceError`].
//!
//! Kept apart from the services so the domain and form layers stay free of
//! service types.

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::services::ServiceError;
use crate::statements::StatementError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<StatementError> for ServiceError {
    fn from(val: StatementError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
