//! Strongly-typed value objects used by domain entities.
//!
//! Identifiers are positive integers; textual values are normalized once on
//! construction and trusted afterwards.
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use phonenumber::{Mode, country};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidateEmail;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    #[error("id must be greater than zero")]
    NonPositiveId,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("value cannot be empty")]
    EmptyString,
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("invalid uuid value")]
    InvalidUuid,
    /// Permission name is not a dot-separated lower-case identifier.
    #[error("invalid permission name: {0}")]
    InvalidPermissionName(String),
    /// Role name is not a lower-case snake_case identifier.
    #[error("invalid role name: {0}")]
    InvalidRoleName(String),
    /// Stored enumeration value is not recognised.
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),
}

macro_rules! id_newtype {
    ($($name:ident => $doc:literal),+ $(,)?) => {$(
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i32);

        impl $name {
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    )+};
}

id_newtype! {
    TenantId => "Tenant (company) primary key.",
    BranchId => "Tenant branch primary key.",
    UserId => "User primary key.",
    RoleId => "Role primary key.",
    PermissionId => "Permission primary key.",
    CustomerId => "Customer primary key.",
    QuoteId => "Quote primary key.",
    WorkOrderId => "Work order primary key.",
    ServiceCallId => "Service call primary key.",
    SlaPolicyId => "SLA policy primary key.",
    CommissionRuleId => "Commission rule primary key.",
    CommissionEventId => "Commission event primary key.",
    SettlementId => "Commission settlement primary key.",
    ReceivableId => "Account receivable primary key.",
    PayableId => "Account payable primary key.",
    BankAccountId => "Bank account primary key.",
    BankStatementId => "Imported bank statement primary key.",
    StatementEntryId => "Bank statement entry primary key.",
    ReconciliationRuleId => "Reconciliation rule primary key.",
    SystemAlertId => "System alert primary key.",
}

/// Copy enum persisted as a fixed lower-case string.
///
/// `$kind` names the enum in [`TypeConstraintError::UnknownVariant`] when a
/// stored value is not recognised.
macro_rules! text_enum {
    ($name:ident, $kind:expr, { $($variant:ident => $text:expr),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::types::TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| $crate::domain::types::TypeConstraintError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}
pub(crate) use text_enum;

/// String newtype whose constructor runs `$normalize` on the input.
macro_rules! text_newtype {
    ($(#[$meta:meta])* $name:ident, $normalize:path) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                $normalize(value.into()).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

fn trimmed(value: String) -> Result<String, TypeConstraintError> {
    let value = value.trim();
    if value.is_empty() {
        Err(TypeConstraintError::EmptyString)
    } else {
        Ok(value.to_string())
    }
}

fn email(value: String) -> Result<String, TypeConstraintError> {
    let value = value.trim().to_lowercase();
    if value.validate_email() {
        Ok(value)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// E.164 form; numbers without a country code are read as Brazilian.
fn phone(value: String) -> Result<String, TypeConstraintError> {
    let value = trimmed(value)?;
    let parsed = phonenumber::parse(Some(country::Id::BR), &value)
        .map_err(|_| TypeConstraintError::InvalidPhone)?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}

fn sanitized(value: String) -> Result<String, TypeConstraintError> {
    trimmed(ammonia::clean(&value))
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

fn permission(value: String) -> Result<String, TypeConstraintError> {
    let value = value.trim().to_string();
    let segments: Vec<&str> = value.split('.').collect();
    let valid = segments.len() >= 2
        && segments
            .iter()
            .all(|s| !s.is_empty() && s.chars().all(is_identifier_char));
    if valid {
        Ok(value)
    } else {
        Err(TypeConstraintError::InvalidPermissionName(value))
    }
}

fn role(value: String) -> Result<String, TypeConstraintError> {
    let value = value.trim().to_string();
    let valid = value.starts_with(|c: char| c.is_ascii_lowercase())
        && value.chars().all(is_identifier_char);
    if valid {
        Ok(value)
    } else {
        Err(TypeConstraintError::InvalidRoleName(value))
    }
}

text_newtype!(
    /// Tenant legal name.
    TenantName,
    trimmed
);
text_newtype!(
    /// User or customer display name.
    PersonName,
    trimmed
);
text_newtype!(
    /// CNPJ/CPF as typed by the user.
    DocumentNumber,
    trimmed
);
text_newtype!(
    /// Short per-tenant branch code.
    BranchCode,
    trimmed
);
text_newtype!(
    /// Lower-cased, validated email address.
    Email,
    email
);
text_newtype!(PhoneNumber, phone);
text_newtype!(
    /// Free text with markup stripped by `ammonia`.
    SanitizedText,
    sanitized
);
text_newtype!(
    /// Dot-separated capability name such as `os.work_order.view`, with at
    /// least two `[a-z0-9_]` segments.
    PermissionName,
    permission
);
text_newtype!(
    /// Lower-case snake_case role identifier such as `tecnico_vendedor`.
    RoleName,
    role
);

impl PermissionName {
    /// First segment of the name, used to group permissions by module.
    pub fn module(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }
}

/// Opaque external identifier exposed instead of the integer primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicId(Uuid);

impl PublicId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reads the 16-byte blob stored in the database.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeConstraintError> {
        Uuid::from_slice(bytes)
            .map(Self)
            .map_err(|_| TypeConstraintError::InvalidUuid)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for PublicId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PublicId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_reject_non_positive_values() {
        assert_eq!(TenantId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(UserId::new(-3), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(WorkOrderId::new(7).map(WorkOrderId::get), Ok(7));
    }

    #[test]
    fn email_is_normalized() {
        let email = Email::new("  Admin@Sistema.Local ").expect("valid email");
        assert_eq!(email.as_str(), "admin@sistema.local");
        assert!(Email::new("not-an-email").is_err());
    }

    #[test]
    fn permission_names_must_be_dotted_lowercase() {
        let name = PermissionName::new("os.work_order.change_status").expect("valid name");
        assert_eq!(name.module(), "os");
        assert!(PermissionName::new("tv.dashboard.view").is_ok());
        assert!(PermissionName::new("single").is_err());
        assert!(PermissionName::new("Os.View").is_err());
        assert!(PermissionName::new("os..view").is_err());
        assert!(PermissionName::new("os.view.").is_err());
    }

    #[test]
    fn role_names_are_snake_case() {
        assert!(RoleName::new("tecnico_vendedor").is_ok());
        assert!(RoleName::new("super-admin").is_err());
        assert!(RoleName::new("_admin").is_err());
        assert!(RoleName::new("").is_err());
    }

    #[test]
    fn brazilian_phone_defaults_region() {
        let phone = PhoneNumber::new("(11) 3000-0001").expect("valid phone");
        assert_eq!(phone.as_str(), "+551130000001");
    }

    #[test]
    fn sanitized_text_strips_markup() {
        let text = SanitizedText::new("<script>x</script>Revisão geral").expect("non-empty");
        assert_eq!(text.as_str(), "Revisão geral");
        assert!(SanitizedText::new("<script>x</script>").is_err());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(PersonName::new("   "), Err(TypeConstraintError::EmptyString));
        assert_eq!(PersonName::new(" Ana ").map(String::from), Ok("Ana".to_string()));
    }

    text_enum!(Shade, "shade", {
        Light => "light",
        DarkBlue => "dark_blue",
    });

    #[test]
    fn text_enums_parse_their_stored_form() {
        assert_eq!("dark_blue".parse::<Shade>(), Ok(Shade::DarkBlue));
        assert_eq!(Shade::Light.to_string(), "light");
        assert_eq!(
            "Dark".parse::<Shade>(),
            Err(TypeConstraintError::UnknownVariant {
                kind: "shade",
                value: "Dark".to_string(),
            })
        );
        assert_eq!(
            serde_json::to_string(&Shade::ALL).expect("serializable"),
            r#"["light","dark_blue"]"#
        );
    }

    #[test]
    fn public_id_round_trips_bytes() {
        let id = PublicId::new();
        let restored = PublicId::from_bytes(id.as_bytes()).expect("valid bytes");
        assert_eq!(id, restored);
    }
}
