//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Menu errors
//! - 4xxx: User errors
//! - 5xxx: Role errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Record id already taken
    AlreadyExists = 4,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Parent assignment would create a cycle
    HierarchyCycle = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Password could not be hashed
    PasswordHashFailed = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin flag required
    AdminRequired = 2003,
    /// Permission not found
    PermissionNotFound = 2101,
    /// Permission identifier already registered
    PermissionExists = 2102,

    // ==================== 3xxx: Menu ====================
    /// Menu node not found
    MenuNotFound = 3001,

    // ==================== 4xxx: User ====================
    /// User not found
    UserNotFound = 4001,
    /// Username already taken
    UsernameExists = 4002,

    // ==================== 5xxx: Role ====================
    /// Role not found
    RoleNotFound = 5001,
    /// Role name already exists
    RoleNameExists = 5002,
    /// Role code already exists
    RoleCodeExists = 5003,

    // ==================== 9xxx: System ====================
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Input was rejected: missing field, bad format or uniqueness violation
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            ErrorCode::ValidationFailed
                | ErrorCode::InvalidFormat
                | ErrorCode::RequiredField
                | ErrorCode::ValueOutOfRange
                | ErrorCode::HierarchyCycle
                | ErrorCode::AlreadyExists
                | ErrorCode::PermissionExists
                | ErrorCode::UsernameExists
                | ErrorCode::RoleNameExists
                | ErrorCode::RoleCodeExists
        )
    }

    /// A referenced record does not exist
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            ErrorCode::PermissionNotFound
                | ErrorCode::MenuNotFound
                | ErrorCode::UserNotFound
                | ErrorCode::RoleNotFound
        )
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::HierarchyCycle => "Parent assignment would create a cycle",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::PasswordHashFailed => "Password could not be hashed",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator flag is required",
            ErrorCode::PermissionNotFound => "Permission not found",
            ErrorCode::PermissionExists => "Permission already exists",

            // Menu
            ErrorCode::MenuNotFound => "Menu not found",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",

            // Role
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleNameExists => "Role name already exists",
            ErrorCode::RoleCodeExists => "Role code already exists",

            // System
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            4 => Ok(ErrorCode::AlreadyExists),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::HierarchyCycle),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::PasswordHashFailed),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2101 => Ok(ErrorCode::PermissionNotFound),
            2102 => Ok(ErrorCode::PermissionExists),

            // Menu
            3001 => Ok(ErrorCode::MenuNotFound),

            // User
            4001 => Ok(ErrorCode::UserNotFound),
            4002 => Ok(ErrorCode::UsernameExists),

            // Role
            5001 => Ok(ErrorCode::RoleNotFound),
            5002 => Ok(ErrorCode::RoleNameExists),
            5003 => Ok(ErrorCode::RoleCodeExists),

            // System
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
