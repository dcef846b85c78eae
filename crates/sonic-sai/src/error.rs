//! SAI error types and status handling.
//!
//! Status codes travel over the wire by name (`SAI_STATUS_SUCCESS`, ...), so
//! besides the numeric `sai_status_t` values this module also provides the
//! name table used to encode and decode them.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// SAI status codes matching the SAI C API.
///
/// These values correspond to `sai_status_t` in the SAI header files.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaiStatus {
    Success = 0,
    Failure = -1,
    NotSupported = -2,
    NoMemory = -3,
    InsufficientResources = -4,
    InvalidParameter = -5,
    ItemAlreadyExists = -6,
    ItemNotFound = -7,
    BufferOverflow = -8,
    InvalidPortNumber = -9,
    InvalidPortMember = -10,
    InvalidVlanId = -11,
    Uninitialized = -12,
    TableFull = -13,
    MandatoryAttributeMissing = -14,
    NotImplemented = -15,
    AddrNotFound = -16,
    ObjectInUse = -17,
    InvalidObjectType = -18,
    InvalidObjectId = -19,
    InvalidNifId = -20,
    NifTableFull = -21,
    HwTableFull = -22,
    NotExecuted = -23,
    InvalidAttribute = -24,
}

const STATUS_NAMES: &[(SaiStatus, &str)] = &[
    (SaiStatus::Success, "SAI_STATUS_SUCCESS"),
    (SaiStatus::Failure, "SAI_STATUS_FAILURE"),
    (SaiStatus::NotSupported, "SAI_STATUS_NOT_SUPPORTED"),
    (SaiStatus::NoMemory, "SAI_STATUS_NO_MEMORY"),
    (SaiStatus::InsufficientResources, "SAI_STATUS_INSUFFICIENT_RESOURCES"),
    (SaiStatus::InvalidParameter, "SAI_STATUS_INVALID_PARAMETER"),
    (SaiStatus::ItemAlreadyExists, "SAI_STATUS_ITEM_ALREADY_EXISTS"),
    (SaiStatus::ItemNotFound, "SAI_STATUS_ITEM_NOT_FOUND"),
    (SaiStatus::BufferOverflow, "SAI_STATUS_BUFFER_OVERFLOW"),
    (SaiStatus::InvalidPortNumber, "SAI_STATUS_INVALID_PORT_NUMBER"),
    (SaiStatus::InvalidPortMember, "SAI_STATUS_INVALID_PORT_MEMBER"),
    (SaiStatus::InvalidVlanId, "SAI_STATUS_INVALID_VLAN_ID"),
    (SaiStatus::Uninitialized, "SAI_STATUS_UNINITIALIZED"),
    (SaiStatus::TableFull, "SAI_STATUS_TABLE_FULL"),
    (
        SaiStatus::MandatoryAttributeMissing,
        "SAI_STATUS_MANDATORY_ATTRIBUTE_MISSING",
    ),
    (SaiStatus::NotImplemented, "SAI_STATUS_NOT_IMPLEMENTED"),
    (SaiStatus::AddrNotFound, "SAI_STATUS_ADDR_NOT_FOUND"),
    (SaiStatus::ObjectInUse, "SAI_STATUS_OBJECT_IN_USE"),
    (SaiStatus::InvalidObjectType, "SAI_STATUS_INVALID_OBJECT_TYPE"),
    (SaiStatus::InvalidObjectId, "SAI_STATUS_INVALID_OBJECT_ID"),
    (SaiStatus::InvalidNifId, "SAI_STATUS_INVALID_NIF_ID"),
    (SaiStatus::NifTableFull, "SAI_STATUS_NIF_TABLE_FULL"),
    (SaiStatus::HwTableFull, "SAI_STATUS_HW_TABLE_FULL"),
    (SaiStatus::NotExecuted, "SAI_STATUS_NOT_EXECUTED"),
    (SaiStatus::InvalidAttribute, "SAI_STATUS_INVALID_ATTRIBUTE"),
];

impl SaiStatus {
    /// Creates a SaiStatus from a raw i32 value.
    ///
    /// Unknown codes collapse to [`SaiStatus::Failure`].
    pub fn from_raw(status: i32) -> Self {
        STATUS_NAMES
            .iter()
            .map(|(s, _)| *s)
            .find(|s| *s as i32 == status)
            .unwrap_or(SaiStatus::Failure)
    }

    /// Returns the raw `sai_status_t` value.
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Returns the wire name of the status, e.g. `SAI_STATUS_SUCCESS`.
    pub fn name(self) -> &'static str {
        STATUS_NAMES
            .iter()
            .find(|(s, _)| *s == self)
            .map(|(_, n)| *n)
            .unwrap_or("SAI_STATUS_FAILURE")
    }

    /// Returns true if the status indicates success.
    pub fn is_success(&self) -> bool {
        *self == SaiStatus::Success
    }

    /// Returns true if the status indicates an error.
    pub fn is_error(&self) -> bool {
        *self != SaiStatus::Success
    }

    /// Converts to a Result, returning Ok(()) for success.
    pub fn into_result(self) -> SaiResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(SaiError::from_status(self))
        }
    }
}

impl fmt::Display for SaiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a status name received from the wire is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown SAI status name: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for SaiStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STATUS_NAMES
            .iter()
            .find(|(_, n)| *n == s)
            .map(|(status, _)| *status)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Error type for SAI operations.
///
/// Every variant maps back to a [`SaiStatus`] through [`SaiError::status`],
/// so callers that speak raw status codes lose nothing.
#[derive(Debug, Clone, Error)]
pub enum SaiError {
    /// A status reported verbatim (usually by the remote end).
    #[error("SAI operation failed: {status}")]
    Status { status: SaiStatus },

    /// The requested feature is not supported in the current mode.
    #[error("Feature not supported: {feature}")]
    NotSupported { feature: String },

    /// The operation exists in the API but is not provided by this layer.
    #[error("Not implemented: {feature}")]
    NotImplemented { feature: String },

    /// Invalid parameter passed to the API.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The requested item was not found.
    #[error("Item not found: {item}")]
    NotFound { item: String },

    /// Object handle space or another local resource is exhausted.
    #[error("Insufficient resources: {resource}")]
    InsufficientResources { resource: String },

    /// The API is not initialized.
    #[error("SAI not initialized")]
    Uninitialized,

    /// A synchronous wait did not see its response in time.
    #[error("Timed out after {timeout_ms} ms waiting for {command}")]
    Timeout { command: String, timeout_ms: u64 },

    /// The communication channel failed.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SaiError {
    /// Creates an error carrying a status code verbatim.
    pub fn from_status(status: SaiStatus) -> Self {
        if status.is_success() {
            return SaiError::Internal {
                message: "from_status called with success status".to_string(),
            };
        }
        SaiError::Status { status }
    }

    /// Creates a generic failure.
    pub fn failure() -> Self {
        SaiError::Status {
            status: SaiStatus::Failure,
        }
    }

    /// Creates a not supported error with a feature description.
    pub fn not_supported(feature: impl Into<String>) -> Self {
        SaiError::NotSupported {
            feature: feature.into(),
        }
    }

    /// Creates a not implemented error.
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        SaiError::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Creates an invalid parameter error with a message.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        SaiError::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates a not found error with an item description.
    pub fn not_found(item: impl Into<String>) -> Self {
        SaiError::NotFound { item: item.into() }
    }

    /// Creates an insufficient resources error.
    pub fn insufficient_resources(resource: impl Into<String>) -> Self {
        SaiError::InsufficientResources {
            resource: resource.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        SaiError::Transport {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        SaiError::Internal {
            message: message.into(),
        }
    }

    /// Returns the SAI status this error stands for.
    pub fn status(&self) -> SaiStatus {
        match self {
            SaiError::Status { status } => *status,
            SaiError::NotSupported { .. } => SaiStatus::NotSupported,
            SaiError::NotImplemented { .. } => SaiStatus::NotImplemented,
            SaiError::InvalidParameter { .. } => SaiStatus::InvalidParameter,
            SaiError::NotFound { .. } => SaiStatus::ItemNotFound,
            SaiError::InsufficientResources { .. } => SaiStatus::InsufficientResources,
            SaiError::Uninitialized => SaiStatus::Uninitialized,
            SaiError::Timeout { .. } | SaiError::Transport { .. } | SaiError::Internal { .. } => {
                SaiStatus::Failure
            }
        }
    }
}

/// Result type for SAI operations.
pub type SaiResult<T> = Result<T, SaiError>;

/// Extension trait for converting raw SAI status codes.
pub trait SaiStatusExt {
    /// Converts a raw status code to a Result.
    fn to_result(self) -> SaiResult<()>;
}

impl SaiStatusExt for i32 {
    fn to_result(self) -> SaiResult<()> {
        SaiStatus::from_raw(self).into_result()
    }
}

/// Collapses a result into the status code a C caller would see.
pub fn status_of<T>(result: &SaiResult<T>) -> SaiStatus {
    match result {
        Ok(_) => SaiStatus::Success,
        Err(e) => e.status(),
    }
}
