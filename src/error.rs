//! Error types for the transaction registry.

use thiserror::Error;

/// Main error type for registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Group name must not be empty")]
    EmptyGroupName,

    #[error("Device id must not be empty")]
    EmptyDeviceId,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Reject empty group names.
pub(crate) fn check_group(group: &str) -> Result<()> {
    if group.is_empty() {
        return Err(RegistryError::EmptyGroupName);
    }
    Ok(())
}

/// Reject empty device ids. The empty id is the range-scan sentinel.
pub(crate) fn check_device(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(RegistryError::EmptyDeviceId);
    }
    Ok(())
}
