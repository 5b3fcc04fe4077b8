use error_stack::Report;
use thiserror::Error;
use validator::ValidateError;

use crate::host::Permission;

/// Errors surfaced by registration operations.
///
/// Every variant is terminal for the current operation and nothing
/// is written to the user store once one of them is raised.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected input: bad e-mail, taken or reserved member id,
    /// weak password, unknown member or an unusable reset code.
    #[error("Invalid registration data: {0}")]
    Invalid(ValidateError),
    /// The permission gate refused the action.
    #[error("Insufficient privileges: '{0}' permission is required")]
    Unauthorized(Permission),
    /// The user store failed to answer or to persist.
    #[error("User store failure")]
    Store,
    /// No mail transport is available or it failed to deliver.
    #[error("Could not send email")]
    Mail,
}

/// Lazily typed [`std::result::Result`] but the error generic
/// is filled up with [a registration error](Error).
pub type Result<T> = error_stack::Result<T, Error>;

impl Error {
    #[must_use]
    pub fn invalid(key: &'static str, message: &'static str) -> Report<Self> {
        Report::new(Self::Invalid(ValidateError::field(key, message)))
    }
}

/// Saves callers from matching on [`Report::current_context`]
/// whenever only the error kind matters.
pub trait ErrorExt {
    fn is_invalid(&self) -> bool;
    fn is_unauthorized(&self) -> bool;
    fn validation(&self) -> Option<&ValidateError>;
}

impl ErrorExt for Report<Error> {
    fn is_invalid(&self) -> bool {
        matches!(self.current_context(), Error::Invalid(..))
    }

    fn is_unauthorized(&self) -> bool {
        matches!(self.current_context(), Error::Unauthorized(..))
    }

    fn validation(&self) -> Option<&ValidateError> {
        match self.current_context() {
            Error::Invalid(error) => Some(error),
            _ => None,
        }
    }
}
