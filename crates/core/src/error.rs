//! # Error Module
//!
//! Domain errors for Kimbank, defined with thiserror.

use thiserror::Error;

/// Core domain errors.
///
/// These never touch the network; they come from parsing user input and from
/// the session gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid account type '{0}', expected 'client' or 'employee'")]
    InvalidAccountType(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("you must login first!")]
    NotLoggedIn,
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidAccountType("bogus".to_string());
        assert_eq!(
            err.to_string(),
            "invalid account type 'bogus', expected 'client' or 'employee'"
        );

        assert_eq!(CoreError::NotLoggedIn.to_string(), "you must login first!");
        assert_eq!(
            CoreError::InvalidNumber("12a".to_string()).to_string(),
            "invalid number '12a'"
        );
    }
}
