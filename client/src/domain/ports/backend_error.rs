//! Failure type shared by every backend-facing port.

use serde_json::json;

use crate::domain::Error;

use super::define_port_error;

/// Backend code reported when sign-up uses a registered email.
pub const EMAIL_IN_USE_CODE: &str = "auth/email-already-in-use";
/// Backend code reported when sign-in names an unknown account.
pub const USER_NOT_FOUND_CODE: &str = "auth/user-not-found";
/// Backend code reported when sign-in uses the wrong password.
pub const WRONG_CREDENTIAL_CODE: &str = "auth/wrong-password";
/// Backend code reported when a document does not exist.
pub const DOCUMENT_NOT_FOUND_CODE: &str = "not-found";
/// Backend code reported when the service cannot be reached.
pub const UNAVAILABLE_CODE: &str = "unavailable";

define_port_error! {
    /// Failures reported by the remote backend.
    ///
    /// Adapters translate their transport errors into these variants; the
    /// known authentication codes carry fixed user-facing messages while
    /// anything else surfaces the backend's own message.
    pub enum BackendError {
        /// Sign-up with an email that already has an account.
        EmailInUse { message: String } => "{message}",
        /// Sign-in for an account that does not exist.
        UserNotFound { message: String } => "{message}",
        /// Sign-in with a wrong password.
        WrongCredential { message: String } => "{message}",
        /// Targeted document does not exist.
        DocumentNotFound { message: String } => "{message}",
        /// Transport or availability failure.
        Unavailable { message: String } => "{message}",
        /// Any other backend-specific failure.
        Other { code: String, message: String } => "{message}",
    }
}

impl BackendError {
    /// Build an error from a raw backend code, recognising known codes.
    ///
    /// # Examples
    /// ```
    /// use client::domain::ports::BackendError;
    ///
    /// let err = BackendError::from_code("auth/wrong-password", "INVALID_PASSWORD");
    /// assert_eq!(err.user_message(), "Wrong Password");
    /// ```
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            EMAIL_IN_USE_CODE => Self::email_in_use(message),
            USER_NOT_FOUND_CODE => Self::user_not_found(message),
            WRONG_CREDENTIAL_CODE => Self::wrong_credential(message),
            DOCUMENT_NOT_FOUND_CODE => Self::document_not_found(message),
            UNAVAILABLE_CODE => Self::unavailable(message),
            other => Self::other(other, message),
        }
    }

    /// Machine-readable backend code.
    pub fn code(&self) -> &str {
        match self {
            Self::EmailInUse { .. } => EMAIL_IN_USE_CODE,
            Self::UserNotFound { .. } => USER_NOT_FOUND_CODE,
            Self::WrongCredential { .. } => WRONG_CREDENTIAL_CODE,
            Self::DocumentNotFound { .. } => DOCUMENT_NOT_FOUND_CODE,
            Self::Unavailable { .. } => UNAVAILABLE_CODE,
            Self::Other { code, .. } => code.as_str(),
        }
    }

    /// Message exactly as the backend reported it.
    pub fn raw_message(&self) -> &str {
        match self {
            Self::EmailInUse { message }
            | Self::UserNotFound { message }
            | Self::WrongCredential { message }
            | Self::DocumentNotFound { message }
            | Self::Unavailable { message }
            | Self::Other { message, .. } => message.as_str(),
        }
    }

    /// Message shown to the user: fixed text for known authentication
    /// codes, the raw backend message otherwise.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmailInUse { .. } => "This email is already registered".to_owned(),
            Self::UserNotFound { .. } => "User not Found".to_owned(),
            Self::WrongCredential { .. } => "Wrong Password".to_owned(),
            _ if self.raw_message().trim().is_empty() => {
                format!("backend request failed ({})", self.code())
            }
            _ => self.raw_message().to_owned(),
        }
    }
}

impl From<BackendError> for Error {
    fn from(value: BackendError) -> Self {
        Error::backend(value.user_message()).with_details(json!({
            "backendCode": value.code(),
            "backendMessage": value.raw_message(),
        }))
    }
}
