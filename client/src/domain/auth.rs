//! Authentication primitives such as sign-in credentials and sign-up forms.
//!
//! Keep raw form parsing outside the services by exposing constructors that
//! validate string inputs before the session manager talks to a port.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{DisplayName, EmailAddress, UserValidationError};

/// Domain error returned when sign-in or sign-up form values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// A required field was missing or blank.
    MissingFields,
    /// Password and confirmation differ.
    PasswordMismatch,
    /// Email did not look like an address.
    InvalidEmail,
    /// Display name exceeds `max` characters.
    NameTooLong { max: usize },
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "All fields are required!"),
            Self::PasswordMismatch => write!(f, "Password does not match"),
            Self::InvalidEmail => write!(f, "Please enter a valid email"),
            Self::NameTooLong { max } => write!(f, "Name must be at most {max} characters"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

/// Validated sign-in credentials.
///
/// ## Invariants
/// - `email` is trimmed and shaped like an address.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("a@x.com", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "a@x.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthValidationError::MissingFields);
        }
        let email = EmailAddress::new(email).map_err(|_| AuthValidationError::InvalidEmail)?;

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used as the account handle.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    name: DisplayName,
    credentials: LoginCredentials,
}

impl SignUpRequest {
    /// Validate the registration form fields.
    ///
    /// Every field is required and the confirmation must match the password
    /// exactly.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, AuthValidationError> {
        if name.trim().is_empty() || confirm_password.is_empty() {
            return Err(AuthValidationError::MissingFields);
        }
        let credentials = LoginCredentials::try_from_parts(email, password)?;
        if password != confirm_password {
            return Err(AuthValidationError::PasswordMismatch);
        }
        let name = DisplayName::new(name).map_err(|err| match err {
            UserValidationError::DisplayNameTooLong { max } => {
                AuthValidationError::NameTooLong { max }
            }
            _ => AuthValidationError::MissingFields,
        })?;

        Ok(Self { name, credentials })
    }

    /// Display name stored in the initial profile.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Credentials used to create the identity.
    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }
}
