use thiserror::Error;

/// Provider-defined failure codes, named the way the identity service's web
/// SDK reports them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthErrorCode {
    EmailAlreadyInUse,
    InvalidEmail,
    WeakPassword,
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    UserDisabled,
    TooManyRequests,
    PopupClosedByUser,
    OperationNotAllowed,
    RequiresRecentLogin,
    UserTokenExpired,
    Other(String),
}

impl AuthErrorCode {
    /// Maps the REST API's `error.message`, which may carry a detail suffix
    /// such as `WEAK_PASSWORD : Password should be at least 6 characters`.
    pub fn from_rest_message(message: &str) -> Self {
        let code = message.split(" : ").next().unwrap_or(message).trim();
        match code {
            "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthErrorCode::InvalidEmail,
            "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => AuthErrorCode::UserNotFound,
            "INVALID_PASSWORD" => AuthErrorCode::WrongPassword,
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => {
                AuthErrorCode::InvalidCredential
            }
            "USER_DISABLED" => AuthErrorCode::UserDisabled,
            "USER_CANCELLED" => AuthErrorCode::PopupClosedByUser,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorCode::TooManyRequests,
            "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => {
                AuthErrorCode::OperationNotAllowed
            }
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => AuthErrorCode::RequiresRecentLogin,
            "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "USER_TOKEN_EXPIRED" => {
                AuthErrorCode::UserTokenExpired
            }
            other => AuthErrorCode::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AuthErrorCode::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthErrorCode::InvalidEmail => "auth/invalid-email",
            AuthErrorCode::WeakPassword => "auth/weak-password",
            AuthErrorCode::UserNotFound => "auth/user-not-found",
            AuthErrorCode::WrongPassword => "auth/wrong-password",
            AuthErrorCode::InvalidCredential => "auth/invalid-credential",
            AuthErrorCode::UserDisabled => "auth/user-disabled",
            AuthErrorCode::TooManyRequests => "auth/too-many-requests",
            AuthErrorCode::PopupClosedByUser => "auth/popup-closed-by-user",
            AuthErrorCode::OperationNotAllowed => "auth/operation-not-allowed",
            AuthErrorCode::RequiresRecentLogin => "auth/requires-recent-login",
            AuthErrorCode::UserTokenExpired => "auth/user-token-expired",
            AuthErrorCode::Other(raw) => raw,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorCode::EmailAlreadyInUse => "This email is already registered. Please log in instead",
            AuthErrorCode::InvalidEmail => "Please enter a valid email address",
            AuthErrorCode::WeakPassword => "Password is too weak. Please choose a stronger one",
            AuthErrorCode::UserNotFound => "No account found with this email address",
            AuthErrorCode::WrongPassword => "Incorrect password. Please try again",
            AuthErrorCode::InvalidCredential => "Invalid email or password",
            AuthErrorCode::UserDisabled => "This account has been disabled",
            AuthErrorCode::TooManyRequests => "Too many requests. Please try again later",
            AuthErrorCode::PopupClosedByUser => "Sign-in was cancelled before it finished",
            AuthErrorCode::OperationNotAllowed => "This sign-in method is not enabled",
            AuthErrorCode::RequiresRecentLogin => "Please log in again to continue",
            AuthErrorCode::UserTokenExpired => "Your session has expired. Please log in again",
            AuthErrorCode::Other(_) => "Something went wrong. Please try again",
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{}", .0.user_message())]
    Provider(AuthErrorCode),

    #[error("identity service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not encode identity service request: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),

    #[error("identity service returned an unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("identity service is not configured: set {0}")]
    NotConfigured(&'static str),

    #[error("You need to log in first")]
    NoSession,
}

impl AuthError {
    pub fn code(&self) -> Option<&AuthErrorCode> {
        match self {
            AuthError::Provider(code) => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_messages_map_to_sdk_codes() {
        let cases = [
            ("EMAIL_EXISTS", "auth/email-already-in-use"),
            ("INVALID_LOGIN_CREDENTIALS", "auth/invalid-credential"),
            ("USER_DISABLED", "auth/user-disabled"),
            ("USER_CANCELLED", "auth/popup-closed-by-user"),
            ("EMAIL_NOT_FOUND", "auth/user-not-found"),
            (
                "TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled",
                "auth/too-many-requests",
            ),
            (
                "WEAK_PASSWORD : Password should be at least 6 characters",
                "auth/weak-password",
            ),
        ];
        for (message, code) in cases {
            assert_eq!(AuthErrorCode::from_rest_message(message).code(), code);
        }
    }

    #[test]
    fn unknown_codes_are_kept_verbatim() {
        let code = AuthErrorCode::from_rest_message("QUOTA_EXCEEDED");
        assert_eq!(code, AuthErrorCode::Other("QUOTA_EXCEEDED".into()));
        assert_eq!(code.code(), "QUOTA_EXCEEDED");
        assert_eq!(code.user_message(), "Something went wrong. Please try again");
    }

    #[test]
    fn provider_error_displays_user_message() {
        let err = AuthError::Provider(AuthErrorCode::EmailAlreadyInUse);
        assert_eq!(
            err.to_string(),
            "This email is already registered. Please log in instead"
        );
        assert_eq!(err.code(), Some(&AuthErrorCode::EmailAlreadyInUse));
    }
}
