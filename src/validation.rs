//! Form checks run before anything reaches the identity service.
//!
//! Each form's `validate` returns the trimmed values on success. The first
//! failing rule is reported and blocks submission.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::warn;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_PHONE_DIGITS: usize = 10;
pub const MAX_PHONE_DIGITS: usize = 15;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your {0}")]
    Required(&'static str),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must contain at least one uppercase letter")]
    PasswordMissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    PasswordMissingLowercase,

    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("Please enter a valid phone number (10-15 digits)")]
    InvalidPhone,

    #[error("Photo URL must start with http:// or https://")]
    InvalidPhotoUrl,
}

pub fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value.to_string())
}

pub fn email(value: &str) -> Result<String, ValidationError> {
    let value = required(value, "email address")?;
    if !EMAIL_SHAPE.is_match(&value) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(value)
}

/// Uppercase, then lowercase, then length. The password is not trimmed.
pub fn password(value: &str) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required("password"));
    }
    if !value.chars().any(char::is_uppercase) {
        return Err(ValidationError::PasswordMissingUppercase);
    }
    if !value.chars().any(char::is_lowercase) {
        return Err(ValidationError::PasswordMissingLowercase);
    }
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(value.to_string())
}

/// Strips separators and returns the bare digits.
pub fn phone(value: &str) -> Result<String, ValidationError> {
    let value = required(value, "phone number")?;
    let rest = value.strip_prefix('+').unwrap_or(&value);

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err(ValidationError::InvalidPhone),
        }
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(digits)
}

pub fn photo_url(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let has_host = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ValidationError::InvalidPhotoUrl);
    }
    Ok(Some(value.to_string()))
}

fn logged<T>(form: &'static str, result: Result<T, ValidationError>) -> Result<T, ValidationError> {
    result.inspect_err(|e| warn!(form, error = %e, "form rejected"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub photo_url: Option<String>,
}

impl SignupForm {
    pub fn validate(&self) -> Result<SignupForm, ValidationError> {
        logged("signup", self.cleaned())
    }

    fn cleaned(&self) -> Result<SignupForm, ValidationError> {
        Ok(SignupForm {
            name: required(&self.name, "name")?,
            email: email(&self.email)?,
            password: password(&self.password)?,
            photo_url: photo_url(self.photo_url.as_deref())?,
        })
    }
}

/// Sign-in only checks presence and email shape. Strength rules apply when
/// the password is chosen, not when it is typed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginForm, ValidationError> {
        logged("login", self.cleaned())
    }

    fn cleaned(&self) -> Result<LoginForm, ValidationError> {
        let email = email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        Ok(LoginForm {
            email,
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetForm {
    pub email: String,
}

impl PasswordResetForm {
    pub fn validate(&self) -> Result<PasswordResetForm, ValidationError> {
        logged("password reset", self.cleaned())
    }

    fn cleaned(&self) -> Result<PasswordResetForm, ValidationError> {
        Ok(PasswordResetForm {
            email: email(&self.email)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<ProfileForm, ValidationError> {
        logged("profile", self.cleaned())
    }

    fn cleaned(&self) -> Result<ProfileForm, ValidationError> {
        let name = match self.name.as_deref() {
            Some(name) => Some(required(name, "name")?),
            None => None,
        };
        Ok(ProfileForm {
            name,
            photo_url: photo_url(self.photo_url.as_deref())?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.photo_url.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsultationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ConsultationForm {
    pub fn validate(&self) -> Result<ConsultationForm, ValidationError> {
        logged("consultation", self.cleaned())
    }

    fn cleaned(&self) -> Result<ConsultationForm, ValidationError> {
        Ok(ConsultationForm {
            name: required(&self.name, "name")?,
            email: email(&self.email)?,
            phone: phone(&self.phone)?,
        })
    }
}
