//! Login and register form validation.
//!
//! Runs before any backend call. Messages are the ones the FinUp screens
//! show, so they stay in Spanish.

use serde::{Deserialize, Serialize};

pub const MSG_NAME_REQUIRED: &str = "Nombre es requerido";
pub const MSG_EMAIL_REQUIRED: &str = "Email es requerido";
pub const MSG_EMAIL_INVALID: &str = "Email inválido";
pub const MSG_PASSWORD_REQUIRED: &str = "Contraseña es requerida";
pub const MSG_PASSWORD_MIN: &str = "La contraseña debe tener al menos 8 caracteres";
pub const MSG_PASSWORD_LETTER: &str = "La contraseña debe contener al menos una letra";
pub const MSG_PASSWORD_DIGIT: &str = "La contraseña debe contener al menos un número";
pub const MSG_CONFIRM_REQUIRED: &str = "Confirmar contraseña es requerido";
pub const MSG_PASSWORDS_MISMATCH: &str = "Las contraseñas deben coincidir";

const PASSWORD_MIN_CHARS: usize = 8;

/// One failed rule on one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Every failed rule, in field order.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_email(&self.email, &mut errors);
        if self.password.trim().is_empty() {
            errors.push(FieldError::new("password", MSG_PASSWORD_REQUIRED));
        }
        into_result(errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Every failed rule, in field order.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", MSG_NAME_REQUIRED));
        }
        check_email(&self.email, &mut errors);

        if self.password.is_empty() {
            errors.push(FieldError::new("password", MSG_PASSWORD_REQUIRED));
        } else {
            if self.password.chars().count() < PASSWORD_MIN_CHARS {
                errors.push(FieldError::new("password", MSG_PASSWORD_MIN));
            }
            if !self.password.chars().any(|c| c.is_ascii_alphabetic()) {
                errors.push(FieldError::new("password", MSG_PASSWORD_LETTER));
            }
            if !self.password.chars().any(|c| c.is_ascii_digit()) {
                errors.push(FieldError::new("password", MSG_PASSWORD_DIGIT));
            }
        }

        if self.confirm_password.is_empty() {
            errors.push(FieldError::new("confirmPassword", MSG_CONFIRM_REQUIRED));
        } else if self.confirm_password != self.password {
            errors.push(FieldError::new("confirmPassword", MSG_PASSWORDS_MISMATCH));
        }

        into_result(errors)
    }
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    let email = email.trim();
    if email.is_empty() {
        errors.push(FieldError::new("email", MSG_EMAIL_REQUIRED));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new("email", MSG_EMAIL_INVALID));
    }
}

/// `local@domain.tld`, no whitespace, a dot inside the domain.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !host.starts_with('.') && tld.len() >= 2
}

fn into_result(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
