//! Input validation applied at the input boundary
//!
//! The stores never call these; front ends check user input before handing
//! it to the core so obviously bad requests never reach the network.

use crate::error::AuthError;
use crate::task::{CreateTaskRequest, UpdateTaskRequest};
use crate::Result;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 72;
pub const NAME_MAX_LEN: usize = 255;
pub const TITLE_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 5000;

pub fn validate_email(email: &str) -> Result<()> {
    match email.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(AuthError::validation("Please enter a valid email address")),
    }
}

pub fn validate_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(AuthError::validation(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(AuthError::validation(format!(
            "Password must be at most {} characters",
            PASSWORD_MAX_LEN
        )));
    }
    Ok(())
}

/// Validate sign-up input; `name` is optional
pub fn validate_sign_up(email: &str, password: &str, name: Option<&str>) -> Result<()> {
    validate_email(email)?;
    validate_password(password)?;
    if let Some(name) = name {
        let len = name.trim().chars().count();
        if len == 0 || len > NAME_MAX_LEN {
            return Err(AuthError::validation(format!(
                "Name must be between 1 and {} characters",
                NAME_MAX_LEN
            )));
        }
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<()> {
    let len = title.trim().chars().count();
    if len == 0 {
        return Err(AuthError::validation("Title is required"));
    }
    if len > TITLE_MAX_LEN {
        return Err(AuthError::validation(format!(
            "Title must be at most {} characters",
            TITLE_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<()> {
    match description {
        Some(desc) if desc.chars().count() > DESCRIPTION_MAX_LEN => Err(AuthError::validation(
            format!("Description must be at most {} characters", DESCRIPTION_MAX_LEN),
        )),
        _ => Ok(()),
    }
}

pub fn validate_create_task(request: &CreateTaskRequest) -> Result<()> {
    validate_title(&request.title)?;
    validate_description(request.description.as_deref())
}

pub fn validate_update_task(request: &UpdateTaskRequest) -> Result<()> {
    if let Some(title) = &request.title {
        validate_title(title)?;
    }
    validate_description(request.description.as_deref())
}
