//! Form bodies. Every field is optional so an absent field reaches the
//! validators as missing rather than failing extraction.

use serde::Deserialize;

use crate::services::{ProfileUpdate, RegisterInput};

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl RegisterForm {
    pub fn as_input(&self) -> RegisterInput<'_> {
        RegisterInput {
            username: self.username.as_deref(),
            password: self.password.as_deref(),
            confirm: self.confirm.as_deref(),
            first_name: self.first_name.as_deref(),
            last_name: self.last_name.as_deref(),
            email: self.email.as_deref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileForm {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl ProfileForm {
    pub fn as_update(&self) -> ProfileUpdate<'_> {
        ProfileUpdate {
            username: self.username.as_deref(),
            first_name: self.first_name.as_deref(),
            last_name: self.last_name.as_deref(),
            email: self.email.as_deref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PasswordForm {
    pub new_password: Option<String>,
    pub verify: Option<String>,
}
