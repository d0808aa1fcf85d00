//! User administration, the current profile and organizational units.

use campus_core::validation::validate_credentials;
use campus_core::{Page, Principal, Unit, User, UserForm, ValidationError};
use serde::Serialize;
use tracing::info;

use super::{with_query, PageParams};
use crate::error::ClientResult;
use crate::http::{ApiBody, ApiClient};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordChange<'a> {
    old_password: &'a str,
    new_password: &'a str,
}

impl ApiClient {
    /// `GET /users/me`
    pub async fn current_user(&self) -> ClientResult<Principal> {
        self.get_json("/users/me").await
    }

    /// `GET /users?page=..&size=..`
    pub async fn list_users(&self, page: u32, size: u32) -> ClientResult<Page<User>> {
        let path = with_query("/users", &PageParams { page, size })?;
        self.get_json(&path).await
    }

    /// `GET /users/{id}`
    pub async fn get_user(&self, id: i64) -> ClientResult<User> {
        self.get_json(&format!("/users/{}", id)).await
    }

    /// `POST /users`
    pub async fn create_user(&self, form: &UserForm) -> ClientResult<()> {
        let password = form.password.as_deref().unwrap_or_default();
        validate_credentials(&form.username, password)?;
        self.post("/users", form).await?;
        info!(username = %form.username, role = ?form.role, "User created");
        Ok(())
    }

    /// `PUT /users/{id}`
    pub async fn update_user(&self, id: i64, form: &UserForm) -> ClientResult<()> {
        if form.username.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "username" }.into());
        }
        self.put(&format!("/users/{}", id), form).await?;
        info!(id, "User updated");
        Ok(())
    }

    /// `DELETE /users/{id}`
    pub async fn delete_user(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/users/{}", id)).await?;
        info!(id, "User deleted");
        Ok(())
    }

    /// `POST /users/{id}/reset-password`; returns whatever the server sent back.
    pub async fn reset_password(&self, id: i64) -> ClientResult<ApiBody> {
        let body = self
            .post_empty(&format!("/users/{}/reset-password", id))
            .await?;
        info!(id, "Password reset");
        Ok(body)
    }

    /// `POST /users/change-password` for the logged-in user.
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> ClientResult<()> {
        if new_password.is_empty() {
            return Err(ValidationError::EmptyField {
                field: "newPassword",
            }
            .into());
        }
        self.post(
            "/users/change-password",
            &PasswordChange {
                old_password,
                new_password,
            },
        )
        .await?;
        info!("Password changed");
        Ok(())
    }

    /// `GET /units`
    pub async fn list_units(&self) -> ClientResult<Vec<Unit>> {
        self.get_json("/units").await
    }
}
