//! User and authentication endpoints.

use reqwest::Method;
use serde_json::json;

use super::model::{AuthResponse, LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest, User};
use super::{ApiError, Client, Page};

impl Client {
    pub fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post(
            "auth/login",
            &LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
    }

    pub fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post("auth/register", req)
    }

    /// The logged-in user.
    pub fn me(&self) -> Result<User, ApiError> {
        self.get_one("users/me")
    }

    pub fn profile(&self) -> Result<User, ApiError> {
        self.get_one("users/profile")
    }

    /// All users (admin).
    pub fn users(&self) -> Result<Page<User>, ApiError> {
        self.get_list("users")
    }

    pub fn update_nickname(&self, id: i64, nickname: &str) -> Result<(), ApiError> {
        self.put_field(id, "nickname", nickname)
    }

    pub fn update_email(&self, id: i64, email: &str) -> Result<(), ApiError> {
        self.put_field(id, "email", email)
    }

    pub fn update_avatar(&self, id: i64, avatar: &str) -> Result<(), ApiError> {
        self.put_field(id, "avatar", avatar)
    }

    pub fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<(), ApiError> {
        self.execute(
            self.request(Method::PUT, &format!("users/{}/profile", id))
                .json(update),
        )
    }

    pub fn update_password(&self, id: i64, change: &PasswordChange) -> Result<(), ApiError> {
        self.execute(
            self.request(Method::PUT, &format!("users/{}/password", id))
                .json(change),
        )
    }

    /// Grant VIP membership for `days` days (admin).
    pub fn grant_vip(&self, id: i64, days: u32) -> Result<(), ApiError> {
        self.execute(
            self.request(Method::POST, &format!("users/{}/vip", id))
                .query(&[("days", days)]),
        )
    }

    pub fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("users/{}", id))
    }

    fn put_field(&self, id: i64, field: &str, value: &str) -> Result<(), ApiError> {
        self.execute(
            self.request(Method::PUT, &format!("users/{}/{}", id, field))
                .json(&json!({ field: value })),
        )
    }
}
