pub mod admin_tariffs;
pub mod files;
pub mod health;
pub mod tariffs;

use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope shared by the JSON endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}
