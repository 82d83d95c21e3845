pub mod admin_auth;
pub mod request_id;

pub use admin_auth::{admin_auth_middleware, AdminAuthState};
pub use request_id::{request_id_middleware, RequestId};
