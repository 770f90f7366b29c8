pub mod auth_handlers;
pub mod auth_middleware;
pub mod user_handlers;

pub use auth_handlers::{login, logout, refresh_token, register};
pub use auth_middleware::{CurrentUser, auth_middleware};
pub use user_handlers::{get_me, get_user, update_me};
