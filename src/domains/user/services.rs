pub mod auth_service;
pub mod jwt_service;
pub mod password_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use jwt_service::{JwtConfig, JwtService};
pub use password_service::{PasswordConfig, PasswordService};
pub use user_service::UserService;
