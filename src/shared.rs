pub mod error;
pub mod models;
pub mod response;
pub mod state;
pub mod store;
pub mod utils;
pub mod validation;
