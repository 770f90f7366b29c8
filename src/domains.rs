pub mod events;
pub mod notes;
pub mod orders;
pub mod posts;
pub mod products;
pub mod resource;
pub mod tasks;
pub mod user;
