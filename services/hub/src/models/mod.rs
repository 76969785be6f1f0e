//! Study Hub records

pub mod material;
pub mod message;
pub mod user;

// Re-export for convenience
pub use material::{Material, NewMaterial};
pub use message::{Message, NewMessage};
pub use user::{NewUser, User};
