pub mod error;
pub mod health;
pub mod repositories;
pub mod users;

pub use error::AppError;
