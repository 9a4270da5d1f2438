pub mod error;
pub mod health;
pub mod timerange;
pub mod types;
