pub mod controllers;
pub mod dto;
pub mod error;
pub mod server;
pub mod services;

pub use error::AppError;
pub use server::{AppState, ConfigProviderResolver, ProviderResolver};
