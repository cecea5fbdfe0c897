//! Shared types, errors, and configuration for Tradewind.
//!
//! This crate holds the primitives every other crate depends on:
//! money in integer minor units, typed IDs, the application error
//! type, and configuration loading.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
