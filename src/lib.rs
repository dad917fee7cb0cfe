//! Atheneum Library Lending Engine
//!
//! Keeps a lending catalog consistent under concurrent requests: per-title
//! copy counts, outstanding borrow records and category membership move
//! together or not at all. Invoked in-process by a host application; this
//! crate owns no network protocol of its own.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod seed;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
