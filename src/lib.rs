//! Biblion Library Management System
//!
//! A Rust implementation of the Biblion library management server,
//! providing a REST JSON API for managing a book catalog, members,
//! borrowing and overdue fines.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod fines;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
