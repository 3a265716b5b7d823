//! LMS Core - grading and room inventory backend
//!
//! REST API over PostgreSQL: grades with an append-only history, and a room
//! inventory with token-authenticated bulk mutations.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod migration;
pub mod repository;
pub mod server;
pub mod service;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
