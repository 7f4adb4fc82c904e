/// Story Service Library
///
/// Community story site backend: readers submit stories, vote once per email,
/// pay to boost a story, and subscribe to a newsletter.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route configuration
/// - `models`: Story and vote ledger records
/// - `services`: Business logic layer and payment processor integration
/// - `db`: JSON-file record store
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
