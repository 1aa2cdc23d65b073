pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod manifest;
pub mod utils;

pub use config::AppConfig;
pub use core::{ChatService, EmbeddingService};
pub use http::{build_router, AppState, HttpServer};
pub use manifest::Manifest;
pub use utils::error::{AppError, Result};
