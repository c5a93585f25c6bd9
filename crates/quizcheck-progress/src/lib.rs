//! quizcheck-progress: Learner progress stores.
//!
//! Implements the `ProgressStore` trait over a PostgREST-style HTTP backend
//! and a local JSON file, and loads the quizcheck configuration that selects
//! between them.

pub mod config;
pub mod error;
pub mod http;
pub mod local;

pub use config::{create_store, load_config, load_config_from, ProgressConfig, QuizcheckConfig};
pub use error::ProgressError;
pub use http::HttpProgressStore;
pub use local::LocalProgressStore;
