//! Query-time recommendation engine and its HTTP service.
//!
//! Loads the preprocessed snapshot once at startup and answers five
//! recommendation strategies plus a composite "by book" query over it.
//! Every query is a bounded in-memory scan; nothing mutates after load.

pub mod config;
pub mod engine;
pub mod server;

pub use config::EngineConfig;
pub use engine::RecommendationEngine;
pub use server::AppState;
