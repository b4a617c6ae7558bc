// DOS2DE Importer - Collada/Granny import pipeline for Divinity: Original Sin 2 assets
//
// This is the library crate containing the import pipeline and its data structures.
// The binary crate (main.rs) provides a command line front end.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::ImportMetrics;
pub use models::{ImportOptions, ImportSettings, ImporterState, Preferences};
pub use services::{Importer, Scene, SkeletonCatalog, TextureResolver};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
