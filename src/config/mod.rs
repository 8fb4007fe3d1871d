//! Configuration loading and management for the leave engine.
//!
//! This module loads engine settings (carry-forward cap, holiday lookup
//! buffer, retention, retry limits) and the per-region default rule tables
//! used to bootstrap an organization's rule catalog.
//!
//! # Example
//!
//! ```no_run
//! use leave_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Carry-forward cap: {}", config.settings().carry_forward_cap);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{DefaultRule, EngineConfig, EngineSettings, RegionPolicy};
