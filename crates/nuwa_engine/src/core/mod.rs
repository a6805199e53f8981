//! # Core Engine Module
//!
//! Shared configuration used by every subsystem. Loading and saving goes
//! through the [`Config`](crate::config::Config) trait.

pub mod config;

pub use config::{
    AssetConfig, CameraConfig, Config, ConfigError, EngineConfig, LoggingConfig, ViewportConfig,
};
