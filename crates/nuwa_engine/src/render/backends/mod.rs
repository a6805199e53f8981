//! Graphics backend implementations
//!
//! Platform backends live outside this crate and implement
//! [`GpuBackend`](crate::render::api::GpuBackend). The headless backend here
//! keeps everything in memory and records every command, which makes it
//! suitable for tests, tooling and running the engine without a display.

pub mod headless;

pub use headless::{HeadlessBackend, RecordedCommand};
