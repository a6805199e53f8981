//! Rendering subsystems

pub mod lighting;
