//! # erosion-core
//! Foundation types, configuration and traits for the Landscrap erosion engine.

pub mod config;
pub mod constants;
pub mod error;
pub mod seed;
pub mod traits;
pub mod types;
