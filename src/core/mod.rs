//! Core domain models
//!
//! This module defines steps, pipelines, their run outcomes, and the
//! declarative workflow configuration that builds simulated pipelines.

pub mod config;
pub mod outcome;
pub mod pipeline;
pub mod simulated;
pub mod step;

pub use outcome::*;
pub use pipeline::*;
pub use step::*;
