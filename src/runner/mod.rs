//! Runner module - the step-sequencing and verification engine.

pub mod engine;

pub use engine::{resolve_base_location, StepRunner};
