// ============================================================================
// Cascading deletion
// ============================================================================
//
// A character is removed together with every record that references it,
// inside a single store transaction. The plan is a flat list of steps, so a
// new dependent table is one more entry in CHARACTER_CASCADE.
//
// ============================================================================

pub mod engine;
pub mod steps;

pub use engine::{DeletionEngine, DeletionReport};
pub use steps::{CHARACTER_CASCADE, DeletionStep, StepKey};
