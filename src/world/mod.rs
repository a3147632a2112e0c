// ============================================================================
// World capability layer
// ============================================================================
//
// The live world belongs to the game runtime. The console reads it through
// the shared LiveRegistry and changes it only through WorldRuntime.
//
// ============================================================================

pub mod actor;
pub mod naming;
pub mod registry;
pub mod runtime;
pub mod simulated;

pub use actor::{LiveActor, SessionContext};
pub use naming::NameRegistry;
pub use registry::LiveRegistry;
pub use runtime::WorldRuntime;
pub use simulated::{SimulatedWorld, WorldEvent};
