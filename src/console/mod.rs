// ============================================================================
// Console service
// ============================================================================
//
// Two producers feed one consumer:
//   - the refresh worker reconciles on a fixed interval (or on demand);
//   - command tasks run lifecycle and deletion operations.
// Every result reaches the display consumer as an Update over one channel,
// and the consumer alone owns ConsoleState. Views are published through a
// watch channel, so a reader never observes a half-applied update.
//
// ============================================================================

pub mod service;
pub mod state;

pub use service::{ConsoleHandle, ConsoleService};
pub use state::{ConsoleState, ConsoleView, Update};
