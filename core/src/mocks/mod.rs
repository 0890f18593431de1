//! In-memory store implementations for testing and local development.
//!
//! [`MemoryStore`] implements every storage trait over one shared state
//! behind a single lock, which gives the booking unit of work the same
//! atomicity a database transaction provides. [`RecordingNotifier`]
//! captures emissions for assertions.

mod memory;
mod notifier;

pub use memory::MemoryStore;
pub use notifier::RecordingNotifier;
