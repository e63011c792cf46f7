//! Destination implementations
//!
//! Every shipped destination is a [`LockedDestination`]: a formatter plus a
//! backend behind a lock policy. Custom media only need a [`Backend`]; fully
//! custom destinations implement [`Destination`](crate::Destination) directly.

pub mod console;
pub mod file;
pub mod locked;
pub mod memory;

pub use console::{ConsoleBackend, ConsoleDestinationMt, ConsoleDestinationSt, ConsoleTarget};
pub use file::{FileBackend, FileDestinationMt, FileDestinationSt};
pub use locked::{Backend, LockedDestination};
pub use memory::{MemoryBackend, MemoryDestination, MemoryDestinationSt};
