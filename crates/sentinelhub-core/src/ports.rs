//! Port trait definitions
//!
//! These traits define the seams to the network, the host CRS registry, the
//! settings store, and the wall clock. Adapters implement them in other crates.

pub mod clock;
pub mod network;
pub mod registry;
pub mod store;

pub use clock::Clock;
pub use network::{Downloader, SessionSettings};
pub use registry::CrsRegistry;
pub use store::SettingsStore;
