//! Capability traits implemented by the leaf crates.

pub mod dispatch;
pub mod provider;
pub mod registry;
pub mod store;

pub use dispatch::Dispatcher;
pub use provider::TextProvider;
pub use registry::{PreferenceRegistry, SlotRegistry, SubscriberRegistry};
pub use store::{BroadcastCounter, BroadcastJobStore, ContentCache, DedupStore, RecordResult};
