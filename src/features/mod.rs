pub mod alerts;
pub mod notifier;
pub mod stats;
pub mod store;

pub use alerts::{should_notify, PriceDropAlert};
pub use notifier::{LogNotifier, Notifier};
pub use store::{StoreError, TrackerStore};
