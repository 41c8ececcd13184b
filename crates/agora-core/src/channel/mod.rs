pub mod model;
pub mod read;
pub mod repository;

pub use model::{Channel, ChannelInfo, ChannelSummary, Message, Snapshot};
pub use read::{History, NewMessages, ReadLimit, ReadMode};
pub use repository::{SnapshotRepository, StoreGuard};
