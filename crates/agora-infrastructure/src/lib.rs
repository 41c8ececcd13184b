pub mod config_service;
pub mod json_snapshot_repository;
pub mod memory_snapshot_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::json_snapshot_repository::JsonSnapshotRepository;
pub use crate::memory_snapshot_repository::InMemorySnapshotRepository;
pub use crate::paths::AgoraPaths;
