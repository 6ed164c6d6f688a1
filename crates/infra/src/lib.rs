//! Infrastructure layer: document persistence, seed data, configuration and
//! code rendering.

pub mod config;
pub mod persistence;
pub mod qr;
pub mod seed;

pub use config::{AppConfig, ConfigError};
pub use persistence::{
    InMemoryGateway, JsonFileGateway, PersistenceError, PersistenceGateway, Snapshot,
    SnapshotSource, load_or_seed,
};
pub use qr::QrSvgRenderer;
pub use seed::{SEED_STORAGE_ID, seed_state, seed_state_at};
