//! Syncs a HEMIS class schedule into a local SQLite store and exports it to XLSX.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod hemis;
pub mod server;
pub mod sync;
pub mod types;

pub use config::{AppConfig, HemisConfig, MalformedPolicy};
pub use db::{ScheduleRecord, ScheduleStore, ScheduleTable};
pub use error::ScheduleError;
pub use export::export_spreadsheet;
pub use hemis::{map_entry, HemisClient};
pub use sync::{SyncPipeline, SyncReport};
