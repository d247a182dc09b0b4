/// HEMIS schedule API: raw payload types, the entry mapper and the HTTP client
mod client;
pub(crate) mod types;

pub use client::HemisClient;
pub use types::{map_entry, RawScheduleEntry, ScheduleResponse};
