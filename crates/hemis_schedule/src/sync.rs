//! Fetch → map → upsert pipeline for one (week, semester) request.

use crate::config::MalformedPolicy;
use crate::db::ScheduleStore;
use crate::error::ScheduleError;
use crate::hemis::{map_entry, HemisClient};
use rand::Rng;
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info, warn};

/// Outcome of one sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub sync_id: String,
    pub week: i64,
    pub semester: i64,
    /// Number of entries HEMIS returned; this is the count shown to the user
    pub received: usize,
    pub upserted: usize,
    pub skipped: usize,
}

/// Runs a sync against borrowed client and store handles.
pub struct SyncPipeline<'a> {
    client: &'a HemisClient,
    store: &'a ScheduleStore,
    policy: MalformedPolicy,
}

impl<'a> SyncPipeline<'a> {
    pub fn new(client: &'a HemisClient, store: &'a ScheduleStore) -> Self {
        Self {
            client,
            store,
            policy: MalformedPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetches the schedule for `week`/`semester` and upserts every entry in order.
    ///
    /// With [`MalformedPolicy::Abort`] the first malformed entry ends the run with
    /// [`ScheduleError::MalformedRecord`]; entries written before it stay written.
    pub async fn sync(&self, week: i64, semester: i64) -> Result<SyncReport, ScheduleError> {
        let sync_id = generate_sync_id();
        let start = Instant::now();

        info!(
            sync_id = %sync_id,
            week = week,
            semester = semester,
            "Starting schedule sync"
        );

        let entries = self.client.fetch(week, semester).await.map_err(|e| {
            error!(sync_id = %sync_id, error = %e, "Schedule fetch failed");
            e
        })?;

        let mut report = SyncReport {
            sync_id: sync_id.clone(),
            week,
            semester,
            received: entries.len(),
            upserted: 0,
            skipped: 0,
        };

        for entry in &entries {
            let record = match map_entry(entry) {
                Ok(record) => record,
                Err(e) if self.policy == MalformedPolicy::Skip => {
                    warn!(sync_id = %sync_id, error = %e, "Skipping malformed entry");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!(
                        sync_id = %sync_id,
                        error = %e,
                        upserted = report.upserted,
                        "Aborting sync on malformed entry"
                    );
                    return Err(e);
                }
            };

            self.store.upsert(&record)?;
            report.upserted += 1;
        }

        info!(
            sync_id = %sync_id,
            received = report.received,
            upserted = report.upserted,
            skipped = report.skipped,
            duration_ms = start.elapsed().as_millis() as u64,
            "Schedule sync completed"
        );

        Ok(report)
    }
}

/// Generates a short random id used to correlate the log lines of one sync run.
fn generate_sync_id() -> String {
    let random: u32 = rand::thread_rng().gen();
    format!("{:08x}", random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HemisConfig;
    use crate::db::tests::temp_store;
    use crate::hemis::types::tests::raw_entry;
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use serde_json::{json, Value};

    async fn serve(server: &mut ServerGuard, entries: Vec<Value>) -> Mock {
        server
            .mock("GET", "/schedule")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("week".into(), "2937".into()),
                Matcher::UrlEncoded("semester".into(), "15".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": entries }).to_string())
            .create_async()
            .await
    }

    fn client_for(server: &ServerGuard) -> HemisClient {
        HemisClient::new(HemisConfig::new(format!("{}/schedule", server.url()), "t")).unwrap()
    }

    #[tokio::test]
    async fn test_resync_updates_teacher_and_keeps_group() {
        let (store, _dir) = temp_store();

        let mut first = Server::new_async().await;
        let _first_mock = serve(
            &mut first,
            vec![
                raw_entry(101, "Karimov A.", "MM-21"),
                raw_entry(102, "Karimov A.", "MM-21"),
                raw_entry(103, "Karimov A.", "MM-21"),
            ],
        )
        .await;
        let client = client_for(&first);

        let report = SyncPipeline::new(&client, &store).sync(2937, 15).await.unwrap();
        assert_eq!(report.received, 3);
        assert_eq!(report.upserted, 3);
        assert_eq!(store.count().unwrap(), 3);

        // Upstream now reports a different teacher and group for 101
        let mut second = Server::new_async().await;
        let _second_mock = serve(
            &mut second,
            vec![
                raw_entry(101, "Rahimova D.", "IQ-22"),
                raw_entry(102, "Karimov A.", "MM-21"),
                raw_entry(103, "Karimov A.", "MM-21"),
            ],
        )
        .await;
        let client = client_for(&second);

        let report = SyncPipeline::new(&client, &store).sync(2937, 15).await.unwrap();
        assert_eq!(report.received, 3);
        assert_eq!(store.count().unwrap(), 3);

        let table = store.query_all().unwrap();
        let row = table.get(101).unwrap();
        assert_eq!(row.record.teacher_name.as_deref(), Some("Rahimova D."));
        assert_eq!(row.record.group_name.as_deref(), Some("MM-21"));
    }

    #[tokio::test]
    async fn test_identical_resync_changes_only_fetched_at() {
        let mut server = Server::new_async().await;
        let (store, _dir) = temp_store();
        let client = client_for(&server);
        let _mock = serve(
            &mut server,
            vec![raw_entry(101, "A", "G"), raw_entry(102, "B", "G")],
        )
        .await;

        let pipeline = SyncPipeline::new(&client, &store);
        pipeline.sync(2937, 15).await.unwrap();
        let before = store.query_all().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        pipeline.sync(2937, 15).await.unwrap();
        let after = store.query_all().unwrap();

        assert_eq!(before.len(), 2);
        assert_eq!(after.len(), 2);
        for row in &before.rows {
            let again = after.get(row.record.id).unwrap();
            assert_eq!(again.record, row.record);
            assert_ne!(again.fetched_at, row.fetched_at);
        }
    }

    #[tokio::test]
    async fn test_malformed_entry_aborts_by_default() {
        let mut server = Server::new_async().await;
        let (store, _dir) = temp_store();
        let client = client_for(&server);

        let mut broken = raw_entry(102, "B", "G");
        broken["subject"].as_object_mut().unwrap().remove("code");
        let _mock = serve(
            &mut server,
            vec![raw_entry(101, "A", "G"), broken, raw_entry(103, "C", "G")],
        )
        .await;

        let err = SyncPipeline::new(&client, &store)
            .sync(2937, 15)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScheduleError::MalformedRecord { id: Some(102), .. }
        ));
        let table = store.query_all().unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get(101).is_some());
        assert!(table.get(102).is_none());
        assert!(table.get(103).is_none());
    }

    #[tokio::test]
    async fn test_skip_policy_continues_past_malformed_entry() {
        let mut server = Server::new_async().await;
        let (store, _dir) = temp_store();
        let client = client_for(&server);

        let mut broken = raw_entry(102, "B", "G");
        broken.as_object_mut().unwrap().remove("_week");
        let _mock = serve(
            &mut server,
            vec![raw_entry(101, "A", "G"), broken, raw_entry(103, "C", "G")],
        )
        .await;

        let report = SyncPipeline::new(&client, &store)
            .with_policy(MalformedPolicy::Skip)
            .sync(2937, 15)
            .await
            .unwrap();

        assert_eq!(report.received, 3);
        assert_eq!(report.upserted, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_remote_failure_writes_nothing() {
        let mut server = Server::new_async().await;
        let (store, _dir) = temp_store();
        let client = client_for(&server);
        let _mock = server
            .mock("GET", "/schedule")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = SyncPipeline::new(&client, &store)
            .sync(2937, 15)
            .await
            .unwrap_err();
        assert!(matches!(err, ScheduleError::RemoteStatus { status: 500 }));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_sync_id_format() {
        let id = generate_sync_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
