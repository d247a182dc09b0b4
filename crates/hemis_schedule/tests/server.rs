//! End-to-end tests of the HTTP surface against a mocked HEMIS endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use hemis_schedule::server::create_router;
use hemis_schedule::types::AppState;
use hemis_schedule::{AppConfig, HemisClient, HemisConfig, ScheduleStore};
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use tempfile::TempDir;

fn raw_entry(id: i64, teacher: &str, group: &str) -> Value {
    json!({
        "id": id,
        "subject": { "name": "Calculus", "code": "MATH101" },
        "faculty": { "name": "Physics and Mathematics" },
        "department": { "name": "Applied Mathematics" },
        "educationYear": { "name": "2024-2025" },
        "semester": { "name": "5-semestr" },
        "group": { "name": group },
        "auditorium": { "name": "301", "building": { "name": "Main building" } },
        "trainingType": { "name": "Lecture" },
        "lessonPair": { "name": "1", "start_time": "08:30", "end_time": "09:50" },
        "employee": { "name": teacher },
        "lesson_date": 1_727_654_400i64,
        "_week": 2937,
        "weekStartTime": 1_727_654_400i64,
        "weekEndTime": 1_728_172_800i64
    })
}

/// Starts the service on an ephemeral port and returns its address.
async fn spawn_app(hemis_url: String, dir: &TempDir) -> SocketAddr {
    let mut config = AppConfig::default();
    config.hemis = HemisConfig::new(hemis_url, "test-token");
    config.db_path = dir.path().join("schedule.db");

    let store = ScheduleStore::open(&config.db_path).unwrap();
    let client = HemisClient::new(config.hemis.clone()).unwrap();
    let router = create_router(Arc::new(AppState::new(config, store, client)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_load_browse_and_export() {
    let mut hemis = Server::new_async().await;
    let mock = hemis
        .mock("GET", "/schedule")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("week".into(), "2937".into()),
            Matcher::UrlEncoded("semester".into(), "15".into()),
        ]))
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": [
                    raw_entry(101, "Karimov A.", "MM-21"),
                    raw_entry(102, "Karimov A.", "MM-21"),
                    raw_entry(103, "Karimov A.", "MM-21"),
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let addr = spawn_app(format!("{}/schedule", hemis.url()), &dir).await;
    let http = reqwest::Client::new();

    // Defaults to week 2937, semester 15
    let loaded: Value = http
        .post(format!("http://{addr}/schedule/load"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(loaded["loaded"], 3);
    mock.assert_async().await;

    let browse: Value = http
        .get(format!("http://{addr}/schedule"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(browse["rows"].as_array().unwrap().len(), 3);
    assert_eq!(browse["columns"][0], "id");
    assert_eq!(browse["columns"].as_array().unwrap().len(), 20);

    let export = http
        .get(format!("http://{addr}/schedule/export"))
        .send()
        .await
        .unwrap();
    assert_eq!(export.status(), 200);
    assert_eq!(
        export.headers()["content-type"],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        export.headers()["content-disposition"],
        "attachment; filename=\"schedule.xlsx\""
    );
    let bytes = export.bytes().await.unwrap();
    // XLSX files are zip archives
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn test_export_of_empty_store_is_a_message() {
    let hemis = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let addr = spawn_app(format!("{}/schedule", hemis.url()), &dir).await;

    let response = reqwest::get(format!("http://{addr}/schedule/export"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No data found in the store.");
}

#[tokio::test]
async fn test_remote_rejection_surfaces_as_bad_gateway() {
    let mut hemis = Server::new_async().await;
    let _mock = hemis
        .mock("GET", "/schedule")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let addr = spawn_app(format!("{}/schedule", hemis.url()), &dir).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/schedule/load?week=3000&semester=16"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to fetch schedule from HEMIS");
    assert_eq!(body["details"], "HEMIS returned status 403");
}
