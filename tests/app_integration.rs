use chrono::NaiveDate;
use std::fs;
use subtrack::core::store::SubscriptionStore;
use subtrack::store::disk::DiskStore;
use subtrack::{AppCommand, DraftChanges};
use tempfile::TempDir;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const COLLECTION_PATH: &str =
        "/projects/demo/databases/(default)/documents/subscriptions";

    pub async fn create_firestore_mock(list_response: serde_json::Value) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(COLLECTION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn document(id: &str, name: &str, cost: f64, next_payment: &str) -> serde_json::Value {
        serde_json::json!({
            "name": format!("projects/demo/databases/(default)/documents/subscriptions/{id}"),
            "fields": {
                "name": {"stringValue": name},
                "cost": {"doubleValue": cost},
                "billing": {"stringValue": "monthly"},
                "category": {"stringValue": "entertainment"},
                "nextPayment": {"stringValue": next_payment}
            }
        })
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
}

fn write_config(dir: &TempDir, storage: &str) -> String {
    let config_path = dir.path().join("config.yaml");
    let config_content = format!(
        r#"
currency: "USD"
seed_demo_data: false
storage:
{storage}
"#
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path.to_string_lossy().into_owned()
}

fn local_config(dir: &TempDir) -> (String, std::path::PathBuf) {
    let data_path = dir.path().join("data");
    let config_path = write_config(
        dir,
        &format!(
            "  backend: local\n  local:\n    path: \"{}\"",
            data_path.display()
        ),
    );
    (config_path, data_path)
}

async fn stored_names(data_path: &std::path::Path) -> Vec<String> {
    let store = DiskStore::open(data_path).expect("Failed to reopen store");
    store
        .list_all()
        .await
        .expect("Failed to list store")
        .into_iter()
        .map(|sub| sub.name)
        .collect()
}

#[test_log::test(tokio::test)]
async fn test_summary_with_memory_store_seeds_demo_data() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        "currency: \"USD\"\nstorage:\n  backend: memory\n",
    )
    .unwrap();

    let result = subtrack::run_command(
        AppCommand::Summary,
        Some(config_path.to_str().unwrap()),
        Some(today()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Summary failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_local_store_add_edit_delete_flow() {
    let dir = TempDir::new().unwrap();
    let (config_path, data_path) = local_config(&dir);

    subtrack::run_command(
        AppCommand::Add {
            name: "Gym".to_string(),
            cost: 30.0,
            billing: "monthly".to_string(),
            category: "health".to_string(),
            next_payment: NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
        },
        Some(&config_path),
        Some(today()),
    )
    .await
    .expect("Add failed");
    assert_eq!(stored_names(&data_path).await, vec!["Gym".to_string()]);

    let id = {
        let store = DiskStore::open(&data_path).unwrap();
        store.list_all().await.unwrap()[0].id.to_string()
    };
    info!(%id, "Added subscription");

    subtrack::run_command(
        AppCommand::Edit {
            id: id.clone(),
            changes: DraftChanges {
                name: Some("Climbing gym".to_string()),
                cost: Some(45.0),
                ..Default::default()
            },
        },
        Some(&config_path),
        Some(today()),
    )
    .await
    .expect("Edit failed");
    {
        let store = DiskStore::open(&data_path).unwrap();
        let subs = store.list_all().await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name, "Climbing gym");
        assert_eq!(subs[0].cost, 45.0);
        assert_eq!(subs[0].category, "health");
    }

    subtrack::run_command(AppCommand::List, Some(&config_path), Some(today()))
        .await
        .expect("List failed");

    subtrack::run_command(
        AppCommand::Delete {
            id,
            yes: true,
        },
        Some(&config_path),
        Some(today()),
    )
    .await
    .expect("Delete failed");
    assert!(stored_names(&data_path).await.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_local_store_seeds_demo_data_once() {
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("data");
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        format!(
            "currency: \"USD\"\nstorage:\n  backend: local\n  local:\n    path: \"{}\"\n",
            data_path.display()
        ),
    )
    .unwrap();

    for _ in 0..2 {
        subtrack::run_command(
            AppCommand::Summary,
            Some(config_path.to_str().unwrap()),
            Some(today()),
        )
        .await
        .expect("Summary failed");
    }

    let mut names = stored_names(&data_path).await;
    names.sort();
    assert_eq!(names, vec!["Adobe Creative Cloud", "Netflix", "Spotify"]);
}

#[test_log::test(tokio::test)]
async fn test_add_rejects_invalid_subscription() {
    let dir = TempDir::new().unwrap();
    let (config_path, data_path) = local_config(&dir);

    let result = subtrack::run_command(
        AppCommand::Add {
            name: "  ".to_string(),
            cost: 5.0,
            billing: "monthly".to_string(),
            category: "other".to_string(),
            next_payment: today(),
        },
        Some(&config_path),
        Some(today()),
    )
    .await;

    assert!(result.is_err());
    assert!(stored_names(&data_path).await.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_edit_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    let (config_path, _) = local_config(&dir);

    let result = subtrack::run_command(
        AppCommand::Edit {
            id: "missing".to_string(),
            changes: DraftChanges::default(),
        },
        Some(&config_path),
        Some(today()),
    )
    .await;

    let err = result.err().expect("Edit of unknown id should fail");
    assert!(format!("{err:#}").contains("missing"));
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_remote_mock() {
    let mock_server = test_utils::create_firestore_mock(serde_json::json!({
        "documents": [
            test_utils::document("a1", "Netflix", 15.99, "2025-11-11"),
            test_utils::document("b2", "Spotify", 9.99, "2025-11-16"),
        ]
    }))
    .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(
        &dir,
        &format!(
            "  backend: remote\n  remote:\n    base_url: \"{}\"\n    project_id: \"demo\"\n    retries: 0",
            mock_server.uri()
        ),
    );

    let result =
        subtrack::run_command(AppCommand::Summary, Some(&config_path), Some(today())).await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_remote_outage_fails_the_command() {
    let mock_server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(
        &dir,
        &format!(
            "  backend: remote\n  remote:\n    base_url: \"{}\"\n    project_id: \"demo\"\n    retries: 0",
            mock_server.uri()
        ),
    );

    let result =
        subtrack::run_command(AppCommand::Summary, Some(&config_path), Some(today())).await;
    let err = result.err().expect("Outage should fail the command");
    assert!(err.to_string().contains("Failed to load subscriptions"));
}
