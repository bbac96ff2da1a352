// Integration tests for on-disk snapshots, transcripts and config files

use intel_dashboard_lib::config::{load_merged_config, ConfigLoader, ConfigMerger, DashboardConfig};
use intel_dashboard_lib::dashboard::{BootstrapSource, DashboardStore, ReconstructionMode};
use intel_dashboard_lib::file_storage::{
    DashboardRepository, FileStore, KeyValueStore, TranscriptRepository, DEFAULT_DASHBOARD_KEY,
    DEFAULT_TRANSCRIPT_KEY,
};
use intel_dashboard_lib::parsers::HeuristicExtractor;
use intel_dashboard_lib::{ChatMessage, IntelligencePayload, InsightType};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn file_store(temp_dir: &TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::new(temp_dir.path()))
}

#[test]
fn test_legacy_snapshot_on_disk_is_migrated() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(format!("{}.json", DEFAULT_DASHBOARD_KEY)),
        r#"{
            "userCompany": "",
            "targetCompanies": ["Initech"],
            "competitorAnalysis": [],
            "salesMetrics": {"timeToClose": "Analyzing..."},
            "recentInsights": [
                {"insight": "Budget frozen until Q3", "timestamp": 1700000000000, "type": "risk"}
            ],
            "industryTrends": []
        }"#,
    )
    .unwrap();

    let store = DashboardStore::new(DashboardRepository::new(file_store(&temp_dir)));
    let source = store.bootstrap(&[], ReconstructionMode::FullReplay, &HeuristicExtractor);

    assert_eq!(source, BootstrapSource::Snapshot);
    let state = store.state();
    assert_eq!(state.user_company, None);
    assert_eq!(state.target_companies, vec!["Initech"]);
    assert!(state.sales_metrics.is_none());
    assert_eq!(state.recent_insights[0].insight_type, InsightType::Risk);
    assert_eq!(state.recent_insights[0].timestamp.timestamp_millis(), 1_700_000_000_000);
}

#[test]
fn test_corrupt_snapshot_falls_back_to_transcript() {
    let temp_dir = TempDir::new().unwrap();
    let store = file_store(&temp_dir);

    let transcript = vec![
        ChatMessage::user("We are Globex and I'd like intel on Initech"),
        ChatMessage::assistant(
            "Here's the latest intelligence on Initech.",
            Some(IntelligencePayload {
                deal_probability: Some(64.0),
                pain_points: vec!["Budget frozen".to_string()],
                ..Default::default()
            }),
        ),
    ];
    assert!(TranscriptRepository::new(store.clone()).save(&transcript));
    fs::write(
        temp_dir.path().join(format!("{}.json", DEFAULT_DASHBOARD_KEY)),
        "{\"version\": 2, \"targetCompanies\": [",
    )
    .unwrap();

    let loaded = TranscriptRepository::new(store.clone()).load();
    let dashboard = DashboardStore::new(DashboardRepository::new(store.clone()));
    let source = dashboard.bootstrap(&loaded, ReconstructionMode::FullReplay, &HeuristicExtractor);

    assert_eq!(source, BootstrapSource::Reconstructed);
    let state = dashboard.state();
    assert_eq!(state.user_company.as_deref(), Some("Globex"));
    assert_eq!(state.target_companies, vec!["Initech"]);
    assert_eq!(state.recent_insights.len(), 1);

    // The corrupt file was replaced by a readable snapshot
    let reloaded = DashboardRepository::new(store).load();
    assert_eq!(reloaded, Some(state));
}

#[test]
fn test_transcript_file_skips_unreadable_messages() {
    let temp_dir = TempDir::new().unwrap();
    let store = file_store(&temp_dir);
    let repo = TranscriptRepository::new(store);

    let message = ChatMessage::user("Tell me about Initech");
    let good = serde_json::to_value(&message).unwrap();
    fs::write(
        temp_dir.path().join(format!("{}.json", DEFAULT_TRANSCRIPT_KEY)),
        serde_json::json!([good, {"sender": "robot"}]).to_string(),
    )
    .unwrap();

    let loaded = repo.load();
    assert_eq!(loaded, vec![message]);
}

#[test]
fn test_custom_keys_share_one_directory() {
    let temp_dir = TempDir::new().unwrap();
    let store = file_store(&temp_dir);

    let first = DashboardRepository::with_key(store.clone(), "team-a");
    let second = DashboardRepository::with_key(store, "team-b");

    let mut state = intel_dashboard_lib::DashboardState::default();
    state.target_companies.push("Initech".to_string());
    assert!(first.save(&state));

    assert!(temp_dir.path().join("team-a.json").exists());
    assert_eq!(first.load(), Some(state));
    assert_eq!(second.load(), None);

    assert!(first.reset());
    assert!(!temp_dir.path().join("team-a.json").exists());
}

#[test]
fn test_saved_project_config_is_loaded_back() {
    let temp_dir = TempDir::new().unwrap();

    let mut config = DashboardConfig::default();
    config.storage.max_history = 40;
    config.engine.reconstruction = ReconstructionMode::LatestOnly;
    config.backend.endpoint = Some("https://intel.example.com/analyze".to_string());

    let path = ConfigLoader::new()
        .with_data_dir(temp_dir.path())
        .save_project(&config)
        .unwrap();
    assert_eq!(path, temp_dir.path().join("config.toml"));

    let loaded = ConfigLoader::new()
        .with_data_dir(temp_dir.path())
        .load_project()
        .unwrap();
    let reloaded = ConfigMerger::new().with_project(loaded).merge();
    assert_eq!(reloaded, config);

    let merged = load_merged_config(Some(temp_dir.path()), None).unwrap();
    assert_eq!(merged.storage.max_history, 40);
    assert_eq!(merged.engine.reconstruction, ReconstructionMode::LatestOnly);
}
