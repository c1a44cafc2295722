//! Export round-trip tests: snapshot file → store → networks → output file.
//!
//! Verifies every output format carries the slice labels and weights the
//! engine produced, and that a TOML config drives the same export.

use std::path::Path;

use pretty_assertions::assert_eq;

use discourse_net::config::ExportConfig;
use discourse_net::engine::{self, ExportControl};
use discourse_net::export::{self, OutputFormat};
use discourse_net::{ExportResult, MemoryStore, StatementStore};

const SNAPSHOT: &str = r#"{
  "statement_types": [
    {"id": 1, "name": "DNA Statement", "variables": [
      {"name": "person", "kind": "short-text"},
      {"name": "organization", "kind": "short-text"},
      {"name": "concept", "kind": "short-text"},
      {"name": "agreement", "kind": "boolean"}
    ]}
  ],
  "documents": [
    {"id": 1, "title": "Hearing", "date": "2020-01-01T10:00:00"},
    {"id": 2, "title": "Op-ed", "date": "2021-06-01T08:00:00"}
  ],
  "statements": [
    {"id": 1, "statement_type": 1, "document": 1, "start": 0, "stop": 20,
     "date": "2020-01-01T10:00:00",
     "values": {"person": "Jane", "organization": "EPA", "concept": "climate", "agreement": 1}},
    {"id": 2, "statement_type": 1, "document": 1, "start": 40, "stop": 70,
     "date": "2020-01-02T10:00:00",
     "values": {"person": "Omar", "organization": "NGO", "concept": "climate", "agreement": 1}},
    {"id": 3, "statement_type": 1, "document": 2, "start": 5, "stop": 25,
     "date": "2021-06-01T08:00:00",
     "values": {"person": "Jane", "organization": "EPA", "concept": "jobs", "agreement": 0}}
  ]
}"#;

const CONFIG: &str = r#"
statement_type = "DNA Statement"
mode1 = "organization"
mode2 = "concept"
network_type = "one-mode"

[agreement]
variable = "agreement"
pattern = "congruence"

[aggregation]
rule = "per-year"
"#;

async fn open(dir: &Path) -> MemoryStore {
    let path = dir.join("corpus.json");
    std::fs::write(&path, SNAPSHOT).unwrap();
    MemoryStore::open_snapshot(&path).await.unwrap()
}

async fn export_with(store: &MemoryStore, config: &ExportConfig) -> ExportResult {
    let schema = store
        .statement_type_by_name(&config.statement_type)
        .await
        .unwrap()
        .unwrap();
    let bounds = store.date_bounds(schema.id).await.unwrap();
    let spec = config.to_spec(&schema, bounds).unwrap();
    engine::export(store, &spec, config.engine_options(), &ExportControl::new())
        .await
        .unwrap()
        .completed()
        .unwrap()
}

#[tokio::test]
async fn test_config_driven_export() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path()).await;
    assert_eq!(store.statement_count(), 3);

    let config_path = dir.path().join("export.toml");
    std::fs::write(&config_path, CONFIG).unwrap();
    let config = ExportConfig::load(&config_path).unwrap();

    let result = export_with(&store, &config).await;
    assert_eq!(result.networks.len(), 2);
    assert_eq!(result.networks[0].rows.as_slice(), &["EPA", "NGO"]);

    let out = dir.path().join("out.csv");
    export::write_file(&result.networks, OutputFormat::Csv, &out).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text, "slice,layer,source,target,weight\n2020,congruence,EPA,NGO,1\n");
}

#[tokio::test]
async fn test_graphml_keeps_slice_labels() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path()).await;
    let config = ExportConfig::from_toml(CONFIG).unwrap();
    let result = export_with(&store, &config).await;

    let mut buf = Vec::new();
    export::write_networks(&result.networks, OutputFormat::GraphMl, &mut buf).unwrap();
    let xml = String::from_utf8(buf).unwrap();

    assert_eq!(xml.matches("<graph ").count(), 2);
    assert!(xml.contains(r#"<data key="slice">2020</data>"#));
    assert!(xml.contains(r#"<data key="slice">2021</data>"#));
    assert!(xml.trim_end().ends_with("</graphml>"));
}

#[tokio::test]
async fn test_json_round_trips_labels() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path()).await;
    let mut config = ExportConfig::from_toml(CONFIG).unwrap();
    config.aggregation = discourse_net::AggregationRule::PerDocument;
    let result = export_with(&store, &config).await;

    let mut buf = Vec::new();
    export::write_networks(&result.networks, OutputFormat::Json, &mut buf).unwrap();
    let docs: Vec<serde_json::Value> = serde_json::from_slice(&buf).unwrap();

    assert_eq!(docs.len(), 2);
    let labels: Vec<discourse_net::SliceLabel> = docs
        .iter()
        .map(|d| serde_json::from_value(d["slice"].clone()).unwrap())
        .collect();
    let expected: Vec<discourse_net::SliceLabel> = result.networks.iter().map(|n| n.label.clone()).collect();
    assert_eq!(labels, expected);
    assert_eq!(docs[0]["slice"]["title"], "Hearing");
}

#[tokio::test]
async fn test_two_mode_matrix() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(dir.path()).await;
    let config = ExportConfig::from_toml(
        r#"
        mode1 = "person"
        output = "out.tsv"
        "#,
    )
    .unwrap();
    assert_eq!(config.output_format(), OutputFormat::Matrix);
    let result = export_with(&store, &config).await;

    let mut buf = Vec::new();
    export::write_networks(&result.networks, config.output_format(), &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[1], "# layer: incidence");
    assert_eq!(lines[2], "\tclimate\tjobs");
    assert_eq!(lines[3], "Jane\t1\t1");
    assert_eq!(lines[4], "Omar\t1\t0");
}
