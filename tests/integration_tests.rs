use clap::Parser;
use httpmock::prelude::*;
use ma_intel::core::Pipeline;
use ma_intel::{
    AiSettings, CliConfig, DealPipeline, IntelEngine, LocalStorage, OpenAiReportGenerator,
    TomlConfig,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const STAMP: &str = "20250101_090000";

fn cli(args: &[&str]) -> CliConfig {
    let mut argv = vec!["ma-intel"];
    argv.extend_from_slice(args);
    CliConfig::try_parse_from(argv).unwrap()
}

fn csv_records(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.records().map(|r| r.unwrap()).collect()
}

#[tokio::test]
async fn test_end_to_end_sample_all_formats() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let config = cli(&[
        "--sample",
        "--output-path",
        &output_path,
        "--formats",
        "csv,md,json,txt",
    ]);

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = DealPipeline::new(storage, config).unwrap().with_stamp(STAMP);
    let summary = IntelEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.total_deals, 6);
    assert_eq!(summary.filtered_deals, 6);
    assert_eq!(summary.written.len(), 4);
    assert!(summary.ai_error.is_none());
    assert!(summary.display.contains("#1 "));

    let dir = temp_dir.path();
    let records = csv_records(&dir.join(format!("ma_deals_{}.csv", STAMP)));
    assert_eq!(records.len(), 6);
    assert_eq!(&records[0][0], "1");

    let summary_md = std::fs::read_to_string(dir.join(format!("ma_summary_{}.md", STAMP))).unwrap();
    assert!(summary_md.starts_with("# M&A Intelligence Report"));
    assert!(summary_md.contains("- Total Deals Processed: 6"));
    assert!(summary_md.contains("- Top Sector: Technology"));

    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.join(format!("ma_deals_{}.json", STAMP))).unwrap(),
    )
    .unwrap();
    assert_eq!(json["deals"].as_array().unwrap().len(), 6);
    assert_eq!(json["analytics"]["total_deals"], 6);

    assert!(dir.join(format!("ma_deals_{}.txt", STAMP)).exists());
}

#[tokio::test]
async fn test_toml_config_file_input_with_zip() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("out").display().to_string();
    let email_path = temp_dir.path().join("alert.txt");
    std::fs::write(
        &email_path,
        "Computer software\n\
         1. Acme Analytics Ltd acquired by Northwind plc\n\
         * UK data platform for retailers\n\
         Value: £450m\n\
         Grade: Strong evidence\n\
         2. Helios Solar GmbH raises EUR 20m\n\
         * German solar developer\n",
    )
    .unwrap();

    let toml_content = format!(
        r#"
[input]
path = "{}"

[filters]
min_value = "300m"

[load]
output_path = "{}"
output_formats = ["csv", "md"]
compression = {{ enabled = true, filename = "weekly" }}
"#,
        email_path.display(),
        output_path
    );
    let config = TomlConfig::from_toml_str(&toml_content).unwrap();

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = DealPipeline::new(storage, config).unwrap().with_stamp(STAMP);
    let summary = IntelEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.total_deals, 2);
    assert_eq!(summary.filtered_deals, 1);
    assert_eq!(summary.written.len(), 1);
    assert!(summary.written[0].ends_with(&format!("weekly_{}.zip", STAMP)));

    let zip_data = std::fs::read(Path::new(&output_path).join(format!("weekly_{}.zip", STAMP))).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    let file_names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        file_names,
        vec![
            format!("ma_deals_{}.csv", STAMP),
            format!("ma_summary_{}.md", STAMP)
        ]
    );

    let mut csv_file = archive.by_name(&format!("ma_deals_{}.csv", STAMP)).unwrap();
    let mut csv_content = String::new();
    std::io::Read::read_to_string(&mut csv_file, &mut csv_content).unwrap();
    assert!(csv_content.contains("Acme Analytics Ltd acquired by Northwind plc"));
    assert!(!csv_content.contains("Helios Solar"));
}

#[tokio::test]
async fn test_ai_report_written_alongside_exports() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("Authorization", "Bearer sk-integration")
            .body_contains("Sector focus: All Sectors");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "## Executive Summary\nSix deals."}}
                ]
            }));
    });

    let config = cli(&["--sample", "--output-path", &output_path]);
    let mut settings = AiSettings::new("sk-integration");
    settings.base_url = server.url("/v1");

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = DealPipeline::new(storage, config)
        .unwrap()
        .with_stamp(STAMP)
        .with_report_generator(Arc::new(OpenAiReportGenerator::new(settings).unwrap()));
    let summary = IntelEngine::new(pipeline).run().await.unwrap();

    api_mock.assert();
    assert!(summary.ai_report_generated);
    assert_eq!(summary.written.len(), 3);

    let report = std::fs::read_to_string(
        temp_dir
            .path()
            .join(format!("ai_intelligence_report_{}.md", STAMP)),
    )
    .unwrap();
    assert_eq!(report, "## Executive Summary\nSix deals.");
}

#[tokio::test]
async fn test_ai_failure_does_not_fail_run() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(401)
            .json_body(serde_json::json!({"error": {"message": "Incorrect API key provided"}}));
    });

    let config = cli(&["--sample", "--output-path", &output_path]);
    let mut settings = AiSettings::new("sk-wrong");
    settings.base_url = server.url("/v1");

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = DealPipeline::new(storage, config)
        .unwrap()
        .with_stamp(STAMP)
        .with_report_generator(Arc::new(OpenAiReportGenerator::new(settings).unwrap()));
    let summary = IntelEngine::new(pipeline).run().await.unwrap();

    assert!(!summary.ai_report_generated);
    assert_eq!(summary.ai_error.as_deref(), Some("AI provider rejected the API key"));
    assert_eq!(summary.written.len(), 2);
    assert!(!temp_dir
        .path()
        .join(format!("ai_intelligence_report_{}.md", STAMP))
        .exists());

    let summary_md =
        std::fs::read_to_string(temp_dir.path().join(format!("ma_summary_{}.md", STAMP))).unwrap();
    assert!(summary_md.contains("Not generated: AI provider rejected the API key"));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("never").display().to_string();

    let config = cli(&["--sample", "--sector", "technology", "--output-path", &output_path]);
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = DealPipeline::new(storage, config).unwrap();
    let summary = IntelEngine::new(pipeline).preview().await.unwrap();

    assert_eq!(summary.total_deals, 6);
    assert!(summary.filtered_deals > 0 && summary.filtered_deals < 6);
    assert!(summary.written.is_empty());
    assert!(!Path::new(&output_path).exists());
}

#[tokio::test]
async fn test_missing_input_file_is_reported() {
    let config = cli(&["--input", "/no/such/alert.txt"]);
    let pipeline = DealPipeline::new(LocalStorage::new("./unused".to_string()), config).unwrap();

    let err = pipeline.extract().await.unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(err.user_friendly_message().contains("/no/such/alert.txt"));
}

#[tokio::test]
async fn test_dry_run_does_not_call_ai_provider() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("never").display().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "billed"}}]
        }));
    });

    let config = cli(&[
        "--sample",
        "--dry-run",
        "--ai-report",
        "--api-key",
        "sk-dry",
        "--output-path",
        &output_path,
    ]);
    let mut settings = config.ai_settings().unwrap();
    settings.base_url = server.url("/v1");

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = DealPipeline::new(storage, config)
        .unwrap()
        .with_report_generator(Arc::new(OpenAiReportGenerator::new(settings).unwrap()));
    let summary = IntelEngine::new(pipeline).preview().await.unwrap();

    api_mock.assert_hits(0);
    assert!(!summary.ai_report_generated);
    assert!(summary.ai_error.is_none());
    assert_eq!(summary.filtered_deals, 6);
    assert!(!Path::new(&output_path).exists());
}

#[tokio::test]
async fn test_invalid_min_value_fails_run() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let config = TomlConfig::from_toml_str(
        r#"
[input]
sample = true

[filters]
min_value = "lots"
"#,
    )
    .unwrap();
    let pipeline = DealPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    let err = IntelEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, ma_intel::IntelError::InvalidConfigValueError { .. }));

    let config = cli(&["--sample", "--min-value", "plenty", "--output-path", &output_path]);
    let pipeline = DealPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    assert!(IntelEngine::new(pipeline).run().await.is_err());

    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}
