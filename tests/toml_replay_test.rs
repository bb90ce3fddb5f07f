use anyhow::Result;
use freelance_rep::config::toml_config::TomlConfig;
use freelance_rep::{BatchPipeline, LocalStorage, ReplayEngine};
use tempfile::TempDir;

/// 透過 TOML 配置驅動完整重放，驗證未壓縮輸出
#[tokio::test]
async fn test_toml_driven_replay_without_compression() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap();
    let normalized_path = temp_path.replace('\\', "/");

    let config_content = format!(
        r#"
[ledger]
name = "reputation-test"
description = "Replay integration test"
version = "1.0.0"

[replay]
submissions_path = "{path}/submissions.json"

[export]
output_path = "{path}/report"
output_formats = ["csv", "json"]
include_reviews = false

[export.compression]
enabled = false
filename = "unused.zip"
"#,
        path = normalized_path
    );

    let config_path = format!("{}/replay-config.toml", temp_path);
    tokio::fs::write(&config_path, config_content).await?;

    let submissions = serde_json::json!([
        {"client": "alice", "freelancer": "dana", "rating": 3},
        {"client": "bob",   "freelancer": "dana", "rating": 4}
    ]);
    tokio::fs::write(
        format!("{}/submissions.json", temp_path),
        serde_json::to_vec_pretty(&submissions)?,
    )
    .await?;

    let config = TomlConfig::from_file(&config_path)?;

    // Absolute paths in the config bypass the storage base
    let storage = LocalStorage::new(".".to_string());
    let pipeline = BatchPipeline::new(storage, config);
    let engine = ReplayEngine::new(pipeline);

    let output_path = engine.run().await?;
    println!("📁 Report written to: {}", output_path);

    // Uncompressed export writes individual report files
    let report_dir = std::path::Path::new(temp_path).join("report");
    assert!(report_dir.join("outcomes.json").exists());
    assert!(report_dir.join("ratings.csv").exists());
    assert!(report_dir.join("ratings.json").exists());
    assert!(!report_dir.join("reviews.json").exists());
    assert!(!report_dir.join("replay_report.zip").exists());

    let csv_content = std::fs::read_to_string(report_dir.join("ratings.csv"))?;
    assert!(csv_content.contains("freelancer,total-score,review-count,average-rating"));
    assert!(csv_content.contains("dana,7,2,3"));
    Ok(())
}

/// 壓縮開啟時使用自訂檔名並附上 metadata
#[tokio::test]
async fn test_toml_driven_replay_with_custom_bundle() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let temp_path = temp_dir.path().to_str().unwrap();
    let normalized_path = temp_path.replace('\\', "/");

    let config_content = format!(
        r#"
[ledger]
name = "reputation-test"
description = "Replay integration test"
version = "1.0.0"

[policy]
allow_self_review = false

[replay]
submissions_path = "{path}/submissions.json"

[export]
output_path = "{path}/report"
output_formats = ["tsv"]

[export.compression]
enabled = true
filename = "weekly_reputation.zip"
include_metadata = true
"#,
        path = normalized_path
    );

    let config_path = format!("{}/replay-config.toml", temp_path);
    tokio::fs::write(&config_path, config_content).await?;

    let submissions = serde_json::json!([
        {"client": "dana",  "freelancer": "dana", "rating": 5},
        {"client": "alice", "freelancer": "dana", "rating": 4}
    ]);
    tokio::fs::write(
        format!("{}/submissions.json", temp_path),
        serde_json::to_vec_pretty(&submissions)?,
    )
    .await?;

    let config = TomlConfig::from_file(&config_path)?;
    let storage = LocalStorage::new(".".to_string());
    let pipeline = BatchPipeline::new(storage, config);
    let engine = ReplayEngine::new(pipeline);

    let output_path = engine.run().await?;
    assert!(output_path.contains("weekly_reputation.zip"));

    let bundle_path = std::path::Path::new(temp_path)
        .join("report")
        .join("weekly_reputation.zip");
    let zip_data = std::fs::read(&bundle_path)?;
    let cursor = std::io::Cursor::new(zip_data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    let file_names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(file_names.contains(&"ratings.tsv".to_string()));
    assert!(file_names.contains(&"metadata.json".to_string()));
    // The self-review was rejected under the closed policy
    assert!(file_names.contains(&"rejected.json".to_string()));

    let mut metadata_file = archive.by_name("metadata.json")?;
    let mut content = String::new();
    std::io::Read::read_to_string(&mut metadata_file, &mut content)?;

    let metadata: serde_json::Value = serde_json::from_str(&content)?;
    assert_eq!(metadata["allow-self-review"], false);
    assert_eq!(metadata["submissions"], 2);
    assert_eq!(metadata["accepted"], 1);
    assert_eq!(metadata["rejected"], 1);
    Ok(())
}
