use anyhow::Context;
use clap::Parser;
use freelance_rep::config::toml_config::{PolicyConfig, TomlConfig};
use freelance_rep::domain::model::{ReviewSubmission, MAX_RATING, MIN_RATING};
use freelance_rep::utils::{logger, validation::Validate};
use freelance_rep::{BatchPipeline, LocalStorage, ReplayEngine};
use std::collections::HashSet;

#[derive(Parser)]
#[command(name = "toml-replay")]
#[command(about = "Reputation replay tool with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "replay-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override halt_on_rejection setting from config
    #[arg(long)]
    halt: Option<bool>,

    /// Override allow_self_review setting from config
    #[arg(long)]
    allow_self_review: Option<bool>,

    /// Dry run - analyze the submissions file without touching the ledger
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(halt) = args.halt {
        config.replay.halt_on_rejection = Some(halt);
    }
    if let Some(allow) = args.allow_self_review {
        config.policy = Some(PolicyConfig {
            allow_self_review: Some(allow),
        });
    }

    // 日誌格式由配置決定，必須在載入配置後才初始化
    if config.log_format() == "json" {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based replay tool");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the ledger will not be touched");
        perform_dry_run(&config).await?;
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和重放管道
    let storage = LocalStorage::new(".".to_string());
    let pipeline = BatchPipeline::new(storage, config);

    // 創建重放引擎並運行
    let engine = ReplayEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Replay completed successfully!");
            tracing::info!("📁 Report saved to: {}", output_path);
            println!("✅ Replay completed successfully!");
            println!("📁 Report saved to: {}", output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Replay failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                freelance_rep::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                freelance_rep::utils::error::ErrorSeverity::Medium => 2, // 批次中止
                freelance_rep::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                freelance_rep::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Ledger: {} v{}", config.ledger.name, config.ledger.version);
    println!("  Submissions: {}", config.submissions_path());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.export.output_formats.join(", "));
    println!("  Self-review allowed: {}", config.allow_self_review());
    println!("  Halt on rejection: {}", config.halt_on_rejection());

    let options = config.export_options();
    if options.compress {
        println!("  Compression: {} (ZIP)", options.bundle_name);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

/// 只讀取並分析提交檔，完全不套用到帳本
async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    let raw = tokio::fs::read(config.submissions_path())
        .await
        .with_context(|| {
            format!(
                "failed to read submissions file '{}'",
                config.submissions_path()
            )
        })?;
    let submissions: Vec<ReviewSubmission> =
        serde_json::from_slice(&raw).context("submissions file is not a valid JSON array")?;

    let clients: HashSet<&str> = submissions.iter().map(|s| s.client.as_str()).collect();
    let freelancers: HashSet<&str> = submissions.iter().map(|s| s.freelancer.as_str()).collect();

    let out_of_range = submissions
        .iter()
        .filter(|s| !(MIN_RATING..=MAX_RATING).contains(&s.rating))
        .count();

    let mut seen_pairs = HashSet::new();
    let duplicate_pairs = submissions
        .iter()
        .filter(|s| !seen_pairs.insert((s.client.as_str(), s.freelancer.as_str())))
        .count();

    let self_reviews = submissions
        .iter()
        .filter(|s| s.client == s.freelancer)
        .count();

    println!("📡 Submissions File:");
    println!("  Path: {}", config.submissions_path());
    println!("  Submissions: {}", submissions.len());
    println!("  Distinct clients: {}", clients.len());
    println!("  Distinct freelancers: {}", freelancers.len());

    println!();
    println!("⚠️ Expected Rejections:");
    println!("  Out-of-range ratings: {}", out_of_range);
    println!("  Duplicate (client, freelancer) pairs: {}", duplicate_pairs);
    if config.allow_self_review() {
        println!("  Self-reviews: {} (allowed by policy)", self_reviews);
    } else {
        println!("  Self-reviews: {} (will be rejected)", self_reviews);
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.export.output_formats.join(", "));

    println!();
    println!("✅ Dry run analysis complete. Run without --dry-run to apply the submissions.");

    Ok(())
}
