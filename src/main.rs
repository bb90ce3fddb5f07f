use clap::Parser;
use freelance_rep::utils::{logger, validation::Validate};
use freelance_rep::{BatchPipeline, CliConfig, LocalStorage, ReplayEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting freelance-rep CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道，路徑以工作目錄為根
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
