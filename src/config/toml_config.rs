use crate::core::ConfigProvider;
use crate::domain::model::{ExportOptions, LedgerPolicy};
use crate::utils::error::{LedgerError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub ledger: LedgerConfig,
    pub policy: Option<PolicyConfig>,
    pub replay: ReplayConfig,
    pub export: ExportConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub allow_self_review: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub submissions_path: String,
    pub halt_on_rejection: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub include_reviews: Option<bool>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
    pub include_metadata: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LedgerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LedgerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUBMISSIONS_PATH})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        // 帳本名稱不可留白
        crate::utils::validation::validate_non_empty_string("ledger.name", &self.ledger.name)?;

        // 驗證輸入與輸出路徑
        crate::utils::validation::validate_path(
            "replay.submissions_path",
            &self.replay.submissions_path,
        )?;
        crate::utils::validation::validate_path("export.output_path", &self.export.output_path)?;

        // 驗證輸出格式
        crate::utils::validation::validate_report_formats(
            "export.output_formats",
            &self.export.output_formats,
            &["csv", "tsv", "json"],
        )?;

        // 壓縮輸出需要一個有效的檔名
        if let Some(compression) = &self.export.compression {
            if compression.enabled {
                crate::utils::validation::validate_non_empty_string(
                    "export.compression.filename",
                    &compression.filename,
                )?;
            }
        }

        Ok(())
    }

    /// 取得提交清單路徑
    pub fn submissions_path(&self) -> &str {
        &self.replay.submissions_path
    }

    /// 取得輸出路徑
    pub fn output_path(&self) -> &str {
        &self.export.output_path
    }

    /// 自我評價是否允許（未設定時預設允許）
    pub fn allow_self_review(&self) -> bool {
        self.policy
            .as_ref()
            .and_then(|p| p.allow_self_review)
            .unwrap_or(true)
    }

    /// 是否在第一筆拒絕時中止重放
    pub fn halt_on_rejection(&self) -> bool {
        self.replay.halt_on_rejection.unwrap_or(false)
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// 日誌輸出格式（compact 或 json）
    pub fn log_format(&self) -> &str {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .unwrap_or("compact")
    }

    /// 組合匯出行為設定
    pub fn export_options(&self) -> ExportOptions {
        let defaults = ExportOptions::default();
        let compression = self.export.compression.as_ref();

        ExportOptions {
            compress: compression.map(|c| c.enabled).unwrap_or(defaults.compress),
            bundle_name: compression
                .map(|c| c.filename.clone())
                .unwrap_or(defaults.bundle_name),
            include_reviews: self
                .export
                .include_reviews
                .unwrap_or(defaults.include_reviews),
            include_metadata: compression
                .and_then(|c| c.include_metadata)
                .unwrap_or(defaults.include_metadata),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn submissions_path(&self) -> &str {
        &self.replay.submissions_path
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }

    fn report_formats(&self) -> &[String] {
        &self.export.output_formats
    }

    fn policy(&self) -> LedgerPolicy {
        LedgerPolicy {
            allow_self_review: self.allow_self_review(),
        }
    }

    fn halt_on_rejection(&self) -> bool {
        self.halt_on_rejection()
    }

    fn export_options(&self) -> ExportOptions {
        self.export_options()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[ledger]
name = "freelance-rep"
description = "Freelancer reputation ledger"
version = "1.0.0"

[replay]
submissions_path = "./submissions.json"

[export]
output_path = "./output"
output_formats = ["csv", "json"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.ledger.name, "freelance-rep");
        assert_eq!(config.submissions_path(), "./submissions.json");
        assert_eq!(config.export.output_formats, vec!["csv", "json"]);
        assert!(config.allow_self_review());
        assert!(!config.halt_on_rejection());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_SUBMISSIONS_PATH", "/data/reviews.json");

        let toml_content = r#"
[ledger]
name = "test"
description = "test"
version = "1.0"

[replay]
submissions_path = "${TEST_SUBMISSIONS_PATH}"

[export]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.submissions_path(), "/data/reviews.json");

        std::env::remove_var("TEST_SUBMISSIONS_PATH");
    }

    #[test]
    fn test_config_validation_rejects_unknown_format() {
        let toml_content = r#"
[ledger]
name = "test"
description = "test"
version = "1.0"

[replay]
submissions_path = "./submissions.json"

[export]
output_path = "./output"
output_formats = ["xml"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policy_section_controls_self_review() {
        let toml_content = r#"
[ledger]
name = "test"
description = "test"
version = "1.0"

[policy]
allow_self_review = false

[replay]
submissions_path = "./submissions.json"
halt_on_rejection = true

[export]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(!config.allow_self_review());
        assert!(config.halt_on_rejection());

        let policy = ConfigProvider::policy(&config);
        assert!(!policy.allow_self_review);
    }

    #[test]
    fn test_export_options_follow_compression_section() {
        let toml_content = r#"
[ledger]
name = "test"
description = "test"
version = "1.0"

[replay]
submissions_path = "./submissions.json"

[export]
output_path = "./output"
output_formats = ["csv"]
include_reviews = false

[export.compression]
enabled = true
filename = "weekly_report.zip"
include_metadata = true

[monitoring]
enabled = true
log_format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let options = config.export_options();

        assert!(options.compress);
        assert_eq!(options.bundle_name, "weekly_report.zip");
        assert!(!options.include_reviews);
        assert!(options.include_metadata);
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_format(), "json");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[ledger]
name = "file-test"
description = "File test"
version = "1.0"

[replay]
submissions_path = "./submissions.json"

[export]
output_path = "./output"
output_formats = ["csv"]
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.ledger.name, "file-test");
    }
}
