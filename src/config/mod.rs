pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::{ExportOptions, LedgerPolicy};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "freelance-rep")]
#[command(about = "Replay freelancer review submissions into a reputation ledger")]
pub struct CliConfig {
    /// JSON 格式的提交清單檔案
    #[arg(long, default_value = "./submissions.json")]
    pub submissions_path: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv,tsv")]
    pub report_formats: Vec<String>,

    #[arg(long, help = "Reject reviews where the reviewer rates themselves")]
    pub deny_self_review: bool,

    #[arg(long, help = "Stop the replay at the first rejected submission")]
    pub halt_on_rejection: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn submissions_path(&self) -> &str {
        &self.submissions_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn report_formats(&self) -> &[String] {
        &self.report_formats
    }

    fn policy(&self) -> LedgerPolicy {
        LedgerPolicy {
            allow_self_review: !self.deny_self_review,
        }
    }

    fn halt_on_rejection(&self) -> bool {
        self.halt_on_rejection
    }

    fn export_options(&self) -> ExportOptions {
        ExportOptions::default()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("submissions_path", &self.submissions_path)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_report_formats(
            "report_formats",
            &self.report_formats,
            &["csv", "tsv", "json"],
        )?;
        Ok(())
    }
}
