use crate::domain::model::{ExportOptions, LedgerPolicy, ReplayReport, ReviewSubmission};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn submissions_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn report_formats(&self) -> &[String];
    fn policy(&self) -> LedgerPolicy;
    fn halt_on_rejection(&self) -> bool;
    fn export_options(&self) -> ExportOptions;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn collect(&self) -> Result<Vec<ReviewSubmission>>;
    async fn apply(&self, submissions: Vec<ReviewSubmission>) -> Result<ReplayReport>;
    async fn export(&self, report: ReplayReport) -> Result<String>;
}
