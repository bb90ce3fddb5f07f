use crate::core::ledger::ReputationLedger;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    CallerContext, ExportOptions, RatingRow, ReplayReport, ReviewSubmission, SubmissionOutcome,
};
use crate::utils::error::{LedgerError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// 批次重放管道：讀入提交檔、逐筆套用到帳本、匯出報表
pub struct BatchPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    ledger: ReputationLedger,
}

impl<S: Storage, C: ConfigProvider> BatchPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let ledger = ReputationLedger::new(config.policy());
        Self {
            storage,
            config,
            ledger,
        }
    }

    /// 取得帳本把手，重放結束後仍可直接查詢
    pub fn ledger(&self) -> ReputationLedger {
        self.ledger.clone()
    }

    fn render_ratings_table(rows: &[RatingRow], delimiter: u8) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        writer.write_record(["freelancer", "total-score", "review-count", "average-rating"])?;
        for row in rows {
            let total_score = row.rating.total_score.to_string();
            let review_count = row.rating.review_count.to_string();
            let average_rating = row.rating.average_rating.to_string();
            writer.write_record([
                row.freelancer.as_str(),
                total_score.as_str(),
                review_count.as_str(),
                average_rating.as_str(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| LedgerError::ReplayError {
                stage: "export".to_string(),
                details: format!("Failed to flush rating table: {}", e),
            })
    }

    /// 依設定產出所有報表檔案（檔名, 內容）
    fn render_artifacts(
        &self,
        report: &ReplayReport,
        options: &ExportOptions,
    ) -> Result<Vec<(String, Vec<u8>)>> {
        let mut artifacts = Vec::new();

        for format in self.config.report_formats() {
            match format.as_str() {
                "csv" => artifacts.push((
                    "ratings.csv".to_string(),
                    Self::render_ratings_table(&report.ratings, b',')?,
                )),
                "tsv" => artifacts.push((
                    "ratings.tsv".to_string(),
                    Self::render_ratings_table(&report.ratings, b'\t')?,
                )),
                "json" => artifacts.push((
                    "ratings.json".to_string(),
                    serde_json::to_vec_pretty(&report.ratings)?,
                )),
                other => {
                    return Err(LedgerError::InvalidConfigValueError {
                        field: "report_formats".to_string(),
                        value: other.to_string(),
                        reason: "Supported report formats are csv, tsv and json".to_string(),
                    })
                }
            }
        }

        artifacts.push((
            "outcomes.json".to_string(),
            serde_json::to_vec_pretty(&report.outcomes)?,
        ));

        // 只有出現拒絕時才寫拒絕清單
        let rejected: Vec<&SubmissionOutcome> =
            report.outcomes.iter().filter(|o| !o.accepted).collect();
        if !rejected.is_empty() {
            artifacts.push((
                "rejected.json".to_string(),
                serde_json::to_vec_pretty(&rejected)?,
            ));
        }

        if options.include_reviews {
            artifacts.push((
                "reviews.json".to_string(),
                serde_json::to_vec_pretty(&report.reviews)?,
            ));
        }

        if options.include_metadata {
            let execution_id = format!("replay_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"));
            let metadata = serde_json::json!({
                "execution-id": execution_id,
                "generated-at": chrono::Utc::now().to_rfc3339(),
                "allow-self-review": self.config.policy().allow_self_review,
                "submissions": report.outcomes.len(),
                "accepted": report.accepted_count,
                "rejected": report.rejected_count,
                "freelancers-rated": report.ratings.len(),
            });
            artifacts.push((
                "metadata.json".to_string(),
                serde_json::to_vec_pretty(&metadata)?,
            ));
        }

        Ok(artifacts)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BatchPipeline<S, C> {
    async fn collect(&self) -> Result<Vec<ReviewSubmission>> {
        tracing::debug!(
            "Reading submissions from: {}",
            self.config.submissions_path()
        );

        let raw = self
            .storage
            .read_file(self.config.submissions_path())
            .await?;
        let submissions: Vec<ReviewSubmission> = serde_json::from_slice(&raw)?;

        tracing::debug!("Parsed {} submissions", submissions.len());
        Ok(submissions)
    }

    async fn apply(&self, submissions: Vec<ReviewSubmission>) -> Result<ReplayReport> {
        let mut outcomes = Vec::with_capacity(submissions.len());
        let mut accepted_count = 0usize;
        let mut rejected_count = 0usize;

        for submission in submissions {
            // 宿主層在這裡鑄造呼叫者身份，帳本核心只收已注入的身份
            let caller = CallerContext::new(submission.client.clone());

            match self
                .ledger
                .submit_review(&caller, &submission.freelancer, submission.rating)
                .await
            {
                Ok(_) => {
                    accepted_count += 1;
                    outcomes.push(SubmissionOutcome::accepted(&submission));
                }
                Err(error) if error.is_rejection() => {
                    rejected_count += 1;
                    tracing::warn!(
                        "⚠️ Rejected review from {} for {}: {}",
                        submission.client,
                        submission.freelancer,
                        error
                    );

                    if self.config.halt_on_rejection() {
                        return Err(LedgerError::ReplayError {
                            stage: "apply".to_string(),
                            details: error.to_string(),
                        });
                    }

                    outcomes.push(SubmissionOutcome::rejected(
                        &submission,
                        error.code(),
                        error.to_string(),
                    ));
                }
                Err(error) => return Err(error),
            }
        }

        Ok(ReplayReport {
            outcomes,
            ratings: self.ledger.rating_rows().await,
            reviews: self.ledger.all_reviews().await,
            accepted_count,
            rejected_count,
        })
    }

    async fn export(&self, report: ReplayReport) -> Result<String> {
        let options = self.config.export_options();
        let artifacts = self.render_artifacts(&report, &options)?;

        if options.compress {
            let output_path = format!("{}/{}", self.config.output_path(), options.bundle_name);
            tracing::debug!("Creating ZIP bundle with {} files", artifacts.len());

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

                for (name, data) in &artifacts {
                    zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                    zip.write_all(data)?;
                }

                // 完成並取回底層 Vec<u8>
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            tracing::debug!("Writing ZIP bundle ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&output_path, &zip_data).await?;

            Ok(output_path)
        } else {
            for (name, data) in &artifacts {
                let path = format!("{}/{}", self.config.output_path(), name);
                tracing::debug!("Writing report file: {}", path);
                self.storage.write_file(&path, data).await?;
            }

            Ok(self.config.output_path().to_string())
        }
    }
}
