use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 重放引擎：依序驅動 collect、apply、export 三個階段
pub struct ReplayEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ReplayEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting reputation replay");
        self.monitor.log_stats("Startup");

        // Collect
        tracing::info!("📥 Collecting submissions...");
        let submissions = self.pipeline.collect().await?;
        tracing::info!("📥 Collected {} submissions", submissions.len());
        let submission_count = submissions.len() as u64;
        self.monitor.log_stats("Collect");

        // Apply
        tracing::info!("🔄 Applying submissions to the ledger...");
        let report = self.pipeline.apply(submissions).await?;
        tracing::info!(
            "🔄 Applied {} submissions: {} accepted, {} rejected, {} freelancers rated",
            report.outcomes.len(),
            report.accepted_count,
            report.rejected_count,
            report.ratings.len()
        );
        self.monitor.record_submissions(submission_count);
        self.monitor.log_stats("Apply");

        // Export
        tracing::info!("💾 Exporting replay report...");
        let output_path = self.pipeline.export(report).await?;
        tracing::info!("💾 Report saved to: {}", output_path);
        self.monitor.log_stats("Export");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ReplayReport, ReviewSubmission, SubmissionOutcome};
    use crate::utils::error::LedgerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubPipeline {
        fail_apply: bool,
        collect_calls: AtomicUsize,
        export_calls: AtomicUsize,
    }

    impl StubPipeline {
        fn new(fail_apply: bool) -> Self {
            Self {
                fail_apply,
                collect_calls: AtomicUsize::new(0),
                export_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn collect(&self) -> Result<Vec<ReviewSubmission>> {
            self.collect_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ReviewSubmission {
                client: "client_1".into(),
                freelancer: "freelancer_1".into(),
                rating: 5,
            }])
        }

        async fn apply(&self, submissions: Vec<ReviewSubmission>) -> Result<ReplayReport> {
            if self.fail_apply {
                return Err(LedgerError::ReplayError {
                    stage: "apply".to_string(),
                    details: "boom".to_string(),
                });
            }

            let outcomes: Vec<SubmissionOutcome> = submissions
                .iter()
                .map(SubmissionOutcome::accepted)
                .collect();
            let accepted_count = outcomes.len();
            Ok(ReplayReport {
                outcomes,
                ratings: vec![],
                reviews: vec![],
                accepted_count,
                rejected_count: 0,
            })
        }

        async fn export(&self, _report: ReplayReport) -> Result<String> {
            self.export_calls.fetch_add(1, Ordering::SeqCst);
            Ok("out/replay_report.zip".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_drives_all_phases_in_order() {
        let engine = ReplayEngine::new(StubPipeline::new(false));

        let output_path = engine.run().await.unwrap();

        assert_eq!(output_path, "out/replay_report.zip");
        assert_eq!(engine.pipeline.collect_calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.pipeline.export_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_stops_when_apply_fails() {
        let engine = ReplayEngine::new(StubPipeline::new(true));

        let error = engine.run().await.unwrap_err();

        assert!(matches!(error, LedgerError::ReplayError { .. }));
        assert_eq!(engine.pipeline.export_calls.load(Ordering::SeqCst), 0);
    }
}
