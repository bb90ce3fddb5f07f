pub mod engine;
pub mod ledger;
pub mod pipeline;

pub use crate::domain::model::{ReplayReport, ReviewSubmission, SubmissionOutcome};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
