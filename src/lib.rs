pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use crate::core::{engine::ReplayEngine, ledger::ReputationLedger, pipeline::BatchPipeline};
pub use domain::model::{CallerContext, FreelancerRating, LedgerPolicy, Principal, Review};
pub use utils::error::{LedgerError, Result};
