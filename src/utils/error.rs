use crate::domain::model::{Principal, MAX_RATING, MIN_RATING};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// 評分超出允許範圍，對應既有的錯誤碼 101
    #[error("Invalid rating {rating}: ratings must be between {} and {}", MIN_RATING, MAX_RATING)]
    InvalidRating { rating: u32 },

    /// 同一組（評價者, 自由工作者）已有評價，對應既有的錯誤碼 102
    #[error("{reviewer} has already reviewed {freelancer}")]
    AlreadyReviewed {
        reviewer: Principal,
        freelancer: Principal,
    },

    /// 政策禁止自我評價時的拒絕，錯誤碼 103
    #[error("Self-review by {principal} is not allowed under the current policy")]
    SelfReview { principal: Principal },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Replay failed during {stage}: {details}")]
    ReplayError { stage: String, details: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Rejection,
    Storage,
    Data,
    Config,
    Replay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LedgerError {
    /// 拒絕類錯誤對應的數字錯誤碼，其餘錯誤沒有
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::InvalidRating { .. } => Some(101),
            Self::AlreadyReviewed { .. } => Some(102),
            Self::SelfReview { .. } => Some(103),
            _ => None,
        }
    }

    /// 拒絕類錯誤代表帳本狀態「未被改動」，呼叫端修正輸入後可重試
    pub fn is_rejection(&self) -> bool {
        self.code().is_some()
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRating { .. } | Self::AlreadyReviewed { .. } | Self::SelfReview { .. } => {
                ErrorCategory::Rejection
            }
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Storage,
            Self::CsvError(_) | Self::SerializationError(_) => ErrorCategory::Data,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Config,
            Self::ReplayError { .. } => ErrorCategory::Replay,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidRating { .. } | Self::AlreadyReviewed { .. } | Self::SelfReview { .. } => {
                ErrorSeverity::Low
            }
            Self::ReplayError { .. } => ErrorSeverity::Medium,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::InvalidRating { .. } => format!(
                "Submit a rating between {} and {}",
                MIN_RATING, MAX_RATING
            ),
            Self::AlreadyReviewed { .. } => {
                "Each client can review a freelancer exactly once; existing reviews are immutable"
                    .to_string()
            }
            Self::SelfReview { .. } => {
                "Use a different reviewer, or enable allow_self_review in the policy configuration"
                    .to_string()
            }
            Self::IoError(_) => {
                "Check that the submissions file exists and the output path is writable".to_string()
            }
            Self::ZipError(_) => {
                "Check available disk space and write permissions for the output path".to_string()
            }
            Self::CsvError(_) => "Check the configured report formats".to_string(),
            Self::SerializationError(_) => {
                "Check that the submissions file contains a valid JSON array of submissions"
                    .to_string()
            }
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => {
                "Review the configuration file or command line arguments".to_string()
            }
            Self::ReplayError { .. } => {
                "Fix the offending submission and re-run the replay".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidRating { rating } => format!(
                "The rating {} is out of range. Ratings go from {} to {}.",
                rating, MIN_RATING, MAX_RATING
            ),
            Self::AlreadyReviewed {
                reviewer,
                freelancer,
            } => format!(
                "{} has already rated {} and reviews cannot be changed.",
                reviewer, freelancer
            ),
            Self::SelfReview { principal } => {
                format!("{} cannot review themselves under the current policy.", principal)
            }
            Self::IoError(_) => "A file could not be read or written.".to_string(),
            Self::ZipError(_) => "The report archive could not be created.".to_string(),
            Self::CsvError(_) => "The rating tables could not be rendered.".to_string(),
            Self::SerializationError(_) => {
                "The submissions file could not be parsed as JSON.".to_string()
            }
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::MissingConfigError { field } => format!("Missing required setting: {}", field),
            Self::InvalidConfigValueError { field, value, .. } => {
                format!("The value '{}' is not valid for '{}'.", value, field)
            }
            Self::ConfigValidationError { field, message } => {
                format!("Configuration check failed for '{}': {}", field, message)
            }
            Self::ReplayError { stage, .. } => {
                format!("The replay stopped during the {} stage.", stage)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
