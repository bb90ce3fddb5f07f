use serde::{Deserialize, Serialize};

/// 評分允許的下限與上限（含）
pub const MIN_RATING: u32 = 1;
pub const MAX_RATING: u32 = 5;

/// 不透明的身份識別字串。客戶與自由工作者共用同一型別，
/// 帳本不對其內容做任何驗證，由宿主環境負責解析與認證。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Principal {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// 已接受的評價紀錄。寫入後不可修改、不可刪除。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer: Principal,
    pub freelancer: Principal,
    pub rating: u32,
}

/// 自由工作者的累計評分。`Default` 即是未被評價過的零聚合。
/// 序列化採 kebab-case 鍵名以維持既有的資料格式。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FreelancerRating {
    pub total_score: u64,
    pub review_count: u64,
    pub average_rating: u64,
}

/// 帳本政策。自我評價預設允許，部署環境可關閉。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPolicy {
    pub allow_self_review: bool,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            allow_self_review: true,
        }
    }
}

/// 呼叫者身份。只能由宿主層建構並注入，帳本核心不從輸入資料解析身份。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    principal: Principal,
}

impl CallerContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub client: Principal,
    pub freelancer: Principal,
    pub rating: u32,
}

/// 單筆提交套用到帳本後的結果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubmissionOutcome {
    pub client: Principal,
    pub freelancer: Principal,
    pub rating: u32,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SubmissionOutcome {
    pub fn accepted(submission: &ReviewSubmission) -> Self {
        Self {
            client: submission.client.clone(),
            freelancer: submission.freelancer.clone(),
            rating: submission.rating,
            accepted: true,
            error_code: None,
            error_message: None,
        }
    }

    pub fn rejected(submission: &ReviewSubmission, code: Option<u32>, message: String) -> Self {
        Self {
            client: submission.client.clone(),
            freelancer: submission.freelancer.clone(),
            rating: submission.rating,
            accepted: false,
            error_code: code,
            error_message: Some(message),
        }
    }
}

/// 匯出報表中的一列評分資料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRow {
    pub freelancer: Principal,
    #[serde(flatten)]
    pub rating: FreelancerRating,
}

/// 一次批次重放的完整結果
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub outcomes: Vec<SubmissionOutcome>,
    pub ratings: Vec<RatingRow>,
    pub reviews: Vec<Review>,
    pub accepted_count: usize,
    pub rejected_count: usize,
}

/// 匯出行為設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub compress: bool,
    pub bundle_name: String,
    pub include_reviews: bool,
    pub include_metadata: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            compress: true,
            bundle_name: "replay_report.zip".to_string(),
            include_reviews: true,
            include_metadata: false,
        }
    }
}
