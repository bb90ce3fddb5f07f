use crate::domain::model::{
    CallerContext, FreelancerRating, LedgerPolicy, Principal, RatingRow, Review, MAX_RATING,
    MIN_RATING,
};
use crate::utils::error::{LedgerError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 信譽帳本的完整狀態。所有寫入都走 `&mut self`，
/// 由外層的 `ReputationLedger` 鎖負責序列化。
///
/// 這個型別本身不做任何日誌或 IO，宿主環境才處理那些關注點。
#[derive(Debug, Default)]
pub struct LedgerState {
    policy: LedgerPolicy,
    reviews: BTreeMap<(Principal, Principal), Review>,
    ratings: BTreeMap<Principal, FreelancerRating>,
}

impl LedgerState {
    pub fn new(policy: LedgerPolicy) -> Self {
        Self {
            policy,
            reviews: BTreeMap::new(),
            ratings: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    /// 記錄一筆評價。檢查依序為：評分範圍、自我評價政策、重複評價，
    /// 第一個失敗的檢查決定回傳的錯誤。檢查全數通過前不寫入任何狀態。
    pub fn record_review(
        &mut self,
        reviewer: &Principal,
        freelancer: &Principal,
        rating: u32,
    ) -> Result<bool> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(LedgerError::InvalidRating { rating });
        }

        if !self.policy.allow_self_review && reviewer == freelancer {
            return Err(LedgerError::SelfReview {
                principal: reviewer.clone(),
            });
        }

        let key = (reviewer.clone(), freelancer.clone());
        if self.reviews.contains_key(&key) {
            return Err(LedgerError::AlreadyReviewed {
                reviewer: reviewer.clone(),
                freelancer: freelancer.clone(),
            });
        }

        self.reviews.insert(
            key,
            Review {
                reviewer: reviewer.clone(),
                freelancer: freelancer.clone(),
                rating,
            },
        );

        // 聚合值遞增維護，平均採整數向下取整
        let aggregate = self.ratings.entry(freelancer.clone()).or_default();
        aggregate.total_score += u64::from(rating);
        aggregate.review_count += 1;
        aggregate.average_rating = aggregate.total_score / aggregate.review_count;

        Ok(true)
    }

    /// 查詢累計評分。從未被評價的自由工作者回傳零聚合。
    pub fn freelancer_rating(&self, freelancer: &Principal) -> FreelancerRating {
        self.ratings.get(freelancer).cloned().unwrap_or_default()
    }

    pub fn review(&self, reviewer: &Principal, freelancer: &Principal) -> Option<Review> {
        self.reviews
            .get(&(reviewer.clone(), freelancer.clone()))
            .cloned()
    }

    pub fn has_reviewed(&self, reviewer: &Principal, freelancer: &Principal) -> bool {
        self.reviews
            .contains_key(&(reviewer.clone(), freelancer.clone()))
    }

    pub fn total_reviews(&self) -> usize {
        self.reviews.len()
    }

    /// 依自由工作者識別字串排序的評分列，供匯出使用
    pub fn rating_rows(&self) -> Vec<RatingRow> {
        self.ratings
            .iter()
            .map(|(freelancer, rating)| RatingRow {
                freelancer: freelancer.clone(),
                rating: rating.clone(),
            })
            .collect()
    }

    pub fn all_reviews(&self) -> Vec<Review> {
        self.reviews.values().cloned().collect()
    }
}

/// 可共享的帳本把手。`submit_review` 取寫鎖，讓「檢查再寫入」
/// 成為不可分割的臨界區；讀取取讀鎖，看到的是一致的快照。
#[derive(Debug, Clone, Default)]
pub struct ReputationLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl ReputationLedger {
    pub fn new(policy: LedgerPolicy) -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::new(policy))),
        }
    }

    /// 以呼叫者身份對自由工作者送出一筆評價
    pub async fn submit_review(
        &self,
        caller: &CallerContext,
        freelancer: &Principal,
        rating: u32,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        state.record_review(caller.principal(), freelancer, rating)
    }

    /// 讀取累計評分。純查詢，永遠成功。
    pub async fn freelancer_rating(&self, freelancer: &Principal) -> FreelancerRating {
        self.state.read().await.freelancer_rating(freelancer)
    }

    pub async fn review(&self, reviewer: &Principal, freelancer: &Principal) -> Option<Review> {
        self.state.read().await.review(reviewer, freelancer)
    }

    pub async fn has_reviewed(&self, reviewer: &Principal, freelancer: &Principal) -> bool {
        self.state.read().await.has_reviewed(reviewer, freelancer)
    }

    pub async fn total_reviews(&self) -> usize {
        self.state.read().await.total_reviews()
    }

    pub async fn rating_rows(&self) -> Vec<RatingRow> {
        self.state.read().await.rating_rows()
    }

    pub async fn all_reviews(&self) -> Vec<Review> {
        self.state.read().await.all_reviews()
    }
}
