use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::{DividendGoalResult, DividendGoalSeriesPoint, DividendGoalSnapshot};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RoadmapHistorySummary {
    pub snapshot: Option<DividendGoalSnapshot>,
    pub result: Option<DividendGoalResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapHistoryListItem {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub input: Value,
    pub summary: RoadmapHistorySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapHistoryDetail {
    #[serde(flatten)]
    pub item: RoadmapHistoryListItem,
    pub series: Vec<DividendGoalSeriesPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapHistoryCreateRequest {
    pub input: Value,
    pub summary: RoadmapHistorySummary,
    pub series: Vec<DividendGoalSeriesPoint>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryErrorType {
    Validation,
    Unauthorized,
    NotFound,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct HistoryError {
    pub kind: HistoryErrorType,
    pub message: String,
}

impl HistoryError {
    pub fn new(kind: HistoryErrorType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(HistoryErrorType::Validation, message)
    }
}

#[async_trait]
pub trait RoadmapHistoryStore: Send + Sync {
    async fn insert(
        &self,
        user_id: &str,
        request: RoadmapHistoryCreateRequest,
    ) -> Result<RoadmapHistoryDetail, HistoryError>;

    /// Newest first, at most `limit` entries.
    async fn list(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<RoadmapHistoryListItem>, HistoryError>;

    async fn get(&self, user_id: &str, id: Uuid)
    -> Result<Option<RoadmapHistoryDetail>, HistoryError>;
}

#[derive(Debug)]
struct StoredHistory {
    user_id: String,
    detail: RoadmapHistoryDetail,
}

/// Entries kept in insertion order, which is also `created_at` order.
#[derive(Debug, Default)]
pub struct InMemoryRoadmapHistoryStore {
    entries: RwLock<Vec<StoredHistory>>,
}

#[async_trait]
impl RoadmapHistoryStore for InMemoryRoadmapHistoryStore {
    async fn insert(
        &self,
        user_id: &str,
        request: RoadmapHistoryCreateRequest,
    ) -> Result<RoadmapHistoryDetail, HistoryError> {
        let detail = RoadmapHistoryDetail {
            item: RoadmapHistoryListItem {
                id: Uuid::new_v4(),
                created_at: Utc::now(),
                input: request.input,
                summary: request.summary,
            },
            series: request.series,
        };
        self.entries.write().await.push(StoredHistory {
            user_id: user_id.to_string(),
            detail: detail.clone(),
        });
        Ok(detail)
    }

    async fn list(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<RoadmapHistoryListItem>, HistoryError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| entry.user_id == user_id)
            .take(limit)
            .map(|entry| entry.detail.item.clone())
            .collect())
    }

    async fn get(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<RoadmapHistoryDetail>, HistoryError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|entry| entry.user_id == user_id && entry.detail.item.id == id)
            .map(|entry| entry.detail.clone()))
    }
}

pub fn parse_limit(
    raw: Option<&str>,
    default_limit: usize,
    max_limit: usize,
) -> Result<usize, HistoryError> {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return Ok(default_limit);
    };
    match raw.parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit.min(max_limit)),
        _ => Err(HistoryError::validation("limit must be a positive integer")),
    }
}

/// Accepts RFC 4122 ids of versions 1 through 5 only.
pub fn parse_history_id(raw: &str) -> Result<Uuid, HistoryError> {
    let invalid = || HistoryError::validation("Invalid history id");
    let id = Uuid::parse_str(raw).map_err(|_| invalid())?;
    let rfc_variant = id.get_variant() == uuid::Variant::RFC4122;
    if raw.len() != 36 || !rfc_variant || !(1..=5).contains(&id.get_version_num()) {
        return Err(invalid());
    }
    Ok(id)
}

pub fn validate_create_request(body: &Value) -> Result<RoadmapHistoryCreateRequest, HistoryError> {
    let Some(object) = body.as_object() else {
        return Err(HistoryError::validation("Request body must be an object"));
    };

    let input = match object.get("input") {
        Some(input @ Value::Object(_)) => input.clone(),
        _ => return Err(HistoryError::validation("input is required")),
    };

    let summary = match object.get("summary") {
        Some(Value::Object(summary))
            if summary.contains_key("snapshot") && summary.contains_key("result") =>
        {
            serde_json::from_value::<RoadmapHistorySummary>(Value::Object(summary.clone()))
                .map_err(|e| HistoryError::validation(format!("summary is invalid: {e}")))?
        }
        _ => return Err(HistoryError::validation("summary is required")),
    };

    let series = match object.get("series") {
        Some(series @ Value::Array(_)) => {
            serde_json::from_value::<Vec<DividendGoalSeriesPoint>>(series.clone())
                .map_err(|e| HistoryError::validation(format!("series is invalid: {e}")))?
        }
        _ => return Err(HistoryError::validation("series is required")),
    };

    Ok(RoadmapHistoryCreateRequest {
        input,
        summary,
        series,
    })
}
