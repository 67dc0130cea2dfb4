use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::ApiError;
use crate::access::{AccessDecision, FeatureKey, PlanTier, decide_access};

/// Set by the authenticating proxy in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_PLAN_HEADER: &str = "x-user-plan";

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub plan: PlanTier,
}

impl Identity {
    pub fn require(&self, feature: FeatureKey) -> Result<(), ApiError> {
        match decide_access(feature, self.plan) {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied => Err(ApiError::Forbidden { feature }),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthorized)?;
        let plan = PlanTier::from_raw(
            parts
                .headers
                .get(USER_PLAN_HEADER)
                .and_then(|value| value.to_str().ok()),
        );
        Ok(Identity {
            user_id: user_id.to_string(),
            plan,
        })
    }
}
