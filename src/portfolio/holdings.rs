use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingAccount {
    Specific,
    NisaGrowth,
    NisaTsumitate,
    NisaLegacy,
}

impl HoldingAccount {
    pub const ALL: [HoldingAccount; 4] = [
        HoldingAccount::Specific,
        HoldingAccount::NisaGrowth,
        HoldingAccount::NisaTsumitate,
        HoldingAccount::NisaLegacy,
    ];

    pub fn index(self) -> usize {
        match self {
            HoldingAccount::Specific => 0,
            HoldingAccount::NisaGrowth => 1,
            HoldingAccount::NisaTsumitate => 2,
            HoldingAccount::NisaLegacy => 3,
        }
    }

    pub fn is_taxable(self) -> bool {
        self == HoldingAccount::Specific
    }
}

/// One position; `annual_dividend` is per share.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Holding {
    pub stock_code: String,
    #[serde(default)]
    pub stock_name: Option<String>,
    pub shares: f64,
    #[serde(default)]
    pub acquisition_price: Option<f64>,
    pub account_type: HoldingAccount,
    #[serde(default)]
    pub annual_dividend: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum HoldingsStoreError {
    #[error("holdings backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait HoldingsStore: Send + Sync {
    async fn holdings_for(&self, user_id: &str) -> Result<Vec<Holding>, HoldingsStoreError>;
    async fn replace_holdings(
        &self,
        user_id: &str,
        holdings: Vec<Holding>,
    ) -> Result<(), HoldingsStoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryHoldingsStore {
    by_user: RwLock<HashMap<String, Vec<Holding>>>,
}

#[async_trait]
impl HoldingsStore for InMemoryHoldingsStore {
    async fn holdings_for(&self, user_id: &str) -> Result<Vec<Holding>, HoldingsStoreError> {
        Ok(self
            .by_user
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_holdings(
        &self,
        user_id: &str,
        holdings: Vec<Holding>,
    ) -> Result<(), HoldingsStoreError> {
        self.by_user
            .write()
            .await
            .insert(user_id.to_string(), holdings);
        Ok(())
    }
}

/// First problem found in a bulk upload, as `(index, message)`.
pub fn validate_holdings(holdings: &[Holding]) -> Result<(), (usize, String)> {
    for (idx, holding) in holdings.iter().enumerate() {
        if holding.stock_code.trim().is_empty() {
            return Err((idx, "stock_code must not be empty".to_string()));
        }
        if !holding.shares.is_finite() || holding.shares <= 0.0 {
            return Err((idx, "shares must be > 0".to_string()));
        }
        if let Some(price) = holding.acquisition_price {
            if !price.is_finite() || price < 0.0 {
                return Err((idx, "acquisition_price must be >= 0".to_string()));
            }
        }
        if let Some(dividend) = holding.annual_dividend {
            if !dividend.is_finite() || dividend < 0.0 {
                return Err((idx, "annual_dividend must be >= 0".to_string()));
            }
        }
    }
    Ok(())
}
