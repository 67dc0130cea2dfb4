use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    Pretax,
    AfterTax,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Nisa,
    Taxable,
}

/// How dividend income feeds back into next year's income.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ReinvestmentPolicy {
    /// Only new contributions buy additional yield.
    #[default]
    ContributionsOnly,
    /// The reinvested share of last year's income also buys yield.
    Compound,
}

/// Calendar years a projection may start in.
pub const SUPPORTED_START_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

/// Projection inputs with every rate already converted to a fraction.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub start_year: i32,
    pub target_annual_dividend: f64,
    pub monthly_contribution: f64,
    pub horizon_years: u32,
    pub yield_rate: f64,
    pub dividend_growth_rate: f64,
    pub reinvest_rate: f64,
    pub reinvestment: ReinvestmentPolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DividendGoalSnapshot {
    pub current_annual_dividend: f64,
    pub current_yield_rate: Option<f64>,
}

/// Rates are percentages: `3.5` means 3.5%.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DividendGoalAssumptions {
    pub yield_rate: f64,
    pub dividend_growth_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reinvest_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    pub tax_mode: TaxMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DividendGoalSeriesPoint {
    pub year: i32,
    pub annual_dividend: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DividendGoalResult {
    pub achieved: bool,
    pub achieved_in_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_now: Option<f64>,
    pub end_annual_dividend: Option<f64>,
    pub target_annual_dividend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ShockEvent {
    pub year: i32,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShockDelta {
    pub achieved_year_delay: Option<i32>,
    pub end_annual_dividend_gap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub label: String,
    pub message: String,
    pub delta: BTreeMap<String, f64>,
    pub result: DividendGoalResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendGoalResponse {
    pub snapshot: DividendGoalSnapshot,
    pub result: DividendGoalResult,
    pub series: Vec<DividendGoalSeriesPoint>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendGoalShockResponse {
    pub base: DividendGoalResponse,
    pub shocked: DividendGoalResponse,
    pub delta: ShockDelta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendGoalScenario {
    pub scenario_id: String,
    pub name: String,
    pub assumptions: DividendGoalAssumptions,
    pub result: DividendGoalResult,
    pub series: Vec<DividendGoalSeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DividendGoalScenarioCompareResponse {
    pub scenarios: Vec<DividendGoalScenario>,
}
