use serde::{Deserialize, Serialize};

use crate::core::{
    DividendGoalAssumptions, Inputs, ReinvestmentPolicy, SUPPORTED_START_YEARS, ShockEvent,
};

/// Longest projection the service accepts; a deployment limit, not a domain rule.
pub const MAX_HORIZON_YEARS: u32 = 200;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DividendGoalRequest {
    pub target_annual_dividend: f64,
    pub monthly_contribution: f64,
    pub horizon_years: u32,
    pub assumptions: DividendGoalAssumptions,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DividendGoalShockRequest {
    #[serde(flatten)]
    pub goal: DividendGoalRequest,
    pub shock: ShockEvent,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DividendGoalScenarioCompareRequest {
    pub target_annual_dividend: f64,
    pub monthly_contribution: f64,
    pub horizon_years: u32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Where and how the projection runs; not part of the request body.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext {
    pub start_year: i32,
    pub reinvestment: ReinvestmentPolicy,
}

fn check_amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new(field, format!("{field} must be >= 0")));
    }
    Ok(())
}

fn check_start_year(start_year: i32) -> Result<(), ValidationError> {
    if !SUPPORTED_START_YEARS.contains(&start_year) {
        return Err(ValidationError::new(
            "current_year",
            format!(
                "current_year must be between {} and {}",
                SUPPORTED_START_YEARS.start(),
                SUPPORTED_START_YEARS.end()
            ),
        ));
    }
    Ok(())
}

fn check_horizon(horizon_years: u32) -> Result<(), ValidationError> {
    if horizon_years > MAX_HORIZON_YEARS {
        return Err(ValidationError::new(
            "horizon_years",
            format!("horizon_years must be <= {MAX_HORIZON_YEARS} (service limit)"),
        ));
    }
    Ok(())
}

/// Checks fields in declaration order and stops at the first failure.
pub fn build_inputs(
    request: &DividendGoalRequest,
    context: ProjectionContext,
) -> Result<Inputs, ValidationError> {
    check_start_year(context.start_year)?;
    check_amount("target_annual_dividend", request.target_annual_dividend)?;
    check_amount("monthly_contribution", request.monthly_contribution)?;
    check_horizon(request.horizon_years)?;

    let assumptions = &request.assumptions;
    if !assumptions.yield_rate.is_finite() {
        return Err(ValidationError::new(
            "assumptions.yield_rate",
            "assumptions.yield_rate must be a finite number",
        ));
    }
    if !assumptions.dividend_growth_rate.is_finite() {
        return Err(ValidationError::new(
            "assumptions.dividend_growth_rate",
            "assumptions.dividend_growth_rate must be a finite number",
        ));
    }
    if let Some(rate) = assumptions.reinvest_rate {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ValidationError::new(
                "assumptions.reinvest_rate",
                "assumptions.reinvest_rate must be between 0 and 1",
            ));
        }
    }

    Ok(Inputs {
        start_year: context.start_year,
        target_annual_dividend: request.target_annual_dividend,
        monthly_contribution: request.monthly_contribution,
        horizon_years: request.horizon_years,
        yield_rate: assumptions.yield_rate / 100.0,
        dividend_growth_rate: assumptions.dividend_growth_rate / 100.0,
        reinvest_rate: assumptions.reinvest_rate.unwrap_or(1.0),
        reinvestment: context.reinvestment,
    })
}

/// Shock rate must be a percentage and the year must fall inside the projected horizon.
pub fn validate_shock(
    shock: &ShockEvent,
    start_year: i32,
    horizon_years: u32,
) -> Result<(), ValidationError> {
    if !(0.0..=100.0).contains(&shock.rate) {
        return Err(ValidationError::new(
            "shock.rate",
            "shock.rate must be between 0 and 100",
        ));
    }
    let last_year = i64::from(start_year) + i64::from(horizon_years);
    let year = i64::from(shock.year);
    if year < i64::from(start_year) || year > last_year {
        return Err(ValidationError::new(
            "shock.year",
            "shock.year must be within the horizon.",
        ));
    }
    Ok(())
}

pub fn build_scenario_inputs(
    request: &DividendGoalScenarioCompareRequest,
    context: ProjectionContext,
) -> Result<Inputs, ValidationError> {
    check_start_year(context.start_year)?;
    check_amount("target_annual_dividend", request.target_annual_dividend)?;
    check_amount("monthly_contribution", request.monthly_contribution)?;
    check_horizon(request.horizon_years)?;

    Ok(Inputs {
        start_year: context.start_year,
        target_annual_dividend: request.target_annual_dividend,
        monthly_contribution: request.monthly_contribution,
        horizon_years: request.horizon_years,
        yield_rate: 0.0,
        dividend_growth_rate: 0.0,
        reinvest_rate: 1.0,
        reinvestment: context.reinvestment,
    })
}
