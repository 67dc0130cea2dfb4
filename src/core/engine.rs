use std::collections::BTreeMap;

use super::error::ComputationError;
use super::types::{
    DividendGoalResponse, DividendGoalResult, DividendGoalSeriesPoint, DividendGoalShockResponse,
    DividendGoalSnapshot, Inputs, Recommendation, ReinvestmentPolicy, ShockDelta, ShockEvent,
};

const MONTHS_PER_YEAR: f64 = 12.0;
const RECOMMENDED_MONTHLY_BOOST: f64 = 10_000.0;
const RECOMMENDED_YIELD_BOOST_PCT: f64 = 0.5;

/// Rounds half-up to a whole monetary unit. Inputs are non-negative, where
/// `f64::round` (half away from zero) is exact half-up.
pub fn round_currency(value: f64) -> f64 {
    value.round()
}

/// Clamps to zero but lets NaN through so `ensure_finite` can report it.
fn floor_at_zero(value: f64) -> f64 {
    if value.is_nan() { value } else { value.max(0.0) }
}

/// Year-by-year income from `start_year` through `start_year + horizon_years`.
///
/// The running income is carried unrounded; only emitted points are rounded.
/// Income never drops below zero, even under a negative growth rate.
pub fn project_series(
    snapshot: &DividendGoalSnapshot,
    inputs: &Inputs,
) -> Vec<DividendGoalSeriesPoint> {
    let annual_contribution = inputs.monthly_contribution * MONTHS_PER_YEAR;
    let contribution_impact = annual_contribution * inputs.yield_rate;
    let mut annual_dividend = floor_at_zero(snapshot.current_annual_dividend);

    let mut series = Vec::with_capacity(inputs.horizon_years as usize + 1);
    for index in 0..=inputs.horizon_years {
        if index > 0 {
            let growth = annual_dividend * inputs.dividend_growth_rate;
            let reinvested = match inputs.reinvestment {
                ReinvestmentPolicy::ContributionsOnly => 0.0,
                ReinvestmentPolicy::Compound => {
                    annual_dividend * inputs.reinvest_rate * inputs.yield_rate
                }
            };
            annual_dividend =
                floor_at_zero(annual_dividend + growth + contribution_impact + reinvested);
        }

        series.push(DividendGoalSeriesPoint {
            year: inputs.start_year + index as i32,
            annual_dividend: round_currency(annual_dividend),
        });
    }
    series
}

/// First point (in series order) at or above `target` decides the achievement year.
pub fn evaluate_goal(series: &[DividendGoalSeriesPoint], target: f64) -> DividendGoalResult {
    let achieved_point = series.iter().find(|point| point.annual_dividend >= target);
    DividendGoalResult {
        achieved: achieved_point.is_some(),
        achieved_in_year: achieved_point.map(|point| point.year),
        gap_now: None,
        end_annual_dividend: series.last().map(|point| point.annual_dividend),
        target_annual_dividend: target,
    }
}

pub fn gap_now(target: f64, current_annual_dividend: f64) -> f64 {
    (target - current_annual_dividend.max(0.0)).max(0.0)
}

/// Permanent step-down of every point from `shock_year` onward.
///
/// Callers validate `shock_rate_pct` in `[0, 100]` and the year against the horizon.
pub fn apply_shock(
    series: &[DividendGoalSeriesPoint],
    shock_year: i32,
    shock_rate_pct: f64,
) -> Vec<DividendGoalSeriesPoint> {
    let multiplier = (1.0 - shock_rate_pct / 100.0).max(0.0);
    series
        .iter()
        .map(|point| {
            if point.year < shock_year {
                *point
            } else {
                DividendGoalSeriesPoint {
                    year: point.year,
                    annual_dividend: round_currency(point.annual_dividend * multiplier),
                }
            }
        })
        .collect()
}

/// Order-sensitive: `shocked - base` for the year, `base - shocked` for income.
pub fn shock_delta(base: &DividendGoalResult, shocked: &DividendGoalResult) -> ShockDelta {
    let achieved_year_delay = match (base.achieved_in_year, shocked.achieved_in_year) {
        (Some(base_year), Some(shocked_year)) => Some(shocked_year - base_year),
        _ => None,
    };
    let end_annual_dividend_gap = match (base.end_annual_dividend, shocked.end_annual_dividend) {
        (Some(base_end), Some(shocked_end)) => Some(base_end - shocked_end),
        _ => None,
    };
    ShockDelta {
        achieved_year_delay,
        end_annual_dividend_gap,
    }
}

/// Projection plus evaluation, with `gap_now` measured against the snapshot.
pub fn simulate_goal(
    snapshot: &DividendGoalSnapshot,
    inputs: &Inputs,
) -> Result<(Vec<DividendGoalSeriesPoint>, DividendGoalResult), ComputationError> {
    let series = project_series(snapshot, inputs);
    ensure_finite(&series)?;

    let target = inputs.target_annual_dividend.max(0.0);
    let mut result = evaluate_goal(&series, target);
    result.gap_now = Some(gap_now(target, snapshot.current_annual_dividend));
    Ok((series, result))
}

pub fn run_simulation(
    snapshot: &DividendGoalSnapshot,
    inputs: &Inputs,
) -> Result<DividendGoalResponse, ComputationError> {
    let (series, result) = simulate_goal(snapshot, inputs)?;
    let recommendations = build_recommendations(snapshot, inputs)?;
    Ok(DividendGoalResponse {
        snapshot: snapshot.clone(),
        result,
        series,
        recommendations,
    })
}

pub fn run_shock(
    snapshot: &DividendGoalSnapshot,
    inputs: &Inputs,
    shock: ShockEvent,
) -> Result<DividendGoalShockResponse, ComputationError> {
    let base = run_simulation(snapshot, inputs)?;
    let shocked_series = apply_shock(&base.series, shock.year, shock.rate);
    let shocked_result = evaluate_goal(&shocked_series, inputs.target_annual_dividend);
    let delta = shock_delta(&base.result, &shocked_result);

    let shocked = DividendGoalResponse {
        snapshot: snapshot.clone(),
        result: shocked_result,
        series: shocked_series,
        recommendations: Vec::new(),
    };
    Ok(DividendGoalShockResponse {
        base,
        shocked,
        delta,
    })
}

fn build_recommendations(
    snapshot: &DividendGoalSnapshot,
    inputs: &Inputs,
) -> Result<Vec<Recommendation>, ComputationError> {
    let mut monthly_inputs = inputs.clone();
    monthly_inputs.monthly_contribution += RECOMMENDED_MONTHLY_BOOST;
    let (_, monthly_result) = simulate_goal(snapshot, &monthly_inputs)?;

    let mut yield_inputs = inputs.clone();
    yield_inputs.yield_rate += RECOMMENDED_YIELD_BOOST_PCT / 100.0;
    let (_, yield_result) = simulate_goal(snapshot, &yield_inputs)?;

    Ok(vec![
        recommendation(
            "monthly_contribution",
            "Add 10,000 per month",
            "Projection with the monthly contribution raised by 10,000.",
            RECOMMENDED_MONTHLY_BOOST,
            monthly_result,
        ),
        recommendation(
            "yield_rate",
            "Raise yield by 0.5%",
            "Projection with the assumed yield raised by 0.5 percentage points.",
            RECOMMENDED_YIELD_BOOST_PCT,
            yield_result,
        ),
    ])
}

fn recommendation(
    kind: &str,
    title: &str,
    message: &str,
    delta: f64,
    result: DividendGoalResult,
) -> Recommendation {
    Recommendation {
        kind: kind.to_string(),
        title: title.to_string(),
        label: title.to_string(),
        message: message.to_string(),
        delta: BTreeMap::from([(kind.to_string(), delta)]),
        result,
    }
}

fn ensure_finite(series: &[DividendGoalSeriesPoint]) -> Result<(), ComputationError> {
    match series.iter().find(|point| !point.annual_dividend.is_finite()) {
        Some(point) => Err(ComputationError::NonFiniteIncome { year: point.year }),
        None => Ok(()),
    }
}
