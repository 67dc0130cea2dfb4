use super::engine::simulate_goal;
use super::error::ComputationError;
use super::types::{
    DividendGoalAssumptions, DividendGoalScenario, DividendGoalSnapshot, Inputs, TaxMode,
};

#[derive(Debug, Clone, Copy)]
pub struct ScenarioPreset {
    pub scenario_id: &'static str,
    pub name: &'static str,
    pub yield_rate_pct: f64,
    pub dividend_growth_rate_pct: f64,
}

pub const SCENARIO_PRESETS: [ScenarioPreset; 3] = [
    ScenarioPreset {
        scenario_id: "stable",
        name: "Stable",
        yield_rate_pct: 3.5,
        dividend_growth_rate_pct: 1.5,
    },
    ScenarioPreset {
        scenario_id: "high",
        name: "High dividend",
        yield_rate_pct: 4.5,
        dividend_growth_rate_pct: 1.0,
    },
    ScenarioPreset {
        scenario_id: "growth",
        name: "Dividend growth",
        yield_rate_pct: 3.0,
        dividend_growth_rate_pct: 3.0,
    },
];

/// Runs the projector once per preset; only yield and growth differ between runs.
pub fn compare_scenarios(
    snapshot: &DividendGoalSnapshot,
    base: &Inputs,
    presets: &[ScenarioPreset],
) -> Result<Vec<DividendGoalScenario>, ComputationError> {
    presets
        .iter()
        .map(|preset| {
            let mut inputs = base.clone();
            inputs.yield_rate = preset.yield_rate_pct / 100.0;
            inputs.dividend_growth_rate = preset.dividend_growth_rate_pct / 100.0;
            let (series, result) = simulate_goal(snapshot, &inputs)?;

            Ok(DividendGoalScenario {
                scenario_id: preset.scenario_id.to_string(),
                name: preset.name.to_string(),
                assumptions: DividendGoalAssumptions {
                    yield_rate: preset.yield_rate_pct,
                    dividend_growth_rate: preset.dividend_growth_rate_pct,
                    reinvest_rate: None,
                    account_type: None,
                    tax_mode: TaxMode::AfterTax,
                },
                result,
                series,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ReinvestmentPolicy;

    fn base_inputs() -> Inputs {
        Inputs {
            start_year: 2026,
            target_annual_dividend: 1_100.0,
            monthly_contribution: 0.0,
            horizon_years: 5,
            yield_rate: 0.0,
            dividend_growth_rate: 0.0,
            reinvest_rate: 1.0,
            reinvestment: ReinvestmentPolicy::ContributionsOnly,
        }
    }

    #[test]
    fn scenarios_keep_preset_order_and_assumptions() {
        let snapshot = DividendGoalSnapshot {
            current_annual_dividend: 1_000.0,
            current_yield_rate: None,
        };
        let scenarios =
            compare_scenarios(&snapshot, &base_inputs(), &SCENARIO_PRESETS).expect("finite");

        let ids: Vec<_> = scenarios.iter().map(|s| s.scenario_id.as_str()).collect();
        assert_eq!(ids, ["stable", "high", "growth"]);
        assert_eq!(scenarios[1].assumptions.yield_rate, 4.5);
        assert_eq!(scenarios[2].assumptions.tax_mode, TaxMode::AfterTax);
        assert!(scenarios.iter().all(|s| s.series.len() == 6));
    }

    #[test]
    fn faster_growth_preset_reaches_target_first() {
        let snapshot = DividendGoalSnapshot {
            current_annual_dividend: 1_000.0,
            current_yield_rate: None,
        };
        let scenarios =
            compare_scenarios(&snapshot, &base_inputs(), &SCENARIO_PRESETS).expect("finite");

        // No contributions: only growth moves income. 3% compounds past 1,100 in 2030,
        // 1.5% and 1.0% stay below it through 2031.
        assert_eq!(scenarios[2].result.achieved_in_year, Some(2030));
        assert_eq!(scenarios[0].result.achieved_in_year, None);
        assert_eq!(scenarios[1].result.achieved_in_year, None);
        assert_eq!(scenarios[0].result.gap_now, Some(100.0));
    }
}
