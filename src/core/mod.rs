mod engine;
mod error;
mod scenarios;
mod types;

pub use engine::{
    apply_shock, evaluate_goal, gap_now, project_series, round_currency, run_shock,
    run_simulation, shock_delta, simulate_goal,
};
pub use error::ComputationError;
pub use scenarios::{SCENARIO_PRESETS, ScenarioPreset, compare_scenarios};
pub use types::{
    AccountType, DividendGoalAssumptions, DividendGoalResponse, DividendGoalResult,
    DividendGoalScenario, DividendGoalScenarioCompareResponse, DividendGoalSeriesPoint,
    DividendGoalShockResponse, DividendGoalSnapshot, Inputs, Recommendation, ReinvestmentPolicy,
    SUPPORTED_START_YEARS, ShockDelta, ShockEvent, TaxMode,
};
