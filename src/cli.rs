use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::api::payload::{DividendGoalRequest, ProjectionContext, build_inputs, validate_shock};
use crate::config::AppConfig;
use crate::core::{
    DividendGoalAssumptions, DividendGoalSnapshot, ReinvestmentPolicy, ShockEvent, TaxMode,
    run_shock, run_simulation,
};

#[derive(Parser, Debug)]
#[command(
    name = "dividend-roadmap",
    about = "Dividend goal roadmap projections with income shock testing"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Project a dividend goal offline and print the response JSON.
    Project(ProjectArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on; overrides the port in ROADMAP_BIND")]
    pub port: Option<u16>,
    #[arg(long, help = "Emit JSON logs; same as ROADMAP_LOG_JSON=1")]
    pub log_json: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTaxMode {
    AfterTax,
    Pretax,
}

impl From<CliTaxMode> for TaxMode {
    fn from(value: CliTaxMode) -> Self {
        match value {
            CliTaxMode::AfterTax => TaxMode::AfterTax,
            CliTaxMode::Pretax => TaxMode::Pretax,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliReinvestment {
    ContributionsOnly,
    Compound,
}

impl From<CliReinvestment> for ReinvestmentPolicy {
    fn from(value: CliReinvestment) -> Self {
        match value {
            CliReinvestment::ContributionsOnly => ReinvestmentPolicy::ContributionsOnly,
            CliReinvestment::Compound => ReinvestmentPolicy::Compound,
        }
    }
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[arg(long, default_value_t = 0.0, help = "Current annual dividend income")]
    current_annual_dividend: f64,
    #[arg(long = "target", help = "Target annual dividend income")]
    target_annual_dividend: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_contribution: f64,
    #[arg(long)]
    horizon_years: u32,
    #[arg(long, help = "Expected portfolio yield in percent, e.g. 3.5")]
    yield_rate: f64,
    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Annual dividend growth in percent; may be negative"
    )]
    dividend_growth_rate: f64,
    #[arg(long, help = "Share of dividends reinvested, 0 to 1")]
    reinvest_rate: Option<f64>,
    #[arg(long, value_enum, default_value_t = CliTaxMode::AfterTax)]
    tax_mode: CliTaxMode,
    #[arg(long, requires = "shock_rate")]
    shock_year: Option<i32>,
    #[arg(long, requires = "shock_year", help = "Income cut in percent, 0 to 100")]
    shock_rate: Option<f64>,
    #[arg(long, help = "First projected year; defaults to ROADMAP_CURRENT_YEAR or today")]
    current_year: Option<i32>,
    #[arg(long, value_enum)]
    reinvestment: Option<CliReinvestment>,
}

impl ProjectArgs {
    fn request(&self) -> DividendGoalRequest {
        DividendGoalRequest {
            target_annual_dividend: self.target_annual_dividend,
            monthly_contribution: self.monthly_contribution,
            horizon_years: self.horizon_years,
            assumptions: DividendGoalAssumptions {
                yield_rate: self.yield_rate,
                dividend_growth_rate: self.dividend_growth_rate,
                reinvest_rate: self.reinvest_rate,
                account_type: None,
                tax_mode: self.tax_mode.into(),
            },
        }
    }

    fn shock(&self) -> Option<ShockEvent> {
        match (self.shock_year, self.shock_rate) {
            (Some(year), Some(rate)) => Some(ShockEvent { year, rate }),
            _ => None,
        }
    }
}

/// Runs the same validation and projection as the HTTP routes; returns pretty JSON.
pub fn run_project(args: &ProjectArgs, config: &AppConfig) -> Result<String, String> {
    let context = ProjectionContext {
        start_year: args.current_year.unwrap_or_else(|| config.current_year()),
        reinvestment: args
            .reinvestment
            .map(ReinvestmentPolicy::from)
            .unwrap_or(config.reinvestment),
    };
    let inputs = build_inputs(&args.request(), context).map_err(|e| e.to_string())?;
    if !args.current_annual_dividend.is_finite() {
        return Err("current_annual_dividend must be a finite number".to_string());
    }
    let snapshot = DividendGoalSnapshot {
        current_annual_dividend: args.current_annual_dividend,
        current_yield_rate: None,
    };

    let json = match args.shock() {
        Some(shock) => {
            validate_shock(&shock, inputs.start_year, inputs.horizon_years)
                .map_err(|e| e.to_string())?;
            let response = run_shock(&snapshot, &inputs, shock).map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&response)
        }
        None => {
            let response = run_simulation(&snapshot, &inputs).map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&response)
        }
    };
    json.map_err(|e| format!("failed to serialize response: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn project_args(extra: &[&str]) -> ProjectArgs {
        let mut argv = vec![
            "dividend-roadmap",
            "project",
            "--current-annual-dividend",
            "50",
            "--target",
            "100",
            "--horizon-years",
            "2",
            "--yield-rate",
            "3.5",
            "--dividend-growth-rate",
            "2",
            "--current-year",
            "2026",
        ];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).expect("valid args").command {
            Command::Project(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn project_args_map_to_request() {
        let args = project_args(&["--tax-mode", "pretax", "--reinvest-rate", "0.5"]);
        let request = args.request();
        assert_eq!(request.target_annual_dividend, 100.0);
        assert_eq!(request.assumptions.tax_mode, TaxMode::Pretax);
        assert_eq!(request.assumptions.reinvest_rate, Some(0.5));
        assert!(args.shock().is_none());
    }

    #[test]
    fn project_prints_simulation_series() {
        let json = run_project(&project_args(&[]), &AppConfig::default()).expect("projects");
        let value: Value = serde_json::from_str(&json).expect("json output");
        let incomes: Vec<f64> = value["series"]
            .as_array()
            .expect("series")
            .iter()
            .filter_map(|point| point["annual_dividend"].as_f64())
            .collect();
        assert_eq!(incomes, vec![50.0, 51.0, 52.0]);
    }

    #[test]
    fn project_with_shock_prints_delta() {
        let args = project_args(&["--shock-year", "2027", "--shock-rate", "50"]);
        let json = run_project(&args, &AppConfig::default()).expect("projects");
        let value: Value = serde_json::from_str(&json).expect("json output");
        assert_eq!(value["delta"]["end_annual_dividend_gap"], 26.0);
    }

    #[test]
    fn project_rejects_out_of_range_shock() {
        let args = project_args(&["--shock-year", "2030", "--shock-rate", "50"]);
        let err = run_project(&args, &AppConfig::default()).expect_err("outside horizon");
        assert_eq!(err, "shock.year must be within the horizon.");
    }

    #[test]
    fn project_rejects_current_year_past_supported_range() {
        let mut args = project_args(&[]);
        args.current_year = Some(i32::MAX);
        args.horizon_years = 1;
        let err = run_project(&args, &AppConfig::default()).expect_err("year out of range");
        assert_eq!(err, "current_year must be between 1900 and 9999");
    }

    #[test]
    fn shock_year_without_rate_is_a_usage_error() {
        let argv = [
            "dividend-roadmap",
            "project",
            "--target",
            "100",
            "--horizon-years",
            "2",
            "--yield-rate",
            "3.5",
            "--dividend-growth-rate",
            "2",
            "--shock-year",
            "2027",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn negative_growth_rate_is_accepted() {
        let argv = [
            "dividend-roadmap",
            "project",
            "--target",
            "100",
            "--horizon-years",
            "1",
            "--yield-rate",
            "3.5",
            "--dividend-growth-rate",
            "-10",
        ];
        match Cli::try_parse_from(argv).expect("valid args").command {
            Command::Project(args) => assert_eq!(args.dividend_growth_rate, -10.0),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
