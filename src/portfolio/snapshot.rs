use crate::core::{DividendGoalSnapshot, TaxMode, round_currency};

use super::holdings::{Holding, HoldingAccount};

/// Withholding on dividends paid into a specific (taxable) account.
const SPECIFIC_ACCOUNT_TAX_RATE: f64 = 0.20315;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividendSummary {
    pub total_pre_tax: f64,
    pub total_after_tax: f64,
    pub total_investment: f64,
}

pub fn summarize_dividends(holdings: &[Holding]) -> DividendSummary {
    let mut pre_tax_by_account = [0.0_f64; HoldingAccount::ALL.len()];
    let mut total_pre_tax = 0.0;
    let mut total_investment = 0.0;

    for holding in holdings {
        let per_share = holding.annual_dividend.filter(|v| v.is_finite()).unwrap_or(0.0);
        let pre_tax = per_share * holding.shares;
        if per_share > 0.0 {
            pre_tax_by_account[holding.account_type.index()] += pre_tax;
            total_pre_tax += pre_tax;
        }
        if let Some(price) = holding.acquisition_price {
            total_investment += price * holding.shares;
        }
    }

    let total_after_tax = HoldingAccount::ALL
        .iter()
        .map(|account| {
            let pre_tax = pre_tax_by_account[account.index()];
            let rate = if account.is_taxable() {
                SPECIFIC_ACCOUNT_TAX_RATE
            } else {
                0.0
            };
            (pre_tax * (1.0 - rate)).floor()
        })
        .sum();

    DividendSummary {
        total_pre_tax,
        total_after_tax,
        total_investment,
    }
}

/// Current income and blended yield on the basis selected by `tax_mode`.
pub fn resolve_snapshot(holdings: &[Holding], tax_mode: TaxMode) -> DividendGoalSnapshot {
    let summary = summarize_dividends(holdings);
    let income = match tax_mode {
        TaxMode::AfterTax => summary.total_after_tax,
        TaxMode::Pretax => summary.total_pre_tax,
    };
    let current_yield_rate = if summary.total_investment.is_finite() && summary.total_investment > 0.0
    {
        let pct = income / summary.total_investment * 100.0;
        Some(round_currency(pct * 100.0) / 100.0)
    } else {
        None
    };

    DividendGoalSnapshot {
        current_annual_dividend: round_currency(income),
        current_yield_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn holding(
        account_type: HoldingAccount,
        shares: f64,
        price: Option<f64>,
        dividend: Option<f64>,
    ) -> Holding {
        Holding {
            stock_code: "8058".to_string(),
            stock_name: None,
            shares,
            acquisition_price: price,
            account_type,
            annual_dividend: dividend,
        }
    }

    #[test]
    fn after_tax_withholds_only_specific_accounts() {
        let holdings = vec![
            holding(HoldingAccount::Specific, 100.0, Some(2_000.0), Some(100.0)),
            holding(HoldingAccount::NisaGrowth, 100.0, Some(2_000.0), Some(50.0)),
        ];
        let summary = summarize_dividends(&holdings);

        assert_approx(summary.total_pre_tax, 15_000.0);
        // 10,000 * (1 - 0.20315) = 7,968.5 floored, plus 5,000 untaxed.
        assert_approx(summary.total_after_tax, 12_968.0);
        assert_approx(summary.total_investment, 400_000.0);
    }

    #[test]
    fn snapshot_follows_tax_mode_and_rounds_yield() {
        let holdings = vec![
            holding(HoldingAccount::Specific, 100.0, Some(2_000.0), Some(100.0)),
            holding(HoldingAccount::NisaGrowth, 100.0, Some(2_000.0), Some(50.0)),
        ];

        let pretax = resolve_snapshot(&holdings, TaxMode::Pretax);
        assert_approx(pretax.current_annual_dividend, 15_000.0);
        assert_eq!(pretax.current_yield_rate, Some(3.75));

        let after_tax = resolve_snapshot(&holdings, TaxMode::AfterTax);
        assert_approx(after_tax.current_annual_dividend, 12_968.0);
        // 12,968 / 400,000 = 3.242%.
        assert_eq!(after_tax.current_yield_rate, Some(3.24));
    }

    #[test]
    fn missing_prices_leave_yield_unknown() {
        let holdings = vec![holding(HoldingAccount::NisaLegacy, 10.0, None, Some(30.0))];
        let snapshot = resolve_snapshot(&holdings, TaxMode::Pretax);
        assert_approx(snapshot.current_annual_dividend, 300.0);
        assert_eq!(snapshot.current_yield_rate, None);
    }

    #[test]
    fn empty_portfolio_is_zero_income() {
        let snapshot = resolve_snapshot(&[], TaxMode::AfterTax);
        assert_approx(snapshot.current_annual_dividend, 0.0);
        assert_eq!(snapshot.current_yield_rate, None);
    }
}
