use serde::Serialize;

use crate::core::{AccountType, DividendGoalAssumptions};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Premium,
}

impl PlanTier {
    /// Billing reports several spellings for the paid tier; anything else is free.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("premium" | "paid" | "pro") => PlanTier::Premium,
            _ => PlanTier::Free,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    StressTest,
    ScenarioCompare,
}

impl FeatureKey {
    pub fn is_premium(self) -> bool {
        match self {
            FeatureKey::StressTest | FeatureKey::ScenarioCompare => true,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeatureKey::StressTest => "Stress test",
            FeatureKey::ScenarioCompare => "Scenario comparison",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccessDecision {
    Allowed,
    Denied,
}

pub fn decide_access(feature: FeatureKey, plan: PlanTier) -> AccessDecision {
    if !feature.is_premium() || plan == PlanTier::Premium {
        AccessDecision::Allowed
    } else {
        AccessDecision::Denied
    }
}

/// Free plans always project with full reinvestment into a NISA account.
pub fn normalize_assumptions(
    assumptions: &DividendGoalAssumptions,
    plan: PlanTier,
) -> DividendGoalAssumptions {
    let mut normalized = assumptions.clone();
    match plan {
        PlanTier::Free => {
            normalized.reinvest_rate = Some(1.0);
            normalized.account_type = Some(AccountType::Nisa);
        }
        PlanTier::Premium => {
            normalized.reinvest_rate = Some(assumptions.reinvest_rate.unwrap_or(1.0));
            normalized.account_type = Some(assumptions.account_type.unwrap_or_default());
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TaxMode;

    fn assumptions() -> DividendGoalAssumptions {
        DividendGoalAssumptions {
            yield_rate: 3.5,
            dividend_growth_rate: 2.0,
            reinvest_rate: Some(0.4),
            account_type: Some(AccountType::Taxable),
            tax_mode: TaxMode::AfterTax,
        }
    }

    #[test]
    fn paid_plan_spellings_normalize_to_premium() {
        for raw in ["premium", "paid", "pro", " pro "] {
            assert_eq!(PlanTier::from_raw(Some(raw)), PlanTier::Premium, "{raw}");
        }
        for raw in [None, Some("free"), Some("Premium"), Some("")] {
            assert_eq!(PlanTier::from_raw(raw), PlanTier::Free, "{raw:?}");
        }
    }

    #[test]
    fn premium_features_require_premium_plan() {
        assert_eq!(
            decide_access(FeatureKey::StressTest, PlanTier::Free),
            AccessDecision::Denied
        );
        assert_eq!(
            decide_access(FeatureKey::StressTest, PlanTier::Premium),
            AccessDecision::Allowed
        );
        assert_eq!(
            decide_access(FeatureKey::ScenarioCompare, PlanTier::Free),
            AccessDecision::Denied
        );
    }

    #[test]
    fn free_plan_overrides_reinvestment_and_account() {
        let normalized = normalize_assumptions(&assumptions(), PlanTier::Free);
        assert_eq!(normalized.reinvest_rate, Some(1.0));
        assert_eq!(normalized.account_type, Some(AccountType::Nisa));
        assert_eq!(normalized.yield_rate, 3.5);
    }

    #[test]
    fn premium_plan_keeps_values_and_fills_defaults() {
        let normalized = normalize_assumptions(&assumptions(), PlanTier::Premium);
        assert_eq!(normalized.reinvest_rate, Some(0.4));
        assert_eq!(normalized.account_type, Some(AccountType::Taxable));

        let mut bare = assumptions();
        bare.reinvest_rate = None;
        bare.account_type = None;
        let normalized = normalize_assumptions(&bare, PlanTier::Premium);
        assert_eq!(normalized.reinvest_rate, Some(1.0));
        assert_eq!(normalized.account_type, Some(AccountType::Nisa));
    }
}
