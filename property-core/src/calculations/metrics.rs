//! Property investment ratios and risk indicators.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{MONTHS_PER_YEAR, percent_of};
use crate::calculations::loan::standard_payment;
use crate::calculations::scenario::ConsolidatedResult;
use crate::error::EngineError;
use crate::models::{EngineConfig, InputRecord};

/// Typical gross rental yield used as a comparison point.
pub const MARKET_YIELD_PCT: Decimal = dec!(7.5);

/// Share of rent set aside for vacancy: one month a year.
const VACANCY_SHARE: Decimal = dec!(0.0833);

/// Exposure to income from the foreign stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Low up to 50%, moderate up to 70%.
    pub fn from_dependence(pct: Decimal) -> Self {
        if pct <= dec!(50) {
            Self::Low
        } else if pct <= dec!(70) {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

/// Percentages are whole numbers; `None` marks an undefined quotient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMetrics {
    pub rental_yield: Option<Decimal>,
    pub net_rental_yield: Option<Decimal>,
    /// Gross yield less [`MARKET_YIELD_PCT`].
    pub yield_vs_market: Option<Decimal>,
    /// Rental as a percentage of total housing cost.
    pub rental_coverage: Option<Decimal>,
    /// Rental as a percentage of the loan payment.
    pub bond_coverage: Option<Decimal>,
    /// Housing cost not covered by rent; negative when rent exceeds it.
    pub housing_shortfall: Decimal,
    pub foreign_income_dependence: Option<Decimal>,
    pub foreign_income_risk: Option<RiskLevel>,
    /// Extra monthly payment if the rate rises by the configured shock.
    pub rate_shock_impact: Decimal,
    /// Monthly interest on the loan per 0.02 percentage points of rate.
    pub interest_sensitivity: Decimal,
}

#[derive(Debug, Clone)]
pub struct PropertyMetricsCalculator<'a> {
    config: &'a EngineConfig,
}

impl<'a> PropertyMetricsCalculator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn calculate(
        &self,
        input: &InputRecord,
        base: &ConsolidatedResult,
    ) -> Result<PropertyMetrics, EngineError> {
        let price = input.house_price;
        let rental = input.rental_income;

        let rental_yield = percent_of(rental * MONTHS_PER_YEAR, price);
        let net_monthly = rental - rental * VACANCY_SHARE - input.property_levies;
        let net_rental_yield = percent_of(net_monthly * MONTHS_PER_YEAR, price);

        let foreign_income_dependence =
            percent_of(input.foreign_income_local(), base.total_monthly_income);

        Ok(PropertyMetrics {
            rental_yield,
            net_rental_yield,
            yield_vs_market: rental_yield.map(|y| y - MARKET_YIELD_PCT),
            rental_coverage: percent_of(rental, base.total_housing_cost),
            bond_coverage: percent_of(rental, base.monthly_payment),
            housing_shortfall: base.total_housing_cost - rental,
            foreign_income_dependence,
            foreign_income_risk: foreign_income_dependence.map(RiskLevel::from_dependence),
            rate_shock_impact: self.rate_shock_impact(base)?,
            interest_sensitivity: base.loan_amount * dec!(0.02) / Decimal::ONE_HUNDRED
                / MONTHS_PER_YEAR,
        })
    }

    fn rate_shock_impact(
        &self,
        base: &ConsolidatedResult,
    ) -> Result<Decimal, EngineError> {
        let shocked = standard_payment(
            base.loan_amount,
            base.interest_rate_pct + self.config.rate_shock_points,
            base.term_months,
        )?;
        Ok(shocked - base.monthly_payment)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::scenario::ScenarioAggregator;

    fn metrics(input: &InputRecord) -> (ConsolidatedResult, PropertyMetrics) {
        let config = EngineConfig::default();
        let base = ScenarioAggregator::new(&config).calculate(input).unwrap();
        let metrics = PropertyMetricsCalculator::new(&config)
            .calculate(input, &base)
            .unwrap();
        (base, metrics)
    }

    #[test]
    fn rental_yield_is_annual_rent_over_price() {
        let (_, metrics) = metrics(&InputRecord::default());

        assert_eq!(metrics.rental_yield, Some(dec!(8.64)));
        assert_eq!(metrics.yield_vs_market, Some(dec!(1.14)));
    }

    #[test]
    fn net_rental_yield_deducts_vacancy_and_levies() {
        let (_, metrics) = metrics(&InputRecord::default());

        // (18000 - 1499.4 - 2200) * 12 / 2500000 * 100
        assert_eq!(metrics.net_rental_yield, Some(dec!(6.864288)));
    }

    #[test]
    fn coverage_and_shortfall_follow_housing_cost() {
        let (base, metrics) = metrics(&InputRecord::default());

        assert_eq!(
            metrics.housing_shortfall,
            base.total_housing_cost - dec!(18000)
        );
        assert!(metrics.rental_coverage.unwrap() < metrics.bond_coverage.unwrap());
    }

    #[test]
    fn foreign_income_dependence_rates_risk() {
        let (_, metrics) = metrics(&InputRecord::default());

        // 29600 / 39600
        let dependence = metrics.foreign_income_dependence.unwrap();
        assert!(dependence > dec!(74) && dependence < dec!(75));
        assert_eq!(metrics.foreign_income_risk, Some(RiskLevel::High));
    }

    #[test]
    fn risk_level_boundaries() {
        assert_eq!(RiskLevel::from_dependence(dec!(50)), RiskLevel::Low);
        assert_eq!(RiskLevel::from_dependence(dec!(70)), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_dependence(dec!(70.1)), RiskLevel::High);
    }

    #[test]
    fn rate_shock_raises_payment() {
        let (_, metrics) = metrics(&InputRecord::default());

        assert!(metrics.rate_shock_impact > dec!(0));
    }

    #[test]
    fn interest_sensitivity_scales_with_loan() {
        let (_, metrics) = metrics(&InputRecord::default());

        // 1900000 * 0.02 / 100 / 12
        assert_eq!(metrics.interest_sensitivity.round_dp(2), dec!(31.67));
    }

    #[test]
    fn zero_price_and_income_give_undefined_ratios() {
        let input = InputRecord {
            house_price: dec!(0),
            down_payment: dec!(0),
            monthly_income_local: dec!(0),
            monthly_income_foreign: dec!(0),
            ..InputRecord::default()
        };

        let (_, metrics) = metrics(&input);

        assert_eq!(metrics.rental_yield, None);
        assert_eq!(metrics.net_rental_yield, None);
        assert_eq!(metrics.bond_coverage, None);
        assert_eq!(metrics.foreign_income_dependence, None);
        assert_eq!(metrics.foreign_income_risk, None);
        assert_eq!(metrics.rate_shock_impact, dec!(0));
    }
}
