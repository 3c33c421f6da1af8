//! Parametric sweeps around a computed [`ConsolidatedResult`].
//!
//! Each sample applies the change in monthly cash directly to the base
//! rent-out available figure instead of recomputing the whole scenario, so
//! second-order effects (tax on the changed income, for instance) are not
//! reflected.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{MONTHS_PER_YEAR, ratio};
use crate::calculations::scenario::ConsolidatedResult;
use crate::error::EngineError;
use crate::models::InputRecord;

const RENTAL_OFFSETS_PCT: [i32; 7] = [-15, -10, -5, 0, 5, 10, 15];
const VACANCY_MONTHS: [u32; 2] = [1, 2];
const EXCHANGE_RATE_FACTORS: [Decimal; 5] = [dec!(0.9), dec!(0.95), dec!(1), dec!(1.05), dec!(1.1)];
const FOREIGN_OFFSETS_PCT: [i32; 5] = [-10, -5, 0, 5, 10];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalVariation {
    pub variation_pct: i32,
    pub income: Decimal,
    pub available: Decimal,
    /// Approximate years taken off the loan if the extra cash were paid
    /// into it. `None` when there is no loan payment to compare against.
    pub time_impact_years: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyImpact {
    pub months: u32,
    pub lost_income: Decimal,
    pub monthly_impact: Decimal,
    pub new_available: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRateImpact {
    pub rate: Decimal,
    pub local_value: Decimal,
    pub net_change: Decimal,
    pub new_available: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignIncomeImpact {
    pub variation_pct: i32,
    pub amount: Decimal,
    pub local_value: Decimal,
    pub new_available: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub base_rental: Decimal,
    pub base_available: Decimal,
    pub rental: Vec<RentalVariation>,
    pub vacancy: Vec<VacancyImpact>,
    pub exchange_rate: Vec<ExchangeRateImpact>,
    pub foreign_income: Vec<ForeignIncomeImpact>,
}

/// Sweeps rental income, vacancy, exchange rate and foreign income.
#[derive(Debug, Clone)]
pub struct SensitivityAnalyzer<'a> {
    input: &'a InputRecord,
    base: &'a ConsolidatedResult,
}

impl<'a> SensitivityAnalyzer<'a> {
    pub fn new(
        input: &'a InputRecord,
        base: &'a ConsolidatedResult,
    ) -> Self {
        Self { input, base }
    }

    pub fn calculate(&self) -> Result<SensitivityReport, EngineError> {
        self.input.validate()?;

        Ok(SensitivityReport {
            base_rental: self.input.rental_income,
            base_available: self.base.rent_out_available,
            rental: self.rental_variations(),
            vacancy: self.vacancy_impacts(),
            exchange_rate: self.exchange_rate_impacts(),
            foreign_income: self.foreign_income_impacts(),
        })
    }

    fn rental_variations(&self) -> Vec<RentalVariation> {
        let base_rental = self.input.rental_income;
        RENTAL_OFFSETS_PCT
            .iter()
            .map(|&pct| {
                let income = base_rental * (Decimal::ONE + percent(pct));
                let delta = income - base_rental;
                RentalVariation {
                    variation_pct: pct,
                    income,
                    available: self.base.rent_out_available + delta,
                    time_impact_years: self.time_impact(delta),
                }
            })
            .collect()
    }

    /// Payment-ratio estimate of years saved by paying `delta` extra each
    /// month: `(n − n / ratio) / 12`, zero when the ratio does not exceed 1.
    fn time_impact(
        &self,
        delta: Decimal,
    ) -> Option<Decimal> {
        let payment = self.base.monthly_payment;
        let payment_ratio = ratio(payment + delta, payment)?;
        if payment_ratio <= Decimal::ONE {
            return Some(Decimal::ZERO);
        }
        let n = Decimal::from(self.base.term_months);
        Some((n - n / payment_ratio) / MONTHS_PER_YEAR)
    }

    fn vacancy_impacts(&self) -> Vec<VacancyImpact> {
        VACANCY_MONTHS
            .iter()
            .map(|&months| {
                let lost_income = self.input.rental_income * Decimal::from(months);
                let monthly_impact = lost_income / MONTHS_PER_YEAR;
                VacancyImpact {
                    months,
                    lost_income,
                    monthly_impact,
                    new_available: self.base.rent_out_available - monthly_impact,
                }
            })
            .collect()
    }

    fn exchange_rate_impacts(&self) -> Vec<ExchangeRateImpact> {
        let foreign = self.input.monthly_income_foreign;
        let base_value = foreign * self.input.exchange_rate;
        EXCHANGE_RATE_FACTORS
            .iter()
            .map(|&factor| {
                let rate = self.input.exchange_rate * factor;
                let local_value = foreign * rate;
                let net_change = local_value - base_value;
                ExchangeRateImpact {
                    rate,
                    local_value,
                    net_change,
                    new_available: self.base.rent_out_available + net_change,
                }
            })
            .collect()
    }

    fn foreign_income_impacts(&self) -> Vec<ForeignIncomeImpact> {
        let base_amount = self.input.monthly_income_foreign;
        let base_value = base_amount * self.input.exchange_rate;
        FOREIGN_OFFSETS_PCT
            .iter()
            .map(|&pct| {
                let amount = base_amount * (Decimal::ONE + percent(pct));
                let local_value = amount * self.input.exchange_rate;
                ForeignIncomeImpact {
                    variation_pct: pct,
                    amount,
                    local_value,
                    new_available: self.base.rent_out_available + (local_value - base_value),
                }
            })
            .collect()
    }
}

fn percent(pct: i32) -> Decimal {
    Decimal::from(pct) / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::scenario::ScenarioAggregator;
    use crate::models::EngineConfig;

    fn report(input: &InputRecord) -> (ConsolidatedResult, SensitivityReport) {
        let config = EngineConfig::default();
        let base = ScenarioAggregator::new(&config).calculate(input).unwrap();
        let report = SensitivityAnalyzer::new(input, &base).calculate().unwrap();
        (base, report)
    }

    // =========================================================================
    // Rental variations
    // =========================================================================

    #[test]
    fn rental_variations_cover_all_offsets() {
        let (_, report) = report(&InputRecord::default());
        let offsets: Vec<i32> = report.rental.iter().map(|v| v.variation_pct).collect();

        assert_eq!(offsets, vec![-15, -10, -5, 0, 5, 10, 15]);
    }

    #[test]
    fn rental_variation_shifts_available_by_income_delta() {
        let (base, report) = report(&InputRecord::default());
        let plus_ten = &report.rental[5];

        assert_eq!(plus_ten.income, dec!(19800));
        assert_eq!(plus_ten.available, base.rent_out_available + dec!(1800));
    }

    #[test]
    fn rental_variation_zero_offset_matches_base() {
        let (base, report) = report(&InputRecord::default());
        let unchanged = &report.rental[3];

        assert_eq!(unchanged.available, base.rent_out_available);
        assert_eq!(unchanged.time_impact_years, Some(dec!(0)));
    }

    #[test]
    fn rental_variation_decrease_has_no_time_impact() {
        let (_, report) = report(&InputRecord::default());

        assert_eq!(report.rental[0].time_impact_years, Some(dec!(0)));
    }

    #[test]
    fn rental_variation_increase_estimates_years_saved() {
        let (base, report) = report(&InputRecord::default());
        let payment = base.monthly_payment;
        let payment_ratio = (payment + dec!(2700)) / payment;
        let expected = (dec!(240) - dec!(240) / payment_ratio) / dec!(12);

        assert_eq!(report.rental[6].time_impact_years, Some(expected));
    }

    #[test]
    fn rental_variation_without_loan_has_undefined_time_impact() {
        let input = InputRecord {
            down_payment: dec!(2500000),
            ..InputRecord::default()
        };

        let (_, report) = report(&input);

        assert_eq!(report.rental[6].time_impact_years, None);
    }

    // =========================================================================
    // Vacancy
    // =========================================================================

    #[test]
    fn vacancy_one_month_spreads_lost_rent_over_year() {
        let (base, report) = report(&InputRecord::default());
        let one = &report.vacancy[0];

        assert_eq!(one.months, 1);
        assert_eq!(one.lost_income, dec!(18000));
        assert_eq!(one.monthly_impact, dec!(1500));
        assert_eq!(one.new_available, base.rent_out_available - dec!(18000) / dec!(12));
    }

    #[test]
    fn vacancy_two_months_doubles_impact() {
        let (_, report) = report(&InputRecord::default());

        assert_eq!(report.vacancy[1].monthly_impact, dec!(3000));
    }

    // =========================================================================
    // Exchange rate and foreign income
    // =========================================================================

    #[test]
    fn exchange_rate_samples_scale_base_rate() {
        let (base, report) = report(&InputRecord::default());
        let rates: Vec<Decimal> = report.exchange_rate.iter().map(|e| e.rate).collect();

        assert_eq!(
            rates,
            vec![dec!(16.65), dec!(17.575), dec!(18.5), dec!(19.425), dec!(20.35)]
        );
        assert_eq!(report.exchange_rate[0].net_change, dec!(-2960));
        assert_eq!(
            report.exchange_rate[0].new_available,
            base.rent_out_available - dec!(2960)
        );
        assert_eq!(report.exchange_rate[2].net_change, dec!(0));
    }

    #[test]
    fn foreign_income_offsets_convert_at_base_rate() {
        let (base, report) = report(&InputRecord::default());
        let minus_ten = &report.foreign_income[0];

        assert_eq!(minus_ten.amount, dec!(1440));
        assert_eq!(minus_ten.local_value, dec!(26640));
        assert_eq!(minus_ten.new_available, base.rent_out_available + dec!(-2960));
    }
}
