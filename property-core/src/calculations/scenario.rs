//! Affordability and the three competing scenarios for one input record.
//!
//! | Figure | Formula |
//! |--------|---------|
//! | loan amount | price − down payment |
//! | housing cost | standard payment + levies |
//! | housing-to-income | housing cost / net income × 100 |
//! | live-in available | net − housing − expenses − allocation |
//! | rent-out available | net + rental − housing − expenses − allocation − rent |
//! | keep-renting available | net − rent − expenses − allocation |
//!
//! Monthly savings default to the keep-renting figure; the savings target
//! defaults to the down payment.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{max, months_to_cover, percent_of};
use crate::calculations::loan::standard_payment;
use crate::calculations::tax::TaxEngine;
use crate::error::EngineError;
use crate::models::{EngineConfig, InputRecord};

/// Housing cost burden category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AffordabilityStatus {
    Good,
    Moderate,
    High,
}

impl fmt::Display for AffordabilityStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let label = match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::High => "High",
        };
        write!(f, "{label}")
    }
}

/// Everything derived from one [`InputRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedResult {
    // Income
    pub total_monthly_income: Decimal,
    pub monthly_tax: Decimal,
    pub monthly_net_income: Decimal,

    // Property
    pub loan_amount: Decimal,
    pub interest_rate_pct: Decimal,
    pub term_months: u32,
    pub monthly_payment: Decimal,
    pub total_housing_cost: Decimal,

    // Affordability
    /// `None` when net income is zero.
    pub housing_to_income_ratio: Option<Decimal>,
    pub disposable_after_housing: Decimal,
    pub affordability_status: AffordabilityStatus,

    // Savings progress
    pub current_savings: Decimal,
    pub savings_target: Decimal,
    pub down_payment_shortfall: Decimal,
    pub monthly_savings: Decimal,
    /// `None` when the target is not yet met and nothing is being saved.
    pub months_to_target: Option<u32>,

    pub current_rent: Decimal,

    // Scenarios
    pub live_in_available: Decimal,
    pub rent_out_available: Decimal,
    pub keep_renting_available: Decimal,
}

/// Runs the tax engine and amortization formula and derives the scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioAggregator<'a> {
    config: &'a EngineConfig,
}

impl<'a> ScenarioAggregator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if the configuration fails
    /// validation and [`EngineError::InvalidInput`] if `input` does.
    pub fn calculate(
        &self,
        input: &InputRecord,
    ) -> Result<ConsolidatedResult, EngineError> {
        self.config.validate()?;
        input.validate()?;

        let income = TaxEngine::new(&self.config.tax_table).income_breakdown(input)?;
        let net = income.net_income;

        let loan_amount = input.loan_amount();
        let interest_rate_pct = input.interest_rate();
        let term_months = input.loan_term_years.saturating_mul(12);
        let monthly_payment = standard_payment(loan_amount, interest_rate_pct, term_months)?;
        let total_housing_cost = monthly_payment + input.property_levies;

        let housing_to_income_ratio = if net > Decimal::ZERO {
            percent_of(total_housing_cost, net)
        } else {
            None
        };
        let affordability_status = self.affordability_status(housing_to_income_ratio);

        let fixed_costs = input.personal_expenses + input.personal_allocation;
        let current_rent = input.monthly_rent;
        let live_in_available = net - total_housing_cost - fixed_costs;
        let rent_out_available =
            net + input.rental_income - total_housing_cost - fixed_costs - current_rent;
        let keep_renting_available = net - current_rent - fixed_costs;

        let current_savings = input.current_savings.unwrap_or(Decimal::ZERO);
        let savings_target = input.savings_target.unwrap_or(input.down_payment);
        let monthly_savings = input.monthly_savings.unwrap_or(keep_renting_available);
        let remaining = savings_target - current_savings;

        Ok(ConsolidatedResult {
            total_monthly_income: income.total_gross,
            monthly_tax: income.tax.monthly_tax,
            monthly_net_income: net,
            loan_amount,
            interest_rate_pct,
            term_months,
            monthly_payment,
            total_housing_cost,
            housing_to_income_ratio,
            disposable_after_housing: net - total_housing_cost - input.personal_expenses,
            affordability_status,
            current_savings,
            savings_target,
            down_payment_shortfall: max(Decimal::ZERO, remaining),
            monthly_savings,
            months_to_target: months_to_cover(remaining, monthly_savings),
            current_rent,
            live_in_available,
            rent_out_available,
            keep_renting_available,
        })
    }

    /// An undefined ratio (no net income) is treated as unaffordable.
    fn affordability_status(
        &self,
        ratio: Option<Decimal>,
    ) -> AffordabilityStatus {
        match ratio {
            Some(r) if r <= self.config.good_affordability_pct => AffordabilityStatus::Good,
            Some(r) if r <= self.config.moderate_affordability_pct => AffordabilityStatus::Moderate,
            _ => AffordabilityStatus::High,
        }
    }
}
