//! Rough monthly upside of three optimization levers.
//!
//! These are fixed-share estimates, not projections: a share of the monthly
//! tax, of the property's running cost and of the rental income.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::scenario::ConsolidatedResult;
use crate::models::InputRecord;

/// Share of monthly tax recoverable through property deductions.
pub const TAX_SAVING_SHARE: Decimal = dec!(0.15);
/// Share of bond payment and levies recoverable by cutting costs.
pub const COST_REDUCTION_SHARE: Decimal = dec!(0.05);
/// Achievable rise in rental income.
pub const RENTAL_UPLIFT_SHARE: Decimal = dec!(0.10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationEstimates {
    pub tax_saving: Decimal,
    pub property_cost_reduction: Decimal,
    pub rental_uplift: Decimal,
}

impl OptimizationEstimates {
    pub fn calculate(
        input: &InputRecord,
        base: &ConsolidatedResult,
    ) -> Self {
        Self {
            tax_saving: base.monthly_tax * TAX_SAVING_SHARE,
            property_cost_reduction: (input.property_levies + base.monthly_payment)
                * COST_REDUCTION_SHARE,
            rental_uplift: input.rental_income * RENTAL_UPLIFT_SHARE,
        }
    }

    /// Combined monthly upside if every lever is pulled.
    pub fn total(&self) -> Decimal {
        self.tax_saving + self.property_cost_reduction + self.rental_uplift
    }
}
