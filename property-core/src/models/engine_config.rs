use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::TaxTable;

/// Longest horizon any month-by-month loop may be configured with.
pub const MAX_HORIZON_MONTHS: u32 = 1200;

/// Tunable constants for the calculation engine.
///
/// Every field has a default, so a configuration file only needs to list
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Iteration cap for savings projections, in months.
    pub savings_horizon_months: u32,
    /// Inflation used by the inflation-adjusted strategy when none is given.
    pub default_inflation_pct: Decimal,
    /// Housing-to-income ratio at or below which affordability is good.
    pub good_affordability_pct: Decimal,
    /// Housing-to-income ratio at or below which affordability is moderate.
    pub moderate_affordability_pct: Decimal,
    /// Annual property appreciation.
    pub appreciation_pct: Decimal,
    /// Horizon of the wealth comparison, in months.
    pub wealth_horizon_months: u32,
    /// Longest rental break-even searched for, in months.
    pub break_even_cap_months: u32,
    /// Rate rise, in percentage points, used for the rate-shock metric.
    pub rate_shock_points: Decimal,
    pub tax_table: TaxTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            savings_horizon_months: 600,
            default_inflation_pct: dec!(6),
            good_affordability_pct: dec!(30),
            moderate_affordability_pct: dec!(40),
            appreciation_pct: dec!(5),
            wealth_horizon_months: 60,
            break_even_cap_months: 120,
            rate_shock_points: dec!(2),
            tax_table: TaxTable::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.savings_horizon_months == 0 {
            return Err(EngineError::InvalidConfig(
                "savings_horizon_months must be positive".to_string(),
            ));
        }
        for (name, months) in [
            ("savings_horizon_months", self.savings_horizon_months),
            ("wealth_horizon_months", self.wealth_horizon_months),
            ("break_even_cap_months", self.break_even_cap_months),
        ] {
            if months > MAX_HORIZON_MONTHS {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be at most {MAX_HORIZON_MONTHS}, got {months}"
                )));
            }
        }
        if self.good_affordability_pct > self.moderate_affordability_pct {
            return Err(EngineError::InvalidConfig(format!(
                "good_affordability_pct ({}) exceeds moderate_affordability_pct ({})",
                self.good_affordability_pct, self.moderate_affordability_pct
            )));
        }
        if self.default_inflation_pct <= dec!(-100) || self.appreciation_pct <= dec!(-100) {
            return Err(EngineError::InvalidConfig(
                "inflation and appreciation must be above -100%".to_string(),
            ));
        }
        if self.rate_shock_points < Decimal::ZERO {
            return Err(EngineError::InvalidConfig(format!(
                "rate_shock_points must be non-negative, got {}",
                self.rate_shock_points
            )));
        }
        // Re-run the table's own checks in case it was deserialized.
        TaxTable::new(
            self.tax_table.version.clone(),
            self.tax_table.brackets.clone(),
            self.tax_table.rebate,
        )?;
        Ok(())
    }
}
