//! Progressive income tax with a flat rebate.
//!
//! The tax on an annual income is computed from the bracket with the highest
//! threshold that does not exceed the income:
//!
//! | Step | Value |
//! |------|-------|
//! | 1 | bracket = highest threshold ≤ income |
//! | 2 | tax before rebate = base + (income − threshold) × rate |
//! | 3 | annual tax = max(0, step 2 − rebate) |
//! | 4 | monthly tax = annual tax / 12 |
//! | 5 | effective rate = annual tax / income × 100 (undefined at zero income) |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use property_core::calculations::TaxEngine;
//! use property_core::TaxTable;
//!
//! let table = TaxTable::default();
//! let result = TaxEngine::new(&table).calculate(dec!(475200)).unwrap();
//!
//! assert_eq!(result.tax_before_rebate, dec!(109819));
//! assert_eq!(result.annual_tax, dec!(92584));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{MONTHS_PER_YEAR, max, percent_of};
use crate::error::{EngineError, require_non_negative};
use crate::models::{InputRecord, TaxBracket, TaxTable};

/// Itemized tax on one annual income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub annual_gross: Decimal,
    /// The full table, ascending by threshold.
    pub brackets: Vec<TaxBracket>,
    pub rebate: Decimal,
    pub applied_bracket: TaxBracket,
    pub tax_before_rebate: Decimal,
    /// Tax after the rebate, never negative.
    pub annual_tax: Decimal,
    pub monthly_tax: Decimal,
    /// Annual tax as a percentage of income; `None` for zero income.
    pub effective_rate: Option<Decimal>,
}

/// Monthly income from both streams with the tax owed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeBreakdown {
    pub local_income: Decimal,
    pub foreign_amount: Decimal,
    pub exchange_rate: Decimal,
    /// Foreign income converted at `exchange_rate`.
    pub foreign_income: Decimal,
    pub total_gross: Decimal,
    pub tax: TaxResult,
    /// Gross less monthly tax.
    pub net_income: Decimal,
}

/// Calculator applying one [`TaxTable`].
#[derive(Debug, Clone)]
pub struct TaxEngine<'a> {
    table: &'a TaxTable,
}

impl<'a> TaxEngine<'a> {
    pub fn new(table: &'a TaxTable) -> Self {
        Self { table }
    }

    /// Computes tax on `annual_income`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for negative income.
    pub fn calculate(
        &self,
        annual_income: Decimal,
    ) -> Result<TaxResult, EngineError> {
        require_non_negative("annual_income", annual_income)?;

        let applied_bracket = *self
            .table
            .bracket_for(annual_income)
            .ok_or(EngineError::InvalidInput {
                field: "annual_income",
                expected: "covered by the tax table",
                value: annual_income,
            })?;

        let tax_before_rebate = applied_bracket.tax_on(annual_income);
        let annual_tax = max(Decimal::ZERO, tax_before_rebate - self.table.rebate);
        let monthly_tax = annual_tax / MONTHS_PER_YEAR;
        let effective_rate = percent_of(annual_tax, annual_income);

        Ok(TaxResult {
            annual_gross: annual_income,
            brackets: self.table.brackets.clone(),
            rebate: self.table.rebate,
            applied_bracket,
            tax_before_rebate,
            annual_tax,
            monthly_tax,
            effective_rate,
        })
    }

    /// Combines both income streams and taxes twelve months of the total.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for negative amounts, or a
    /// non-positive exchange rate while foreign income is present.
    pub fn income_breakdown(
        &self,
        input: &InputRecord,
    ) -> Result<IncomeBreakdown, EngineError> {
        let local_income = require_non_negative("monthly_income_local", input.monthly_income_local)?;
        let foreign_amount = require_non_negative("monthly_income_foreign", input.monthly_income_foreign)?;
        let exchange_rate = input.exchange_rate;
        if foreign_amount > Decimal::ZERO && exchange_rate <= Decimal::ZERO {
            return Err(EngineError::InvalidInput {
                field: "exchange_rate",
                expected: "positive",
                value: exchange_rate,
            });
        }

        let foreign_income = foreign_amount * exchange_rate;
        let total_gross = local_income + foreign_income;
        let annual = total_gross
            .checked_mul(MONTHS_PER_YEAR)
            .ok_or(EngineError::Overflow("annual income"))?;
        let tax = self.calculate(annual)?;
        let net_income = total_gross - tax.monthly_tax;

        Ok(IncomeBreakdown {
            local_income,
            foreign_amount,
            exchange_rate,
            foreign_income,
            total_gross,
            tax,
            net_income,
        })
    }
}
