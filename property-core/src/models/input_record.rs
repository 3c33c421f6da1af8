use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{
    EngineError, require_above_total_loss, require_non_negative, require_positive,
};

/// The financial inputs for one buy/rent/save calculation.
///
/// Money fields are monthly amounts in the local currency unless the name
/// says otherwise. Rate fields are whole-number percentages (`11.75` means
/// 11.75%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputRecord {
    // Property
    pub house_price: Decimal,
    pub down_payment: Decimal,
    pub prime_rate: Decimal,
    pub premium_above_prime: Decimal,
    pub loan_term_years: u32,

    // Income
    pub monthly_income_local: Decimal,
    pub monthly_income_foreign: Decimal,
    /// Local currency units per foreign unit.
    pub exchange_rate: Decimal,
    pub rental_income: Decimal,
    pub monthly_rent: Decimal,

    pub investment_return_rate: Decimal,

    // Expenses
    pub personal_allocation: Decimal,
    pub personal_expenses: Decimal,
    pub property_levies: Decimal,

    // Savings
    pub current_savings: Option<Decimal>,
    pub savings_target: Option<Decimal>,
    pub monthly_savings: Option<Decimal>,
}

impl InputRecord {
    /// Prime plus premium.
    pub fn interest_rate(&self) -> Decimal {
        self.prime_rate + self.premium_above_prime
    }

    /// House price less down payment.
    ///
    /// Negative when the down payment exceeds the price, which
    /// [`validate`](Self::validate) rejects.
    pub fn loan_amount(&self) -> Decimal {
        self.house_price - self.down_payment
    }

    /// Foreign income converted to the local currency.
    pub fn foreign_income_local(&self) -> Decimal {
        self.monthly_income_foreign * self.exchange_rate
    }

    /// Combined monthly gross income in the local currency.
    pub fn total_monthly_income(&self) -> Decimal {
        self.monthly_income_local + self.foreign_income_local()
    }

    /// Checks every field's sign and range contract.
    pub fn validate(&self) -> Result<(), EngineError> {
        require_non_negative("house_price", self.house_price)?;
        require_non_negative("down_payment", self.down_payment)?;
        if self.down_payment > self.house_price {
            return Err(EngineError::InvalidInput {
                field: "down_payment",
                expected: "at most house_price",
                value: self.down_payment,
            });
        }
        require_non_negative("prime_rate", self.prime_rate)?;
        require_non_negative("interest_rate", self.interest_rate())?;
        require_positive("loan_term_years", Decimal::from(self.loan_term_years))?;
        require_non_negative("monthly_income_local", self.monthly_income_local)?;
        require_non_negative("monthly_income_foreign", self.monthly_income_foreign)?;
        if self.monthly_income_foreign > Decimal::ZERO {
            require_positive("exchange_rate", self.exchange_rate)?;
        } else {
            require_non_negative("exchange_rate", self.exchange_rate)?;
        }
        require_non_negative("rental_income", self.rental_income)?;
        require_non_negative("monthly_rent", self.monthly_rent)?;
        require_non_negative("personal_allocation", self.personal_allocation)?;
        require_non_negative("personal_expenses", self.personal_expenses)?;
        require_non_negative("property_levies", self.property_levies)?;
        require_above_total_loss("investment_return_rate", self.investment_return_rate)?;
        if let Some(current) = self.current_savings {
            require_non_negative("current_savings", current)?;
        }
        if let Some(target) = self.savings_target {
            require_non_negative("savings_target", target)?;
        }
        Ok(())
    }
}

impl Default for InputRecord {
    /// The reference scenario used when no saved record is available.
    fn default() -> Self {
        Self {
            house_price: dec!(2500000),
            down_payment: dec!(600000),
            prime_rate: dec!(11.75),
            premium_above_prime: dec!(2),
            loan_term_years: 20,
            monthly_income_local: dec!(10000),
            monthly_income_foreign: dec!(1600),
            exchange_rate: dec!(18.5),
            rental_income: dec!(18000),
            monthly_rent: dec!(9500),
            investment_return_rate: dec!(10),
            personal_allocation: dec!(3000),
            personal_expenses: dec!(6000),
            property_levies: dec!(2200),
            current_savings: Some(dec!(150000)),
            savings_target: None,
            monthly_savings: None,
        }
    }
}
