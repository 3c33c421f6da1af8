//! Net position of each scenario after the wealth horizon (five years by
//! default).
//!
//! | Scenario | Savings | Equity | Appreciation | Net rental |
//! |----------|---------|--------|--------------|------------|
//! | keep renting | current savings + keep-renting cash | – | – | – |
//! | buy and live | savings left after the deposit + live-in cash | ✓ | ✓ | – |
//! | buy and rent out | savings left after the deposit | ✓ | ✓ | ✓ |
//!
//! Savings compound monthly at the investment return. Buy-and-live only
//! counts equity and appreciation when its monthly cash is positive.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{MONTHS_PER_YEAR, max, monthly_rate};
use crate::calculations::loan::principal_repaid_after;
use crate::calculations::scenario::ConsolidatedResult;
use crate::error::EngineError;
use crate::models::{EngineConfig, InputRecord};

/// Share of rent kept after vacancy and maintenance.
const RENT_RETAINED: Decimal = dec!(0.92);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WealthScenario {
    KeepRenting,
    BuyAndLive,
    BuyAndRentOut,
}

impl WealthScenario {
    pub fn label(self) -> &'static str {
        match self {
            Self::KeepRenting => "Keep renting & invest",
            Self::BuyAndLive => "Buy & live",
            Self::BuyAndRentOut => "Buy & rent out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WealthPosition {
    pub scenario: WealthScenario,
    pub savings: Decimal,
    pub equity: Decimal,
    pub appreciation: Decimal,
    /// Rent retained less bond and levies over the horizon; may be negative.
    pub net_rental_income: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WealthComparison {
    pub horizon_months: u32,
    pub keep_renting: WealthPosition,
    pub buy_and_live: WealthPosition,
    pub buy_and_rent_out: WealthPosition,
    pub best: WealthScenario,
}

#[derive(Debug, Clone)]
pub struct WealthCalculator<'a> {
    config: &'a EngineConfig,
}

impl<'a> WealthCalculator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn calculate(
        &self,
        input: &InputRecord,
        base: &ConsolidatedResult,
    ) -> Result<WealthComparison, EngineError> {
        let months = self.config.wealth_horizon_months;
        let monthly_return = monthly_rate(input.investment_return_rate);
        let after_deposit = max(Decimal::ZERO, base.current_savings - input.down_payment);

        let equity = principal_repaid_after(
            base.loan_amount,
            base.interest_rate_pct,
            input.loan_term_years,
            months,
        )?;
        let appreciation = self.appreciation(input.house_price, months)?;
        let net_rental_monthly = input.rental_income * RENT_RETAINED
            - base.monthly_payment
            - input.property_levies;

        let keep_renting = position(
            WealthScenario::KeepRenting,
            future_value(
                base.current_savings,
                max(Decimal::ZERO, base.keep_renting_available),
                monthly_return,
                months,
            )?,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        );

        let sustainable = base.live_in_available > Decimal::ZERO;
        let buy_and_live = position(
            WealthScenario::BuyAndLive,
            future_value(
                after_deposit,
                max(Decimal::ZERO, base.live_in_available),
                monthly_return,
                months,
            )?,
            if sustainable { equity } else { Decimal::ZERO },
            if sustainable { appreciation } else { Decimal::ZERO },
            Decimal::ZERO,
        );

        let buy_and_rent_out = position(
            WealthScenario::BuyAndRentOut,
            future_value(after_deposit, Decimal::ZERO, monthly_return, months)?,
            equity,
            appreciation,
            net_rental_monthly * Decimal::from(months),
        );

        let best = [&keep_renting, &buy_and_live, &buy_and_rent_out]
            .into_iter()
            .fold(&keep_renting, |best, p| if p.total > best.total { p } else { best })
            .scenario;

        Ok(WealthComparison {
            horizon_months: months,
            keep_renting,
            buy_and_live,
            buy_and_rent_out,
            best,
        })
    }

    /// `price × (1 + a)^(months / 12) − price`.
    fn appreciation(
        &self,
        price: Decimal,
        months: u32,
    ) -> Result<Decimal, EngineError> {
        let annual = Decimal::ONE + self.config.appreciation_pct / Decimal::ONE_HUNDRED;
        if months == 0 || annual == Decimal::ONE {
            return Ok(Decimal::ZERO);
        }
        let factor = annual
            .checked_powd(Decimal::from(months) / MONTHS_PER_YEAR)
            .ok_or(EngineError::Overflow("appreciation factor"))?;
        price
            .checked_mul(factor)
            .map(|value| value - price)
            .ok_or(EngineError::Overflow("appreciation"))
    }
}

fn position(
    scenario: WealthScenario,
    savings: Decimal,
    equity: Decimal,
    appreciation: Decimal,
    net_rental_income: Decimal,
) -> WealthPosition {
    WealthPosition {
        scenario,
        savings,
        equity,
        appreciation,
        net_rental_income,
        total: savings + equity + appreciation + net_rental_income,
    }
}

/// Balance after `months` of compounding with a contribution each month.
fn future_value(
    start: Decimal,
    contribution: Decimal,
    monthly_return: Decimal,
    months: u32,
) -> Result<Decimal, EngineError> {
    let growth = Decimal::ONE + monthly_return;
    (0..months).try_fold(start, |balance, _| {
        balance
            .checked_mul(growth)
            .and_then(|b| b.checked_add(contribution))
            .ok_or(EngineError::Overflow("invested savings"))
    })
}
