//! Month-by-month savings growth toward a target.
//!
//! Two strategies share one horizon:
//!
//! - [`SavingsStrategy::Milestones`] runs two trajectories side by side: a
//!   flat one that only adds the contribution, and one that also compounds
//!   at `annual_return / 12` per month. Milestones are recorded every twelve
//!   months and at the month either trajectory first reaches the target.
//! - [`SavingsStrategy::InflationAdjusted`] compounds at the real monthly
//!   return `(1 + nominal) / (1 + inflation) − 1`, where both monthly rates
//!   are derived geometrically from their annual rates, and records every
//!   month's balance.
//!
//! Both stop at the target or at the horizon, whichever comes first. A target
//! not reached within the horizon is reported as `None`.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{MONTHS_PER_YEAR, monthly_rate, months_to_cover};
use crate::error::{EngineError, require_above_total_loss, require_non_negative};

/// How a savings balance grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SavingsStrategy {
    Milestones {
        annual_return_pct: Decimal,
    },
    InflationAdjusted {
        expected_return_pct: Decimal,
        inflation_pct: Decimal,
    },
}

/// What to project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsPlan {
    pub current: Decimal,
    pub target: Decimal,
    pub monthly_contribution: Decimal,
    pub strategy: SavingsStrategy,
}

/// Balances of both trajectories at one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsMilestone {
    pub month: u32,
    pub flat_balance: Decimal,
    pub with_returns: Decimal,
}

/// One month of the inflation-adjusted trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBalance {
    pub month: u32,
    pub balance: Decimal,
    pub contribution: Decimal,
    pub returns: Decimal,
}

/// Months until each trajectory reaches the target; `None` if it does not
/// within the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthsToTarget {
    pub flat: Option<u32>,
    pub with_returns: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsProjection {
    pub current: Decimal,
    pub target: Decimal,
    pub monthly_contribution: Decimal,
    pub strategy: SavingsStrategy,
    pub months_to_target: MonthsToTarget,
    pub milestones: Vec<SavingsMilestone>,
    /// Every simulated month; inflation-adjusted strategy only.
    pub monthly_breakdown: Vec<MonthlyBalance>,
    /// Contributions added to the compounding trajectory.
    pub total_contributions: Decimal,
    /// Growth of the compounding trajectory beyond contributions.
    pub total_returns: Decimal,
}

/// Runs [`SavingsPlan`]s against a fixed horizon.
#[derive(Debug, Clone, Copy)]
pub struct SavingsProjector {
    horizon_months: u32,
}

impl SavingsProjector {
    pub fn new(horizon_months: u32) -> Self {
        Self { horizon_months }
    }

    /// Projects `plan` month by month.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for a negative balance or target,
    /// or a rate at or below −100%, and [`EngineError::Overflow`] if a
    /// compounding balance leaves the representable range before the
    /// horizon.
    pub fn project(
        &self,
        plan: &SavingsPlan,
    ) -> Result<SavingsProjection, EngineError> {
        require_non_negative("current_savings", plan.current)?;
        require_non_negative("savings_target", plan.target)?;

        let projection = match plan.strategy {
            SavingsStrategy::Milestones { annual_return_pct } => {
                require_above_total_loss("annual_return_pct", annual_return_pct)?;
                self.milestones(plan, monthly_rate(annual_return_pct))?
            }
            SavingsStrategy::InflationAdjusted {
                expected_return_pct,
                inflation_pct,
            } => {
                require_above_total_loss("expected_return_pct", expected_return_pct)?;
                require_above_total_loss("inflation_pct", inflation_pct)?;
                let real = real_monthly_return(expected_return_pct, inflation_pct)?;
                self.inflation_adjusted(plan, real)?
            }
        };

        if projection.months_to_target.with_returns.is_none() {
            debug!(
                horizon = self.horizon_months,
                target = %plan.target,
                "savings target not reached within horizon"
            );
        }
        Ok(projection)
    }

    fn milestones(
        &self,
        plan: &SavingsPlan,
        monthly_return: Decimal,
    ) -> Result<SavingsProjection, EngineError> {
        let contribution = plan.monthly_contribution;
        let mut flat = plan.current;
        let mut growth = plan.current;
        let mut contributed = Decimal::ZERO;
        let mut flat_months = (flat >= plan.target).then_some(0);
        let mut growth_months = (growth >= plan.target).then_some(0);
        let mut milestones = vec![SavingsMilestone {
            month: 0,
            flat_balance: flat,
            with_returns: growth,
        }];

        let mut month = 0;
        while month < self.horizon_months && (flat_months.is_none() || growth_months.is_none()) {
            month += 1;
            let mut reached = false;

            if flat_months.is_none() {
                flat += contribution;
                if flat >= plan.target {
                    flat_months = Some(month);
                    reached = true;
                }
            }
            if growth_months.is_none() {
                growth = compound(growth, Decimal::ONE + monthly_return, contribution)?;
                contributed += contribution;
                if growth >= plan.target {
                    growth_months = Some(month);
                    reached = true;
                }
            }

            if month % 12 == 0 || reached {
                milestones.push(SavingsMilestone {
                    month,
                    flat_balance: flat,
                    with_returns: growth,
                });
            }
        }

        Ok(SavingsProjection {
            current: plan.current,
            target: plan.target,
            monthly_contribution: contribution,
            strategy: plan.strategy,
            months_to_target: MonthsToTarget {
                flat: flat_months,
                with_returns: growth_months,
            },
            milestones,
            monthly_breakdown: Vec::new(),
            total_contributions: contributed,
            total_returns: growth - plan.current - contributed,
        })
    }

    fn inflation_adjusted(
        &self,
        plan: &SavingsPlan,
        real_return: Decimal,
    ) -> Result<SavingsProjection, EngineError> {
        let contribution = plan.monthly_contribution;
        let mut balance = plan.current;
        let mut month = 0;
        let mut breakdown = Vec::new();
        let mut milestones = vec![SavingsMilestone {
            month: 0,
            flat_balance: plan.current,
            with_returns: balance,
        }];

        while balance < plan.target && month < self.horizon_months {
            let returns = balance
                .checked_mul(real_return)
                .ok_or(EngineError::Overflow("savings balance"))?;
            balance = compound(balance, Decimal::ONE, contribution + returns)?;
            month += 1;
            breakdown.push(MonthlyBalance {
                month,
                balance,
                contribution,
                returns,
            });
            if month % 12 == 0 || balance >= plan.target {
                milestones.push(SavingsMilestone {
                    month,
                    flat_balance: plan.current + contribution * Decimal::from(month),
                    with_returns: balance,
                });
            }
        }

        let flat = months_to_cover(plan.target - plan.current, contribution)
            .filter(|m| *m <= self.horizon_months);
        let with_returns = (balance >= plan.target).then_some(month);
        let total_contributions = contribution * Decimal::from(month);

        Ok(SavingsProjection {
            current: plan.current,
            target: plan.target,
            monthly_contribution: contribution,
            strategy: plan.strategy,
            months_to_target: MonthsToTarget { flat, with_returns },
            milestones,
            monthly_breakdown: breakdown,
            total_contributions,
            total_returns: balance - plan.current - total_contributions,
        })
    }
}

/// `balance × growth + added`, failing instead of overflowing.
fn compound(
    balance: Decimal,
    growth: Decimal,
    added: Decimal,
) -> Result<Decimal, EngineError> {
    balance
        .checked_mul(growth)
        .and_then(|b| b.checked_add(added))
        .ok_or(EngineError::Overflow("savings balance"))
}

/// Real monthly return after inflation, both compounded geometrically from
/// their annual percentages.
pub fn real_monthly_return(
    expected_return_pct: Decimal,
    inflation_pct: Decimal,
) -> Result<Decimal, EngineError> {
    let nominal = geometric_monthly_rate(expected_return_pct)?;
    let inflation = geometric_monthly_rate(inflation_pct)?;
    Ok((Decimal::ONE + nominal) / (Decimal::ONE + inflation) - Decimal::ONE)
}

fn geometric_monthly_rate(annual_pct: Decimal) -> Result<Decimal, EngineError> {
    let growth = Decimal::ONE + annual_pct / Decimal::ONE_HUNDRED;
    if growth == Decimal::ONE {
        return Ok(Decimal::ZERO);
    }
    growth
        .checked_powd(Decimal::ONE / MONTHS_PER_YEAR)
        .map(|g| g - Decimal::ONE)
        .ok_or(EngineError::Overflow("monthly rate"))
}
