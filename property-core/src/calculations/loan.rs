//! Loan amortization with optional extra monthly payments.
//!
//! The standard payment is the annuity formula
//! `P·r·(1+r)^n / ((1+r)^n − 1)`, or `P/n` when the rate is zero.
//!
//! The accelerated schedule is simulated month by month, paying
//! `payment + extra` against interest on the remaining balance. When the
//! simulation cannot settle the loan (the payment does not cover the first
//! month's interest, the balance stops moving, or the iteration cap of twice
//! the term is reached) the original schedule is reported with zero savings.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use property_core::calculations::{LoanAmortizer, LoanTerms};
//!
//! let terms = LoanTerms {
//!     principal: dec!(1900000),
//!     annual_rate_pct: dec!(13.75),
//!     term_years: 20,
//!     extra_payment: dec!(5000),
//! };
//! let projection = LoanAmortizer::new(&terms).calculate().unwrap();
//!
//! assert!(projection.accelerated.term_months < projection.original.term_months);
//! assert!(projection.accelerated.interest_saved > dec!(0));
//! ```

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{MONTHS_PER_YEAR, max, monthly_rate};
use crate::error::{EngineError, require_non_negative, require_positive};

/// A balance at or below half a cent counts as repaid.
const SETTLED_BALANCE: Decimal = dec!(0.005);

/// Balance movement below this counts as a stalled month.
const STALL_DELTA: Decimal = dec!(0.01);

/// Consecutive stalled months tolerated before giving up.
const MAX_STALLED_MONTHS: u32 = 3;

/// Inputs for one loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Decimal,
    /// Annual rate as a whole-number percentage.
    pub annual_rate_pct: Decimal,
    pub term_years: u32,
    /// Paid on top of the standard payment every month.
    pub extra_payment: Decimal,
}

/// Repayment at the standard payment for the full term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalSchedule {
    pub monthly_payment: Decimal,
    pub total_interest: Decimal,
    pub total_payments: Decimal,
    pub term_months: u32,
}

/// Repayment at the standard payment plus the extra payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceleratedSchedule {
    pub monthly_payment: Decimal,
    pub total_interest: Decimal,
    pub total_payments: Decimal,
    pub term_months: u32,
    pub years_saved: Decimal,
    pub interest_saved: Decimal,
    /// False when the simulation fell back to the original schedule.
    pub converged: bool,
}

impl AcceleratedSchedule {
    fn unchanged(original: &OriginalSchedule) -> Self {
        Self {
            monthly_payment: original.monthly_payment,
            total_interest: original.total_interest,
            total_payments: original.total_payments,
            term_months: original.term_months,
            years_saved: Decimal::ZERO,
            interest_saved: Decimal::ZERO,
            converged: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanProjection {
    pub original: OriginalSchedule,
    pub accelerated: AcceleratedSchedule,
}

/// Standard monthly payment for `principal` over `months`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInput`] for negative amounts or a zero term,
/// and [`EngineError::Overflow`] if the compounding factor does not fit.
pub fn standard_payment(
    principal: Decimal,
    annual_rate_pct: Decimal,
    months: u32,
) -> Result<Decimal, EngineError> {
    require_non_negative("principal", principal)?;
    require_non_negative("annual_rate_pct", annual_rate_pct)?;
    let n = require_positive("term_months", Decimal::from(months))?;

    let r = monthly_rate(annual_rate_pct);
    if r.is_zero() {
        return Ok(principal / n);
    }

    let factor = (Decimal::ONE + r)
        .checked_powi(i64::from(months))
        .ok_or(EngineError::Overflow("compounding factor"))?;
    principal
        .checked_mul(r)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(factor - Decimal::ONE))
        .ok_or(EngineError::Overflow("monthly payment"))
}

/// Principal repaid after `months` of standard payments.
///
/// Months beyond the term are treated as the full term.
pub fn principal_repaid_after(
    principal: Decimal,
    annual_rate_pct: Decimal,
    term_years: u32,
    months: u32,
) -> Result<Decimal, EngineError> {
    let term_months = term_years.saturating_mul(12);
    let payment = standard_payment(principal, annual_rate_pct, term_months)?;
    let r = monthly_rate(annual_rate_pct);

    let mut balance = principal;
    for _ in 0..months.min(term_months) {
        balance -= payment - balance * r;
        if balance <= SETTLED_BALANCE {
            return Ok(principal);
        }
    }
    Ok(max(Decimal::ZERO, principal - balance))
}

/// Calculator for standard and accelerated repayment.
#[derive(Debug, Clone)]
pub struct LoanAmortizer<'a> {
    terms: &'a LoanTerms,
}

impl<'a> LoanAmortizer<'a> {
    pub fn new(terms: &'a LoanTerms) -> Self {
        Self { terms }
    }

    pub fn calculate(&self) -> Result<LoanProjection, EngineError> {
        require_non_negative("extra_payment", self.terms.extra_payment)?;
        let original = self.original_schedule()?;
        let accelerated = self.accelerated_schedule(&original);
        Ok(LoanProjection {
            original,
            accelerated,
        })
    }

    fn term_months(&self) -> u32 {
        self.terms.term_years.saturating_mul(12)
    }

    fn original_schedule(&self) -> Result<OriginalSchedule, EngineError> {
        let term_months = self.term_months();
        let monthly_payment = standard_payment(
            self.terms.principal,
            self.terms.annual_rate_pct,
            term_months,
        )?;
        let total_payments = monthly_payment * Decimal::from(term_months);
        let total_interest = max(Decimal::ZERO, total_payments - self.terms.principal);

        Ok(OriginalSchedule {
            monthly_payment,
            total_interest,
            total_payments,
            term_months,
        })
    }

    fn accelerated_schedule(
        &self,
        original: &OriginalSchedule,
    ) -> AcceleratedSchedule {
        let principal = self.terms.principal;
        let r = monthly_rate(self.terms.annual_rate_pct);
        let scheduled = original.monthly_payment + self.terms.extra_payment;

        if principal.is_zero() {
            return AcceleratedSchedule::unchanged(original);
        }
        if scheduled <= principal * r {
            warn!(
                payment = %scheduled,
                interest = %(principal * r),
                "payment does not cover monthly interest; keeping original schedule"
            );
            return AcceleratedSchedule::unchanged(original);
        }

        let cap = original.term_months.saturating_mul(2);
        let mut balance = principal;
        let mut total_interest = Decimal::ZERO;
        let mut months = 0u32;
        let mut stalled = 0u32;

        while balance > SETTLED_BALANCE && months < cap {
            let interest = balance * r;
            total_interest += interest;
            let previous = balance;
            balance -= scheduled - interest;
            months += 1;

            if (previous - balance).abs() < STALL_DELTA {
                stalled += 1;
                if stalled > MAX_STALLED_MONTHS {
                    warn!(months, balance = %balance, "balance stalled; keeping original schedule");
                    return AcceleratedSchedule::unchanged(original);
                }
            } else {
                stalled = 0;
            }
        }

        if balance > SETTLED_BALANCE {
            warn!(cap, balance = %balance, "iteration cap reached; keeping original schedule");
            return AcceleratedSchedule::unchanged(original);
        }

        // Rounding in the simulation can leave a few cents on either side of
        // the closed form; savings never go negative.
        let total_interest = total_interest.min(original.total_interest);
        let term_months = months.min(original.term_months);
        let years_saved =
            Decimal::from(original.term_months - term_months) / MONTHS_PER_YEAR;
        let interest_saved = original.total_interest - total_interest;

        debug!(
            term_months,
            years_saved = %years_saved,
            interest_saved = %interest_saved,
            "accelerated schedule settled"
        );

        AcceleratedSchedule {
            monthly_payment: scheduled,
            total_interest,
            total_payments: total_interest + principal,
            term_months,
            years_saved,
            interest_saved,
            converged: true,
        }
    }
}
