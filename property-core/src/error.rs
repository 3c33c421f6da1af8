use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

/// Errors raised by the calculation engine.
///
/// Undefined quotients (zero income, zero savings rate, zero house price) are
/// not errors: they are reported as `None` on the result types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// An input value violates its contract (negative money, zero term, ...).
    #[error("invalid input: {field} must be {expected}, got {value}")]
    InvalidInput {
        field: &'static str,
        expected: &'static str,
        value: Decimal,
    },

    /// A fixed-point computation overflowed.
    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    /// The engine configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Rejects negative values for `field`.
pub fn require_non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, EngineError> {
    if value < Decimal::ZERO {
        return Err(EngineError::InvalidInput {
            field,
            expected: "non-negative",
            value,
        });
    }
    Ok(value)
}

/// Rejects zero and negative values for `field`.
pub fn require_positive(
    field: &'static str,
    value: Decimal,
) -> Result<Decimal, EngineError> {
    if value <= Decimal::ZERO {
        return Err(EngineError::InvalidInput {
            field,
            expected: "positive",
            value,
        });
    }
    Ok(value)
}

/// Rejects percentage rates at or below −100% for `field`.
pub fn require_above_total_loss(
    field: &'static str,
    pct: Decimal,
) -> Result<Decimal, EngineError> {
    if pct <= dec!(-100) {
        return Err(EngineError::InvalidInput {
            field,
            expected: "above -100%",
            value: pct,
        });
    }
    Ok(pct)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn require_non_negative_accepts_zero() {
        assert_eq!(require_non_negative("principal", dec!(0)), Ok(dec!(0)));
    }

    #[test]
    fn require_non_negative_rejects_negative() {
        let result = require_non_negative("principal", dec!(-1));

        assert_eq!(
            result,
            Err(EngineError::InvalidInput {
                field: "principal",
                expected: "non-negative",
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn require_positive_rejects_zero() {
        assert!(require_positive("term_years", dec!(0)).is_err());
    }

    #[test]
    fn require_above_total_loss_rejects_minus_hundred() {
        assert!(require_above_total_loss("investment_return_rate", dec!(-100)).is_err());
        assert_eq!(
            require_above_total_loss("investment_return_rate", dec!(-99.9)),
            Ok(dec!(-99.9))
        );
    }

    #[test]
    fn invalid_input_message_names_the_field() {
        let err = EngineError::InvalidInput {
            field: "annual_income",
            expected: "non-negative",
            value: dec!(-5),
        };

        assert_eq!(
            err.to_string(),
            "invalid input: annual_income must be non-negative, got -5"
        );
    }
}
