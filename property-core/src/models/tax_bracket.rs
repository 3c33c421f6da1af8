use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, require_non_negative};

/// One tier of a progressive tax table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Annual income at which this bracket starts.
    pub threshold: Decimal,
    /// Marginal rate as a whole-number percentage (`31` means 31%).
    pub rate: Decimal,
    /// Tax owed at exactly `threshold`.
    pub base_tax: Decimal,
}

impl TaxBracket {
    /// Tax owed on `income` under this bracket, before any rebate.
    pub fn tax_on(
        &self,
        income: Decimal,
    ) -> Decimal {
        self.base_tax + (income - self.threshold) * self.rate / Decimal::ONE_HUNDRED
    }
}

/// A versioned progressive tax table with a flat annual rebate.
///
/// Brackets are kept in ascending threshold order and the first bracket
/// always starts at zero, so every non-negative income has a bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTable {
    pub version: String,
    pub brackets: Vec<TaxBracket>,
    pub rebate: Decimal,
}

impl TaxTable {
    pub const DEFAULT_VERSION: &'static str = "2024/25";

    /// Builds a table, checking ordering and sign constraints.
    ///
    /// Continuity between brackets is not enforced here; see
    /// [`TaxTable::continuity_gaps`].
    pub fn new(
        version: impl Into<String>,
        brackets: Vec<TaxBracket>,
        rebate: Decimal,
    ) -> Result<Self, EngineError> {
        let first = brackets
            .first()
            .ok_or_else(|| EngineError::InvalidConfig("tax table has no brackets".to_string()))?;
        if !first.threshold.is_zero() {
            return Err(EngineError::InvalidConfig(format!(
                "first tax bracket must start at 0, got {}",
                first.threshold
            )));
        }
        for pair in brackets.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(EngineError::InvalidConfig(format!(
                    "tax bracket thresholds must ascend: {} follows {}",
                    pair[1].threshold, pair[0].threshold
                )));
            }
        }
        for bracket in &brackets {
            require_non_negative("bracket rate", bracket.rate)?;
            require_non_negative("bracket base tax", bracket.base_tax)?;
        }
        require_non_negative("rebate", rebate)?;

        Ok(Self {
            version: version.into(),
            brackets,
            rebate,
        })
    }

    /// Selects the bracket with the greatest threshold not exceeding `income`.
    ///
    /// Does not rely on bracket order. Returns `None` only for income below
    /// every threshold.
    pub fn bracket_for(
        &self,
        income: Decimal,
    ) -> Option<&TaxBracket> {
        self.brackets
            .iter()
            .filter(|b| b.threshold <= income)
            .max_by_key(|b| b.threshold)
    }

    /// Lists boundaries where a bracket's base tax differs from the tax the
    /// previous bracket would charge at that threshold by more than
    /// `tolerance`, as `(threshold, expected_base, actual_base)`.
    pub fn continuity_gaps(
        &self,
        tolerance: Decimal,
    ) -> Vec<(Decimal, Decimal, Decimal)> {
        self.brackets
            .windows(2)
            .filter_map(|pair| {
                let expected = pair[0].tax_on(pair[1].threshold);
                ((expected - pair[1].base_tax).abs() > tolerance).then_some((
                    pair[1].threshold,
                    expected,
                    pair[1].base_tax,
                ))
            })
            .collect()
    }
}

impl Default for TaxTable {
    /// 2024/25 individual income tax table with the primary rebate.
    fn default() -> Self {
        let bracket = |threshold, rate, base_tax| TaxBracket {
            threshold,
            rate,
            base_tax,
        };
        Self {
            version: Self::DEFAULT_VERSION.to_string(),
            brackets: vec![
                bracket(dec!(0), dec!(18), dec!(0)),
                bracket(dec!(237100), dec!(26), dec!(42678)),
                bracket(dec!(370500), dec!(31), dec!(77362)),
                bracket(dec!(512800), dec!(36), dec!(121475)),
                bracket(dec!(673000), dec!(39), dec!(179147)),
                bracket(dec!(857900), dec!(41), dec!(251258)),
                bracket(dec!(1817000), dec!(45), dec!(644489)),
            ],
            rebate: dec!(17235),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_table_is_continuous() {
        let table = TaxTable::default();

        assert!(table.continuity_gaps(dec!(0.01)).is_empty());
    }

    #[test]
    fn bracket_for_picks_highest_qualifying_threshold() {
        let table = TaxTable::default();

        let bracket = table.bracket_for(dec!(475200)).unwrap();

        assert_eq!(bracket.threshold, dec!(370500));
        assert_eq!(bracket.rate, dec!(31));
    }

    #[test]
    fn bracket_for_exact_threshold_uses_that_bracket() {
        let table = TaxTable::default();

        let bracket = table.bracket_for(dec!(237100)).unwrap();

        assert_eq!(bracket.threshold, dec!(237100));
    }

    #[test]
    fn bracket_for_zero_income_uses_first_bracket() {
        let table = TaxTable::default();

        assert_eq!(table.bracket_for(dec!(0)).unwrap().threshold, dec!(0));
    }

    #[test]
    fn bracket_for_negative_income_is_none() {
        let table = TaxTable::default();

        assert!(table.bracket_for(dec!(-1)).is_none());
    }

    #[test]
    fn bracket_for_ignores_bracket_order() {
        let mut table = TaxTable::default();
        table.brackets.reverse();

        let bracket = table.bracket_for(dec!(475200)).unwrap();

        assert_eq!(bracket.threshold, dec!(370500));
    }

    #[test]
    fn new_rejects_unordered_thresholds() {
        let brackets = vec![
            TaxBracket {
                threshold: dec!(0),
                rate: dec!(10),
                base_tax: dec!(0),
            },
            TaxBracket {
                threshold: dec!(0),
                rate: dec!(20),
                base_tax: dec!(0),
            },
        ];

        assert!(TaxTable::new("test", brackets, dec!(0)).is_err());
    }

    #[test]
    fn new_rejects_table_not_starting_at_zero() {
        let brackets = vec![TaxBracket {
            threshold: dec!(100),
            rate: dec!(10),
            base_tax: dec!(0),
        }];

        assert!(TaxTable::new("test", brackets, dec!(0)).is_err());
    }

    #[test]
    fn new_rejects_empty_table() {
        assert!(TaxTable::new("test", vec![], dec!(0)).is_err());
    }

    #[test]
    fn continuity_gaps_reports_broken_boundary() {
        let brackets = vec![
            TaxBracket {
                threshold: dec!(0),
                rate: dec!(10),
                base_tax: dec!(0),
            },
            TaxBracket {
                threshold: dec!(1000),
                rate: dec!(20),
                base_tax: dec!(150),
            },
        ];
        let table = TaxTable::new("test", brackets, dec!(0)).unwrap();

        let gaps = table.continuity_gaps(dec!(0.01));

        assert_eq!(gaps, vec![(dec!(1000), dec!(100), dec!(150))]);
    }
}
