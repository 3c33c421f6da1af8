//! Decision timeline: when the key buy/rent checkpoints fall.
//!
//! The rental break-even is the first month in which compounded property
//! appreciation, `price × ((1 + a)^(m/12) − 1)`, covers the shortfall
//! accumulated while the rent does not pay for the bond and levies.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::calculations::common::{MONTHS_PER_YEAR, max, months_to_cover};
use crate::calculations::savings::SavingsProjection;
use crate::calculations::scenario::ConsolidatedResult;
use crate::error::EngineError;
use crate::models::{EngineConfig, InputRecord};

/// Month of the periodic market review.
const MARKET_REVIEW_MONTH: u32 = 6;

/// Month at which the rate-risk warning is placed.
const RATE_RISK_MONTH: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    DownPaymentTarget,
    RentalBreakEven,
    InterestRateRisk,
    MarketReview,
}

impl EventKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::DownPaymentTarget => "Down payment target",
            Self::RentalBreakEven => "Rental break-even",
            Self::InterestRateRisk => "Interest rate risk",
            Self::MarketReview => "Market review",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::DownPaymentTarget => "Savings reach the required down payment",
            Self::RentalBreakEven => "Property appreciation covers the accumulated shortfall",
            Self::InterestRateRisk => "Consider fixing the rate before potential increases",
            Self::MarketReview => "Evaluate property market trends and price movements",
        }
    }

    pub fn category(self) -> EventCategory {
        match self {
            Self::DownPaymentTarget | Self::RentalBreakEven => EventCategory::Milestone,
            Self::InterestRateRisk => EventCategory::Warning,
            Self::MarketReview => EventCategory::Opportunity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    Milestone,
    Warning,
    Opportunity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub month: u32,
    pub kind: EventKind,
    pub value: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionTimeline {
    /// Zero when rent already covers the housing cost; `None` when not
    /// reached within the configured cap.
    pub break_even_months: Option<u32>,
    /// Sorted by month.
    pub events: Vec<TimelineEvent>,
}

#[derive(Debug, Clone)]
pub struct TimelinePlanner<'a> {
    config: &'a EngineConfig,
}

impl<'a> TimelinePlanner<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn calculate(
        &self,
        input: &InputRecord,
        base: &ConsolidatedResult,
        savings: &SavingsProjection,
    ) -> Result<DecisionTimeline, EngineError> {
        let mut events = Vec::new();

        if let Some(milestone) = savings
            .milestones
            .iter()
            .find(|m| m.flat_balance >= savings.target)
        {
            events.push(TimelineEvent {
                month: milestone.month,
                kind: EventKind::DownPaymentTarget,
                value: Some(milestone.flat_balance),
            });
        }

        let break_even_months = self.break_even_months(
            base.monthly_payment,
            input.rental_income,
            input.property_levies,
            input.house_price,
        )?;
        if let Some(month) = break_even_months {
            events.push(TimelineEvent {
                month,
                kind: EventKind::RentalBreakEven,
                value: Some(self.appreciated(input.house_price, month)?),
            });
        }

        // Savings that would run out within two years leave little room if
        // rates rise.
        let cover = months_to_cover(base.current_savings, base.monthly_savings);
        if matches!(cover, Some(months) if months < RATE_RISK_MONTH) {
            events.push(TimelineEvent {
                month: RATE_RISK_MONTH,
                kind: EventKind::InterestRateRisk,
                value: None,
            });
        }

        events.push(TimelineEvent {
            month: MARKET_REVIEW_MONTH,
            kind: EventKind::MarketReview,
            value: None,
        });

        events.sort_by_key(|e| e.month);

        Ok(DecisionTimeline {
            break_even_months,
            events,
        })
    }

    /// Months until appreciation catches up with the rental shortfall.
    pub fn break_even_months(
        &self,
        monthly_payment: Decimal,
        rental_income: Decimal,
        levies: Decimal,
        price: Decimal,
    ) -> Result<Option<u32>, EngineError> {
        let shortfall = monthly_payment + levies - rental_income;
        if shortfall <= Decimal::ZERO {
            return Ok(Some(0));
        }

        for month in 1..=self.config.break_even_cap_months {
            let appreciation = self.appreciated(price, month)? - price;
            if appreciation >= shortfall * Decimal::from(month) {
                return Ok(Some(month));
            }
        }
        Ok(None)
    }

    /// `price × (1 + a)^(month / 12)`.
    fn appreciated(
        &self,
        price: Decimal,
        month: u32,
    ) -> Result<Decimal, EngineError> {
        let annual = Decimal::ONE + max(Decimal::ZERO, self.config.appreciation_pct) / Decimal::ONE_HUNDRED;
        if month == 0 || annual == Decimal::ONE {
            return Ok(price);
        }
        annual
            .checked_powd(Decimal::from(month) / MONTHS_PER_YEAR)
            .and_then(|factor| price.checked_mul(factor))
            .ok_or(EngineError::Overflow("appreciation factor"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::savings::{SavingsPlan, SavingsProjector, SavingsStrategy};
    use crate::calculations::scenario::ScenarioAggregator;

    fn timeline(input: &InputRecord) -> DecisionTimeline {
        let config = EngineConfig::default();
        let base = ScenarioAggregator::new(&config).calculate(input).unwrap();
        let savings = SavingsProjector::new(config.savings_horizon_months)
            .project(&SavingsPlan {
                current: base.current_savings,
                target: base.savings_target,
                monthly_contribution: base.monthly_savings,
                strategy: SavingsStrategy::Milestones {
                    annual_return_pct: input.investment_return_rate,
                },
            })
            .unwrap();
        TimelinePlanner::new(&config)
            .calculate(input, &base, &savings)
            .unwrap()
    }

    // =========================================================================
    // Break-even
    // =========================================================================

    #[test]
    fn break_even_is_immediate_when_rent_covers_costs() {
        let config = EngineConfig::default();

        let months = TimelinePlanner::new(&config)
            .break_even_months(dec!(10000), dec!(15000), dec!(2000), dec!(1000000))
            .unwrap();

        assert_eq!(months, Some(0));
    }

    #[test]
    fn break_even_reached_when_appreciation_outgrows_shortfall() {
        let config = EngineConfig::default();

        // Shortfall 2000/month against 5% on 2,000,000.
        let months = TimelinePlanner::new(&config)
            .break_even_months(dec!(20000), dec!(20000), dec!(2000), dec!(2000000))
            .unwrap();

        assert_eq!(months, Some(1));
    }

    #[test]
    fn break_even_not_reached_within_cap() {
        let config = EngineConfig::default();

        let months = TimelinePlanner::new(&config)
            .break_even_months(dec!(30000), dec!(0), dec!(0), dec!(1000000))
            .unwrap();

        assert_eq!(months, None);
    }

    #[test]
    fn break_even_without_appreciation_is_never_reached() {
        let config = EngineConfig {
            appreciation_pct: dec!(0),
            ..EngineConfig::default()
        };

        let months = TimelinePlanner::new(&config)
            .break_even_months(dec!(20000), dec!(19000), dec!(0), dec!(2000000))
            .unwrap();

        assert_eq!(months, None);
    }

    // =========================================================================
    // Events
    // =========================================================================

    #[test]
    fn events_are_sorted_by_month() {
        let result = timeline(&InputRecord::default());
        let months: Vec<u32> = result.events.iter().map(|e| e.month).collect();

        let mut sorted = months.clone();
        sorted.sort();
        assert_eq!(months, sorted);
    }

    #[test]
    fn events_include_market_review() {
        let result = timeline(&InputRecord::default());

        assert!(
            result
                .events
                .iter()
                .any(|e| e.kind == EventKind::MarketReview && e.month == 6)
        );
    }

    #[test]
    fn events_include_down_payment_target_at_first_flat_attainment() {
        let input = InputRecord {
            monthly_savings: Some(dec!(15000)),
            ..InputRecord::default()
        };

        let result = timeline(&input);
        let target = result
            .events
            .iter()
            .find(|e| e.kind == EventKind::DownPaymentTarget)
            .unwrap();

        assert_eq!(target.month, 30);
        assert_eq!(target.value, Some(dec!(600000)));
    }

    #[test]
    fn rate_risk_raised_when_savings_cover_is_short() {
        let input = InputRecord {
            current_savings: Some(dec!(100000)),
            monthly_savings: Some(dec!(10000)),
            ..InputRecord::default()
        };

        let result = timeline(&input);

        assert!(
            result
                .events
                .iter()
                .any(|e| e.kind == EventKind::InterestRateRisk && e.month == 24)
        );
    }

    #[test]
    fn rate_risk_not_raised_without_savings_rate() {
        let input = InputRecord {
            monthly_savings: Some(dec!(0)),
            ..InputRecord::default()
        };

        let result = timeline(&input);

        assert!(
            !result
                .events
                .iter()
                .any(|e| e.kind == EventKind::InterestRateRisk)
        );
    }

    #[test]
    fn event_kind_categories() {
        assert_eq!(EventKind::RentalBreakEven.category(), EventCategory::Milestone);
        assert_eq!(EventKind::InterestRateRisk.category(), EventCategory::Warning);
        assert_eq!(EventKind::MarketReview.category(), EventCategory::Opportunity);
    }
}
