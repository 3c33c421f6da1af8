//! Calculation modules for the buy/rent/save decision.
//!
//! The leaf calculators ([`TaxEngine`], [`LoanAmortizer`],
//! [`SavingsProjector`]) work on plain amounts. [`ScenarioAggregator`] combines
//! them into a [`ConsolidatedResult`], which the remaining modules read.

pub mod common;
pub mod loan;
pub mod metrics;
pub mod optimization;
pub mod savings;
pub mod scenario;
pub mod sensitivity;
pub mod tax;
pub mod timeline;
pub mod wealth;

pub use loan::{
    AcceleratedSchedule, LoanAmortizer, LoanProjection, LoanTerms, OriginalSchedule,
    standard_payment,
};
pub use metrics::{PropertyMetrics, PropertyMetricsCalculator, RiskLevel};
pub use optimization::OptimizationEstimates;
pub use savings::{
    MonthlyBalance, MonthsToTarget, SavingsMilestone, SavingsPlan, SavingsProjection,
    SavingsProjector, SavingsStrategy,
};
pub use scenario::{AffordabilityStatus, ConsolidatedResult, ScenarioAggregator};
pub use sensitivity::{
    ExchangeRateImpact, ForeignIncomeImpact, RentalVariation, SensitivityAnalyzer,
    SensitivityReport, VacancyImpact,
};
pub use tax::{IncomeBreakdown, TaxEngine, TaxResult};
pub use timeline::{DecisionTimeline, EventCategory, EventKind, TimelineEvent, TimelinePlanner};
pub use wealth::{WealthCalculator, WealthComparison, WealthPosition, WealthScenario};
