//! Engine entry points.
//!
//! [`Engine`] binds the calculators to one [`EngineConfig`]. The free
//! `compute_*` functions run against the default configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::max;
use crate::calculations::{
    ConsolidatedResult, DecisionTimeline, IncomeBreakdown, LoanAmortizer, LoanProjection,
    LoanTerms, OptimizationEstimates, PropertyMetrics, PropertyMetricsCalculator, SavingsPlan,
    SavingsProjection, SavingsProjector, SavingsStrategy, ScenarioAggregator, SensitivityAnalyzer,
    SensitivityReport, TaxEngine, TaxResult, TimelinePlanner, WealthCalculator, WealthComparison,
};
use crate::error::EngineError;
use crate::models::{EngineConfig, InputRecord};

/// Every figure derived from one input record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyReport {
    pub input: InputRecord,
    pub income: IncomeBreakdown,
    pub consolidated: ConsolidatedResult,
    /// Bond repaid with any positive rent-out cash as the extra payment.
    pub loan: LoanProjection,
    pub savings: SavingsProjection,
    pub sensitivity: SensitivityReport,
    pub metrics: PropertyMetrics,
    pub optimization: OptimizationEstimates,
    pub timeline: DecisionTimeline,
    pub wealth: WealthComparison,
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tax(
        &self,
        annual_income: Decimal,
    ) -> Result<TaxResult, EngineError> {
        TaxEngine::new(&self.config.tax_table).calculate(annual_income)
    }

    pub fn income_breakdown(
        &self,
        input: &InputRecord,
    ) -> Result<IncomeBreakdown, EngineError> {
        TaxEngine::new(&self.config.tax_table).income_breakdown(input)
    }

    pub fn loan_projection(
        &self,
        principal: Decimal,
        annual_rate_pct: Decimal,
        term_years: u32,
        extra_payment: Decimal,
    ) -> Result<LoanProjection, EngineError> {
        let terms = LoanTerms {
            principal,
            annual_rate_pct,
            term_years,
            extra_payment,
        };
        LoanAmortizer::new(&terms).calculate()
    }

    /// Flat and compounding trajectories from `current`.
    pub fn savings_projection(
        &self,
        current: Decimal,
        target: Decimal,
        monthly_contribution: Decimal,
        annual_return_pct: Decimal,
    ) -> Result<SavingsProjection, EngineError> {
        self.project(&SavingsPlan {
            current,
            target,
            monthly_contribution,
            strategy: SavingsStrategy::Milestones { annual_return_pct },
        })
    }

    /// Real-return trajectory from a zero balance. Inflation defaults to the
    /// configured rate.
    pub fn inflation_adjusted_projection(
        &self,
        monthly_contribution: Decimal,
        target: Decimal,
        expected_return_pct: Decimal,
        inflation_pct: Option<Decimal>,
    ) -> Result<SavingsProjection, EngineError> {
        self.project(&SavingsPlan {
            current: Decimal::ZERO,
            target,
            monthly_contribution,
            strategy: SavingsStrategy::InflationAdjusted {
                expected_return_pct,
                inflation_pct: inflation_pct.unwrap_or(self.config.default_inflation_pct),
            },
        })
    }

    pub fn project(
        &self,
        plan: &SavingsPlan,
    ) -> Result<SavingsProjection, EngineError> {
        SavingsProjector::new(self.config.savings_horizon_months).project(plan)
    }

    pub fn sensitivity(
        &self,
        input: &InputRecord,
        base: &ConsolidatedResult,
    ) -> Result<SensitivityReport, EngineError> {
        SensitivityAnalyzer::new(input, base).calculate()
    }

    pub fn consolidate(
        &self,
        input: &InputRecord,
    ) -> Result<ConsolidatedResult, EngineError> {
        ScenarioAggregator::new(&self.config).calculate(input)
    }

    pub fn metrics(
        &self,
        input: &InputRecord,
        base: &ConsolidatedResult,
    ) -> Result<PropertyMetrics, EngineError> {
        PropertyMetricsCalculator::new(&self.config).calculate(input, base)
    }

    pub fn optimization(
        &self,
        input: &InputRecord,
        base: &ConsolidatedResult,
    ) -> OptimizationEstimates {
        OptimizationEstimates::calculate(input, base)
    }

    pub fn timeline(
        &self,
        input: &InputRecord,
        base: &ConsolidatedResult,
        savings: &SavingsProjection,
    ) -> Result<DecisionTimeline, EngineError> {
        TimelinePlanner::new(&self.config).calculate(input, base, savings)
    }

    pub fn wealth(
        &self,
        input: &InputRecord,
        base: &ConsolidatedResult,
    ) -> Result<WealthComparison, EngineError> {
        WealthCalculator::new(&self.config).calculate(input, base)
    }

    /// Runs every calculation for `input`.
    pub fn report(
        &self,
        input: &InputRecord,
    ) -> Result<PropertyReport, EngineError> {
        let consolidated = self.consolidate(input)?;
        let income = self.income_breakdown(input)?;
        let loan = self.loan_projection(
            consolidated.loan_amount,
            consolidated.interest_rate_pct,
            input.loan_term_years,
            max(Decimal::ZERO, consolidated.rent_out_available),
        )?;
        let savings = self.savings_projection(
            consolidated.current_savings,
            consolidated.savings_target,
            consolidated.monthly_savings,
            input.investment_return_rate,
        )?;
        let sensitivity = self.sensitivity(input, &consolidated)?;
        let metrics = self.metrics(input, &consolidated)?;
        let optimization = self.optimization(input, &consolidated);
        let timeline = self.timeline(input, &consolidated, &savings)?;
        let wealth = self.wealth(input, &consolidated)?;

        debug!(
            status = %consolidated.affordability_status,
            best = ?wealth.best,
            "report computed"
        );

        Ok(PropertyReport {
            input: input.clone(),
            income,
            consolidated,
            loan,
            savings,
            sensitivity,
            metrics,
            optimization,
            timeline,
            wealth,
        })
    }
}

pub fn compute_tax(annual_income: Decimal) -> Result<TaxResult, EngineError> {
    Engine::default().tax(annual_income)
}

pub fn compute_income_breakdown(input: &InputRecord) -> Result<IncomeBreakdown, EngineError> {
    Engine::default().income_breakdown(input)
}

pub fn compute_loan_projection(
    principal: Decimal,
    annual_rate_pct: Decimal,
    term_years: u32,
    extra_payment: Decimal,
) -> Result<LoanProjection, EngineError> {
    Engine::default().loan_projection(principal, annual_rate_pct, term_years, extra_payment)
}

pub fn compute_savings_projection(
    current: Decimal,
    target: Decimal,
    monthly_contribution: Decimal,
    annual_return_pct: Decimal,
) -> Result<SavingsProjection, EngineError> {
    Engine::default().savings_projection(current, target, monthly_contribution, annual_return_pct)
}

pub fn compute_inflation_adjusted_projection(
    monthly_contribution: Decimal,
    target: Decimal,
    expected_return_pct: Decimal,
    inflation_pct: Option<Decimal>,
) -> Result<SavingsProjection, EngineError> {
    Engine::default().inflation_adjusted_projection(
        monthly_contribution,
        target,
        expected_return_pct,
        inflation_pct,
    )
}

pub fn compute_sensitivity(
    input: &InputRecord,
    base: &ConsolidatedResult,
) -> Result<SensitivityReport, EngineError> {
    Engine::default().sensitivity(input, base)
}

pub fn compute_all(input: &InputRecord) -> Result<ConsolidatedResult, EngineError> {
    Engine::default().consolidate(input)
}
