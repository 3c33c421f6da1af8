//! Plain-text rendering of engine results.

use chrono::NaiveDate;
use property_core::PropertyReport;
use property_core::calculations::{
    ConsolidatedResult, DecisionTimeline, IncomeBreakdown, LoanProjection, OptimizationEstimates,
    PropertyMetrics, SavingsProjection, SavingsStrategy, SensitivityReport, TaxResult, WealthComparison,
    WealthPosition,
};

use crate::format::{
    format_money, format_months, format_optional_percentage, format_percentage,
    format_projected_date,
};

fn heading(
    out: &mut Vec<String>,
    title: &str,
) {
    if !out.is_empty() {
        out.push(String::new());
    }
    out.push(title.to_string());
    out.push("-".repeat(title.chars().count()));
}

fn row(
    out: &mut Vec<String>,
    label: &str,
    value: impl AsRef<str>,
) {
    out.push(format!("{label:<30} {}", value.as_ref()));
}

pub fn render_tax(tax: &TaxResult) -> String {
    let mut out = Vec::new();
    push_tax(&mut out, tax);
    out.join("\n")
}

fn push_tax(
    out: &mut Vec<String>,
    tax: &TaxResult,
) {
    heading(out, "Income tax");
    row(out, "Annual income", format_money(tax.annual_gross));
    row(
        out,
        "Bracket",
        format!(
            "from {} at {}",
            format_money(tax.applied_bracket.threshold),
            format_percentage(tax.applied_bracket.rate)
        ),
    );
    row(out, "Tax before rebate", format_money(tax.tax_before_rebate));
    row(out, "Rebate", format_money(tax.rebate));
    row(out, "Annual tax", format_money(tax.annual_tax));
    row(out, "Monthly tax", format_money(tax.monthly_tax));
    row(out, "Effective rate", format_optional_percentage(tax.effective_rate));
}

fn push_income(
    out: &mut Vec<String>,
    income: &IncomeBreakdown,
) {
    heading(out, "Monthly income");
    row(out, "Local income", format_money(income.local_income));
    row(
        out,
        "Foreign income",
        format!(
            "{} × {} = {}",
            income.foreign_amount,
            income.exchange_rate,
            format_money(income.foreign_income)
        ),
    );
    row(out, "Gross income", format_money(income.total_gross));
    row(out, "Tax", format_money(income.tax.monthly_tax));
    row(out, "Net income", format_money(income.net_income));
}

fn push_affordability(
    out: &mut Vec<String>,
    base: &ConsolidatedResult,
) {
    heading(out, "Affordability");
    row(out, "Loan amount", format_money(base.loan_amount));
    row(
        out,
        "Interest rate",
        format_percentage(base.interest_rate_pct),
    );
    row(out, "Monthly bond payment", format_money(base.monthly_payment));
    row(out, "Total housing cost", format_money(base.total_housing_cost));
    row(
        out,
        "Housing to income",
        format!(
            "{} ({})",
            format_optional_percentage(base.housing_to_income_ratio),
            base.affordability_status
        ),
    );
    row(out, "Left after housing", format_money(base.disposable_after_housing));
    row(out, "Buy & live: available", format_money(base.live_in_available));
    row(out, "Buy & rent out: available", format_money(base.rent_out_available));
    row(out, "Keep renting: available", format_money(base.keep_renting_available));
}

pub fn render_loan(loan: &LoanProjection) -> String {
    let mut out = Vec::new();
    push_loan(&mut out, loan);
    out.join("\n")
}

fn push_loan(
    out: &mut Vec<String>,
    loan: &LoanProjection,
) {
    let original = &loan.original;
    let accelerated = &loan.accelerated;

    heading(out, "Bond repayment");
    row(out, "Monthly payment", format_money(original.monthly_payment));
    row(out, "Term", format_months(Some(original.term_months)));
    row(out, "Total interest", format_money(original.total_interest));
    row(out, "Total paid", format_money(original.total_payments));

    if accelerated.monthly_payment > original.monthly_payment {
        row(
            out,
            "With extra payment",
            format_money(accelerated.monthly_payment),
        );
        row(out, "Paid off in", format_months(Some(accelerated.term_months)));
        row(out, "Years saved", format!("{:.1}", accelerated.years_saved));
        row(out, "Interest saved", format_money(accelerated.interest_saved));
        if !accelerated.converged {
            row(out, "Note", "extra payment schedule did not converge");
        }
    }
}

/// Savings with the projected calendar month for each trajectory.
pub fn render_savings(
    savings: &SavingsProjection,
    today: NaiveDate,
) -> String {
    let mut out = Vec::new();
    push_savings(&mut out, savings, today);
    out.join("\n")
}

fn push_savings(
    out: &mut Vec<String>,
    savings: &SavingsProjection,
    today: NaiveDate,
) {
    heading(out, "Savings");
    row(out, "Current", format_money(savings.current));
    row(out, "Target", format_money(savings.target));
    row(out, "Monthly contribution", format_money(savings.monthly_contribution));
    match savings.strategy {
        SavingsStrategy::Milestones { annual_return_pct } => {
            row(out, "Annual return", format_percentage(annual_return_pct));
        }
        SavingsStrategy::InflationAdjusted {
            expected_return_pct,
            inflation_pct,
        } => {
            row(
                out,
                "Return / inflation",
                format!(
                    "{} / {}",
                    format_percentage(expected_return_pct),
                    format_percentage(inflation_pct)
                ),
            );
        }
    }

    let targets = &savings.months_to_target;
    row(
        out,
        "Target without returns",
        format!(
            "{} → {}",
            format_months(targets.flat),
            format_projected_date(today, targets.flat)
        ),
    );
    row(
        out,
        "Target with returns",
        format!(
            "{} → {}",
            format_months(targets.with_returns),
            format_projected_date(today, targets.with_returns)
        ),
    );
    row(out, "Total contributions", format_money(savings.total_contributions));
    row(out, "Total returns", format_money(savings.total_returns));

    if !savings.milestones.is_empty() {
        out.push(String::new());
        out.push(format!("{:>6}  {:>18}  {:>18}", "Month", "Flat", "With returns"));
        for m in &savings.milestones {
            out.push(format!(
                "{:>6}  {:>18}  {:>18}",
                m.month,
                format_money(m.flat_balance),
                format_money(m.with_returns)
            ));
        }
    }
}

pub fn render_sensitivity(report: &SensitivityReport) -> String {
    let mut out = Vec::new();
    push_sensitivity(&mut out, report);
    out.join("\n")
}

fn push_sensitivity(
    out: &mut Vec<String>,
    report: &SensitivityReport,
) {
    heading(out, "Rental income sensitivity");
    for v in &report.rental {
        out.push(format!(
            "{:>+4}%  {:>16}  available {:>16}  loan impact {}",
            v.variation_pct,
            format_money(v.income),
            format_money(v.available),
            v.time_impact_years
                .map(|y| format!("{y:.1} yr"))
                .unwrap_or_else(|| "—".to_string())
        ));
    }

    heading(out, "Vacancy");
    for v in &report.vacancy {
        out.push(format!(
            "{:>2} mo  lost {:>16}  per month {:>14}  available {:>16}",
            v.months,
            format_money(v.lost_income),
            format_money(v.monthly_impact),
            format_money(v.new_available)
        ));
    }

    heading(out, "Exchange rate");
    for e in &report.exchange_rate {
        out.push(format!(
            "{:>6}  {:>16}  change {:>16}  available {:>16}",
            e.rate,
            format_money(e.local_value),
            format_money(e.net_change),
            format_money(e.new_available)
        ));
    }

    heading(out, "Foreign income");
    for f in &report.foreign_income {
        out.push(format!(
            "{:>+4}%  {:>10}  {:>16}  available {:>16}",
            f.variation_pct,
            f.amount,
            format_money(f.local_value),
            format_money(f.new_available)
        ));
    }
}

fn push_metrics(
    out: &mut Vec<String>,
    metrics: &PropertyMetrics,
) {
    heading(out, "Property metrics");
    row(out, "Gross rental yield", format_optional_percentage(metrics.rental_yield));
    row(out, "Net rental yield", format_optional_percentage(metrics.net_rental_yield));
    row(out, "Yield vs market", format_optional_percentage(metrics.yield_vs_market));
    row(out, "Rental coverage", format_optional_percentage(metrics.rental_coverage));
    row(out, "Bond coverage", format_optional_percentage(metrics.bond_coverage));
    row(out, "Housing shortfall", format_money(metrics.housing_shortfall));
    row(
        out,
        "Foreign income dependence",
        match metrics.foreign_income_risk {
            Some(risk) => format!(
                "{} ({risk:?} risk)",
                format_optional_percentage(metrics.foreign_income_dependence)
            ),
            None => format_optional_percentage(metrics.foreign_income_dependence),
        },
    );
    row(out, "Rate shock impact", format_money(metrics.rate_shock_impact));
    row(out, "Interest sensitivity", format_money(metrics.interest_sensitivity));
}

fn push_optimization(
    out: &mut Vec<String>,
    estimates: &OptimizationEstimates,
) {
    heading(out, "Optimization estimates (monthly)");
    row(out, "Tax deductions", format_money(estimates.tax_saving));
    row(out, "Property cost reduction", format_money(estimates.property_cost_reduction));
    row(out, "Rental uplift", format_money(estimates.rental_uplift));
    row(out, "Combined", format_money(estimates.total()));
}

fn push_timeline(
    out: &mut Vec<String>,
    timeline: &DecisionTimeline,
    today: NaiveDate,
) {
    heading(out, "Decision timeline");
    row(out, "Rental break-even", format_months(timeline.break_even_months));
    for event in &timeline.events {
        let value = event.value.map(format_money).unwrap_or_default();
        out.push(format!(
            "{:>4}  {:<14}  {:<10}  {:<20}  {} {}",
            event.month,
            format_projected_date(today, Some(event.month)),
            format!("{:?}", event.kind.category()),
            event.kind.title(),
            event.kind.description(),
            value
        ));
    }
}

fn push_position(
    out: &mut Vec<String>,
    position: &WealthPosition,
) {
    out.push(format!(
        "{:<24} savings {:>16}  equity {:>16}  appreciation {:>16}  rental {:>16}  total {:>16}",
        position.scenario.label(),
        format_money(position.savings),
        format_money(position.equity),
        format_money(position.appreciation),
        format_money(position.net_rental_income),
        format_money(position.total)
    ));
}

fn push_wealth(
    out: &mut Vec<String>,
    wealth: &WealthComparison,
) {
    heading(
        out,
        &format!("Wealth after {}", format_months(Some(wealth.horizon_months))),
    );
    push_position(out, &wealth.keep_renting);
    push_position(out, &wealth.buy_and_live);
    push_position(out, &wealth.buy_and_rent_out);
    row(out, "Best", wealth.best.label());
}

/// Every section of a [`PropertyReport`].
pub fn render_report(
    report: &PropertyReport,
    today: NaiveDate,
) -> String {
    let mut out = Vec::new();
    push_income(&mut out, &report.income);
    push_tax(&mut out, &report.income.tax);
    push_affordability(&mut out, &report.consolidated);
    push_loan(&mut out, &report.loan);
    push_savings(&mut out, &report.savings, today);
    push_metrics(&mut out, &report.metrics);
    push_optimization(&mut out, &report.optimization);
    push_timeline(&mut out, &report.timeline, today);
    push_wealth(&mut out, &report.wealth);
    out.join("\n")
}
