use super::types::{Calculator, Investment, InvestmentResult, YearlyData};

/// Prices an investment with the calculator its instrument maps to.
///
/// The engine never rejects input: out-of-range values yield degenerate numbers
/// (possibly NaN or infinite) rather than errors. Callers that need guarantees run
/// [`super::validate_investment`] first.
pub fn calculate_investment(investment: &Investment) -> InvestmentResult {
    match investment.instrument.calculator() {
        Calculator::CompoundLumpSum => calculate_fd(investment),
        Calculator::AnnuityDue => calculate_sip(investment),
        Calculator::AnnualContribution => calculate_ppf(investment),
        Calculator::RecurringDeposit => calculate_rd(investment),
    }
}

/// Lump sum compounded once a year. Also prices NSC.
pub fn calculate_fd(investment: &Investment) -> InvestmentResult {
    let principal = investment.principal;
    let growth = 1.0 + investment.rate / 100.0;

    let yearly_breakdown = (1..=investment.time)
        .map(|year| yearly_point(year, principal * compound(growth, year), principal))
        .collect();

    let maturity_amount = principal * compound(growth, investment.time);
    build_result(investment, maturity_amount, principal, yearly_breakdown)
}

/// Future value of an annuity-due: each contribution lands at the start of its
/// period. Also prices ELSS.
pub fn calculate_sip(investment: &Investment) -> InvestmentResult {
    let principal = investment.principal;
    let frequency = f64::from(investment.contributions_per_year());
    let periodic_rate = investment.rate / 100.0 / frequency;

    let yearly_breakdown = (1..=investment.time)
        .map(|year| {
            let payments = f64::from(year) * frequency;
            yearly_point(
                year,
                annuity_due_value(principal, periodic_rate, payments),
                principal * payments,
            )
        })
        .collect();

    let total_payments = f64::from(investment.time) * frequency;
    let maturity_amount = annuity_due_value(principal, periodic_rate, total_payments);
    build_result(
        investment,
        maturity_amount,
        principal * total_payments,
        yearly_breakdown,
    )
}

/// Annual contribution at the start of each year, compounded on the running balance.
pub fn calculate_ppf(investment: &Investment) -> InvestmentResult {
    let principal = investment.principal;
    let growth = 1.0 + investment.rate / 100.0;

    let mut balance = 0.0;
    let mut yearly_breakdown = Vec::with_capacity(investment.time as usize);
    for year in 1..=investment.time {
        balance = (balance + principal) * growth;
        yearly_breakdown.push(yearly_point(year, balance, principal * f64::from(year)));
    }

    build_result(
        investment,
        balance,
        principal * f64::from(investment.time),
        yearly_breakdown,
    )
}

/// Monthly recurring deposit, closed form: linear interest on the running deposit
/// count rather than compounding each deposit separately.
pub fn calculate_rd(investment: &Investment) -> InvestmentResult {
    let principal = investment.principal;
    let months_per_year = f64::from(investment.contributions_per_year());
    let monthly_rate = investment.rate / 100.0 / months_per_year;

    let yearly_breakdown = (1..=investment.time)
        .map(|year| {
            let months = f64::from(year) * months_per_year;
            yearly_point(
                year,
                recurring_deposit_value(principal, monthly_rate, months),
                principal * months,
            )
        })
        .collect();

    let total_months = f64::from(investment.time) * months_per_year;
    let maturity_amount = recurring_deposit_value(principal, monthly_rate, total_months);
    build_result(
        investment,
        maturity_amount,
        principal * total_months,
        yearly_breakdown,
    )
}

fn build_result(
    investment: &Investment,
    maturity_amount: f64,
    total_invested: f64,
    yearly_breakdown: Vec<YearlyData>,
) -> InvestmentResult {
    InvestmentResult {
        investment: investment.clone(),
        maturity_amount,
        total_interest: maturity_amount - total_invested,
        yearly_breakdown,
    }
}

fn yearly_point(year: u32, amount: f64, total_invested: f64) -> YearlyData {
    YearlyData {
        year,
        amount,
        interest: amount - total_invested,
        total_invested,
    }
}

fn compound(growth: f64, years: u32) -> f64 {
    growth.powf(f64::from(years))
}

fn annuity_due_value(payment: f64, periodic_rate: f64, periods: f64) -> f64 {
    // (1+r)^n - 1 over r is undefined at r = 0; the limit is n.
    if periodic_rate == 0.0 {
        return payment * periods;
    }
    // ln_1p/exp_m1 keep the low digits of 1+r that powf loses at tiny rates.
    let accumulation = (periods * periodic_rate.ln_1p()).exp_m1() / periodic_rate;
    payment * accumulation * (1.0 + periodic_rate)
}

fn recurring_deposit_value(deposit: f64, monthly_rate: f64, months: f64) -> f64 {
    deposit * months * (1.0 + monthly_rate) + deposit * (months * (months + 1.0) / 2.0) * monthly_rate
}
