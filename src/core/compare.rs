use serde::Serialize;

use super::types::{InstrumentType, InvestmentResult};

/// One investment's yearly amounts on the shared year axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthSeries {
    pub id: String,
    pub name: String,
    pub amounts: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthChart {
    pub years: Vec<u32>,
    pub series: Vec<GrowthSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalComparison {
    pub id: String,
    pub name: String,
    pub invested: f64,
    pub maturity: f64,
    pub interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub instrument: InstrumentType,
    pub principal: f64,
    pub rate: f64,
    pub time: u32,
    pub total_invested: f64,
    pub maturity_amount: f64,
    pub total_interest: f64,
    pub total_return_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub highest_maturity: Option<Highlight>,
    pub best_rate: Option<Highlight>,
    pub total_interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub results: Vec<InvestmentResult>,
    pub growth: GrowthChart,
    pub final_comparison: Vec<FinalComparison>,
    pub rows: Vec<ResultRow>,
    pub summary: PortfolioSummary,
}

pub fn build_comparison(results: &[InvestmentResult]) -> ComparisonReport {
    ComparisonReport {
        results: results.to_vec(),
        growth: growth_chart(results),
        final_comparison: results.iter().map(final_comparison).collect(),
        rows: results.iter().map(result_row).collect(),
        summary: portfolio_summary(results),
    }
}

/// Aligns yearly amounts on `1..=max(time)`. Years past an investment's own horizon
/// read as zero instead of being extrapolated.
pub fn growth_chart(results: &[InvestmentResult]) -> GrowthChart {
    let max_years = results
        .iter()
        .map(|result| result.investment.time)
        .max()
        .unwrap_or(0);
    let years: Vec<u32> = (1..=max_years).collect();

    let series = results
        .iter()
        .map(|result| {
            let amounts = years
                .iter()
                .map(|&year| {
                    if year > result.investment.time {
                        return 0.0;
                    }
                    result
                        .yearly_breakdown
                        .iter()
                        .find(|row| row.year == year)
                        .map_or(0.0, |row| row.amount.round())
                })
                .collect();
            GrowthSeries {
                id: result.investment.id.clone(),
                name: result.investment.name.clone(),
                amounts,
            }
        })
        .collect();

    GrowthChart { years, series }
}

pub fn final_comparison(result: &InvestmentResult) -> FinalComparison {
    FinalComparison {
        id: result.investment.id.clone(),
        name: result.investment.name.clone(),
        invested: result.total_invested(),
        maturity: result.maturity_amount.round(),
        interest: result.total_interest.round(),
    }
}

pub fn result_row(result: &InvestmentResult) -> ResultRow {
    let investment = &result.investment;
    ResultRow {
        id: investment.id.clone(),
        name: investment.name.clone(),
        instrument: investment.instrument,
        principal: investment.principal,
        rate: investment.rate,
        time: investment.time,
        total_invested: result.total_invested(),
        maturity_amount: result.maturity_amount,
        total_interest: result.total_interest,
        total_return_pct: result.total_return_pct(),
    }
}

pub fn portfolio_summary(results: &[InvestmentResult]) -> PortfolioSummary {
    PortfolioSummary {
        highest_maturity: first_max_by(results, |result| result.maturity_amount),
        best_rate: first_max_by(results, |result| result.investment.rate),
        total_interest: results.iter().map(|result| result.total_interest).sum(),
    }
}

// Earlier entries win ties.
fn first_max_by<F>(results: &[InvestmentResult], key: F) -> Option<Highlight>
where
    F: Fn(&InvestmentResult) -> f64,
{
    let mut best: Option<(&InvestmentResult, f64)> = None;
    for result in results {
        let value = key(result);
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((result, value)),
        }
    }
    best.map(|(result, value)| Highlight {
        id: result.investment.id.clone(),
        name: result.investment.name.clone(),
        value,
    })
}
