mod compare;
mod engine;
mod error;
mod export;
mod types;
mod validate;

pub use compare::{
    ComparisonReport, FinalComparison, GrowthChart, GrowthSeries, Highlight, PortfolioSummary,
    ResultRow, build_comparison, final_comparison, growth_chart, portfolio_summary, result_row,
};
pub use engine::{calculate_fd, calculate_investment, calculate_ppf, calculate_rd, calculate_sip};
pub use error::InvestmentError;
pub use export::{CSV_HEADER, export_csv, write_csv};
pub use types::{
    Calculator, DEFAULT_FREQUENCY, InstrumentType, Investment, InvestmentResult, RD_MONTHS_PER_YEAR,
    YearlyData,
};
pub use validate::{MAX_FREQUENCY, MAX_RATE, MAX_YEARS, validate_investment};
