use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpListener;

use crate::core::{
    ComparisonReport, InstrumentType, Investment, InvestmentError,
    InvestmentResult, build_comparison, calculate_investment, export_csv, validate_investment,
};

const CSV_FILENAME: &str = "investment_summary.csv";

static NEXT_INVESTMENT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliInstrumentType {
    Fd,
    Sip,
    Ppf,
    Rd,
    Nsc,
    Elss,
}

impl From<CliInstrumentType> for InstrumentType {
    fn from(value: CliInstrumentType) -> Self {
        match value {
            CliInstrumentType::Fd => InstrumentType::Fd,
            CliInstrumentType::Sip => InstrumentType::Sip,
            CliInstrumentType::Ppf => InstrumentType::Ppf,
            CliInstrumentType::Rd => InstrumentType::Rd,
            CliInstrumentType::Nsc => InstrumentType::Nsc,
            CliInstrumentType::Elss => InstrumentType::Elss,
        }
    }
}

impl From<InstrumentType> for CliInstrumentType {
    fn from(value: InstrumentType) -> Self {
        match value {
            InstrumentType::Fd => CliInstrumentType::Fd,
            InstrumentType::Sip => CliInstrumentType::Sip,
            InstrumentType::Ppf => CliInstrumentType::Ppf,
            InstrumentType::Rd => CliInstrumentType::Rd,
            InstrumentType::Nsc => CliInstrumentType::Nsc,
            InstrumentType::Elss => CliInstrumentType::Elss,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InvestmentPayload {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    instrument: Option<InstrumentType>,
    principal: Option<f64>,
    rate: Option<f64>,
    time: Option<u32>,
    frequency: Option<u32>,
    lock_in: Option<u32>,
    tax_benefit: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ComparePayload {
    investments: Vec<InvestmentPayload>,
}

#[derive(Parser, Debug)]
#[command(
    name = "invest_compare",
    about = "Maturity and yearly growth for FD, SIP, PPF, RD, NSC and ELSS investments",
    after_help = "Run `invest_compare serve [port]` to start the HTTP API instead."
)]
struct Cli {
    #[arg(long, default_value = "Investment")]
    name: String,
    #[arg(
        long = "type",
        value_enum,
        ignore_case = true,
        default_value_t = CliInstrumentType::Fd
    )]
    instrument: CliInstrumentType,
    #[arg(
        long,
        default_value_t = 100_000.0,
        help = "Lump sum for FD/PPF/NSC, per-period deposit for SIP/RD/ELSS"
    )]
    principal: f64,
    #[arg(
        long,
        help = "Annual rate in percent; defaults to the instrument's usual rate"
    )]
    rate: Option<f64>,
    #[arg(long, default_value_t = 5, help = "Horizon in whole years")]
    time: u32,
    #[arg(long, help = "Contributions per year for SIP/ELSS (default 12)")]
    frequency: Option<u32>,
    #[arg(long, help = "Lock-in period in years")]
    lock_in: Option<u32>,
    #[arg(long, default_value_t = false)]
    tax_benefit: bool,
    #[arg(long, help = "Identifier to attach; generated when omitted")]
    id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    result: InvestmentResult,
    total_invested: f64,
    total_return_pct: f64,
}

impl From<InvestmentResult> for CalculateResponse {
    fn from(result: InvestmentResult) -> Self {
        Self {
            total_invested: result.total_invested(),
            total_return_pct: result.total_return_pct(),
            result,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentInfo {
    #[serde(rename = "type")]
    instrument: InstrumentType,
    label: &'static str,
    default_rate: f64,
    recurring: bool,
    principal_label: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn next_investment_id() -> String {
    NEXT_INVESTMENT_ID.fetch_add(1, Ordering::Relaxed).to_string()
}

fn build_investment(cli: Cli) -> Result<Investment, InvestmentError> {
    let instrument: InstrumentType = cli.instrument.into();
    let investment = Investment {
        id: cli.id.unwrap_or_else(next_investment_id),
        name: cli.name.trim().to_string(),
        instrument,
        principal: cli.principal,
        rate: cli.rate.unwrap_or(instrument.default_rate()),
        time: cli.time,
        frequency: cli.frequency,
        lock_in: cli.lock_in,
        tax_benefit: cli.tax_benefit,
    };
    validate_investment(&investment)?;
    Ok(investment)
}

fn default_cli_for_api() -> Cli {
    Cli {
        name: "Investment".to_string(),
        instrument: CliInstrumentType::Fd,
        principal: 100_000.0,
        rate: None,
        time: 5,
        frequency: None,
        lock_in: None,
        tax_benefit: false,
        id: None,
    }
}

fn investment_from_payload(payload: InvestmentPayload) -> Result<Investment, InvestmentError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.id {
        cli.id = Some(v);
    }
    if let Some(v) = payload.name {
        cli.name = v;
    }
    if let Some(v) = payload.instrument {
        cli.instrument = v.into();
    }
    if let Some(v) = payload.principal {
        cli.principal = v;
    }
    if let Some(v) = payload.rate {
        cli.rate = Some(v);
    }
    if let Some(v) = payload.time {
        cli.time = v;
    }
    if let Some(v) = payload.frequency {
        cli.frequency = Some(v);
    }
    if let Some(v) = payload.lock_in {
        cli.lock_in = Some(v);
    }
    if let Some(v) = payload.tax_benefit {
        cli.tax_benefit = v;
    }

    build_investment(cli)
}

fn investments_from_payload(payload: ComparePayload) -> Result<Vec<Investment>, String> {
    payload
        .investments
        .into_iter()
        .enumerate()
        .map(|(idx, item)| investment_from_payload(item).map_err(|e| format!("investments[{idx}]: {e}")))
        .collect()
}

fn instrument_catalogue() -> Vec<InstrumentInfo> {
    InstrumentType::ALL
        .into_iter()
        .map(|instrument| InstrumentInfo {
            instrument,
            label: instrument.label(),
            default_rate: instrument.default_rate(),
            recurring: instrument.is_recurring(),
            principal_label: if instrument.is_recurring() {
                "Monthly Amount"
            } else {
                "Principal Amount"
            },
        })
        .collect()
}

fn compare_investments(investments: &[Investment]) -> ComparisonReport {
    let results: Vec<InvestmentResult> = investments.iter().map(calculate_investment).collect();
    build_comparison(&results)
}

/// Runs a single calculation from command-line arguments and prints it as JSON.
pub fn run_cli<I, T>(args: I) -> Result<(), InvestmentError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let investment = build_investment(Cli::parse_from(args))?;
    let response = CalculateResponse::from(calculate_investment(&investment));
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route("/api/compare", post(compare_handler))
        .route("/api/export.csv", post(export_csv_handler))
        .route("/api/instruments", get(instruments_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("investment comparison API listening on http://{addr}");
    log::info!("local access: http://127.0.0.1:{port}/api/instruments");

    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn instruments_handler() -> Response {
    json_response(StatusCode::OK, instrument_catalogue())
}

async fn calculate_get_handler(Query(payload): Query<InvestmentPayload>) -> Response {
    calculate_handler_impl(payload).await
}

async fn calculate_post_handler(Json(payload): Json<InvestmentPayload>) -> Response {
    calculate_handler_impl(payload).await
}

async fn calculate_handler_impl(payload: InvestmentPayload) -> Response {
    let investment = match investment_from_payload(payload) {
        Ok(investment) => investment,
        Err(e) => return bad_request(&e.to_string()),
    };

    log::debug!(
        "calculating {} {:?} over {} years",
        investment.instrument.tag(),
        investment.name,
        investment.time
    );
    let response = CalculateResponse::from(calculate_investment(&investment));
    json_response(StatusCode::OK, response)
}

async fn compare_handler(Json(payload): Json<ComparePayload>) -> Response {
    let investments = match investments_from_payload(payload) {
        Ok(investments) => investments,
        Err(msg) => return bad_request(&msg),
    };

    log::debug!("comparing {} investments", investments.len());
    json_response(StatusCode::OK, compare_investments(&investments))
}

async fn export_csv_handler(Json(payload): Json<ComparePayload>) -> Response {
    let investments = match investments_from_payload(payload) {
        Ok(investments) => investments,
        Err(msg) => return bad_request(&msg),
    };

    let report = compare_investments(&investments);
    match export_csv(&report.rows) {
        Ok(body) => with_cache_control((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{CSV_FILENAME}\""),
                ),
            ],
            body,
        )),
        Err(e) => {
            log::error!("csv export failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn bad_request(msg: &str) -> Response {
    log::warn!("rejected request: {msg}");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn investment_from_json(json: &str) -> Result<Investment, String> {
    let payload = serde_json::from_str::<InvestmentPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    investment_from_payload(payload).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be json")
    }

    #[test]
    fn build_investment_defaults_rate_to_instrument_rate() {
        let mut cli = sample_cli();
        cli.instrument = CliInstrumentType::Ppf;

        let investment = build_investment(cli).expect("valid investment");
        assert_eq!(investment.instrument, InstrumentType::Ppf);
        assert_approx(investment.rate, 7.1);
    }

    #[test]
    fn build_investment_keeps_explicit_zero_rate() {
        let mut cli = sample_cli();
        cli.rate = Some(0.0);

        let investment = build_investment(cli).expect("valid investment");
        assert_approx(investment.rate, 0.0);
    }

    #[test]
    fn build_investment_rejects_non_positive_principal() {
        let mut cli = sample_cli();
        cli.principal = 0.0;

        let err = build_investment(cli).expect_err("must reject zero principal");
        assert!(err.to_string().contains("principal"));
    }

    #[test]
    fn build_investment_rejects_zero_years() {
        let mut cli = sample_cli();
        cli.time = 0;

        let err = build_investment(cli).expect_err("must reject zero time");
        assert!(err.to_string().contains("time"));
    }

    #[test]
    fn build_investment_assigns_distinct_ids() {
        let first = build_investment(sample_cli()).expect("valid investment");
        let second = build_investment(sample_cli()).expect("valid investment");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn cli_parses_flags_case_insensitively() {
        let cli = Cli::parse_from([
            "invest_compare",
            "--name",
            "Index SIP",
            "--type",
            "sip",
            "--principal",
            "5000",
            "--time",
            "10",
        ]);
        let investment = build_investment(cli).expect("valid investment");
        assert_eq!(investment.instrument, InstrumentType::Sip);
        assert_approx(investment.rate, 12.0);
        assert_eq!(investment.frequency, None);
        assert_eq!(investment.name, "Index SIP");
    }

    #[test]
    fn investment_from_json_parses_web_keys() {
        let json = r#"{
          "id": "1700000000000",
          "name": "Tax saver",
          "type": "ELSS",
          "principal": 2500,
          "rate": 14,
          "time": 3,
          "frequency": 12,
          "lockIn": 3,
          "taxBenefit": true
        }"#;
        let investment = investment_from_json(json).expect("json should parse");

        assert_eq!(investment.id, "1700000000000");
        assert_eq!(investment.name, "Tax saver");
        assert_eq!(investment.instrument, InstrumentType::Elss);
        assert_approx(investment.principal, 2_500.0);
        assert_approx(investment.rate, 14.0);
        assert_eq!(investment.time, 3);
        assert_eq!(investment.frequency, Some(12));
        assert_eq!(investment.lock_in, Some(3));
        assert!(investment.tax_benefit);
    }

    #[test]
    fn investment_from_json_prices_unknown_type_as_fd() {
        let investment =
            investment_from_json(r#"{"name": "Gold", "type": "SGB"}"#).expect("json should parse");
        assert_eq!(investment.instrument, InstrumentType::Fd);
        assert_approx(investment.rate, 6.5);
    }

    #[test]
    fn investment_from_json_matches_type_tags_exactly() {
        let investment = investment_from_json(
            r#"{"name": "Index", "type": "sip", "principal": 5000, "rate": 12, "time": 10}"#,
        )
        .expect("json should parse");
        assert_eq!(investment.instrument, InstrumentType::Fd);
        assert_eq!(investment.frequency, None);
    }

    #[test]
    fn json_and_cli_build_the_same_investment() {
        let from_json = investment_from_json(
            r#"{"id": "9", "name": "Bank FD", "type": "FD", "principal": 100000, "rate": 6.5, "time": 5}"#,
        )
        .expect("json should parse");
        let from_cli = build_investment(Cli::parse_from([
            "invest_compare",
            "--id",
            "9",
            "--name",
            "Bank FD",
            "--principal",
            "100000",
            "--rate",
            "6.5",
        ]))
        .expect("valid investment");

        assert_eq!(from_json, from_cli);
        let json = serde_json::to_string(&from_json).expect("serialize");
        assert!(!json.contains("frequency"), "{json}");
    }

    #[test]
    fn investment_from_json_uses_form_defaults() {
        let investment = investment_from_json("{}").expect("json should parse");
        assert_eq!(investment.name, "Investment");
        assert_eq!(investment.instrument, InstrumentType::Fd);
        assert_approx(investment.principal, 100_000.0);
        assert_eq!(investment.time, 5);
    }

    #[test]
    fn investment_from_json_rejects_blank_name() {
        let err = investment_from_json(r#"{"name": "  "}"#).expect_err("blank name");
        assert!(err.contains("name"));
    }

    #[test]
    fn compare_payload_reports_failing_index() {
        let payload: ComparePayload = serde_json::from_str(
            r#"{"investments": [{"name": "ok"}, {"name": "bad", "time": 0}]}"#,
        )
        .expect("json should parse");
        let err = investments_from_payload(payload).expect_err("second entry is invalid");
        assert!(err.starts_with("investments[1]"), "{err}");
    }

    #[test]
    fn instrument_catalogue_lists_all_types_with_default_rates() {
        let catalogue = instrument_catalogue();
        assert_eq!(catalogue.len(), 6);
        let rd = catalogue
            .iter()
            .find(|info| info.instrument == InstrumentType::Rd)
            .expect("RD listed");
        assert_approx(rd.default_rate, 6.0);
        assert_eq!(rd.principal_label, "Monthly Amount");

        let json = serde_json::to_string(&catalogue).expect("catalogue should serialize");
        assert!(json.contains("\"type\":\"NSC\""));
        assert!(json.contains("\"defaultRate\":15.0"));
    }

    #[test]
    fn calculate_response_serialization_contains_expected_fields() {
        let investment = build_investment(sample_cli()).expect("valid investment");
        let response = CalculateResponse::from(calculate_investment(&investment));
        assert_approx(response.total_invested, 100_000.0);

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"maturityAmount\""));
        assert!(json.contains("\"totalInterest\""));
        assert!(json.contains("\"yearlyBreakdown\""));
        assert!(json.contains("\"totalInvested\""));
        assert!(json.contains("\"totalReturnPct\""));
        assert!(json.contains("\"type\":\"FD\""));
    }

    #[tokio::test]
    async fn calculate_handler_returns_result_json() {
        let payload = InvestmentPayload {
            name: Some("Bank FD".to_string()),
            principal: Some(100_000.0),
            rate: Some(6.5),
            time: Some(5),
            ..InvestmentPayload::default()
        };
        let response = calculate_post_handler(Json(payload)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );

        let body = body_json(response).await;
        let maturity = body["result"]["maturityAmount"].as_f64().expect("number");
        assert!((maturity - 137_008.67).abs() < 0.01);
        assert_eq!(body["result"]["yearlyBreakdown"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn calculate_handler_rejects_invalid_input() {
        let payload = InvestmentPayload {
            principal: Some(-1.0),
            ..InvestmentPayload::default()
        };
        let response = calculate_post_handler(Json(payload)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().expect("string").contains("principal"));
    }

    #[tokio::test]
    async fn compare_handler_aligns_series_across_horizons() {
        let payload: ComparePayload = serde_json::from_str(
            r#"{"investments": [
                {"name": "FD", "type": "FD", "time": 2},
                {"name": "SIP", "type": "SIP", "principal": 5000, "time": 4}
            ]}"#,
        )
        .expect("json should parse");
        let response = compare_handler(Json(payload)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["growth"]["years"].as_array().map(Vec::len), Some(4));
        assert_eq!(body["growth"]["series"][0]["amounts"][3].as_f64(), Some(0.0));
        assert_eq!(body["summary"]["highestMaturity"]["name"].as_str(), Some("SIP"));
    }

    #[tokio::test]
    async fn export_handler_returns_csv_attachment() {
        let payload: ComparePayload =
            serde_json::from_str(r#"{"investments": [{"name": "Bank FD", "rate": 6.5}]}"#)
                .expect("json should parse");
        let response = export_csv_handler(Json(payload)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"text/csv; charset=utf-8"[..])
        );

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let csv = String::from_utf8(bytes.to_vec()).expect("utf-8 csv");
        assert!(csv.starts_with("Name,Type,Invested,Returns,Maturity\n"));
        assert!(csv.contains("Bank FD,FD,100000.00,37008.67,137008.67"));
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let response = not_found_handler().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"].as_str(), Some("Not found"));
    }
}
