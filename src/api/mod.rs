use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    CalculationResults, FinancialInputs, MonteCarloConfig, MonteCarloResult, SensitivityAnalysis,
    YearlyProjection, calculate_rent_vs_buy, run_monte_carlo, run_sensitivity,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum AnalysisMode {
    Projection,
    MonteCarlo,
    Sensitivity,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiAnalysisMode {
    #[serde(alias = "basic", alias = "deterministic")]
    Projection,
    #[serde(alias = "monteCarlo", alias = "monte_carlo")]
    MonteCarlo,
    #[serde(alias = "sensitivityAnalysis", alias = "sensitivity_analysis")]
    Sensitivity,
}

impl From<ApiAnalysisMode> for AnalysisMode {
    fn from(value: ApiAnalysisMode) -> Self {
        match value {
            ApiAnalysisMode::Projection => AnalysisMode::Projection,
            ApiAnalysisMode::MonteCarlo => AnalysisMode::MonteCarlo,
            ApiAnalysisMode::Sensitivity => AnalysisMode::Sensitivity,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ResponseMode {
    Projection,
    MonteCarlo,
    Sensitivity,
}

impl From<AnalysisMode> for ResponseMode {
    fn from(value: AnalysisMode) -> Self {
        match value {
            AnalysisMode::Projection => ResponseMode::Projection,
            AnalysisMode::MonteCarlo => ResponseMode::MonteCarlo,
            AnalysisMode::Sensitivity => ResponseMode::Sensitivity,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    home_price: Option<f64>,
    down_payment_percent: Option<f64>,
    current_rent: Option<f64>,
    interest_rate: Option<f64>,
    loan_term_years: Option<u32>,
    pmi_rate: Option<f64>,
    property_tax_rate: Option<f64>,
    annual_insurance: Option<f64>,
    maintenance_rate: Option<f64>,
    monthly_hoa: Option<f64>,

    rent_growth_rate: Option<f64>,
    investment_return: Option<f64>,
    inflation_rate: Option<f64>,
    home_appreciation_rate: Option<f64>,
    time_horizon_years: Option<u32>,

    marginal_tax_rate: Option<f64>,
    other_deductions: Option<f64>,
    closing_costs_percent: Option<f64>,
    selling_costs_percent: Option<f64>,

    simulations: Option<u32>,
    seed: Option<u64>,
    appreciation_volatility: Option<f64>,
    rent_growth_volatility: Option<f64>,
    investment_return_volatility: Option<f64>,

    analysis_mode: Option<ApiAnalysisMode>,
}

#[derive(Parser, Debug)]
#[command(
    name = "tenure",
    about = "Rent-vs-buy calculator (yearly projection + Monte Carlo bands + sensitivity sweeps)"
)]
struct Cli {
    #[arg(long, default_value_t = 500_000.0)]
    home_price: f64,
    #[arg(long, default_value_t = 20.0, help = "Down payment in percent of home price")]
    down_payment_percent: f64,
    #[arg(long, default_value_t = 2_500.0, help = "Current monthly rent")]
    current_rent: f64,
    #[arg(long, default_value_t = 6.5, help = "Mortgage annual interest rate in percent")]
    interest_rate: f64,
    #[arg(long, default_value_t = 30)]
    loan_term_years: u32,
    #[arg(
        long,
        default_value_t = 0.5,
        help = "Annual PMI rate in percent of the original loan, charged while loan-to-value exceeds 80%"
    )]
    pmi_rate: f64,
    #[arg(
        long,
        default_value_t = 1.2,
        help = "Annual property tax in percent of current home value"
    )]
    property_tax_rate: f64,
    #[arg(long, default_value_t = 1_500.0, help = "Annual homeowner's insurance")]
    annual_insurance: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Annual maintenance in percent of current home value"
    )]
    maintenance_rate: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly HOA dues")]
    monthly_hoa: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual rent growth in percent")]
    rent_growth_rate: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Annual return on the renter's invested savings in percent"
    )]
    investment_return: f64,
    #[arg(long, default_value_t = 2.5, help = "Expected annual inflation in percent")]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 3.5,
        help = "Annual home appreciation in percent"
    )]
    home_appreciation_rate: f64,
    #[arg(long, default_value_t = 30, help = "Years to project")]
    time_horizon_years: u32,
    #[arg(long, default_value_t = 24.0, help = "Marginal income tax rate in percent")]
    marginal_tax_rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Other itemized deductions beyond mortgage interest and property tax"
    )]
    other_deductions: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "One-time closing costs in percent of home price"
    )]
    closing_costs_percent: f64,
    #[arg(
        long,
        default_value_t = 6.0,
        help = "Selling costs in percent of sale price at the end of the horizon"
    )]
    selling_costs_percent: f64,
    #[arg(long, default_value_t = 1_000)]
    simulations: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Home appreciation volatility in absolute percentage points"
    )]
    appreciation_volatility: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Rent growth volatility in absolute percentage points"
    )]
    rent_growth_volatility: f64,
    #[arg(
        long,
        default_value_t = 15.0,
        help = "Investment return volatility in absolute percentage points"
    )]
    investment_return_volatility: f64,
}

#[derive(Copy, Clone, Debug)]
struct ApiOptions {
    mode: AnalysisMode,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: FinancialInputs,
    monte_carlo: MonteCarloConfig,
    options: ApiOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    mode: ResponseMode,
    yearly_projections: Vec<YearlyProjection>,
    break_even_year: Option<u32>,
    total_cost_rent: f64,
    total_cost_buy: f64,
    net_worth_difference: f64,
    total_tax_savings: f64,
    total_interest_paid: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    monte_carlo: Option<Vec<MonteCarloResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sensitivity: Option<Vec<SensitivityAnalysis>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: &Cli) -> Result<FinancialInputs, String> {
    if !cli.home_price.is_finite() || cli.home_price <= 0.0 {
        return Err("--home-price must be > 0".to_string());
    }

    if !(0.0..=100.0).contains(&cli.down_payment_percent) {
        return Err("--down-payment-percent must be between 0 and 100".to_string());
    }

    if !cli.current_rent.is_finite() || cli.current_rent < 0.0 {
        return Err("--current-rent must be >= 0".to_string());
    }

    if !(0.0..=100.0).contains(&cli.interest_rate) {
        return Err("--interest-rate must be between 0 and 100".to_string());
    }

    if cli.loan_term_years == 0 {
        return Err("--loan-term-years must be >= 1".to_string());
    }

    if cli.time_horizon_years == 0 {
        return Err("--time-horizon-years must be >= 1".to_string());
    }

    for (name, rate) in [
        ("--pmi-rate", cli.pmi_rate),
        ("--property-tax-rate", cli.property_tax_rate),
        ("--maintenance-rate", cli.maintenance_rate),
        ("--marginal-tax-rate", cli.marginal_tax_rate),
        ("--closing-costs-percent", cli.closing_costs_percent),
        ("--selling-costs-percent", cli.selling_costs_percent),
    ] {
        if !(0.0..=100.0).contains(&rate) {
            return Err(format!("{name} must be between 0 and 100"));
        }
    }

    for (name, amount) in [
        ("--annual-insurance", cli.annual_insurance),
        ("--monthly-hoa", cli.monthly_hoa),
        ("--other-deductions", cli.other_deductions),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    for (name, rate) in [
        ("--rent-growth-rate", cli.rent_growth_rate),
        ("--investment-return", cli.investment_return),
        ("--inflation-rate", cli.inflation_rate),
        ("--home-appreciation-rate", cli.home_appreciation_rate),
    ] {
        if !rate.is_finite() || rate <= -100.0 {
            return Err(format!("{name} must be > -100"));
        }
    }

    Ok(FinancialInputs {
        home_price: cli.home_price,
        down_payment_percent: cli.down_payment_percent,
        current_rent: cli.current_rent,
        interest_rate: cli.interest_rate,
        loan_term_years: cli.loan_term_years,
        pmi_rate: cli.pmi_rate,
        property_tax_rate: cli.property_tax_rate,
        annual_insurance: cli.annual_insurance,
        maintenance_rate: cli.maintenance_rate,
        monthly_hoa: cli.monthly_hoa,
        rent_growth_rate: cli.rent_growth_rate,
        investment_return: cli.investment_return,
        inflation_rate: cli.inflation_rate,
        home_appreciation_rate: cli.home_appreciation_rate,
        time_horizon_years: cli.time_horizon_years,
        marginal_tax_rate: cli.marginal_tax_rate,
        other_deductions: cli.other_deductions,
        closing_costs_percent: cli.closing_costs_percent,
        selling_costs_percent: cli.selling_costs_percent,
    })
}

fn build_monte_carlo_config(cli: &Cli) -> Result<MonteCarloConfig, String> {
    if cli.simulations == 0 {
        return Err("--simulations must be > 0".to_string());
    }

    for (name, volatility) in [
        ("--appreciation-volatility", cli.appreciation_volatility),
        ("--rent-growth-volatility", cli.rent_growth_volatility),
        (
            "--investment-return-volatility",
            cli.investment_return_volatility,
        ),
    ] {
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    Ok(MonteCarloConfig {
        simulations: cli.simulations,
        seed: cli.seed,
        appreciation_volatility: cli.appreciation_volatility,
        rent_growth_volatility: cli.rent_growth_volatility,
        investment_return_volatility: cli.investment_return_volatility,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Rent-vs-buy HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let mut results = calculate_rent_vs_buy(&request.inputs);
    let sensitivity = match request.options.mode {
        AnalysisMode::Projection => None,
        AnalysisMode::MonteCarlo => {
            results.monte_carlo = Some(run_monte_carlo(&request.inputs, &request.monte_carlo));
            None
        }
        AnalysisMode::Sensitivity => Some(run_sensitivity(&request.inputs)),
    };

    let response = build_simulate_response(results, request.options.mode, sensitivity);
    json_response(StatusCode::OK, response)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
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
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();
    let mut options = ApiOptions {
        mode: AnalysisMode::Projection,
    };

    if let Some(v) = payload.home_price {
        cli.home_price = v;
    }
    if let Some(v) = payload.down_payment_percent {
        cli.down_payment_percent = v;
    }
    if let Some(v) = payload.current_rent {
        cli.current_rent = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.loan_term_years {
        cli.loan_term_years = v;
    }
    if let Some(v) = payload.pmi_rate {
        cli.pmi_rate = v;
    }
    if let Some(v) = payload.property_tax_rate {
        cli.property_tax_rate = v;
    }
    if let Some(v) = payload.annual_insurance {
        cli.annual_insurance = v;
    }
    if let Some(v) = payload.maintenance_rate {
        cli.maintenance_rate = v;
    }
    if let Some(v) = payload.monthly_hoa {
        cli.monthly_hoa = v;
    }

    if let Some(v) = payload.rent_growth_rate {
        cli.rent_growth_rate = v;
    }
    if let Some(v) = payload.investment_return {
        cli.investment_return = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.home_appreciation_rate {
        cli.home_appreciation_rate = v;
    }
    if let Some(v) = payload.time_horizon_years {
        cli.time_horizon_years = v;
    }

    if let Some(v) = payload.marginal_tax_rate {
        cli.marginal_tax_rate = v;
    }
    if let Some(v) = payload.other_deductions {
        cli.other_deductions = v;
    }
    if let Some(v) = payload.closing_costs_percent {
        cli.closing_costs_percent = v;
    }
    if let Some(v) = payload.selling_costs_percent {
        cli.selling_costs_percent = v;
    }

    if let Some(v) = payload.simulations {
        cli.simulations = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }
    if let Some(v) = payload.appreciation_volatility {
        cli.appreciation_volatility = v;
    }
    if let Some(v) = payload.rent_growth_volatility {
        cli.rent_growth_volatility = v;
    }
    if let Some(v) = payload.investment_return_volatility {
        cli.investment_return_volatility = v;
    }

    if let Some(v) = payload.analysis_mode {
        options.mode = v.into();
    }

    let inputs = build_inputs(&cli)?;
    let monte_carlo = build_monte_carlo_config(&cli)?;

    Ok(ApiRequest {
        inputs,
        monte_carlo,
        options,
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        home_price: 500_000.0,
        down_payment_percent: 20.0,
        current_rent: 2_500.0,
        interest_rate: 6.5,
        loan_term_years: 30,
        pmi_rate: 0.5,
        property_tax_rate: 1.2,
        annual_insurance: 1_500.0,
        maintenance_rate: 1.0,
        monthly_hoa: 0.0,
        rent_growth_rate: 3.0,
        investment_return: 7.0,
        inflation_rate: 2.5,
        home_appreciation_rate: 3.5,
        time_horizon_years: 30,
        marginal_tax_rate: 24.0,
        other_deductions: 0.0,
        closing_costs_percent: 3.0,
        selling_costs_percent: 6.0,
        simulations: 1_000,
        seed: 42,
        appreciation_volatility: 2.0,
        rent_growth_volatility: 1.0,
        investment_return_volatility: 15.0,
    }
}

fn build_simulate_response(
    results: CalculationResults,
    mode: AnalysisMode,
    sensitivity: Option<Vec<SensitivityAnalysis>>,
) -> SimulateResponse {
    SimulateResponse {
        mode: mode.into(),
        yearly_projections: results.yearly_projections,
        break_even_year: results.break_even_year,
        total_cost_rent: results.total_cost_rent,
        total_cost_buy: results.total_cost_buy,
        net_worth_difference: results.net_worth_difference,
        total_tax_savings: results.total_tax_savings,
        total_interest_paid: results.total_interest_paid,
        monte_carlo: results.monte_carlo,
        sensitivity,
    }
}
