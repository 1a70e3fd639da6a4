use serde::Serialize;

/// One complete scenario description. All rate fields are percentages
/// (`7.0` means 7%), matching what the web form collects.
#[derive(Debug, Clone)]
pub struct FinancialInputs {
    pub home_price: f64,
    pub down_payment_percent: f64,
    /// Current monthly rent.
    pub current_rent: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,
    pub pmi_rate: f64,
    pub property_tax_rate: f64,
    pub annual_insurance: f64,
    pub maintenance_rate: f64,
    pub monthly_hoa: f64,
    pub rent_growth_rate: f64,
    pub investment_return: f64,
    pub inflation_rate: f64,
    pub home_appreciation_rate: f64,
    pub time_horizon_years: u32,
    pub marginal_tax_rate: f64,
    pub other_deductions: f64,
    pub closing_costs_percent: f64,
    pub selling_costs_percent: f64,
}

/// Monte Carlo sampler settings. Volatilities are standard deviations in
/// absolute percentage points applied to the respective rate input.
#[derive(Debug, Clone, Copy)]
pub struct MonteCarloConfig {
    pub simulations: u32,
    pub seed: u64,
    pub appreciation_volatility: f64,
    pub rent_growth_volatility: f64,
    pub investment_return_volatility: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyProjection {
    pub year: u32,
    pub annual_rent: f64,
    pub total_rent_paid: f64,
    pub mortgage_payment: f64,
    pub pmi: f64,
    pub property_tax: f64,
    pub insurance: f64,
    pub maintenance: f64,
    pub hoa: f64,
    pub total_ownership_cost: f64,
    pub cumulative_ownership_cost: f64,
    pub home_value: f64,
    pub mortgage_balance: f64,
    pub home_equity: f64,
    pub mortgage_interest: f64,
    pub deductible_property_tax: f64,
    pub tax_savings: f64,
    pub investment_value: f64,
    pub rent_net_worth: f64,
    pub buy_net_worth: f64,
    pub annual_cash_outflow_rent: f64,
    pub annual_cash_outflow_buy: f64,
    pub selling_costs: f64,
    pub net_sale_proceeds: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResults {
    pub yearly_projections: Vec<YearlyProjection>,
    pub break_even_year: Option<u32>,
    pub total_cost_rent: f64,
    pub total_cost_buy: f64,
    pub net_worth_difference: f64,
    pub total_tax_savings: f64,
    pub total_interest_paid: f64,
    pub monte_carlo: Option<Vec<MonteCarloResult>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileBand {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloResult {
    pub year: u32,
    pub rent_net_worth: PercentileBand,
    pub buy_net_worth: PercentileBand,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityAnalysis {
    pub parameter: String,
    pub values: Vec<f64>,
    pub break_even_years: Vec<Option<u32>>,
    pub net_worth_differences: Vec<f64>,
}
