mod engine;
mod monte_carlo;
mod sensitivity;
mod types;

pub use engine::{calculate_rent_vs_buy, monthly_mortgage_payment};
pub use monte_carlo::run_monte_carlo;
pub use sensitivity::run_sensitivity;
pub use types::{
    CalculationResults, FinancialInputs, MonteCarloConfig, MonteCarloResult, PercentileBand,
    SensitivityAnalysis, YearlyProjection,
};
