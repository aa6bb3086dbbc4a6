mod dates;
mod engine;
mod error;
mod types;

pub use dates::{add_months, months_between};
pub use engine::calculate_payment_strategy;
pub use error::InputError;
pub use types::{
    CalculationInput, InstallmentSummary, InvestmentBreakdownEntry, LumpSumSummary,
    MAX_INSTALLMENTS, MonthOverflow, PaymentScheduleEntry, Recommendation, Strategy,
    StrategyResult,
};
