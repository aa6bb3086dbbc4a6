use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::InputError;

/// Upper bound on the installment count. Boundary validation rejects larger
/// counts and the calculator yields no result for them.
pub const MAX_INSTALLMENTS: u32 = 1200;

/// How a schedule date resolves when the target month is shorter than the
/// first payment's day of month.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthOverflow {
    /// Spill the missing days into the following month (Jan 31 + 1 month = Mar 3 in 2023).
    #[default]
    Rollover,
    /// Stop at the last day of the target month (Jan 31 + 1 month = Feb 28 in 2023).
    Clamp,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationInput {
    pub total_amount: f64,
    pub installments: u32,
    pub on_time_fee: f64,
    /// Annual return in percent, e.g. `6.0` for 6%.
    pub return_rate: f64,
    pub first_payment_date: Option<NaiveDate>,
    pub lump_sum_date: Option<NaiveDate>,
    /// Leading installments deferred into the first actual payment.
    pub postpone_months: u32,
    pub month_overflow: MonthOverflow,
}

impl CalculationInput {
    /// Name of the first required field that is absent or zero, using wire names.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.total_amount == 0.0 || self.total_amount.is_nan() {
            return Some("totalAmount");
        }
        if self.installments == 0 {
            return Some("installments");
        }
        if self.first_payment_date.is_none() {
            return Some("firstPaymentDate");
        }
        if self.lump_sum_date.is_none() {
            return Some("lumpSumDate");
        }
        None
    }

    /// Boundary checks applied before calculating on behalf of a user.
    ///
    /// The calculator itself never calls this; it only needs the required
    /// fields to be present.
    pub fn validate(&self) -> Result<(), InputError> {
        if let Some(field) = self.missing_field() {
            return Err(InputError::Missing(field));
        }

        if !self.total_amount.is_finite() || self.total_amount < 0.0 {
            return Err(InputError::invalid(
                "totalAmount",
                "must be a positive number",
            ));
        }

        if self.installments > MAX_INSTALLMENTS {
            return Err(InputError::invalid(
                "installments",
                format!("must be <= {MAX_INSTALLMENTS}"),
            ));
        }

        if !self.on_time_fee.is_finite() || self.on_time_fee < 0.0 {
            return Err(InputError::invalid("onTimeFee", "must be >= 0"));
        }

        if !self.return_rate.is_finite() {
            return Err(InputError::invalid("returnRate", "must be a finite number"));
        }

        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Strategy {
    #[serde(rename = "Lump Sum")]
    LumpSum,
    Installment,
}

impl Strategy {
    pub fn label(self) -> &'static str {
        match self {
            Strategy::LumpSum => "Lump Sum",
            Strategy::Installment => "Installment",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Recommendation {
    pub strategy: Strategy,
    pub savings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentSummary {
    pub total_amount: f64,
    pub total_fees: f64,
    pub investment_returns: f64,
    pub net_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LumpSumSummary {
    pub total_amount: f64,
    pub fees: f64,
    pub opportunity_cost: f64,
    pub net_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentScheduleEntry {
    pub payment_number: u32,
    pub date: NaiveDate,
    pub amount: f64,
    pub fee: f64,
    pub remaining_balance: f64,
    /// Set only on a combined payment covering postponed installments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accumulated_payments: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentBreakdownEntry {
    pub month: u32,
    pub balance: f64,
    pub monthly_return: f64,
    pub cumulative_return: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub recommendation: Recommendation,
    pub installment: InstallmentSummary,
    pub lump_sum: LumpSumSummary,
    pub payment_schedule: Vec<PaymentScheduleEntry>,
    pub investment_breakdown: Vec<InvestmentBreakdownEntry>,
}
