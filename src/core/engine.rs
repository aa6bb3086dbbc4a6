use chrono::NaiveDate;

use super::dates::{add_months, months_between};
use super::types::{
    CalculationInput, InstallmentSummary, InvestmentBreakdownEntry, LumpSumSummary,
    MAX_INSTALLMENTS, MonthOverflow, PaymentScheduleEntry, Recommendation, Strategy,
    StrategyResult,
};

#[derive(Debug, Clone, Copy)]
struct PlanTerms {
    total_amount: f64,
    installments: u32,
    installment_amount: f64,
    on_time_fee: f64,
    monthly_rate: f64,
    postpone_months: u32,
}

impl PlanTerms {
    fn balance_after(self, payments_made: u32) -> f64 {
        self.total_amount - self.installment_amount * f64::from(payments_made)
    }
}

#[derive(Debug, Clone)]
struct InvestmentAccrual {
    total_returns: f64,
    breakdown: Vec<InvestmentBreakdownEntry>,
}

/// Compare paying by installments against paying a lump sum.
///
/// Returns `None` when a required field is missing or zero, when the
/// installment count exceeds [`MAX_INSTALLMENTS`], and when a schedule date
/// would fall outside the representable calendar.
pub fn calculate_payment_strategy(input: &CalculationInput) -> Option<StrategyResult> {
    if input.missing_field().is_some() || input.installments > MAX_INSTALLMENTS {
        return None;
    }
    let first_payment_date = input.first_payment_date?;
    let lump_sum_date = input.lump_sum_date?;

    let months_to_lump_sum = months_between(lump_sum_date, first_payment_date);
    let terms = PlanTerms {
        total_amount: input.total_amount,
        installments: input.installments,
        installment_amount: input.total_amount / f64::from(input.installments),
        on_time_fee: input.on_time_fee,
        monthly_rate: input.return_rate / 100.0 / 12.0,
        postpone_months: effective_postponement(
            input.postpone_months,
            months_to_lump_sum,
            input.installments,
        ),
    };

    let payment_schedule =
        build_payment_schedule(terms, first_payment_date, input.month_overflow)?;
    let accrual = accrue_investment_returns(terms);

    let total_fees = terms.on_time_fee;
    let installment_net_cost = terms.total_amount + total_fees - accrual.total_returns;

    let opportunity_cost = terms.total_amount
        * (input.return_rate / 100.0)
        * (f64::from(months_to_lump_sum) / 12.0);
    let lump_sum_net_cost = terms.total_amount + opportunity_cost;

    Some(StrategyResult {
        recommendation: recommend(installment_net_cost, lump_sum_net_cost),
        installment: InstallmentSummary {
            total_amount: terms.total_amount,
            total_fees,
            investment_returns: accrual.total_returns,
            net_cost: installment_net_cost,
        },
        lump_sum: LumpSumSummary {
            total_amount: terms.total_amount,
            fees: 0.0,
            opportunity_cost,
            net_cost: lump_sum_net_cost,
        },
        payment_schedule,
        investment_breakdown: accrual.breakdown,
    })
}

/// Postponement can't outlast the lump-sum date and must leave one payment.
fn effective_postponement(requested: u32, months_to_lump_sum: i32, installments: u32) -> u32 {
    let window = u32::try_from(months_to_lump_sum.max(0)).unwrap_or(0);
    requested
        .min(window)
        .min(installments.saturating_sub(1))
}

fn build_payment_schedule(
    terms: PlanTerms,
    first_payment_date: NaiveDate,
    overflow: MonthOverflow,
) -> Option<Vec<PaymentScheduleEntry>> {
    let postponed = terms.postpone_months;
    let payments = terms.installments - postponed;
    let mut schedule = Vec::with_capacity(payments as usize);

    for i in 0..payments {
        let date = add_months(first_payment_date, i + postponed, overflow)?;
        let (amount, fee, accumulated_payments) = if i == 0 {
            let covered = postponed + 1;
            (
                terms.installment_amount * f64::from(covered),
                terms.on_time_fee,
                (covered > 1).then_some(covered),
            )
        } else {
            (terms.installment_amount, 0.0, None)
        };

        schedule.push(PaymentScheduleEntry {
            payment_number: i + 1,
            date,
            amount,
            fee,
            remaining_balance: terms.balance_after(i + 1 + postponed).max(0.0),
            accumulated_payments,
        });
    }

    Some(schedule)
}

fn accrue_investment_returns(terms: PlanTerms) -> InvestmentAccrual {
    let mut total_returns = 0.0;
    let mut breakdown = Vec::new();
    let mut record = |month: u32, balance: f64| {
        let monthly_return = balance * terms.monthly_rate;
        total_returns += monthly_return;
        breakdown.push(InvestmentBreakdownEntry {
            month,
            balance,
            monthly_return,
            cumulative_return: total_returns,
        });
    };

    // While postponed, the whole obligation stays invested.
    for month in 0..terms.postpone_months {
        record(month + 1, terms.total_amount);
    }

    // The final payment clears the balance, so it never earns a month.
    for month in terms.postpone_months..terms.installments.saturating_sub(1) {
        let balance = terms.balance_after(month + 1);
        if balance > 0.0 {
            record(month + 1, balance);
        }
    }

    InvestmentAccrual {
        total_returns,
        breakdown,
    }
}

fn recommend(installment_net_cost: f64, lump_sum_net_cost: f64) -> Recommendation {
    let strategy = if lump_sum_net_cost < installment_net_cost {
        Strategy::LumpSum
    } else {
        Strategy::Installment
    };
    Recommendation {
        strategy,
        savings: (installment_net_cost - lump_sum_net_cost).abs(),
    }
}
