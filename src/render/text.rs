use std::io;

use super::{
    EMPTY_STATE_MESSAGE, Render, format_currency, format_currency_short, format_percentage,
};
use crate::core::StrategyResult;

const DISPLAY_DATE_FORMAT: &str = "%b %d, %Y";

/// Plain-text report for terminals.
#[derive(Debug, Clone, Copy)]
pub struct TextRender {
    /// Include the per-payment and per-month tables after the summary.
    pub details: bool,
}

impl Default for TextRender {
    fn default() -> Self {
        Self { details: true }
    }
}

impl Render for TextRender {
    fn render(&self, result: Option<&StrategyResult>, out: &mut dyn io::Write) -> io::Result<()> {
        let Some(result) = result else {
            return writeln!(out, "{EMPTY_STATE_MESSAGE}");
        };

        write_summary(result, out)?;
        if self.details {
            write_schedule(result, out)?;
            write_breakdown(result, out)?;
        }
        Ok(())
    }
}

fn write_summary(result: &StrategyResult, out: &mut dyn io::Write) -> io::Result<()> {
    writeln!(
        out,
        "Recommended strategy: {} (saves {})",
        result.recommendation.strategy,
        format_currency_short(result.recommendation.savings)
    )?;

    let installment = &result.installment;
    writeln!(out)?;
    writeln!(out, "Installment payment plan")?;
    write_row(out, "Total amount", installment.total_amount)?;
    write_row(out, "One-time fee", installment.total_fees)?;
    write_row(out, "Investment returns", installment.investment_returns)?;
    write_row(out, "Net cost", installment.net_cost)?;

    let lump_sum = &result.lump_sum;
    writeln!(out)?;
    writeln!(out, "Lump sum payment")?;
    write_row(out, "Total amount", lump_sum.total_amount)?;
    write_row(out, "One-time fee", lump_sum.fees)?;
    write_row(out, "Opportunity cost", lump_sum.opportunity_cost)?;
    write_row(out, "Net cost", lump_sum.net_cost)
}

fn write_row(out: &mut dyn io::Write, label: &str, value: f64) -> io::Result<()> {
    writeln!(out, "  {label:<20}{:>16}", format_currency(value))
}

fn write_schedule(result: &StrategyResult, out: &mut dyn io::Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Payment schedule")?;
    for payment in &result.payment_schedule {
        write!(
            out,
            "  Payment {:>3}  {}  {:>14}",
            payment.payment_number,
            payment.date.format(DISPLAY_DATE_FORMAT),
            format_currency(payment.amount)
        )?;
        if payment.fee > 0.0 {
            write!(out, "  +{} fee", format_currency(payment.fee))?;
        }
        if let Some(covered) = payment.accumulated_payments {
            write!(out, "  ({covered} payments combined)")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_breakdown(result: &StrategyResult, out: &mut dyn io::Write) -> io::Result<()> {
    if result.investment_breakdown.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Monthly investment returns")?;
    for item in &result.investment_breakdown {
        let rate = if item.balance != 0.0 {
            item.monthly_return / item.balance
        } else {
            0.0
        };
        writeln!(
            out,
            "  Month {:>3}  {} x {} = {}  (cumulative {})",
            item.month,
            format_currency(item.balance),
            format_percentage(rate),
            format_currency(item.monthly_return),
            format_currency(item.cumulative_return)
        )?;
    }
    Ok(())
}
