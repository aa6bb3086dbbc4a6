use std::io;

use super::Render;
use crate::core::StrategyResult;

/// Pretty-printed JSON in the same shape the HTTP API returns; `null` when empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRender;

impl Render for JsonRender {
    fn render(&self, result: Option<&StrategyResult>, out: &mut dyn io::Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, &result)?;
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CalculationInput, calculate_payment_strategy};
    use chrono::NaiveDate;

    #[test]
    fn empty_state_is_null() {
        let text = JsonRender.render_to_string(None).expect("render");
        assert_eq!(text, "null\n");
    }

    #[test]
    fn result_uses_wire_field_names() {
        let input = CalculationInput {
            total_amount: 1_200.0,
            installments: 3,
            on_time_fee: 10.0,
            return_rate: 5.0,
            first_payment_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            lump_sum_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..CalculationInput::default()
        };
        let result = calculate_payment_strategy(&input).expect("result");

        let text = JsonRender.render_to_string(Some(&result)).expect("render");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["recommendation"]["strategy"], "Lump Sum");
        assert_eq!(value["paymentSchedule"][2]["date"], "2024-07-01");
        assert!(value["lumpSum"].get("opportunityCost").is_some());
        assert!(value["installment"].get("totalFees").is_some());
    }
}
