//! Presentation of calculation results.
//!
//! The calculator never formats anything itself; callers pick a [`Render`]
//! implementation and hand it whatever `calculate_payment_strategy` returned.

mod json;
mod text;

use std::io;

use crate::core::StrategyResult;

pub use json::JsonRender;
pub use text::TextRender;

pub const EMPTY_STATE_MESSAGE: &str = "Enter your payment details to see the comparison";

pub trait Render {
    /// Write `result`, or the empty state when there is none.
    fn render(&self, result: Option<&StrategyResult>, out: &mut dyn io::Write) -> io::Result<()>;

    fn render_to_string(&self, result: Option<&StrategyResult>) -> io::Result<String> {
        let mut buf = Vec::new();
        self.render(result, &mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Format a currency value with thousands separators and cents.
pub fn format_currency(value: f64) -> String {
    format_currency_with(value, 2)
}

/// Format a currency value rounded to whole dollars.
pub fn format_currency_short(value: f64) -> String {
    format_currency_with(value, 0)
}

fn format_currency_with(value: f64, decimals: usize) -> String {
    let rounded = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match rounded.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (rounded.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && rounded.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}${grouped}.{fraction}"),
        None => format!("{sign}${grouped}"),
    }
}

/// Format a fraction as a percentage, e.g. `0.005` as `0.50%`.
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}
