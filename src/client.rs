//! HTTP client for a remote `/api/calculate` endpoint.
//!
//! Failures are reported once and never retried; the caller decides whether
//! to submit again.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::api::{CALCULATE_PATH, CalculatePayload};
use crate::core::{CalculationInput, StrategyResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Calculation service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status; `message` is the server's `error` field when present.
    #[error("{message}")]
    Server { status: StatusCode, message: String },

    #[error("Unexpected response from calculation service: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct RemoteCalculator {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteCalculator {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{CALCULATE_PATH}", self.base_url)
    }

    pub async fn calculate(&self, input: &CalculationInput) -> Result<StrategyResult, RemoteError> {
        let endpoint = self.endpoint();
        debug!(%endpoint, "requesting remote calculation");

        let resp = self
            .http
            .post(&endpoint)
            .json(&CalculatePayload::from(input))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        debug!(%status, bytes = body.len(), "remote calculation responded");

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("Server returned status {status}"));
        Err(RemoteError::Server { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::core::{MonthOverflow, Strategy, calculate_payment_strategy};
    use chrono::NaiveDate;
    use tokio::net::TcpListener;

    fn sample_input() -> CalculationInput {
        CalculationInput {
            total_amount: 12_000.0,
            installments: 12,
            on_time_fee: 50.0,
            return_rate: 6.0,
            first_payment_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            lump_sum_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            postpone_months: 1,
            month_overflow: MonthOverflow::Clamp,
        }
    }

    async fn spawn_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router()).await.expect("server");
        });
        format!("http://{addr}/")
    }

    #[test]
    fn endpoint_joins_base_url_without_double_slash() {
        let client = RemoteCalculator::new("http://calc.local:5500/").expect("client");
        assert_eq!(client.endpoint(), "http://calc.local:5500/api/calculate");
    }

    #[tokio::test]
    async fn remote_result_matches_local_calculation() {
        let base_url = spawn_server().await;
        let client = RemoteCalculator::new(&base_url).expect("client");
        let input = sample_input();

        let remote = client.calculate(&input).await.expect("remote result");
        let local = calculate_payment_strategy(&input).expect("local result");

        assert_eq!(remote.recommendation.strategy, Strategy::Installment);
        assert!((remote.installment.net_cost - local.installment.net_cost).abs() <= 1e-6);
        assert!((remote.lump_sum.net_cost - local.lump_sum.net_cost).abs() <= 1e-6);
        assert_eq!(remote.payment_schedule.len(), local.payment_schedule.len());
        assert_eq!(
            remote.investment_breakdown.len(),
            local.investment_breakdown.len()
        );
        for (r, l) in remote.payment_schedule.iter().zip(&local.payment_schedule) {
            assert_eq!(r.date, l.date);
            assert!((r.remaining_balance - l.remaining_balance).abs() <= 1e-6);
        }
        assert_eq!(remote.payment_schedule[0].accumulated_payments, Some(2));
    }

    #[tokio::test]
    async fn server_error_message_is_surfaced() {
        let base_url = spawn_server().await;
        let client = RemoteCalculator::new(&base_url).expect("client");
        let mut input = sample_input();
        input.lump_sum_date = None;

        let err = client.calculate(&input).await.expect_err("must fail");
        match &err {
            RemoteError::Server { status, message } => {
                assert_eq!(*status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Missing required: lumpSumDate");
            }
            other => panic!("expected server error, got {other:?}"),
        }
        assert_eq!(err.to_string(), "Missing required: lumpSumDate");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let client = RemoteCalculator::new(&format!("http://{addr}")).expect("client");
        let err = client
            .calculate(&sample_input())
            .await
            .expect_err("nothing is listening");
        assert!(matches!(err, RemoteError::Http(_)));
        assert!(err.to_string().starts_with("Calculation service unreachable"));
    }
}
