use std::fmt::Display;
use std::str::FromStr;

use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::core::{CalculationInput, InputError, MonthOverflow, calculate_payment_strategy};

pub const CALCULATE_PATH: &str = "/api/calculate";
pub const HEALTH_PATH: &str = "/health";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire shape of a calculation request, shared by the server and the client.
///
/// Numeric fields accept JSON numbers or numeric strings; a blank string
/// counts as absent, so `?totalAmount=` reads as a missing total.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalculatePayload {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub total_amount: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub installments: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub on_time_fee: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub return_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lump_sum_date: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub postpone_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_overflow: Option<MonthOverflow>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberField<T> {
    Number(T),
    Text(String),
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<NumberField<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberField::Number(value)) => Ok(Some(value)),
        Some(NumberField::Text(raw)) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("{raw:?}: {e}")))
        }
    }
}

impl From<&CalculationInput> for CalculatePayload {
    fn from(input: &CalculationInput) -> Self {
        let format_date = |date: Option<NaiveDate>| {
            date.map(|d| d.format(DATE_FORMAT).to_string())
        };
        Self {
            total_amount: Some(input.total_amount),
            installments: Some(input.installments),
            on_time_fee: Some(input.on_time_fee),
            return_rate: Some(input.return_rate),
            first_payment_date: format_date(input.first_payment_date),
            lump_sum_date: format_date(input.lump_sum_date),
            postpone_months: (input.postpone_months > 0).then_some(input.postpone_months),
            month_overflow: Some(input.month_overflow),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

/// Turn a wire payload into a validated calculator input.
///
/// Omitted fee and rate default to zero; blank dates count as missing.
pub fn build_input(payload: CalculatePayload) -> Result<CalculationInput, InputError> {
    let input = CalculationInput {
        total_amount: payload.total_amount.unwrap_or(0.0),
        installments: payload.installments.unwrap_or(0),
        on_time_fee: payload.on_time_fee.unwrap_or(0.0),
        return_rate: payload.return_rate.unwrap_or(0.0),
        first_payment_date: parse_date("firstPaymentDate", payload.first_payment_date.as_deref())?,
        lump_sum_date: parse_date("lumpSumDate", payload.lump_sum_date.as_deref())?,
        postpone_months: payload.postpone_months.unwrap_or(0),
        month_overflow: payload.month_overflow.unwrap_or_default(),
    };
    input.validate()?;
    Ok(input)
}

fn parse_date(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, InputError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|e| InputError::invalid(field, format!("{raw:?}: {e}")))
}

pub fn router() -> Router {
    Router::new()
        .route(
            CALCULATE_PATH,
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route(HEALTH_PATH, get(health_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "payment strategy API listening");
    info!("local access: http://127.0.0.1:{}{CALCULATE_PATH}", config.port);

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(
    payload: Result<Query<CalculatePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => calculate_handler_impl(payload),
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

async fn calculate_post_handler(payload: Result<Json<CalculatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => calculate_handler_impl(payload),
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

fn rejected_payload(detail: &str) -> Response {
    warn!(detail, "rejected calculation payload");
    error_response(
        StatusCode::BAD_REQUEST,
        &format!("Invalid data format: {detail}"),
    )
}

fn calculate_handler_impl(payload: CalculatePayload) -> Response {
    let input = match build_input(payload) {
        Ok(input) => input,
        Err(e) => {
            warn!(field = e.field(), error = %e, "invalid calculation input");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    match calculate_payment_strategy(&input) {
        Some(result) => {
            debug!(
                strategy = %result.recommendation.strategy,
                savings = result.recommendation.savings,
                payments = result.payment_schedule.len(),
                "calculated payment strategy"
            );
            json_response(StatusCode::OK, result)
        }
        None => {
            warn!(?input, "calculation produced no result");
            error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Calculation error: payment schedule runs past the supported calendar range",
            )
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
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
fn input_from_json(json: &str) -> Result<CalculationInput, String> {
    let payload = serde_json::from_str::<CalculatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    build_input(payload).map_err(|e| e.to_string())
}
