//! AWS Lambda handler for loan schedules
//!
//! Accepts the calculator's fields as JSON and returns the schedule, the
//! summary and the effective annual cost. Incomplete input returns an empty
//! schedule, mirroring an interactive form that recomputes on every change.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use loan_amortization::{
    amortization::{effective_annual_rate, AmortizationEngine, AmortizationSummary, PaymentRecord},
    loan::lenient_number,
    Currency, FallbackRate, LoanError, LoanInput, RatePeriod, TermUnit,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Input fields, as the calculator form holds them.
///
/// Numeric fields accept numbers or text; text that does not parse counts as
/// a missing value, so a half-typed form gets an empty schedule, not a 400.
#[derive(Debug, Deserialize)]
pub struct LoanRequest {
    #[serde(default, deserialize_with = "lenient_number")]
    pub principal: Option<f64>,

    /// Term in `term_unit` (default: years)
    #[serde(default, deserialize_with = "lenient_number")]
    pub term: Option<f64>,

    #[serde(default)]
    pub term_unit: TermUnit,

    /// Term already in months; takes precedence over `term`
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_months: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub margin_percent: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub index_percent: Option<f64>,

    #[serde(default)]
    pub tiers: Vec<RatePeriod>,

    #[serde(default)]
    pub currency: Currency,

    /// Set to false to get the summary only
    #[serde(default = "default_include_schedule")]
    pub include_schedule: bool,
}

fn default_include_schedule() -> bool { true }

impl LoanRequest {
    fn to_input(&self) -> LoanInput {
        let total_months = self
            .total_months
            .map(|months| months.round() as i64)
            .or_else(|| self.term.and_then(|t| self.term_unit.to_months(t)))
            .unwrap_or(0);

        let fallback = FallbackRate::new(
            self.margin_percent.unwrap_or(f64::NAN),
            self.index_percent.unwrap_or(f64::NAN),
        )
        .with_reference(self.currency.reference_rate());

        LoanInput::new(self.principal.unwrap_or(f64::NAN), total_months, fallback)
            .with_tiers(self.tiers.clone())
    }
}

#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub currency: &'static str,
    pub reference_rate: &'static str,
    pub variable_rate_percent: Option<f64>,
    pub total_months: i64,
    pub months_scheduled: usize,
    pub summary: AmortizationSummary,
    pub effective_annual_rate_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<PaymentRecord>>,
    pub execution_time_ms: u64,
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message }).to_string();
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(body))?)
}

fn json_response(body: &LoanResponse) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

/// Run the request through the engine. Errors carry the HTTP status.
fn build_response(request: &LoanRequest, start: Instant) -> Result<LoanResponse, (u16, String)> {
    let input = request.to_input();
    let result = match AmortizationEngine::default().run(&input) {
        Ok(result) => result,
        Err(LoanError::InvalidInput(msg)) => return Err((400, msg)),
        Err(e) => return Err((500, e.to_string())),
    };

    let effective = effective_annual_rate(input.principal, &result.schedule);
    let variable_rate = input.fallback.annual_rate_percent();

    Ok(LoanResponse {
        currency: request.currency.code(),
        reference_rate: input.fallback.reference.label(),
        variable_rate_percent: variable_rate.is_finite().then_some(variable_rate),
        total_months: input.total_months,
        months_scheduled: result.months(),
        summary: result.summary.clone(),
        effective_annual_rate_pct: effective.map(|r| r * 100.0),
        schedule: request.include_schedule.then(|| result.schedule),
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let start = Instant::now();

    if event.method().as_str() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)?);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let request: LoanRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
    };

    match build_response(&request, start) {
        Ok(response) => {
            log::info!(
                "scheduled {} of {} months in {} ms",
                response.months_scheduled,
                response.total_months,
                response.execution_time_ms
            );
            json_response(&response)
        }
        Err((status, message)) => {
            log::warn!("rejected request ({}): {}", status, message);
            error_response(status, &message)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_to_soft_empty() {
        let request: LoanRequest = serde_json::from_str("{}").unwrap();
        let input = request.to_input();

        assert!(!input.is_computable());
        assert!(request.include_schedule);
    }

    #[test]
    fn test_request_to_input() {
        let body = r#"{
            "principal": 100000,
            "term": 20,
            "margin_percent": 3,
            "index_percent": 2.5,
            "currency": "ALL",
            "tiers": [
                {"duration_months": 12, "annual_rate_percent": 1.0, "enabled": true},
                {"duration_months": null, "annual_rate_percent": 2.0}
            ]
        }"#;
        let request: LoanRequest = serde_json::from_str(body).unwrap();
        let input = request.to_input();

        assert_eq!(input.total_months, 240);
        assert_eq!(input.tiers.len(), 2);
        assert_eq!(input.promotional_months(), 12.0);
        assert_eq!(input.fallback.reference.label(), "Treasury bonds");
    }

    #[test]
    fn test_total_months_overrides_term() {
        let request: LoanRequest =
            serde_json::from_str(r#"{"principal": 1000, "term": 5, "total_months": -3}"#).unwrap();
        assert_eq!(request.to_input().total_months, -3);
    }

    #[test]
    fn test_total_months_text_and_fraction() {
        let request: LoanRequest =
            serde_json::from_str(r#"{"principal": "1000", "total_months": "12"}"#).unwrap();
        assert_eq!(request.to_input().total_months, 12);
        assert_eq!(request.principal, Some(1000.0));

        let request: LoanRequest = serde_json::from_str(r#"{"total_months": 12.5}"#).unwrap();
        assert_eq!(request.to_input().total_months, 13);
    }

    #[test]
    fn test_text_tier_field_is_skipped() {
        let body = r#"{
            "principal": 100000,
            "total_months": 240,
            "margin_percent": "3",
            "index_percent": 2.5,
            "tiers": [{"duration_months": "12a", "annual_rate_percent": 1.0}]
        }"#;
        let request: LoanRequest = serde_json::from_str(body).unwrap();
        let response = build_response(&request, Instant::now()).unwrap();

        assert_eq!(response.months_scheduled, 240);
        let schedule = response.schedule.unwrap();
        assert!((schedule[0].annual_rate_percent - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_text_principal_gives_empty_schedule() {
        let body = r#"{"principal": "abc", "term": 20, "margin_percent": 3, "index_percent": 2.5}"#;
        let request: LoanRequest = serde_json::from_str(body).unwrap();
        let response = build_response(&request, Instant::now()).unwrap();

        assert_eq!(response.months_scheduled, 0);
        assert_eq!(response.summary.total_payment, 0.0);
        assert_eq!(response.schedule.map(|s| s.len()), Some(0));
    }

    #[test]
    fn test_fractional_tier_duration_accepted() {
        let body = r#"{
            "principal": 100000,
            "total_months": 240,
            "margin_percent": 3,
            "index_percent": 2.5,
            "tiers": [{"duration_months": 12.5, "annual_rate_percent": 1.0}]
        }"#;
        let request: LoanRequest = serde_json::from_str(body).unwrap();
        let schedule = build_response(&request, Instant::now()).unwrap().schedule.unwrap();

        assert!((schedule[11].annual_rate_percent - 1.0).abs() < 1e-12);
        assert!((schedule[12].annual_rate_percent - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_terms_are_bad_requests() {
        for body in [
            r#"{"principal": 1000, "total_months": 4000000000, "margin_percent": 3, "index_percent": 2.5}"#,
            r#"{"principal": 1000, "total_months": -3, "margin_percent": 3, "index_percent": 2.5}"#,
        ] {
            let request: LoanRequest = serde_json::from_str(body).unwrap();
            let (status, _) = build_response(&request, Instant::now()).unwrap_err();
            assert_eq!(status, 400);
        }
    }
}
