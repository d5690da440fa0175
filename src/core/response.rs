use serde::Serialize;
use tracing::warn;

use super::engine::Estimator;
use super::fra::resolve_fra_str;
use super::types::{EstimateRequest, EstimateResult};

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;

/// Uniform body: `data` and `error` are always both present, one of them null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateResponse {
    pub status_code: u16,
    pub body: Envelope<EstimateResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FraBody {
    Age([u32; 2]),
    Error(Envelope<[u32; 2]>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraResponse {
    pub status_code: u16,
    pub body: FraBody,
}

pub fn build_response(request: &EstimateRequest, estimator: &Estimator<'_>) -> EstimateResponse {
    let result = request
        .normalize(estimator.today())
        .and_then(|inputs| estimator.estimate_inputs(&inputs));

    match result {
        Ok(data) => EstimateResponse {
            status_code: STATUS_OK,
            body: Envelope::ok(data),
        },
        Err(err) => {
            warn!(code = err.code(), error = %err, "rejected estimate request");
            EstimateResponse {
                status_code: STATUS_BAD_REQUEST,
                body: Envelope::err(err.to_string()),
            }
        }
    }
}

pub fn build_fra_response(raw_birth_year: &str) -> FraResponse {
    match resolve_fra_str(raw_birth_year) {
        Ok(fra) => FraResponse {
            status_code: STATUS_OK,
            body: FraBody::Age(fra.as_pair()),
        },
        Err(err) => {
            warn!(code = err.code(), error = %err, "rejected retirement age request");
            FraResponse {
                status_code: STATUS_BAD_REQUEST,
                body: FraBody::Error(Envelope::err(err.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EstimatorConfig;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
    }

    fn request(dob: Option<&str>, income: Option<&str>) -> EstimateRequest {
        EstimateRequest {
            dob: dob.map(str::to_string),
            income: income.map(str::to_string),
            ..EstimateRequest::default()
        }
    }

    fn respond(request: &EstimateRequest) -> EstimateResponse {
        let config = EstimatorConfig::default();
        let estimator = Estimator::new(&config, today());
        build_response(request, &estimator)
    }

    #[test]
    fn valid_request_returns_data_and_null_error() {
        let response = respond(&request(Some("1955-05-05"), Some("40000")));
        assert_eq!(response.status_code, STATUS_OK);

        let json = serde_json::to_value(&response.body).expect("body should serialize");
        let object = json.as_object().expect("body is an object");
        assert!(object.contains_key("data"));
        assert!(object.contains_key("error"));
        assert_eq!(object["error"], Value::Null);
        assert_eq!(json["data"]["fullRetirementAge"]["years"], 66);
        assert_eq!(json["data"]["benefits"][0]["claimingAge"], "62");
        assert_eq!(json["data"]["benefitsByAge"]["age 66"], 1_727);
    }

    #[test]
    fn missing_fields_return_400() {
        for (dob, income, expected) in [
            (None, None, "dob, income"),
            (None, Some("40000"), "dob"),
            (Some("1955-05-05"), None, "income"),
            (Some(""), Some(" "), "dob, income"),
        ] {
            let response = respond(&request(dob, income));
            assert_eq!(response.status_code, STATUS_BAD_REQUEST);
            assert_eq!(response.body.data, None);
            let error = response.body.error.expect("error message");
            assert!(error.ends_with(expected), "{error}");
        }
    }

    #[test]
    fn malformed_fields_return_400_naming_the_field() {
        let bad_income = respond(&request(Some("1955-05-05"), Some("z")));
        assert_eq!(bad_income.status_code, STATUS_BAD_REQUEST);
        assert!(
            bad_income
                .body
                .error
                .as_deref()
                .is_some_and(|e| e.contains("income"))
        );

        let bad_dob = respond(&request(Some("1955-05-xx"), Some("4000")));
        assert_eq!(bad_dob.status_code, STATUS_BAD_REQUEST);
        assert!(
            bad_dob
                .body
                .error
                .as_deref()
                .is_some_and(|e| e.contains("date of birth"))
        );

        let future_dob = respond(&request(Some("2029-01-02"), Some("x")));
        assert_eq!(future_dob.status_code, STATUS_BAD_REQUEST);
    }

    #[test]
    fn claim_before_62_returns_400() {
        let response = respond(&EstimateRequest {
            dob: Some("1960-03-10".to_string()),
            income: Some("40000".to_string()),
            retire_month: Some("1".to_string()),
            retire_year: Some("2020".to_string()),
            dollars: None,
        });
        assert_eq!(response.status_code, STATUS_BAD_REQUEST);
        assert!(
            response
                .body
                .error
                .as_deref()
                .is_some_and(|e| e.contains("claiming date"))
        );
    }

    #[test]
    fn far_future_nominal_claim_returns_400() {
        let response = respond(&EstimateRequest {
            dob: Some("1960-03-10".to_string()),
            income: Some("40000".to_string()),
            retire_month: Some("1".to_string()),
            retire_year: Some("9999".to_string()),
            dollars: Some("0".to_string()),
        });
        assert_eq!(response.status_code, STATUS_BAD_REQUEST);
        assert_eq!(response.body.data, None);
    }

    #[test]
    fn year_1000_birth_is_a_dob_error() {
        let response = respond(&request(Some("1000-01-01"), Some("40000")));
        assert_eq!(response.status_code, STATUS_BAD_REQUEST);
        let error = response.body.error.expect("error message");
        assert!(error.contains("date of birth"), "{error}");
        assert!(!error.contains("999"), "{error}");
    }

    #[test]
    fn fra_response_serializes_as_pair() {
        let response = build_fra_response("1957");
        assert_eq!(response.status_code, STATUS_OK);
        let json = serde_json::to_string(&response.body).expect("serialize");
        assert_eq!(json, "[66,6]");

        assert_eq!(build_fra_response("1953").body, FraBody::Age([66, 0]));
        assert_eq!(build_fra_response("1969").body, FraBody::Age([67, 0]));
    }

    #[test]
    fn fra_response_rejects_implausible_year() {
        let response = build_fra_response("969");
        assert_eq!(response.status_code, STATUS_BAD_REQUEST);
        let json = serde_json::to_value(&response.body).expect("serialize");
        assert_eq!(json["data"], Value::Null);
        assert!(json["error"].as_str().is_some_and(|e| e.contains("969")));
    }
}
