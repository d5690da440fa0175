use std::collections::HashMap;

use chrono::NaiveDate;

use super::types::{BirthDate, ClaimDate, DollarBasis, EstimateInputs, EstimateRequest, Income};
use crate::error::ValidationError;

/// Returns the trimmed value for `key`, treating absent and blank the same.
pub fn extract_param(source: &HashMap<String, String>, key: &str) -> Option<String> {
    source
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn parse_date_of_birth(raw: &str, today: NaiveDate) -> Result<BirthDate, ValidationError> {
    let invalid = || ValidationError::InvalidDob(raw.to_string());
    let trimmed = raw.trim();
    let separator = if trimmed.contains('/') { '/' } else { '-' };
    let parts: Vec<&str> = trimmed.split(separator).collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(invalid());
    };

    if year.len() != 4 || !(1..=2).contains(&month.len()) || !(1..=2).contains(&day.len()) {
        return Err(invalid());
    }
    if ![year, month, day]
        .iter()
        .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(invalid());
    }

    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    let day = day.parse::<u32>().map_err(|_| invalid())?;
    let birth_date = BirthDate::from_ymd(year, month, day).map_err(|_| invalid())?;

    if birth_date.date() > today {
        return Err(invalid());
    }
    Ok(birth_date)
}

/// Strips `$`, thousands separators and cents, then parses whole dollars.
pub fn parse_income(raw: &str) -> Result<Income, ValidationError> {
    let invalid = || ValidationError::InvalidIncome(raw.to_string());
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    let whole = cleaned.split('.').next().unwrap_or_default();

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    whole.parse::<u64>().map(Income::new).map_err(|_| invalid())
}

pub fn income_check(raw: &str) -> Option<u64> {
    parse_income(raw).ok().map(Income::amount)
}

pub fn parse_claim_date(
    month: Option<&str>,
    year: Option<&str>,
) -> Result<Option<ClaimDate>, ValidationError> {
    let (month, year) = match (month, year) {
        (None, None) => return Ok(None),
        (Some(month), Some(year)) => (month.trim(), year.trim()),
        (Some(_), None) => {
            return Err(ValidationError::InvalidClaimDate(
                "retireyear is required with retiremonth".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(ValidationError::InvalidClaimDate(
                "retiremonth is required with retireyear".to_string(),
            ));
        }
    };

    let month = month
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| {
            ValidationError::InvalidClaimDate(format!("retiremonth '{month}' must be 1-12"))
        })?;
    let year = Some(year)
        .filter(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|y| y.parse::<i32>().ok())
        .filter(|y| *y >= 1000)
        .ok_or_else(|| {
            ValidationError::InvalidClaimDate(format!(
                "retireyear '{year}' must be a four-digit year"
            ))
        })?;

    Ok(Some(ClaimDate { year, month }))
}

pub fn parse_dollar_basis(raw: Option<&str>) -> Result<DollarBasis, ValidationError> {
    let Some(raw) = raw else {
        return Ok(DollarBasis::Current);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "current" => Ok(DollarBasis::Current),
        "0" | "false" | "no" | "off" | "nominal" | "future" => Ok(DollarBasis::Nominal),
        _ => Err(ValidationError::InvalidDollars(raw.to_string())),
    }
}

impl EstimateRequest {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            dob: extract_param(params, "dob"),
            income: extract_param(params, "income"),
            retire_month: extract_param(params, "retiremonth"),
            retire_year: extract_param(params, "retireyear"),
            dollars: extract_param(params, "dollars"),
        }
    }

    /// Validates every field, reporting missing required fields first.
    pub fn normalize(&self, today: NaiveDate) -> Result<EstimateInputs, ValidationError> {
        let dob = non_blank(self.dob.as_deref());
        let income = non_blank(self.income.as_deref());

        let missing: Vec<&'static str> = [("dob", dob.is_none()), ("income", income.is_none())]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
        let (Some(dob), Some(income)) = (dob, income) else {
            return Err(ValidationError::MissingField(missing));
        };

        Ok(EstimateInputs {
            birth_date: parse_date_of_birth(dob, today)?,
            income: parse_income(income)?,
            claim: parse_claim_date(
                non_blank(self.retire_month.as_deref()),
                non_blank(self.retire_year.as_deref()),
            )?,
            dollars: parse_dollar_basis(non_blank(self.dollars.as_deref()))?,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
