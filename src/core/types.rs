use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

use crate::error::ValidationError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct BirthDate(NaiveDate);

impl BirthDate {
    /// Builds a birth date from already-split components. Only calendar
    /// validity is checked here; see `parse_date_of_birth` for the full rules.
    ///
    /// The year must be after 1000 so that the SSA birth year of a January 1
    /// birth is still a four-digit year.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, ValidationError> {
        if !(1001..=9999).contains(&year) {
            return Err(ValidationError::InvalidDob(format!("{year}-{month}-{day}")));
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidDob(format!("{year}-{month}-{day}")))
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Birth year used for the FRA and credit tables. Ages are attained the
    /// day before the birthday, so January 1 births belong to the prior year.
    pub fn ssa_birth_year(self) -> i32 {
        if self.month() == 1 && self.day() == 1 {
            self.year() - 1
        } else {
            self.year()
        }
    }

    /// Month index (year * 12 + zero-based month) in which ages are attained.
    pub(crate) fn attainment_month_index(self) -> i32 {
        let index = self.year() * 12 + self.month() as i32 - 1;
        if self.day() == 1 { index - 1 } else { index }
    }

    /// Whole years completed on `today`. Callers must pass a birth date on or
    /// before `today`; `parse_date_of_birth` guarantees this for requests.
    pub fn age_on(self, today: NaiveDate) -> u32 {
        debug_assert!(self.0 <= today, "birth date {} is after {today}", self.0);
        today.years_since(self.0).unwrap_or(0)
    }
}

impl Serialize for BirthDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format("%Y-%m-%d"))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Income(u64);

impl Income {
    pub fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub fn amount(self) -> u64 {
        self.0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FullRetirementAge {
    pub years: u32,
    pub months: u32,
}

impl FullRetirementAge {
    pub fn total_months(self) -> u32 {
        self.years * 12 + self.months
    }

    pub fn as_pair(self) -> [u32; 2] {
        [self.years, self.months]
    }
}

impl fmt::Display for FullRetirementAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.months {
            0 => write!(f, "{}", self.years),
            1 => write!(f, "{} and 1 month", self.years),
            months => write!(f, "{} and {months} months", self.years),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AgeInMonths {
    pub years: u32,
    pub months: u32,
}

impl AgeInMonths {
    pub fn from_total(total_months: u32) -> Self {
        Self {
            years: total_months / 12,
            months: total_months % 12,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ClaimingAge {
    #[serde(rename = "62")]
    Early,
    #[serde(rename = "fra")]
    FullRetirement,
    #[serde(rename = "70")]
    Latest,
    #[serde(rename = "requested")]
    Requested,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ClaimDate {
    pub year: i32,
    pub month: u32,
}

impl ClaimDate {
    pub(crate) fn month_index(self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }

    pub(crate) fn from_month_index(index: i32) -> Self {
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DollarBasis {
    #[default]
    Current,
    Nominal,
}

/// Raw, unvalidated estimator parameters as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EstimateRequest {
    pub dob: Option<String>,
    pub income: Option<String>,
    pub retire_month: Option<String>,
    pub retire_year: Option<String>,
    pub dollars: Option<String>,
}

/// Estimator inputs after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimateInputs {
    pub birth_date: BirthDate,
    pub income: Income,
    pub claim: Option<ClaimDate>,
    pub dollars: DollarBasis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimingEstimate {
    pub claiming_age: ClaimingAge,
    pub age: AgeInMonths,
    pub claim_year: i32,
    pub claim_month: u32,
    /// Percent change from the PIA: negative when claiming early.
    pub adjustment_percent: f64,
    pub monthly_benefit: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResult {
    pub birth_date: BirthDate,
    pub income: Income,
    pub current_age: u32,
    pub full_retirement_age: FullRetirementAge,
    pub full_retirement_age_label: String,
    pub past_fra: bool,
    pub dollars: DollarBasis,
    pub primary_insurance_amount: f64,
    pub benefits: Vec<ClaimingEstimate>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub benefits_by_age: BTreeMap<String, u64>,
}

impl EstimateResult {
    pub fn benefit_at(&self, claiming_age: ClaimingAge) -> Option<u64> {
        self.benefits
            .iter()
            .find(|estimate| estimate.claiming_age == claiming_age)
            .map(|estimate| estimate.monthly_benefit)
    }
}
