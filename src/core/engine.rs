use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::fra::resolve_fra_for;
use super::types::{
    AgeInMonths, BirthDate, ClaimDate, ClaimingAge, ClaimingEstimate, DollarBasis,
    EstimateInputs, EstimateResult, FullRetirementAge, Income,
};
use crate::config::EstimatorConfig;
use crate::error::ValidationError;

// Absorbs binary float noise before truncating (e.g. 1747.3999999 -> 1747.4).
const TRUNCATION_EPS: f64 = 1e-7;

/// Benefit engine bound to a configuration and a reference date.
///
/// Holds no mutable state: the same inputs always produce the same result.
#[derive(Debug, Clone, Copy)]
pub struct Estimator<'a> {
    config: &'a EstimatorConfig,
    today: NaiveDate,
}

impl<'a> Estimator<'a> {
    pub fn new(config: &'a EstimatorConfig, today: NaiveDate) -> Self {
        Self { config, today }
    }

    pub fn config(&self) -> &'a EstimatorConfig {
        self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn estimate_inputs(
        &self,
        inputs: &EstimateInputs,
    ) -> Result<EstimateResult, ValidationError> {
        self.estimate(inputs.birth_date, inputs.income, inputs.claim, inputs.dollars)
    }

    pub fn estimate(
        &self,
        birth_date: BirthDate,
        income: Income,
        claim: Option<ClaimDate>,
        dollars: DollarBasis,
    ) -> Result<EstimateResult, ValidationError> {
        let fra = resolve_fra_for(birth_date)?;
        let pia = self.primary_insurance_amount(income);
        let current_age_months = self.age_in_months_at(birth_date, self.today_month());

        let benefits = match claim {
            Some(date) => {
                let age_months = self.age_in_months_at(birth_date, date);
                let earliest = self.config.earliest_claiming_age as i32 * 12;
                if age_months < earliest {
                    return Err(ValidationError::InvalidClaimDate(format!(
                        "{}-{:02} is before age {}",
                        date.year, date.month, self.config.earliest_claiming_age
                    )));
                }
                if age_months > self.config.latest_claiming_age as i32 * 12 {
                    return Err(ValidationError::InvalidClaimDate(format!(
                        "{}-{:02} is after age {}",
                        date.year, date.month, self.config.latest_claiming_age
                    )));
                }
                vec![self.claiming_estimate(
                    birth_date,
                    fra,
                    pia,
                    ClaimingAge::Requested,
                    age_months as u32,
                    dollars,
                )]
            }
            None => [
                (ClaimingAge::Early, self.config.earliest_claiming_age * 12),
                (ClaimingAge::FullRetirement, fra.total_months()),
                (ClaimingAge::Latest, self.config.latest_credit_age * 12),
            ]
            .into_iter()
            .map(|(label, months)| {
                self.claiming_estimate(birth_date, fra, pia, label, months, dollars)
            })
            .collect(),
        };

        let benefits_by_age = match claim {
            Some(_) => BTreeMap::new(),
            None => (self.config.earliest_claiming_age..=self.config.latest_credit_age)
                .map(|age| {
                    let estimate = self.claiming_estimate(
                        birth_date,
                        fra,
                        pia,
                        ClaimingAge::Requested,
                        age * 12,
                        dollars,
                    );
                    (format!("age {age}"), estimate.monthly_benefit)
                })
                .collect(),
        };

        debug!(
            birth_year = birth_date.year(),
            income = income.amount(),
            pia,
            fra_months = fra.total_months(),
            estimates = benefits.len(),
            "computed benefit estimate"
        );

        Ok(EstimateResult {
            birth_date,
            income,
            current_age: birth_date.age_on(self.today),
            full_retirement_age: fra,
            full_retirement_age_label: fra.to_string(),
            past_fra: current_age_months >= fra.total_months() as i32,
            dollars,
            primary_insurance_amount: pia,
            benefits,
            benefits_by_age,
        })
    }

    /// Average indexed monthly earnings, using the single income figure as the
    /// career average and capping it at the taxable maximum.
    pub fn average_indexed_monthly_earnings(&self, income: Income) -> u64 {
        income.amount().min(self.config.taxable_maximum) / 12
    }

    /// PIA from the bend-point formula, truncated to the dime.
    pub fn primary_insurance_amount(&self, income: Income) -> f64 {
        let aime = self.average_indexed_monthly_earnings(income) as f64;
        let [first, second] = self.config.bend_points.map(|b| b as f64);
        let [low, mid, high] = self.config.pia_factors;

        let pia = low * aime.min(first)
            + mid * (aime.min(second) - first).max(0.0)
            + high * (aime - second).max(0.0);
        truncate_to_dime(pia)
    }

    /// Fractional change applied to the PIA for a claim at `claim_age_months`.
    pub fn adjustment_factor(
        &self,
        fra: FullRetirementAge,
        ssa_birth_year: i32,
        claim_age_months: u32,
    ) -> f64 {
        let fra_months = fra.total_months();
        let latest = self.config.latest_credit_age * 12;
        let claim_age_months = claim_age_months.min(latest.max(fra_months));

        if claim_age_months < fra_months {
            let early = &self.config.early_reduction;
            let months_early = fra_months - claim_age_months;
            let first_tier = months_early.min(early.first_tier_months);
            let extra = months_early - first_tier;
            -(f64::from(first_tier) * early.first_tier_monthly_rate
                + f64::from(extra) * early.extra_monthly_rate)
        } else {
            let months_late = claim_age_months - fra_months;
            f64::from(months_late) * self.config.delayed_credit_rate(ssa_birth_year) / 12.0
        }
    }

    fn claiming_estimate(
        &self,
        birth_date: BirthDate,
        fra: FullRetirementAge,
        pia: f64,
        claiming_age: ClaimingAge,
        age_months: u32,
        dollars: DollarBasis,
    ) -> ClaimingEstimate {
        let claim_date =
            ClaimDate::from_month_index(birth_date.attainment_month_index() + age_months as i32);
        let adjustment = self.adjustment_factor(fra, birth_date.ssa_birth_year(), age_months);
        let base = pia * self.dollar_factor(claim_date, dollars);
        let monthly_benefit = truncate_to_dollar(base * (1.0 + adjustment));

        ClaimingEstimate {
            claiming_age,
            age: AgeInMonths::from_total(age_months),
            claim_year: claim_date.year,
            claim_month: claim_date.month,
            adjustment_percent: round_percent(adjustment * 100.0),
            monthly_benefit,
        }
    }

    /// Growth from today's dollars to the claim year's dollars.
    fn dollar_factor(&self, claim_date: ClaimDate, dollars: DollarBasis) -> f64 {
        match dollars {
            DollarBasis::Current => 1.0,
            DollarBasis::Nominal => {
                let years_ahead = (claim_date.year - self.today.year()).max(0);
                (1.0 + self.config.cola_rate).powi(years_ahead)
            }
        }
    }

    fn today_month(&self) -> ClaimDate {
        ClaimDate {
            year: self.today.year(),
            month: self.today.month(),
        }
    }

    fn age_in_months_at(&self, birth_date: BirthDate, date: ClaimDate) -> i32 {
        date.month_index() - birth_date.attainment_month_index()
    }
}

fn truncate_to_dime(amount: f64) -> f64 {
    ((amount * 10.0 + TRUNCATION_EPS).floor() / 10.0).max(0.0)
}

fn truncate_to_dollar(amount: f64) -> u64 {
    (amount + TRUNCATION_EPS).floor().max(0.0) as u64
}

fn round_percent(percent: f64) -> f64 {
    (percent * 100.0).round() / 100.0
}
