use super::types::{BirthDate, FullRetirementAge};
use crate::error::ValidationError;

#[derive(Copy, Clone, Debug)]
struct FraStep {
    first_year: i32,
    last_year: i32,
    years: u32,
    /// Months added per birth year into the step; the first year already gets one increment.
    months_per_year: u32,
}

const FRA_SCHEDULE: [FraStep; 5] = [
    FraStep {
        first_year: i32::MIN,
        last_year: 1937,
        years: 65,
        months_per_year: 0,
    },
    FraStep {
        first_year: 1938,
        last_year: 1942,
        years: 65,
        months_per_year: 2,
    },
    FraStep {
        first_year: 1943,
        last_year: 1954,
        years: 66,
        months_per_year: 0,
    },
    FraStep {
        first_year: 1955,
        last_year: 1959,
        years: 66,
        months_per_year: 2,
    },
    FraStep {
        first_year: 1960,
        last_year: i32::MAX,
        years: 67,
        months_per_year: 0,
    },
];

pub fn resolve_fra(birth_year: i32) -> Result<FullRetirementAge, ValidationError> {
    if !(1000..=9999).contains(&birth_year) {
        return Err(ValidationError::InvalidYear(birth_year.to_string()));
    }

    let step = FRA_SCHEDULE
        .iter()
        .find(|step| (step.first_year..=step.last_year).contains(&birth_year))
        .ok_or_else(|| ValidationError::InvalidYear(birth_year.to_string()))?;

    let months = if step.months_per_year == 0 {
        0
    } else {
        step.months_per_year * (birth_year - step.first_year + 1) as u32
    };

    Ok(FullRetirementAge {
        years: step.years + months / 12,
        months: months % 12,
    })
}

/// FRA for a concrete birth date, honouring the January 1 rule.
pub fn resolve_fra_for(birth_date: BirthDate) -> Result<FullRetirementAge, ValidationError> {
    resolve_fra(birth_date.ssa_birth_year())
}

/// Parses a caller-supplied birth year and resolves it.
pub fn resolve_fra_str(raw: &str) -> Result<FullRetirementAge, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidYear(raw.to_string()));
    }
    let year = trimmed
        .parse::<i32>()
        .map_err(|_| ValidationError::InvalidYear(raw.to_string()))?;
    resolve_fra(year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn fra(years: u32, months: u32) -> FullRetirementAge {
        FullRetirementAge { years, months }
    }

    #[test]
    fn resolves_published_examples() {
        assert_eq!(resolve_fra(1953), Ok(fra(66, 0)));
        assert_eq!(resolve_fra(1957), Ok(fra(66, 6)));
        assert_eq!(resolve_fra(1969), Ok(fra(67, 0)));
    }

    #[test]
    fn resolves_every_step_boundary() {
        assert_eq!(resolve_fra(1937), Ok(fra(65, 0)));
        assert_eq!(resolve_fra(1938), Ok(fra(65, 2)));
        assert_eq!(resolve_fra(1942), Ok(fra(65, 10)));
        assert_eq!(resolve_fra(1943), Ok(fra(66, 0)));
        assert_eq!(resolve_fra(1954), Ok(fra(66, 0)));
        assert_eq!(resolve_fra(1955), Ok(fra(66, 2)));
        assert_eq!(resolve_fra(1959), Ok(fra(66, 10)));
        assert_eq!(resolve_fra(1960), Ok(fra(67, 0)));
    }

    #[test]
    fn rejects_years_that_are_not_four_digits() {
        assert_eq!(
            resolve_fra(969),
            Err(ValidationError::InvalidYear("969".to_string()))
        );
        assert!(resolve_fra(10_000).is_err());
        assert!(resolve_fra(-1957).is_err());
    }

    #[test]
    fn string_form_rejects_padding_and_noise() {
        assert_eq!(resolve_fra_str("1953"), Ok(fra(66, 0)));
        assert_eq!(resolve_fra_str(" 1957 "), Ok(fra(66, 6)));
        assert!(resolve_fra_str("969").is_err());
        assert!(resolve_fra_str("0969").is_err());
        assert!(resolve_fra_str("19x7").is_err());
        assert!(resolve_fra_str("+957").is_err());
        assert!(resolve_fra_str("").is_err());
    }

    #[test]
    fn january_first_births_use_prior_year() {
        let jan_first = BirthDate::from_ymd(1960, 1, 1).expect("valid date");
        let jan_second = BirthDate::from_ymd(1960, 1, 2).expect("valid date");
        assert_eq!(resolve_fra_for(jan_first), Ok(fra(66, 10)));
        assert_eq!(resolve_fra_for(jan_second), Ok(fra(67, 0)));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_fra_months_stay_within_a_year(year in 1000i32..=9999) {
            let age = resolve_fra(year).expect("four-digit years resolve");
            prop_assert!(age.months <= 11);
            prop_assert!((65..=67).contains(&age.years));
        }

        #[test]
        fn prop_fra_never_decreases_with_birth_year(year in 1000i32..9999) {
            let earlier = resolve_fra(year).expect("valid year");
            let later = resolve_fra(year + 1).expect("valid year");
            prop_assert!(later.total_months() >= earlier.total_months());
            prop_assert!(later.total_months() - earlier.total_months() <= 2);
        }
    }
}
