mod engine;
mod fra;
mod normalize;
mod response;
mod types;

pub use engine::Estimator;
pub use fra::{resolve_fra, resolve_fra_for, resolve_fra_str};
pub use normalize::{
    extract_param, income_check, parse_claim_date, parse_date_of_birth, parse_dollar_basis,
    parse_income,
};
pub use response::{
    Envelope, EstimateResponse, FraBody, FraResponse, STATUS_BAD_REQUEST, STATUS_OK,
    build_fra_response, build_response,
};
pub use types::{
    AgeInMonths, BirthDate, ClaimDate, ClaimingAge, ClaimingEstimate, DollarBasis,
    EstimateInputs, EstimateRequest, EstimateResult, FullRetirementAge, Income,
};

/// External-interface aliases matching the estimator service's operation names.
pub use normalize::extract_param as param_check;
pub use response::build_fra_response as get_full_retirement_age;
pub use response::build_response as estimator;
