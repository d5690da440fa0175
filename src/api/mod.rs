use axum::{
    Router,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::EstimatorConfig;
use crate::core::{
    Envelope, EstimateRequest, Estimator, STATUS_OK, build_fra_response, build_response,
    extract_param,
};
use crate::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "retirement",
    about = "Social Security retirement benefit estimator (FRA, early and delayed claiming)"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Enable debug logging")]
    pub verbose: bool,
    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,
    #[arg(
        long,
        global = true,
        help = "TOML file overriding the statutory constants (bend points, taxable maximum, ...)"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the estimator HTTP API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, default_value = "0.0.0.0")]
        bind: IpAddr,
    },
    /// Print a benefit estimate as JSON
    Estimate {
        #[arg(long, help = "Date of birth, YYYY-MM-DD")]
        dob: String,
        #[arg(long, help = "Annual income, e.g. 40000 or $40,000")]
        income: String,
        #[arg(long, requires = "retire_year", help = "Claiming month, 1-12")]
        retire_month: Option<String>,
        #[arg(long, requires = "retire_month", help = "Claiming year, e.g. 2030")]
        retire_year: Option<String>,
        #[arg(long, help = "Express benefits in future (nominal) dollars")]
        nominal: bool,
    },
    /// Print the full retirement age for a birth year as [years, months]
    Fra { birth_year: String },
}

#[derive(Clone)]
struct AppState {
    config: Arc<EstimatorConfig>,
}

/// Runs the parsed command. Returns `false` when the command produced a
/// client error the caller should reflect in the exit status.
pub async fn run(cli: Cli) -> Result<bool, AppError> {
    let config = match &cli.config {
        Some(path) => EstimatorConfig::load(path)?,
        None => EstimatorConfig::default(),
    };

    match cli.command {
        Command::Serve { port, bind } => {
            run_http_server(SocketAddr::new(bind, port), config).await?;
            Ok(true)
        }
        Command::Estimate {
            dob,
            income,
            retire_month,
            retire_year,
            nominal,
        } => {
            let request = EstimateRequest {
                dob: Some(dob),
                income: Some(income),
                retire_month,
                retire_year,
                dollars: Some(if nominal { "0" } else { "1" }.to_string()),
            };
            let estimator = Estimator::new(&config, today());
            let response = build_response(&request, &estimator);
            println!("{}", serde_json::to_string_pretty(&response.body)?);
            Ok(response.status_code == STATUS_OK)
        }
        Command::Fra { birth_year } => {
            let response = build_fra_response(&birth_year);
            println!("{}", serde_json::to_string(&response.body)?);
            Ok(response.status_code == STATUS_OK)
        }
    }
}

pub fn router(config: Arc<EstimatorConfig>) -> Router {
    Router::new()
        .route("/retirement-api/estimator", get(estimator_query_handler))
        .route("/retirement-api/estimator/", get(estimator_query_handler))
        .route(
            "/retirement-api/estimator/:dob/:income",
            get(estimator_path_handler),
        )
        .route(
            "/retirement-api/estimator/:dob/:income/",
            get(estimator_path_handler),
        )
        .route(
            "/retirement-api/get-retirement-age/:birth_year",
            get(retirement_age_handler),
        )
        .route(
            "/retirement-api/get-retirement-age/:birth_year/",
            get(retirement_age_handler),
        )
        .fallback(not_found_handler)
        .with_state(AppState { config })
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(addr: SocketAddr, config: EstimatorConfig) -> std::io::Result<()> {
    let app = router(Arc::new(config));

    let listener = TcpListener::bind(addr).await?;
    info!("Retirement estimator API listening on http://{addr}");
    info!(
        "Try: http://127.0.0.1:{}/retirement-api/estimator/?dob=1955-05-05&income=40000",
        addr.port()
    );

    axum::serve(listener, app).await
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn estimator_query_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    estimate_handler_impl(&state, EstimateRequest::from_params(&params))
}

async fn estimator_path_handler(
    State(state): State<AppState>,
    Path((dob, income)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut request = EstimateRequest::from_params(&params);
    // URL segments take precedence over query parameters.
    let segments = HashMap::from([("dob".to_string(), dob), ("income".to_string(), income)]);
    if let Some(dob) = extract_param(&segments, "dob") {
        request.dob = Some(dob);
    }
    if let Some(income) = extract_param(&segments, "income") {
        request.income = Some(income);
    }
    estimate_handler_impl(&state, request)
}

fn estimate_handler_impl(state: &AppState, request: EstimateRequest) -> Response {
    let estimator = Estimator::new(&state.config, today());
    let response = build_response(&request, &estimator);
    json_response(status_from(response.status_code), response.body)
}

async fn retirement_age_handler(Path(birth_year): Path<String>) -> Response {
    let response = build_fra_response(&birth_year);
    json_response(status_from(response.status_code), response.body)
}

async fn not_found_handler() -> Response {
    json_response(StatusCode::NOT_FOUND, Envelope::<()>::err("Not found"))
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}
