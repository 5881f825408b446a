use axum::{
    Router,
    extract::{Json, Query, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::core::{AffordabilityInput, AffordabilityResult, ProjectionError, project};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const APP_JS: &str = include_str!("../../web/app.js");

const HOUSE_PRICE: &str = "house_price";
const INTEREST_RATE: &str = "interest_rate";
const LOAN_TERM_YEARS: &str = "loan_term_years";
const TARGET_MONTHLY_PAYMENT: &str = "target_monthly_payment";
const CURRENT_SAVINGS: &str = "current_savings";
const MONTHLY_SAVING: &str = "monthly_saving";

#[derive(Parser, Debug)]
#[command(
    name = "homesave",
    about = "Estimate how long you need to save for a house deposit at a given mortgage budget"
)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP calculator
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Compute one projection and print it as JSON
    Project(ProjectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(long, allow_negative_numbers = true)]
    house_price: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Nominal annual interest rate in percent, e.g. 6.5"
    )]
    interest_rate: f64,
    #[arg(long, allow_negative_numbers = true)]
    loan_term_years: i64,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Largest mortgage payment you are willing to make each month"
    )]
    target_monthly_payment: f64,
    #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
    current_savings: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Amount added to savings every month"
    )]
    monthly_saving: f64,
}

impl From<ProjectArgs> for AffordabilityInput {
    fn from(args: ProjectArgs) -> Self {
        AffordabilityInput {
            house_price: args.house_price,
            annual_interest_rate_percent: args.interest_rate,
            loan_term_years: args.loan_term_years,
            target_monthly_payment: args.target_monthly_payment,
            current_savings: args.current_savings,
            monthly_saving: args.monthly_saving,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct CalculateResponse {
    years: u64,
    months: u64,
    down_payment: f64,
}

impl From<&AffordabilityResult> for CalculateResponse {
    fn from(result: &AffordabilityResult) -> Self {
        CalculateResponse {
            years: result.years_to_goal,
            months: result.months_to_goal,
            down_payment: round_cents(result.required_down_payment),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProjectOutput {
    #[serde(flatten)]
    response: CalculateResponse,
    max_loan: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Runs the parsed command line. Returns the process exit code.
pub async fn run_cli(cli: Cli) -> i32 {
    match cli.command {
        Command::Serve { host, port } => {
            if let Err(e) = run_http_server(SocketAddr::new(host, port)).await {
                eprintln!("Server error: {e}");
                return 1;
            }
            0
        }
        Command::Project(args) => {
            let output = match project_output(args.into()) {
                Ok(output) => output,
                Err(e) => {
                    eprintln!("{e}");
                    return 1;
                }
            };
            match serde_json::to_string_pretty(&output) {
                Ok(json) => {
                    println!("{json}");
                    0
                }
                Err(e) => {
                    eprintln!("Failed to encode result: {e}");
                    1
                }
            }
        }
    }
}

fn project_output(input: AffordabilityInput) -> Result<ProjectOutput, ProjectionError> {
    let result = project(&input)?;
    Ok(ProjectOutput {
        response: CalculateResponse::from(&result),
        max_loan: round_cents(result.max_loan_amount),
    })
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("home deposit calculator listening on http://{addr}");
    info!("local access: http://127.0.0.1:{}/", addr.port());

    axum::serve(listener, router()).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(Query(params): Query<HashMap<String, String>>) -> Response {
    let fields = params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect::<Map<String, Value>>();
    calculate_handler_impl(input_from_fields(&fields))
}

async fn calculate_post_handler(payload: Result<Json<Value>, JsonRejection>) -> Response {
    let parsed = match payload {
        Ok(Json(body)) => input_from_json(&body),
        Err(rejection) => Err(ProjectionError::malformed("body", rejection.body_text())),
    };
    calculate_handler_impl(parsed)
}

fn calculate_handler_impl(parsed: Result<AffordabilityInput, ProjectionError>) -> Response {
    match parsed.and_then(|input| project(&input)) {
        Ok(result) => {
            let time = result.goal_time();
            debug!(
                years = time.years,
                months = time.months,
                total_months = time.total_months(),
                down_payment = result.required_down_payment,
                "projection computed"
            );
            json_response(StatusCode::OK, CalculateResponse::from(&result))
        }
        Err(err) => {
            warn!(field = err.field(), "rejected calculation request: {err}");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn input_from_json(body: &Value) -> Result<AffordabilityInput, ProjectionError> {
    let Some(fields) = body.as_object() else {
        return Err(ProjectionError::malformed(
            "body",
            format!("expected a JSON object, got {}", value_kind(body)),
        ));
    };
    input_from_fields(fields)
}

fn input_from_fields(fields: &Map<String, Value>) -> Result<AffordabilityInput, ProjectionError> {
    Ok(AffordabilityInput {
        house_price: real_field(fields, HOUSE_PRICE)?,
        annual_interest_rate_percent: real_field(fields, INTEREST_RATE)?,
        loan_term_years: integer_field(fields, LOAN_TERM_YEARS)?,
        target_monthly_payment: real_field(fields, TARGET_MONTHLY_PAYMENT)?,
        current_savings: real_field(fields, CURRENT_SAVINGS)?,
        monthly_saving: real_field(fields, MONTHLY_SAVING)?,
    })
}

fn required_field<'a>(
    fields: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a Value, ProjectionError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(ProjectionError::malformed(name, "field is required")),
        Some(value) => Ok(value),
    }
}

fn real_field(fields: &Map<String, Value>, name: &'static str) -> Result<f64, ProjectionError> {
    let value = match required_field(fields, name)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ProjectionError::malformed(name, format!("{n} is not a number")))?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            ProjectionError::malformed(name, format!("could not convert {s:?} to a number"))
        })?,
        other => {
            return Err(ProjectionError::malformed(
                name,
                format!("expected a number, got {}", value_kind(other)),
            ));
        }
    };

    if !value.is_finite() {
        return Err(ProjectionError::malformed(
            name,
            format!("{value} is not a finite number"),
        ));
    }
    Ok(value)
}

fn integer_field(fields: &Map<String, Value>, name: &'static str) -> Result<i64, ProjectionError> {
    match required_field(fields, name)? {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Ok(v);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(ProjectionError::malformed(
                    name,
                    format!("{n} is not a whole number of years"),
                )),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            ProjectionError::malformed(name, format!("could not convert {s:?} to an integer"))
        }),
        other => Err(ProjectionError::malformed(
            name,
            format!("expected an integer, got {}", value_kind(other)),
        )),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
