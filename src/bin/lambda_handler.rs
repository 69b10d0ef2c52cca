//! AWS Lambda handler for the calculators
//!
//! Accepts a JSON request tagged by `calculator` (debt, investment, mortgage,
//! tax, retirement) and returns the engine result as JSON. Works both for
//! direct invocations and Lambda Function URLs, where the request arrives in
//! the `body` of an HTTP envelope and the response is wrapped the same way.
//!
//! Tax brackets and the default state rate come from the FINCALC_* environment
//! variables, read once at cold start.

use chrono::NaiveDate;
use fincalc::debt::{Debt, PayoffStrategy};
use fincalc::{
    compute_debt_payoff_plan, compute_investment_growth, compute_mortgage,
    compute_retirement_plan, CalculatorConfig, InvestmentInputs, MortgageInputs,
    RetirementInputs, ScenarioRunner, TaxInputs,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use serde::Deserialize;
use serde_json::{json, Value};

/// One row of the debt form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebtEntry {
    #[serde(default)]
    name: String,
    balance: f64,
    #[serde(default)]
    annual_rate_pct: f64,
    #[serde(default)]
    min_payment: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebtRequest {
    debts: Vec<DebtEntry>,
    monthly_budget: f64,
    #[serde(default)]
    strategy: PayoffStrategy,
    /// First payment date used to report the debt-free date
    #[serde(default)]
    start_date: Option<NaiveDate>,
    /// Also run the other strategy
    #[serde(default)]
    compare: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "calculator", rename_all = "snake_case")]
enum CalculatorRequest {
    Debt(DebtRequest),
    Investment(InvestmentInputs),
    Mortgage(MortgageInputs),
    Tax(TaxInputs),
    Retirement(RetirementInputs),
}

fn run_debt(runner: &ScenarioRunner, request: DebtRequest) -> fincalc::Result<Value> {
    let mut debts = Vec::with_capacity(request.debts.len());
    for entry in &request.debts {
        if let Some(debt) =
            Debt::from_form_row(&entry.name, entry.balance, entry.annual_rate_pct, entry.min_payment)?
        {
            debts.push(debt);
        }
    }

    let plan = compute_debt_payoff_plan(&debts, request.monthly_budget, request.strategy)?;
    let (years, months) = plan.duration();
    let payoff_date = request.start_date.and_then(|start| plan.payoff_date(start));
    let comparison = if request.compare {
        let comparison = runner.compare_payoff_strategies(&debts, request.monthly_budget)?;
        Some(json!({
            "interestSaved": comparison.interest_saved,
            "periodsSaved": comparison.periods_saved,
        }))
    } else {
        None
    };

    Ok(json!({
        "plan": plan,
        "duration": { "years": years, "months": months },
        "payoffDate": payoff_date,
        "cumulative": plan.cumulative_series(),
        "comparison": comparison,
    }))
}

fn calculate(runner: &ScenarioRunner, request: CalculatorRequest) -> fincalc::Result<Value> {
    let value = match request {
        CalculatorRequest::Debt(request) => return run_debt(runner, request),
        CalculatorRequest::Investment(inputs) => json!(compute_investment_growth(&inputs)?),
        CalculatorRequest::Mortgage(inputs) => json!(compute_mortgage(&inputs)?),
        CalculatorRequest::Tax(inputs) => json!(runner.estimate_tax(&inputs)?),
        CalculatorRequest::Retirement(inputs) => json!(compute_retirement_plan(&inputs)?),
    };
    Ok(value)
}

/// Status code and JSON body for one request
fn respond(runner: &ScenarioRunner, body: &str) -> (u16, Value) {
    let request: CalculatorRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => return (400, json!({ "error": format!("Invalid JSON: {}", e) })),
    };

    match calculate(runner, request) {
        Ok(result) => (200, result),
        Err(e) => {
            warn!("calculation rejected: {}", e);
            (400, json!({ "error": e.to_string() }))
        }
    }
}

fn http_response(status: u16, body: Option<&Value>) -> Value {
    json!({
        "statusCode": status,
        "headers": {
            "Content-Type": "application/json",
            "Access-Control-Allow-Origin": "*",
            "Access-Control-Allow-Methods": "POST, OPTIONS",
            "Access-Control-Allow-Headers": "Content-Type",
        },
        "body": body.map(Value::to_string).unwrap_or_default(),
    })
}

/// Lambda handler function
async fn handler(runner: &ScenarioRunner, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let start = std::time::Instant::now();
    let payload = event.payload;

    let method = payload
        .pointer("/requestContext/http/method")
        .and_then(Value::as_str);
    if method == Some("OPTIONS") {
        return Ok(http_response(200, None));
    }

    let response = match payload.get("body") {
        // Function URL envelope
        Some(body) => {
            if payload.get("isBase64Encoded").and_then(Value::as_bool) == Some(true) {
                let error = json!({ "error": "base64-encoded bodies are not supported" });
                return Ok(http_response(400, Some(&error)));
            }
            let body = body.as_str().unwrap_or("{}");
            let (status, value) = respond(runner, body);
            http_response(status, Some(&value))
        }
        // Direct invocation
        None => respond(runner, &payload.to_string()).1,
    };

    info!("request handled in {} ms", start.elapsed().as_millis());
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let runner = ScenarioRunner::from_config(CalculatorConfig::from_env())?;
    let runner = &runner;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(runner, event).await
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_mortgage_request() {
        let runner = ScenarioRunner::new();
        let body = r#"{"calculator":"mortgage","loanAmount":300000,"downPayment":60000,"annualRatePct":6,"termYears":30}"#;
        let (status, value) = respond(&runner, body);

        assert_eq!(status, 200);
        let payment = value["principalAndInterest"].as_f64().unwrap();
        assert!((payment - 1438.92).abs() < 0.01);
    }

    #[test]
    fn test_debt_request_with_payoff_date() {
        let runner = ScenarioRunner::new();
        let body = r#"{
            "calculator": "debt",
            "monthlyBudget": 250,
            "strategy": "snowball",
            "startDate": "2024-01-31",
            "debts": [{"name": "Card", "balance": 1000, "annualRatePct": 0, "minPayment": 25}]
        }"#;
        let (status, value) = respond(&runner, body);

        assert_eq!(status, 200);
        assert_eq!(value["plan"]["periods"], 4);
        assert_eq!(value["payoffDate"], "2024-04-30");
    }

    #[test]
    fn test_engine_error_becomes_error_field() {
        let runner = ScenarioRunner::new();
        let body = r#"{"calculator":"debt","monthlyBudget":0,"debts":[{"balance":100}]}"#;
        let (status, value) = respond(&runner, body);

        assert_eq!(status, 400);
        assert!(value["error"].as_str().unwrap().contains("invalid monthly_budget"));
    }

    #[test]
    fn test_debt_entries_normalized_like_csv_rows() {
        let runner = ScenarioRunner::new();
        let body = r#"{
            "calculator": "debt",
            "monthlyBudget": 100,
            "debts": [
                {"name": "", "balance": 300, "minPayment": 10},
                {"name": "Closed", "balance": 0, "minPayment": 10}
            ]
        }"#;
        let (status, value) = respond(&runner, body);

        assert_eq!(status, 200);
        let debts = value["plan"]["debts"].as_array().unwrap();
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0]["name"], "Unnamed Debt");
    }

    #[test]
    fn test_negative_debt_balance_rejected() {
        let runner = ScenarioRunner::new();
        let body = r#"{"calculator":"debt","monthlyBudget":100,"debts":[{"name":"Bad","balance":-50}]}"#;
        let (status, value) = respond(&runner, body);

        assert_eq!(status, 400);
        assert!(value["error"].as_str().unwrap().contains("invalid debt balance"));
    }

    #[test]
    fn test_unknown_calculator_rejected() {
        let runner = ScenarioRunner::new();
        let (status, value) = respond(&runner, r#"{"calculator":"crypto"}"#);
        assert_eq!(status, 400);
        assert!(value["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }

    #[test]
    fn test_tax_request_uses_runner_schedule() {
        let runner = ScenarioRunner::new();
        let body = r#"{"calculator":"tax","grossIncome":50000,"filingStatus":"single","state":{"kind":"none"}}"#;
        let (status, value) = respond(&runner, body);

        assert_eq!(status, 200);
        assert!((value["federalTax"].as_f64().unwrap() - 6617.0).abs() < 1e-6);
        assert_eq!(value["taxYear"], 2023);
    }
}
