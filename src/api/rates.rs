use crate::api::ApiState;
use crate::api::error::{
    ApiError, MISSING_PARAMETERS_MESSAGE, MessageResponse, NOT_FOUND_MESSAGE,
};
use crate::core::{CurrencyRecord, RatesError};
use crate::directory::RateDirectory;
use actix_web::{HttpResponse, get, post, web};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub currency: String,
    pub rub_course: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConvertRequest {
    pub from_currency: Option<String>,
    pub to_currency: Option<String>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub currency: String,
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct StoredRateResponse {
    pub currency: String,
    pub name: String,
    pub value: f64,
}

struct Conversion {
    from_currency: String,
    to_currency: String,
    amount: Decimal,
}

impl ConvertRequest {
    fn validate(self) -> Result<Conversion, RatesError> {
        match (self.from_currency, self.to_currency, self.amount) {
            (Some(from_currency), Some(to_currency), Some(amount)) => Ok(Conversion {
                from_currency,
                to_currency,
                amount,
            }),
            (from, to, amount) => {
                let missing: Vec<&str> = [
                    ("from_currency", from.is_none()),
                    ("to_currency", to.is_none()),
                    ("amount", amount.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(RatesError::Validation(missing.join(", ")))
            }
        }
    }
}

/// Rounds half away from zero and converts for the JSON body.
fn rounded(value: Decimal, dp: u32) -> f64 {
    value
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Skips the upstream fetch when every code is the domestic one.
async fn directory_for(state: &ApiState, codes: &[&str]) -> Result<RateDirectory, RatesError> {
    if codes.iter().all(|code| CurrencyRecord::is_domestic_code(code)) {
        return Ok(RateDirectory::empty());
    }
    RateDirectory::load(state.feed.as_ref()).await
}

#[get("/api/course/{currency}")]
#[instrument(name = "CurrencyCourse", skip(state))]
pub async fn currency_course(
    state: web::Data<ApiState>,
    currency: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let currency = currency.into_inner();
    let directory = directory_for(&state, &[currency.as_str()]).await?;

    match directory.lookup(&currency) {
        Ok(record) => Ok(HttpResponse::Ok().json(CourseResponse {
            rub_course: rounded(record.rate_to_domestic(), 3),
            currency: record.char_code,
        })),
        Err(e) if e.is_not_found() => {
            debug!("No rate for {}", currency);
            Ok(MessageResponse::ok(NOT_FOUND_MESSAGE))
        }
        Err(e) => Err(e.into()),
    }
}

#[post("/api/convert")]
#[instrument(name = "ConvertCurrencies", skip(state, body))]
pub async fn convert_currencies(
    state: web::Data<ApiState>,
    body: web::Json<ConvertRequest>,
) -> Result<HttpResponse, ApiError> {
    let conversion = match body.into_inner().validate() {
        Ok(conversion) => conversion,
        Err(e) => {
            debug!(error = %e, "Rejected conversion request");
            return Ok(MessageResponse::ok(MISSING_PARAMETERS_MESSAGE));
        }
    };

    let codes = [
        conversion.from_currency.as_str(),
        conversion.to_currency.as_str(),
    ];
    let directory = directory_for(&state, &codes).await?;

    let converted = directory
        .convert(&conversion.from_currency, &conversion.to_currency)
        .and_then(|proportion| {
            proportion
                .checked_mul(conversion.amount)
                .ok_or_else(|| RatesError::OutOfRange(conversion.amount.to_string()))
        });

    match converted {
        Ok(amount) => Ok(HttpResponse::Ok().json(ConvertResponse {
            amount: rounded(amount, 2),
            currency: conversion.to_currency,
        })),
        Err(e) if e.is_not_found() => Ok(MessageResponse::ok(NOT_FOUND_MESSAGE)),
        Err(e) => Err(e.into()),
    }
}

/// Reads the row the refresher last stored, without touching the upstream feed.
#[get("/api/stored/{currency}")]
#[instrument(name = "StoredRate", skip(state))]
pub async fn stored_rate(
    state: web::Data<ApiState>,
    currency: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    match state.store.get(&currency).await {
        Ok(row) => Ok(HttpResponse::Ok().json(StoredRateResponse {
            currency: row.char_code,
            name: row.display_name,
            value: rounded(row.value, 4),
        })),
        Err(e) if e.is_not_found() => Ok(MessageResponse::ok(NOT_FOUND_MESSAGE)),
        Err(e) => Err(e.into()),
    }
}
