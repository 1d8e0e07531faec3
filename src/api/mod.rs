//! HTTP boundary: liveness, rate lookup, conversion and stored-rate reads.

pub mod error;
pub mod rates;

use crate::context::AppContext;
use crate::providers::FeedSource;
use crate::store::RateStore;
use actix_web::{HttpResponse, get, web};
use serde_json::json;
use std::sync::Arc;

/// Handles shared with every request handler.
#[derive(Clone)]
pub struct ApiState {
    pub feed: Arc<dyn FeedSource>,
    pub store: Arc<dyn RateStore>,
}

impl From<&AppContext> for ApiState {
    fn from(context: &AppContext) -> Self {
        ApiState {
            feed: context.feed(),
            store: context.store(),
        }
    }
}

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "hello": "world" }))
}

/// Registers every route. State is supplied by the caller through `app_data`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(rates::currency_course)
        .service(rates::convert_currencies)
        .service(rates::stored_rate);
}
