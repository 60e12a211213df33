use actix_web::{web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::handlers::activity::DateQuery;
use crate::models::activity::SUGGESTED_CATEGORIES;
use crate::services::ledger::Ledger;
use crate::services::summary;
use crate::utils::jwt::owner_id;
use crate::utils::validation::require_date;

// GET /v1/activities/summary?date=YYYY-MM-DD
pub async fn get_summary(
    req: HttpRequest,
    ledger: web::Data<Ledger>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    let owner = owner_id(&req)?;
    let date = require_date(query.date.as_deref())?;

    let summary = summary::summarize(ledger.store(), &owner, date).await?;
    Ok(HttpResponse::Ok().json(summary))
}

// GET /v1/activities/analytics?date=YYYY-MM-DD
pub async fn get_analytics(
    req: HttpRequest,
    ledger: web::Data<Ledger>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    let owner = owner_id(&req)?;
    let date = require_date(query.date.as_deref())?;

    let analytics = summary::analytics(ledger.store(), &owner, date).await?;
    Ok(HttpResponse::Ok().json(analytics))
}

// GET /v1/categories
pub async fn list_categories() -> HttpResponse {
    HttpResponse::Ok().json(SUGGESTED_CATEGORIES)
}
