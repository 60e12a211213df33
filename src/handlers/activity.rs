use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::activity::{ActivityChanges, NewActivity};
use crate::services::ledger::Ledger;
use crate::utils::jwt::owner_id;
use crate::utils::validation::{parse_activity_date, require_date, validate_payload};

#[derive(Deserialize, Validate)]
pub struct CreateActivityRequest {
    #[validate(required(message = "Activity name is required"))]
    #[validate(length(min = 1, message = "Activity name cannot be empty"))]
    activity_name: Option<String>,

    #[validate(required(message = "Minutes are required"))]
    #[validate(range(min = 1, message = "Minutes must be at least 1"))]
    minutes: Option<i32>,

    #[validate(required(message = "Activity date is required"))]
    activity_date: Option<String>,

    category: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct UpdateActivityRequest {
    #[validate(length(min = 1, message = "Activity name cannot be empty"))]
    activity_name: Option<String>,

    #[validate(range(min = 1, message = "Minutes must be at least 1"))]
    minutes: Option<i32>,

    /// Empty text clears the category.
    category: Option<String>,
}

#[derive(Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

// POST /v1/activities
pub async fn create_activity(
    req: HttpRequest,
    ledger: web::Data<Ledger>,
    payload: web::Json<CreateActivityRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let owner = owner_id(&req)?;

    let CreateActivityRequest {
        activity_name,
        minutes,
        activity_date,
        category,
    } = payload.into_inner();
    let date = parse_activity_date(activity_date.as_deref().unwrap_or_default())?;
    let candidate = NewActivity::new(
        activity_name.unwrap_or_default(),
        minutes.unwrap_or_default(),
        date,
        category,
    );

    let activity = ledger.checked_insert(&owner, candidate).await?;
    Ok(HttpResponse::Created().json(activity))
}

// GET /v1/activities?date=YYYY-MM-DD
pub async fn list_activities(
    req: HttpRequest,
    ledger: web::Data<Ledger>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    let owner = owner_id(&req)?;
    let date = require_date(query.date.as_deref())?;

    let activities = ledger.store().get_by_owner_and_date(&owner, date).await?;
    Ok(HttpResponse::Ok().json(activities))
}

// PATCH|PUT /v1/activities/:activityId
pub async fn update_activity(
    req: HttpRequest,
    ledger: web::Data<Ledger>,
    activity_id: web::Path<Uuid>,
    payload: web::Json<UpdateActivityRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let owner = owner_id(&req)?;

    let UpdateActivityRequest {
        activity_name,
        minutes,
        category,
    } = payload.into_inner();
    let changes = ActivityChanges {
        activity_name,
        minutes,
        category: category.map(Some),
    };

    let activity = ledger.checked_update(&owner, *activity_id, changes).await?;
    Ok(HttpResponse::Ok().json(activity))
}

// DELETE /v1/activities/:activityId
pub async fn delete_activity(
    req: HttpRequest,
    ledger: web::Data<Ledger>,
    activity_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let owner = owner_id(&req)?;
    ledger.delete(&owner, *activity_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
