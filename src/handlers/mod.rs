pub mod activity;
pub mod summary;

use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::errors::AppError;
use crate::utils::jwt::validator;

/// Registers every route. The day-level read routes come before
/// `/v1/activities/{activityId}` so the id pattern does not capture them.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let auth = HttpAuthentication::bearer(validator);

    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .service(
        web::resource("/v1/categories")
            .route(web::get().to(summary::list_categories)),
    )
    .service(
        web::resource("/v1/activities/summary")
            .wrap(auth.clone())
            .route(web::get().to(summary::get_summary)),
    )
    .service(
        web::resource("/v1/activities/analytics")
            .wrap(auth.clone())
            .route(web::get().to(summary::get_analytics)),
    )
    .service(
        web::resource("/v1/activities")
            .wrap(auth.clone())
            .route(web::get().to(activity::list_activities))
            .route(web::post().to(activity::create_activity)),
    )
    .service(
        web::resource("/v1/activities/{activityId}")
            .wrap(auth)
            .route(web::patch().to(activity::update_activity))
            .route(web::put().to(activity::update_activity))
            .route(web::delete().to(activity::delete_activity)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::dev::Service;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::services::ledger::Ledger;
    use crate::store::MemoryStore;
    use crate::utils::jwt::{generate_token, JwtSecret};

    const SECRET: &str = "test-secret";

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Ledger::new(Arc::new(MemoryStore::new()))))
                    .app_data(web::Data::new(JwtSecret(SECRET.to_string())))
                    .configure(configure),
            )
            .await
        };
    }

    fn bearer(owner: &str) -> (&'static str, String) {
        let token = generate_token(SECRET, owner, chrono::Duration::hours(1)).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    fn create(owner: &str, body: Value) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/v1/activities")
            .insert_header(bearer(owner))
            .set_json(body)
    }

    #[actix_web::test]
    async fn create_then_list_for_a_day() {
        let app = app!();
        let req = create(
            "u1",
            json!({"activity_name": "Sleep", "minutes": 480, "activity_date": "2024-01-01", "category": "Sleep"}),
        )
        .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(res).await;
        assert_eq!(created["minutes"], 480);
        assert_eq!(created["owner_id"], "u1");

        let req = test::TestRequest::get()
            .uri("/v1/activities?date=2024-01-01")
            .insert_header(bearer("u1"))
            .to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri("/v1/activities?date=2024-01-01")
            .insert_header(bearer("u2"))
            .to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn day_reads_require_a_date() {
        let app = app!();
        for uri in ["/v1/activities", "/v1/activities/summary", "/v1/activities/analytics?date=2024-1-1"] {
            let req = test::TestRequest::get().uri(uri).insert_header(bearer("u1")).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[actix_web::test]
    async fn requests_without_a_valid_token_are_unauthorized() {
        let app = app!();

        let req = test::TestRequest::get().uri("/v1/activities?date=2024-01-01").to_request();
        let status = match app.call(req).await {
            Ok(res) => res.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/v1/activities?date=2024-01-01")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let status = match app.call(req).await {
            Ok(res) => res.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn rejects_invalid_payloads() {
        let app = app!();
        let bad = [
            json!({"activity_name": "", "minutes": 30, "activity_date": "2024-01-01"}),
            json!({"activity_name": "Run", "minutes": 0, "activity_date": "2024-01-01"}),
            json!({"activity_name": "Run", "minutes": 30, "activity_date": "2024-02-30"}),
            json!({"activity_name": "Run", "minutes": 30}),
            json!({"activity_name": "Run", "minutes": "thirty", "activity_date": "2024-01-01"}),
        ];
        for body in bad {
            let res = test::call_service(&app, create("u1", body.clone()).to_request()).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        }
    }

    #[actix_web::test]
    async fn overflowing_the_day_reports_totals() {
        let app = app!();
        let res = test::call_service(&app, create("u1", json!({"activity_name": "Work", "minutes": 700, "activity_date": "2024-01-01"})).to_request()).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = test::call_service(&app, create("u1", json!({"activity_name": "Games", "minutes": 800, "activity_date": "2024-01-01"})).to_request()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["current_total"], 700);
        assert_eq!(body["attempted_total"], 1500);
    }

    #[actix_web::test]
    async fn update_and_delete_follow_ownership() {
        let app = app!();
        let res = test::call_service(&app, create("u1", json!({"activity_name": "A", "minutes": 500, "activity_date": "2024-01-01"})).to_request()).await;
        let a: Value = test::read_body_json(res).await;
        let a_id = a["activity_id"].as_str().unwrap().to_string();
        test::call_service(&app, create("u1", json!({"activity_name": "B", "minutes": 900, "activity_date": "2024-01-01"})).to_request()).await;

        let req = test::TestRequest::patch()
            .uri(&format!("/v1/activities/{a_id}"))
            .insert_header(bearer("u2"))
            .set_json(json!({"minutes": 10}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put()
            .uri(&format!("/v1/activities/{a_id}"))
            .insert_header(bearer("u1"))
            .set_json(json!({"minutes": 540, "category": "Work"}))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["minutes"], 540);
        assert_eq!(updated["category"], "Work");
        assert_eq!(updated["activity_name"], "A");

        let req = test::TestRequest::patch()
            .uri(&format!("/v1/activities/{a_id}"))
            .insert_header(bearer("u1"))
            .set_json(json!({"minutes": 541}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["current_total"], 900);
        assert_eq!(body["attempted_total"], 1441);

        let req = test::TestRequest::delete()
            .uri(&format!("/v1/activities/{a_id}"))
            .insert_header(bearer("u1"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete()
            .uri(&format!("/v1/activities/{a_id}"))
            .insert_header(bearer("u1"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn summary_and_analytics_for_a_complete_day() {
        let app = app!();
        test::call_service(&app, create("u1", json!({"activity_name": "Everything", "minutes": 1440, "activity_date": "2024-01-01"})).to_request()).await;

        let req = test::TestRequest::get()
            .uri("/v1/activities/summary?date=2024-01-01")
            .insert_header(bearer("u1"))
            .to_request();
        let summary: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["total_minutes"], 1440);
        assert_eq!(summary["is_complete"], true);

        let req = test::TestRequest::get()
            .uri("/v1/activities/analytics?date=2024-01-01")
            .insert_header(bearer("u1"))
            .to_request();
        let analytics: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(analytics["is_complete"], true);
        assert_eq!(analytics["remaining_minutes"], 0);
        assert_eq!(analytics["categories"]["Other"]["count"], 1);
        assert_eq!(analytics["timeline"][0]["start_offset_minutes"], 0);
    }

    #[actix_web::test]
    async fn categories_are_public() {
        let app = app!();
        let req = test::TestRequest::get().uri("/v1/categories").to_request();
        let categories: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(categories.as_array().unwrap().len(), 10);
    }
}
