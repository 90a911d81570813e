use actix_web::{test, web, App, HttpResponse};
use serde_json::json;

async fn health_check() -> actix_web::Result<HttpResponse> {
    Ok(HttpResponse::Ok().body("OK"))
}

async fn search_cities() -> actix_web::Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!([])))
}

async fn shared_trip_private() -> actix_web::Result<HttpResponse> {
    Ok(HttpResponse::Forbidden().json(json!({"detail": "This trip is currently private"})))
}

async fn shared_trip_unknown() -> actix_web::Result<HttpResponse> {
    Ok(HttpResponse::NotFound().json(json!({"detail": "Trip not found or invalid token"})))
}

#[actix_rt::test]
async fn test_health_endpoint() {
    let app =
        test::init_service(App::new().route("/health", web::get().to(health_check))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_rt::test]
async fn test_city_search_returns_array() {
    let app =
        test::init_service(App::new().route("/cities", web::get().to(search_cities))).await;

    let req = test::TestRequest::get()
        .uri("/cities?search=par&limit=5")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body.is_array());
}

// The share lookup distinguishes a wrong token (404) from a token whose trip
// was toggled back to private (403) so the frontend can show the right message.
#[actix_rt::test]
async fn test_shared_trip_statuses_are_distinct() {
    let app = test::init_service(
        App::new()
            .route(
                "/trips/share/known-but-private",
                web::get().to(shared_trip_private),
            )
            .route(
                "/trips/share/{share_token}",
                web::get().to(shared_trip_unknown),
            ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/trips/share/known-but-private")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let req = test::TestRequest::get()
        .uri("/trips/share/no-such-token")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Trip not found or invalid token");
}
