use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use salesboard::api::{self, AppState, FAILURE_MESSAGE};
use salesboard_core::feed::{parse_timestamp, SourceItem};
use salesboard_core::memory::{FailingFeed, MemoryRepository, StaticFeed};
use salesboard_core::model::NewSaleRecord;
use serde_json::{json, Value};
use tower::ServiceExt;

fn foo_item() -> SourceItem {
    serde_json::from_value(json!({
        "id": 1,
        "title": "Foo",
        "description": "A jacket",
        "category": "men's clothing",
        "price": 150,
        "sold": true,
        "dateOfSale": "2023-03-05"
    }))
    .expect("valid source item")
}

fn sale(title: &str, category: &str, price: f64, sold: bool, date: &str) -> NewSaleRecord {
    NewSaleRecord {
        title: Some(title.to_string()),
        description: Some(format!("{title} description")),
        category: Some(category.to_string()),
        price: Some(price),
        image: None,
        sold: Some(sold),
        date_of_sale: parse_timestamp(date),
    }
}

fn app_with(repository: Arc<MemoryRepository>, feed: StaticFeed) -> Router {
    api::router(Arc::new(AppState::new(repository, Arc::new(feed))))
}

fn populated() -> Router {
    let repository = MemoryRepository::with_records(
        (1..=12)
            .map(|n| sale(&format!("March item {n}"), "electronics", 10.0 * n as f64, n % 2 == 0, "2022-03-15"))
            .chain([
                sale("Ring", "jewelery", 450.0, true, "2021-03-01"),
                sale("April coat", "women's clothing", 80.0, false, "2022-04-01"),
            ])
            .collect(),
    );
    app_with(Arc::new(repository), StaticFeed::default())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn seed_then_barchart_counts_single_item() {
    let repository = Arc::new(MemoryRepository::new());
    let app = app_with(repository.clone(), StaticFeed::new(vec![foo_item()]));

    let (status, body) = get(&app, "/transactions/seed-data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"statusCode": 200, "message": "Data Seeded Successfully"}));
    assert_eq!(repository.snapshot().len(), 1);

    let (status, body) = get(&app, "/transactions/barchart?month=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Bar Chart Data Fetched Successfully");
    assert_eq!(
        body["data"],
        json!({
            "0-100": 0, "101-200": 1, "201-300": 0, "301-400": 0, "401-500": 0,
            "501-600": 0, "601-700": 0, "701-800": 0, "801-900": 0, "901-above": 0
        })
    );
}

#[tokio::test]
async fn seeded_record_is_found_by_search() {
    let app = app_with(
        Arc::new(MemoryRepository::new()),
        StaticFeed::new(vec![foo_item()]),
    );
    get(&app, "/transactions/seed-data").await;

    let (status, body) = get(&app, "/transactions/list?month=3&searchInput=foo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "List Fetched Successfully");
    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["title"], "Foo");
    assert_eq!(records[0]["price"], json!(150.0));
    assert_eq!(records[0]["sold"], json!(true));
    assert!(records[0]["dateOfSale"].as_str().unwrap().starts_with("2023-03-05"));
    assert!(records[0]["createdAt"].is_string());
}

#[tokio::test]
async fn empty_feed_reports_no_data() {
    let repository = Arc::new(MemoryRepository::with_records(vec![sale(
        "Keep", "misc", 5.0, true, "2022-01-01",
    )]));
    let app = app_with(repository.clone(), StaticFeed::default());

    let (status, body) = get(&app, "/transactions/seed-data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Data Not Found In Third Party Url");
    assert_eq!(repository.snapshot().len(), 1);
}

#[tokio::test]
async fn upstream_failure_becomes_generic_500() {
    let state = AppState::new(Arc::new(MemoryRepository::new()), Arc::new(FailingFeed { status: 502 }));
    let app = api::router(Arc::new(state));

    let (status, body) = get(&app, "/transactions/seed-data").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"statusCode": 500, "message": FAILURE_MESSAGE}));
}

#[tokio::test]
async fn list_is_month_scoped_and_paginated() {
    let app = populated();

    let (_, first) = get(&app, "/transactions/list?month=3").await;
    let first = first["data"].as_array().unwrap().clone();
    assert_eq!(first.len(), 10);

    let (_, second) = get(&app, "/transactions/list?month=3&page=2&perPage=10").await;
    let second = second["data"].as_array().unwrap().clone();
    assert_eq!(second.len(), 3);

    for record in first.iter().chain(second.iter()) {
        let date = record["dateOfSale"].as_str().unwrap();
        assert_eq!(&date[5..7], "03", "record {date} is outside March");
    }

    let (_, april) = get(&app, "/transactions/list?month=4&perPage=50").await;
    assert_eq!(april["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn statistics_totals_cover_the_month() {
    let (status, body) = get(&populated(), "/transactions/statistics?month=3").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    // Even-numbered items and the ring are sold: 20+40+...+120 = 420, plus 450.
    assert_eq!(data["totalSaleAmount"], json!(870.0));
    assert_eq!(data["totalSoldItems"], json!(7));
    assert_eq!(data["totalNotSoldItems"], json!(6));
}

#[tokio::test]
async fn piechart_counts_sum_to_month_total() {
    let (_, body) = get(&populated(), "/transactions/piechart?month=3").await;
    assert_eq!(body["message"], "Pie Chart Data Fetched Successfully");
    assert_eq!(body["data"], json!({"electronics": 12, "jewelery": 1}));
}

#[tokio::test]
async fn commonapi_merges_reports() {
    let app = populated();
    let (status, body) = get(&app, "/transactions/commonapi?month=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Combined Data Fetched Successfully");

    let (_, bar) = get(&app, "/transactions/barchart?month=3").await;
    let (_, pie) = get(&app, "/transactions/piechart?month=3").await;
    let (_, stats) = get(&app, "/transactions/statistics?month=3").await;
    assert_eq!(body["data"]["barChart"], bar["data"]);
    assert_eq!(body["data"]["pieChart"], pie["data"]);
    assert_eq!(body["data"]["statistics"], stats["data"]);
}

#[tokio::test]
async fn invalid_month_goes_through_failure_envelope() {
    let app = populated();
    for uri in [
        "/transactions/statistics",
        "/transactions/barchart?month=13",
        "/transactions/piechart?month=march",
        "/transactions/list?month=3&page=two",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, json!({"statusCode": 500, "message": FAILURE_MESSAGE}), "{uri}");
    }
}

#[tokio::test]
async fn root_banner_is_plain_text() {
    let response = populated()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Salesboard server is running");
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let response = populated()
        .oneshot(
            Request::builder()
                .uri("/transactions/statistics?month=3")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let preflight = populated()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/transactions/list")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(preflight.status().is_success());
    assert!(preflight
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}
