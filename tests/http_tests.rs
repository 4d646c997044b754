//! Router tests: drive the axum app in-process with `oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use ppalink::{
    db::{self, MappingStore, SqliteStore},
    error::StoreError,
    models::{ErrorBody, NewMapping, ShortenResponse, UrlMapping},
    service::MappingService,
    shortcode::ShortCodeGenerator,
    AppState,
};
use tower::ServiceExt;

const PREFIX: &str = "www.ppa.in/";

fn app_over(store: Arc<dyn MappingStore>, generator: ShortCodeGenerator) -> Router {
    ppalink::router(AppState::new(MappingService::new(store, generator, 20)))
}

async fn sqlite_store() -> Arc<dyn MappingStore> {
    Arc::new(SqliteStore::new(
        db::connect_in_memory().await.expect("in-memory pool"),
    ))
}

async fn app() -> Router {
    app_over(sqlite_store().await, ShortCodeGenerator::new(PREFIX))
}

fn shorten_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/shorten")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json<T: serde::de::DeserializeOwned>(res: axum::response::Response) -> T {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn shorten_then_redirect() {
    let app = app().await;

    let res = app
        .clone()
        .oneshot(shorten_request(r#"{ "originalUrl": "https://example.com" }"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ShortenResponse { short_url } = json(res).await;

    let code = short_url.strip_prefix(PREFIX).expect("prefix");
    assert_eq!(code.len(), 7);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));

    let res = app.oneshot(get(&format!("/{code}"))).await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers().get(header::LOCATION).unwrap(),
        "https://example.com"
    );
}

#[tokio::test]
async fn unknown_code_is_404() {
    let res = app().await.oneshot(get("/abc1234")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = json(res).await;
    assert_eq!(body.error, "Short URL not found");
}

#[tokio::test]
async fn health_is_ok() {
    let res = app().await.oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn bad_bodies_get_the_generic_500() {
    for body in ["{}", r#"{ "originalUrl": "" }"#, r#"{ "originalUrl": null }"#, "not json"] {
        let res = app().await.oneshot(shorten_request(body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR, "{body}");
        let err: ErrorBody = json(res).await;
        assert_eq!(err.error, "Failed to shorten URL");
    }
}

#[tokio::test]
async fn numeric_url_is_stored_as_text() {
    let app = app().await;

    let res = app
        .clone()
        .oneshot(shorten_request(r#"{ "originalUrl": 123 }"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ShortenResponse { short_url } = json(res).await;

    let code = short_url.strip_prefix(PREFIX).expect("prefix");
    let res = app.oneshot(get(&format!("/{code}"))).await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "123");
}

#[tokio::test]
async fn collision_surfaces_as_500() {
    let store = sqlite_store().await;
    let first = app_over(store.clone(), ShortCodeGenerator::seeded(PREFIX, 3));
    let second = app_over(store, ShortCodeGenerator::seeded(PREFIX, 3));
    let body = r#"{ "originalUrl": "https://example.com" }"#;

    let res = first.oneshot(shorten_request(body)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = second.oneshot(shorten_request(body)).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: ErrorBody = json(res).await;
    assert_eq!(err.error, "Failed to shorten URL");
}

/// Store whose every call fails as if the database were unreachable.
struct BrokenStore;

#[async_trait]
impl MappingStore for BrokenStore {
    async fn insert(&self, _: &NewMapping) -> Result<UrlMapping, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn find_live(&self, _: &str, _: DateTime<Utc>) -> Result<Option<UrlMapping>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn update_destination(
        &self,
        _: &str,
        _: &str,
        _: DateTime<Utc>,
    ) -> Result<Option<UrlMapping>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn set_expiry(&self, _: &str, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<u64, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn purge_expired(&self, _: DateTime<Utc>) -> Result<u64, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}

#[tokio::test]
async fn storage_failures_hide_the_cause() {
    let app = app_over(Arc::new(BrokenStore), ShortCodeGenerator::new(PREFIX));

    let res = app
        .clone()
        .oneshot(shorten_request(r#"{ "originalUrl": "https://example.com" }"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: ErrorBody = json(res).await;
    assert_eq!(err.error, "Failed to shorten URL");

    let res = app.oneshot(get("/abc1234")).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: ErrorBody = json(res).await;
    assert_eq!(err.error, "Failed to redirect");
}

#[tokio::test]
async fn sweeper_survives_store_errors() {
    assert_eq!(ppalink::expiry::sweep_once(&BrokenStore).await, 0);
}
