//! End-to-end pipeline tests against mocked upstream and warehouse APIs

use meli_etl::config::{
    secret_string, ApifyConfig, BigQueryConfig, MeliConfig, PipelineConfig, RetryConfig,
    SourceKind,
};
use meli_etl::core::pipeline::PipelineCoordinator;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

const TABLE_PATH: &str = "/bigquery/v2/projects/proj/datasets/marketplace/tables/products";
const UPLOAD_PATH: &str = "/upload/bigquery/v2/projects/proj/jobs";

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 1,
        initial_delay_ms: 1,
        max_delay_ms: 2,
        backoff_multiplier: 2.0,
    }
}

fn config(base_url: &str, dry_run: bool) -> PipelineConfig {
    let mut config = PipelineConfig {
        meli: MeliConfig {
            base_url: base_url.to_string(),
            search_query: "phone".to_string(),
            limit_per_page: 2,
            max_products: 2,
            request_delay_ms: 0,
            retry: fast_retry(),
            ..Default::default()
        },
        bigquery: Some(BigQueryConfig {
            base_url: base_url.to_string(),
            project_id: "proj".to_string(),
            dataset_id: "marketplace".to_string(),
            access_token: Some(secret_string("ya29.token".to_string())),
            job_poll_interval_ms: 1,
            job_timeout_seconds: 5,
            ..Default::default()
        }),
        ..Default::default()
    };
    config.application.dry_run = dry_run;
    config
}

async fn mock_marketplace(server: &mut ServerGuard) {
    server
        .mock("GET", "/sites/MLA/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "phone".into()),
            Matcher::UrlEncoded("offset".into(), "0".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "results": [
                    {"id": "MLA1", "title": "Phone A", "price": 100, "currency_id": "ARS",
                     "permalink": "http://x/MLA1", "seller": {"id": 7, "nickname": "SHOP"}},
                    {"id": "MLA2", "title": "Phone B", "price": 250.5, "currency_id": "ARS",
                     "permalink": "http://x/MLA2", "seller": {"id": 7, "nickname": "SHOP"}}
                ],
                "paging": {"total": 2, "offset": 0, "limit": 2}
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", Matcher::Regex(r"^/items/MLA\d$".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "attributes": [{"id": "BRAND", "name": "Marca", "value_name": "Acme"}],
                "pictures": [{"secure_url": "https://img/1.jpg"}],
                "warranty": "6 meses"
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/users/7")
        .with_status(200)
        .with_body(json!({"seller_reputation": {"level_id": "4_light_green"}}).to_string())
        .create_async()
        .await;
}

#[tokio::test]
async fn test_rest_to_bigquery_run() {
    let mut server = Server::new_async().await;
    mock_marketplace(&mut server).await;

    let table = server
        .mock("GET", TABLE_PATH)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let upload = server
        .mock("POST", UPLOAD_PATH)
        .match_query(Matcher::UrlEncoded("uploadType".into(), "multipart".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""product_id":"MLA1""#.to_string()),
            Matcher::Regex(r#""product_id":"MLA2""#.to_string()),
            Matcher::Regex(r#""brand":"Acme""#.to_string()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "jobReference": {"projectId": "proj", "jobId": "job_1"},
                "status": {"state": "DONE"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let coordinator = PipelineCoordinator::from_config(config(&server.url(), false))
        .await
        .unwrap();
    let metrics = coordinator.run().await;

    assert!(metrics.success, "errors: {:?}", metrics.errors);
    assert_eq!(metrics.exit_code(), 0);
    assert_eq!(metrics.source, "meli_api");
    assert_eq!(metrics.records_extracted, 2);
    assert_eq!(metrics.records_transformed, 2);
    assert_eq!(metrics.records_dropped, 0);
    assert_eq!(metrics.records_loaded, 2);

    table.assert_async().await;
    upload.assert_async().await;
}

#[tokio::test]
async fn test_dry_run_never_touches_warehouse() {
    let mut server = Server::new_async().await;
    mock_marketplace(&mut server).await;

    let table = server
        .mock("GET", TABLE_PATH)
        .expect(0)
        .create_async()
        .await;
    let upload = server
        .mock("POST", UPLOAD_PATH)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let metrics = PipelineCoordinator::from_config(config(&server.url(), true))
        .await
        .unwrap()
        .run()
        .await;

    assert!(metrics.success);
    assert!(metrics.dry_run);
    assert_eq!(metrics.records_loaded, 2);

    table.assert_async().await;
    upload.assert_async().await;
}

#[tokio::test]
async fn test_upstream_failure_exits_with_one() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/sites/MLA/search")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let metrics = PipelineCoordinator::from_config(config(&server.url(), false))
        .await
        .unwrap()
        .run()
        .await;

    assert!(!metrics.success);
    assert_eq!(metrics.exit_code(), 1);
    assert_eq!(metrics.records_extracted, 0);
    assert_eq!(metrics.errors.len(), 1);
}

#[tokio::test]
async fn test_scrape_source_to_bigquery_dry_run() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v2/acts/q0PB9Xd1hjynYAEhi/runs")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer apify_token")
        .with_status(201)
        .with_body(json!({"data": {"id": "run1", "status": "RUNNING"}}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/v2/actor-runs/run1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({"data": {"id": "run1", "status": "SUCCEEDED", "defaultDatasetId": "ds1"}})
                .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/v2/datasets/ds1/items")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([
                {"title": "Phone X", "price": "1.299,00", "currency": "ARS", "url": "http://x/1"},
                {"title": "Phone Y", "price": "$ 2.500", "seller": "SHOP"}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let mut config = config(&server.url(), true);
    config.source.kind = SourceKind::Scrape;
    config.apify = ApifyConfig {
        base_url: server.url(),
        token: Some(secret_string("apify_token".to_string())),
        search: "phone".to_string(),
        wait_seconds: 1,
        max_wait_seconds: 5,
        retry: fast_retry(),
        ..Default::default()
    };

    let metrics = PipelineCoordinator::from_config(config)
        .await
        .unwrap()
        .run()
        .await;

    assert!(metrics.success, "errors: {:?}", metrics.errors);
    assert_eq!(metrics.source, "apify");
    assert_eq!(metrics.records_extracted, 2);
    assert_eq!(metrics.records_transformed, 2);
}
