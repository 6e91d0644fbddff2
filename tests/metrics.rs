// tests/metrics.rs
//
// The Prometheus recorder is process-global, so everything that needs it
// lives in this one test.

use http::{Request, StatusCode};
use shuttle_axum::axum::body::{self, Body};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt as _;

use job_scout::config::AppConfig;
use job_scout::generate::DisabledGenerator;
use job_scout::ingest::providers::remoteok::RemoteOkAdapter;
use job_scout::ingest::types::SourceAdapter;
use job_scout::metrics::Metrics;
use job_scout::store::{JobStore, SqliteStore};
use job_scout::Pipeline;

#[tokio::test]
async fn metrics_endpoint_exposes_pipeline_series() {
    let m = Metrics::init().expect("install recorder");
    assert!(Metrics::init().is_err(), "second install must fail, not panic");

    let body = std::fs::read_to_string("tests/fixtures/remoteok.json").expect("fixture");
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(RemoteOkAdapter::from_fixture(&body)),
        Arc::new(RemoteOkAdapter::from_fixture("not json")),
    ];
    let store: Arc<dyn JobStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let mut cfg = AppConfig::default();
    cfg.pipeline.pacing_ms = 0;
    let p = Pipeline::new(adapters, store, Arc::new(DisabledGenerator), &cfg);
    p.run_once().await.expect("run");

    // let the exporter observe the updates
    tokio::time::sleep(Duration::from_millis(20)).await;

    let resp = m
        .router()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(
        body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap()
            .to_vec(),
    )
    .unwrap();

    for series in [
        "scout_adapter_postings_total",
        "scout_adapter_errors_total",
        "scout_filtered_out_total",
        "scout_inserted_total",
        "scout_runs_total",
        "scout_pipeline_last_run_ts",
    ] {
        assert!(text.contains(series), "missing {series} in:\n{text}");
    }
    assert!(text.contains(r#"adapter="RemoteOK""#));
}
