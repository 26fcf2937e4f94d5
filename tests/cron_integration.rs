//! Integration tests for the cron endpoint and health probes

mod api_harness;

use api_harness::{CRON_SECRET, harness};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use invoicer::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct CountingPdf {
    generated: AtomicUsize,
}

#[async_trait]
impl GeneratesPdf for CountingPdf {
    fn pdf_name(&self) -> String {
        "INV-000042".to_string()
    }

    async fn generate_pdf(&self, _delete_existing_file: bool) -> Result<()> {
        self.generated.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

mod cron {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let h = harness();

        let response = h.server.post("/api/cron").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>(), json!(["unauthorized"]));
    }

    #[tokio::test]
    async fn test_wrong_or_empty_token_is_unauthorized() {
        let h = harness();

        for token in ["guess", ""] {
            let response = h
                .server
                .post("/api/cron")
                .add_header("x-authorization-token", token)
                .await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            assert_eq!(response.json::<Value>(), json!(["unauthorized"]));
        }
    }

    #[tokio::test]
    async fn test_runs_queued_pdf_jobs() {
        let h = harness();
        let pdf = Arc::new(CountingPdf {
            generated: AtomicUsize::new(0),
        });
        h.jobs.dispatch(GeneratePdfJob::new(pdf.clone(), true)).await;
        h.jobs.dispatch(GeneratePdfJob::new(pdf.clone(), false)).await;

        let response = h
            .server
            .post("/api/cron")
            .add_header("x-authorization-token", CRON_SECRET)
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({ "success": true, "processed": 2 })
        );
        assert_eq!(pdf.generated.load(Ordering::SeqCst), 2);
        assert!(h.jobs.is_empty().await);
    }

    #[tokio::test]
    async fn test_unset_secret_rejects_everything() {
        // Default config ships an empty cron token
        let server = TestServer::new(ServerBuilder::new().build().unwrap());

        server
            .post("/api/cron")
            .add_header("x-authorization-token", "")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints() {
        let h = harness();

        for path in ["/health", "/healthz"] {
            let response = h.server.get(path).await;
            response.assert_status_ok();
            assert_eq!(
                response.json::<Value>(),
                json!({ "status": "ok", "service": "invoicer" })
            );
        }
    }
}
