//! Integration tests for marketplace module installation

mod api_harness;

use api_harness::{ADMIN, MARKET_TOKEN, OWNER, harness};
use axum::http::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_anonymous_gets_401() {
    let h = harness();

    let response = h
        .server
        .post("/api/v1/modules/check")
        .json(&json!({ "api_token": MARKET_TOKEN }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["code"], json!("UNAUTHORIZED"));
}

#[tokio::test]
async fn test_without_ability_gets_403() {
    let h = harness();

    let response = h
        .server
        .post("/api/v1/modules/check")
        .add_header("authorization", ADMIN)
        .json(&json!({ "api_token": MARKET_TOKEN }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let body = response.json::<Value>();
    assert_eq!(body["code"], json!("FORBIDDEN"));
    assert!(body["message"].as_str().unwrap().contains("manage modules"));
}

#[tokio::test]
async fn test_ability_is_checked_before_the_body() {
    let h = harness();

    for path in [
        "/api/v1/modules/download",
        "/api/v1/modules/unzip",
        "/api/v1/modules/copy",
        "/api/v1/modules/complete",
    ] {
        let response = h
            .server
            .post(path)
            .add_header("authorization", ADMIN)
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(response.json::<Value>()["code"], json!("FORBIDDEN"));
    }

    h.server
        .post("/api/v1/modules/download")
        .add_header("authorization", ADMIN)
        .text("{not json")
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

// =============================================================================
// Token check
// =============================================================================

mod token_check {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_400() {
        let h = harness();

        let response = h
            .server
            .post("/api/v1/modules/check")
            .add_header("authorization", OWNER)
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>(),
            json!({ "success": false, "message": "API token is required" })
        );
    }

    #[tokio::test]
    async fn test_blank_token_is_400() {
        let h = harness();

        let response = h
            .server
            .post("/api/v1/modules/check")
            .add_header("authorization", OWNER)
            .json(&json!({ "api_token": "   " }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["message"],
            json!("API token cannot be empty")
        );
    }

    #[tokio::test]
    async fn test_rejected_token_is_401() {
        let h = harness();

        let response = h
            .server
            .post("/api/v1/modules/check")
            .add_header("authorization", OWNER)
            .json(&json!({ "api_token": "stolen" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<Value>(),
            json!({ "success": false, "message": "Invalid token" })
        );
    }

    #[tokio::test]
    async fn test_valid_token_passes_through_payload() {
        let h = harness();

        let response = h
            .server
            .post("/api/v1/modules/check")
            .add_header("authorization", OWNER)
            .json(&json!({ "api_token": MARKET_TOKEN }))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({ "success": true, "message": "Token verified" })
        );
    }
}

// =============================================================================
// Installation steps
// =============================================================================

mod installation {
    use super::*;

    #[tokio::test]
    async fn test_full_installation() {
        let h = harness();

        let download = h
            .server
            .post("/api/v1/modules/download")
            .add_header("authorization", OWNER)
            .json(&json!({ "module": "sales-tax", "version": "1.0.0" }))
            .await;
        download.assert_status_ok();
        let download = download.json::<Value>();
        assert_eq!(download["success"], json!(true));
        let zip = download["path"].as_str().unwrap().to_string();

        let unzip = h
            .server
            .post("/api/v1/modules/unzip")
            .add_header("authorization", OWNER)
            .json(&json!({ "module": "sales-tax", "path": zip }))
            .await
            .json::<Value>();
        assert_eq!(unzip["success"], json!(true));
        let extracted = unzip["path"].as_str().unwrap().to_string();
        assert!(extracted.ends_with("/sales-tax"));

        let copy = h
            .server
            .post("/api/v1/modules/copy")
            .add_header("authorization", OWNER)
            .json(&json!({ "module": "sales-tax", "path": extracted }))
            .await;
        assert_eq!(copy.json::<Value>(), json!({ "success": true }));

        let complete = h
            .server
            .post("/api/v1/modules/complete")
            .add_header("authorization", OWNER)
            .json(&json!({ "module": "sales-tax", "version": "1.0.0" }))
            .await;
        assert_eq!(complete.json::<Value>(), json!({ "success": true }));

        assert_eq!(
            h.modules.completed(),
            vec![("sales-tax".to_string(), "1.0.0".to_string())]
        );
    }

    #[tokio::test]
    async fn test_download_failure_is_reported_in_body() {
        let h = harness();

        let response = h
            .server
            .post("/api/v1/modules/download")
            .add_header("authorization", OWNER)
            .json(&json!({ "module": "sales-tax" }))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({ "success": false, "error": "Module not found" })
        );
    }

    #[tokio::test]
    async fn test_missing_module_is_422() {
        let h = harness();

        let response = h
            .server
            .post("/api/v1/modules/unzip")
            .add_header("authorization", OWNER)
            .json(&json!({ "path": "/tmp/temp-1/upload.zip" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.json::<Value>()["errors"]["module"][0],
            json!("The module field is required.")
        );
    }
}
