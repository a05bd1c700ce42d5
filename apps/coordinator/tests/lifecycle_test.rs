// [apps/coordinator/tests/lifecycle_test.rs]
//! End-to-end HTTP coverage for the three terminal verdict paths and
//! the commit-reveal hash binding (spec.md §8, scenarios 1-4), driven
//! entirely through the `/api/v1` router with `tower::ServiceExt::oneshot`
//! rather than a bound socket.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use whistlechain_coordinator::prelude::*;

fn test_app() -> axum::Router {
    build_router(AppState::new(Config::default()))
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

async fn post_json(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

/// Hand-rolled `multipart/form-data` body: no multipart client in the
/// dependency graph, so the wire format is built directly the way
/// `submit_evidence` expects to parse it.
fn multipart_submit_body(boundary: &str, category: &str, organization: &str, description: &str, stake: u64) -> Vec<u8> {
    let mut body = Vec::new();
    let mut push_field = |name: &str, value: &str| {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    };
    push_field("category", category);
    push_field("organization", organization);
    push_field("description", description);
    push_field("stake", &stake.to_string());

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"files\"; filename=\"statement.pdf\"\r\n\
Content-Type: application/octet-stream\r\n\r\n",
    );
    body.extend_from_slice(b"alleged misappropriation of public funds");
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

async fn submit_evidence(app: &axum::Router, category: &str, stake: u64) -> (StatusCode, Value) {
    let boundary = "whistlechain-test-boundary";
    let body = multipart_submit_body(boundary, category, "Acme Municipal Works", "Invoices inflated over three quarters", stake);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/evidence/submit")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

/// Registers three FINANCIAL-specialized inspectors and returns their
/// wallet addresses.
async fn register_panel(app: &axum::Router) -> Vec<String> {
    let mut wallets = Vec::new();
    for i in 0..3 {
        let (_, wallet) = post_json(app, "/api/v1/wallet/create", json!({})).await;
        let address = wallet["address"].as_str().unwrap().to_string();
        let (status, _) = post_json(
            app,
            "/api/v1/verification/register-inspector",
            json!({
                "address": address,
                "display_name": format!("Inspector {i}"),
                "specializations": ["FINANCIAL"],
                "department": "Oversight Bureau",
                "employee_id": format!("EMP-{i:03}"),
                "jurisdiction": "National",
                "experience_years": 5,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        wallets.push(address);
    }
    wallets
}

fn commit_hash_hex(verdict_code: u8, nonce: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update((verdict_code as u64).to_be_bytes());
    hasher.update(nonce.as_bytes());
    hex::encode(hasher.finalize())
}

/// Drives one evidence item from submission through commit/reveal with
/// a uniform verdict set, returning the evidence id.
async fn run_until_revealed(app: &axum::Router, verdicts: &[u8; 3]) -> String {
    register_panel(app).await;
    let (status, submitted) = submit_evidence(app, "FINANCIAL", 25_000_000).await;
    assert_eq!(status, StatusCode::OK, "{submitted}");
    let evidence_id = submitted["id"].as_str().unwrap().to_string();

    let (status, session) = post_json(
        app,
        "/api/v1/verification/begin",
        json!({"evidence_id": evidence_id, "category": "FINANCIAL"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{session}");
    let panel: Vec<String> = session["panel"].as_array().unwrap().iter().map(|w| w.as_str().unwrap().to_string()).collect();

    for (i, wallet) in panel.iter().enumerate() {
        let nonce = format!("nonce-{i}-{evidence_id}");
        let hash = commit_hash_hex(verdicts[i], &nonce);
        let (status, _) = post_json(
            app,
            "/api/v1/verification/commit",
            json!({"evidence_id": evidence_id, "inspector_address": wallet, "commit_hash": hash}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    for (i, wallet) in panel.iter().enumerate() {
        let nonce = format!("nonce-{i}-{evidence_id}");
        let (status, body) = post_json(
            app,
            "/api/v1/verification/reveal",
            json!({
                "evidence_id": evidence_id,
                "inspector_address": wallet,
                "verdict": verdicts[i],
                "nonce": nonce,
                "justification_ipfs": "cid-justification-detail",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    evidence_id
}

#[tokio::test]
async fn verified_happy_path_releases_stake_and_publishes() {
    let app = test_app();
    let evidence_id = run_until_revealed(&app, &[1, 1, 1]).await;

    let (status, finalized) = post_json(&app, &format!("/api/v1/verification/finalize?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finalized["final_verdict"], json!("VERIFIED"));
    assert_eq!(finalized["tally"]["authentic_weight"], finalized["tally"]["total_weight"]);

    let (status, resolution) = post_json(&app, &format!("/api/v1/resolution/resolve?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolution["action"], json!("STAKE_RELEASED"));
    assert_eq!(resolution["refund_micro"], json!(25_000_000));

    let (status, bounty) = post_json(&app, &format!("/api/v1/bounty/process?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bounty["payout_micro"], json!(200_000_000));
    assert_eq!(bounty["status"], json!("PAID"));

    let (status, audit) = post_json(&app, &format!("/api/v1/audit/publish?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit["verification"]["final_verdict"], json!("VERIFIED"));

    let (status, publication) = post_json(&app, &format!("/api/v1/publication/publish?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(publication["rti_reference"].as_str().unwrap().starts_with("RTI/"));

    // A resolved, published case still carries its original submission record.
    let (status, evidence) = get(&app, &format!("/api/v1/evidence/{evidence_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(evidence["evidence"]["status"]["state"], json!("PUBLISHED"));
}

#[tokio::test]
async fn rejected_path_forfeits_stake_with_no_bounty() {
    let app = test_app();
    let evidence_id = run_until_revealed(&app, &[2, 2, 2]).await;

    let (status, finalized) = post_json(&app, &format!("/api/v1/verification/finalize?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finalized["final_verdict"], json!("REJECTED"));

    let (status, resolution) = post_json(&app, &format!("/api/v1/resolution/resolve?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolution["action"], json!("STAKE_FORFEITED"));
    assert_eq!(resolution["refund_micro"], json!(0));

    let (status, bounty) = post_json(&app, &format!("/api/v1/bounty/process?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bounty["payout_micro"], json!(0));
    assert_eq!(bounty["status"], json!("FORFEITED"));

    let (status, transparency) = get(&app, "/api/v1/transparency").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(transparency["total_forfeited_micro"], json!(25_000_000));
}

#[tokio::test]
async fn disputed_path_locks_stake_with_no_transfer() {
    let app = test_app();
    let evidence_id = run_until_revealed(&app, &[1, 2, 3]).await;

    let (status, finalized) = post_json(&app, &format!("/api/v1/verification/finalize?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finalized["final_verdict"], json!("DISPUTED"));

    let (status, resolution) = post_json(&app, &format!("/api/v1/resolution/resolve?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolution["action"], json!("STAKE_LOCKED"));
    assert_eq!(resolution["refund_micro"], json!(0));

    let (status, bounty) = post_json(&app, &format!("/api/v1/bounty/process?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bounty["payout_micro"], json!(0));
    assert_eq!(bounty["status"], json!("PENDING"));
}

#[tokio::test]
async fn commit_reveal_tamper_is_rejected_with_crypto_error() {
    let app = test_app();
    register_panel(&app).await;
    let (_, submitted) = submit_evidence(&app, "FINANCIAL", 25_000_000).await;
    let evidence_id = submitted["id"].as_str().unwrap().to_string();

    let (_, session) = post_json(&app, "/api/v1/verification/begin", json!({"evidence_id": evidence_id, "category": "FINANCIAL"})).await;
    let inspector = session["panel"][0].as_str().unwrap().to_string();

    let hash = commit_hash_hex(1, "n");
    let (status, _) = post_json(
        &app,
        "/api/v1/verification/commit",
        json!({"evidence_id": evidence_id, "inspector_address": inspector, "commit_hash": hash}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &app,
        "/api/v1/verification/reveal",
        json!({
            "evidence_id": evidence_id,
            "inspector_address": inspector,
            "verdict": 2,
            "nonce": "n",
            "justification_ipfs": "cid-justification-detail",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("CRYPTO_ERROR"));

    // The tampered reveal never touched session state: the commit is
    // still the only recorded event, so the session is still mid-commit.
    let (_, session_after) = get(&app, &format!("/api/v1/verification/status/{evidence_id}")).await;
    assert_eq!(session_after["reveals"].as_object().unwrap().len(), 0);
}

#[tokio::test]
async fn resolve_is_idempotent_after_the_first_call() {
    let app = test_app();
    let evidence_id = run_until_revealed(&app, &[1, 1, 1]).await;
    post_json(&app, &format!("/api/v1/verification/finalize?evidence_id={evidence_id}"), json!({})).await;

    let (first_status, _) = post_json(&app, &format!("/api/v1/resolution/resolve?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(first_status, StatusCode::OK);

    let (second_status, body) = post_json(&app, &format!("/api/v1/resolution/resolve?evidence_id={evidence_id}"), json!({})).await;
    assert_eq!(second_status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("STATE_ERROR"));
}

#[tokio::test]
async fn evidence_submission_rejects_stake_one_unit_below_category_minimum() {
    let app = test_app();
    register_panel(&app).await;
    let (status, body) = submit_evidence(&app, "FINANCIAL", 24_999_999).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn health_check_reports_ok_without_touching_the_api_tree() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
