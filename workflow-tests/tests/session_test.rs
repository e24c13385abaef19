//! Session lifecycle over HTTP: login, introspection, logout.

use gate_core::axum::http::{Method, StatusCode};
use serde_json::json;
use workflow_tests::spawn_app;

#[tokio::test]
async fn login_issues_a_working_token() {
    let app = spawn_app();

    let (status, body) = app
        .post(
            "/auth/login",
            None,
            json!({"username": "emmanuel", "password": "emmanuel123"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["congregation_name"], "Emmanuel Congregation Ahinsan");
    assert_eq!(body["is_district"], false);

    let token = body["token"].as_str().unwrap();
    let (status, session) = app.get("/auth/session", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["username"], "emmanuel");
    assert_eq!(session["security_access_granted"], false);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_read_the_same() {
    let app = spawn_app();

    let (status, wrong_pw) = app
        .post(
            "/auth/login",
            None,
            json!({"username": "emmanuel", "password": "nope"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = app
        .post(
            "/auth/login",
            None,
            json!({"username": "no-such-account", "password": "nope"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // no hint distinguishes the two failures
    assert_eq!(wrong_pw["error"], unknown["error"]);
}

#[tokio::test]
async fn requests_without_a_session_are_refused() {
    let app = spawn_app();

    let (status, _) = app.get("/members", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/members", Some("not-a-real-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = spawn_app();
    let token = app.login("emmanuel", "emmanuel123").await;

    let (status, _) = app
        .request(Method::POST, "/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/auth/session", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn member_reads_are_scoped_to_the_principal() {
    let app = spawn_app();

    let emmanuel = app.login("emmanuel", "emmanuel123").await;
    let (_, local) = app.get("/members", Some(&emmanuel)).await;

    let district = app.login("district", "district123").await;
    let (_, all) = app.get("/members", Some(&district)).await;

    let local_total = local["total"].as_u64().unwrap();
    let district_total = all["total"].as_u64().unwrap();
    assert!(local_total > 0);
    assert!(district_total > local_total);
}
