//! The PIN challenge workflow end to end: request, submit, confirm,
//! cancel, and the notifications mutations leave behind.

use gate_core::axum::http::{Method, StatusCode};
use serde_json::json;
use workflow_tests::spawn_app;

#[tokio::test]
async fn delete_flow_wrong_then_right_pin() {
    let app = spawn_app();
    let token = app.login("emmanuel", "emmanuel123").await;
    let member = app.any_member_of("emmanuel");

    // challenge names the member
    let (status, body) = app
        .post(
            "/gate/request",
            Some(&token),
            json!({"action": {"kind": "delete", "member_id": member.id}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["challenge"]["kind"], "delete");
    assert_eq!(
        body["challenge"]["message"],
        format!("Please enter your PIN to delete {}", member.full_name())
    );

    // wrong PIN: denied, nothing executed, challenge still open
    let (status, body) = app
        .post("/gate/submit", Some(&token), json!({"pin": "9999"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["granted"], false);
    assert_eq!(body["message"], "Incorrect PIN. Please try again.");
    assert!(app.members.get(member.id).is_some());

    // right PIN: executes exactly once
    let (status, body) = app
        .post("/gate/submit", Some(&token), json!({"pin": "1234"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["granted"], true);
    assert_eq!(body["message"], "Member deleted successfully!");
    assert!(app.members.get(member.id).is_none());

    // district notification was emitted
    let sent = app.notifications.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, format!("Delete in {}", member.congregation_name));
    assert_eq!(
        sent[0].message,
        format!("{} was deleted by emmanuel.", member.full_name())
    );

    // a second submit finds no challenge
    let (status, _) = app
        .post("/gate/submit", Some(&token), json!({"pin": "1234"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn bulk_delete_requires_second_confirmation() {
    let app = spawn_app();
    let token = app.login("emmanuel", "emmanuel123").await;
    let member = app.any_member_of("emmanuel");

    let (status, _) = app
        .post(
            "/gate/request",
            Some(&token),
            json!({"action": {"kind": "bulk_delete", "member_ids": [member.id]}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // PIN grant parks the action behind a confirm step
    let (status, body) = app
        .post("/gate/submit", Some(&token), json!({"pin": "1234"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["granted"], true);
    assert_eq!(body["awaiting_confirmation"], true);
    assert!(app.members.get(member.id).is_some());

    let (status, body) = app
        .request(Method::POST, "/gate/confirm", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "1 member(s) deleted successfully!");
    assert!(app.members.get(member.id).is_none());

    // confirming again has nothing to run
    let (status, _) = app
        .request(Method::POST, "/gate/confirm", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn cancel_after_grant_discards_the_bulk_action() {
    let app = spawn_app();
    let token = app.login("emmanuel", "emmanuel123").await;
    let member = app.any_member_of("emmanuel");
    let before = app.members.len();

    app.post(
        "/gate/request",
        Some(&token),
        json!({"action": {"kind": "bulk_delete", "member_ids": [member.id]}}),
    )
    .await;
    app.post("/gate/submit", Some(&token), json!({"pin": "1234"}))
        .await;

    let (status, _) = app
        .request(Method::POST, "/gate/cancel", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.members.len(), before);

    // the grant cannot be replayed
    let (status, _) = app
        .request(Method::POST, "/gate/confirm", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // cancel is idempotent
    let (status, _) = app
        .request(Method::POST, "/gate/cancel", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn a_new_request_overwrites_the_previous_pending_action() {
    let app = spawn_app();
    let token = app.login("emmanuel", "emmanuel123").await;
    let member = app.any_member_of("emmanuel");

    app.post(
        "/gate/request",
        Some(&token),
        json!({"action": {"kind": "delete", "member_id": member.id}}),
    )
    .await;

    // overwrite with an edit of the same member
    app.post(
        "/gate/request",
        Some(&token),
        json!({"action": {"kind": "edit", "member_id": member.id,
               "fields": {"phone_number": "0200000001"}}}),
    )
    .await;

    let (status, body) = app
        .post("/gate/submit", Some(&token), json!({"pin": "1234"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "edit");

    // the member was edited, not deleted
    let survivor = app.members.get(member.id).expect("member still present");
    assert_eq!(survivor.phone_number, "0200000001");
}

#[tokio::test]
async fn security_access_elevates_the_session() {
    let app = spawn_app();
    let token = app.login("peniel", "peniel123").await;

    // preferences writes are refused without elevation
    let (status, _) = app
        .request(
            Method::PUT,
            "/security/preferences",
            Some(&token),
            Some(json!({"two_factor_auth": true})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.post(
        "/gate/request",
        Some(&token),
        json!({"action": {"kind": "security_access"}}),
    )
    .await;
    let (status, body) = app
        .post("/gate/submit", Some(&token), json!({"pin": "1234"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Security access granted!");

    let (_, session) = app.get("/auth/session", Some(&token)).await;
    assert_eq!(session["security_access_granted"], true);

    let (status, prefs) = app
        .request(
            Method::PUT,
            "/security/preferences",
            Some(&token),
            Some(json!({"two_factor_auth": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["two_factor_auth"], true);

    // elevation is per session: a fresh login starts unelevated
    let fresh = app.login("peniel", "peniel123").await;
    let (_, session) = app.get("/auth/session", Some(&fresh)).await;
    assert_eq!(session["security_access_granted"], false);
}

#[tokio::test]
async fn congregations_cannot_touch_each_others_members() {
    let app = spawn_app();
    let emmanuel_member = app.any_member_of("emmanuel");

    // another congregation is refused before any challenge appears
    let peniel = app.login("peniel", "peniel123").await;
    let (status, _) = app
        .post(
            "/gate/request",
            Some(&peniel),
            json!({"action": {"kind": "delete", "member_id": emmanuel_member.id}}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // the district admin is not
    let district = app.login("district", "district123").await;
    let (status, _) = app
        .post(
            "/gate/request",
            Some(&district),
            json!({"action": {"kind": "delete", "member_id": emmanuel_member.id}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_pin_is_a_validation_error_not_a_denial() {
    let app = spawn_app();
    let token = app.login("emmanuel", "emmanuel123").await;
    let member = app.any_member_of("emmanuel");

    app.post(
        "/gate/request",
        Some(&token),
        json!({"action": {"kind": "delete", "member_id": member.id}}),
    )
    .await;

    let (status, _) = app
        .post("/gate/submit", Some(&token), json!({"pin": "12ab"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // the challenge survived the malformed attempt
    let (status, body) = app
        .post("/gate/submit", Some(&token), json!({"pin": "1234"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["granted"], true);
}
