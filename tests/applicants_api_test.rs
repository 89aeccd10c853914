mod common;

use std::time::Duration;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::{json, Value as JsonValue};

use common::{john_doe, request, TestApp};

const REVIEWER: &[&str] = &[
    "applications.add_applicant",
    "applications.view_applicant",
    "applications.change_applicant",
];

fn timestamp(value: &JsonValue) -> DateTime<Utc> {
    value.as_str().expect("timestamp").parse().expect("rfc3339")
}

#[tokio::test]
async fn create_returns_pending_unstamped_applicant() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;

    let mut body = john_doe();
    body["approve_status"] = json!(1);
    body["approve_status_changed_by"] = json!(reviewer.id);
    body["id"] = json!(999);

    let (status, created) = app
        .send(request("POST", "/api/applicants/", Some(&reviewer.token), Some(body)))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(created["id"], json!(999));
    assert_eq!(created["name"], "John Doe");
    assert_eq!(created["approve_status"], 0);
    assert!(created["approve_status_changed_by"].is_null());
    assert!(created["approve_status_changed_at"].is_null());
    let id = created["id"].as_i64().unwrap();
    assert_eq!(
        created["url"],
        format!("http://testserver/api/applicants/{}/", id)
    );
    assert_eq!(
        created["comments"],
        format!("http://testserver/api/applicants/{}/comments/", id)
    );
}

#[tokio::test]
async fn status_change_stamps_actor_and_time() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;
    let (_, created) = app
        .send(request("POST", "/api/applicants", Some(&reviewer.token), Some(john_doe())))
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, patched) = app
        .send(request(
            "PATCH",
            &format!("/api/applicants/{}", id),
            Some(&reviewer.token),
            Some(json!({ "approve_status": 1 })),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["approve_status"], 1);
    assert_eq!(patched["approve_status_changed_by"], json!(reviewer.id));
    let changed_at = timestamp(&patched["approve_status_changed_at"]);
    assert!(changed_at >= timestamp(&created["updated_at"]));
    assert_eq!(patched["name"], "John Doe");
}

#[tokio::test]
async fn unchanged_status_keeps_stamp_but_refreshes_updated_at() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;
    let other = app.user("other", REVIEWER).await;
    let (_, created) = app
        .send(request("POST", "/api/applicants", Some(&reviewer.token), Some(john_doe())))
        .await;
    let uri = format!("/api/applicants/{}", created["id"]);

    let (_, stamped) = app
        .send(request("PATCH", &uri, Some(&reviewer.token), Some(json!({ "approve_status": 2 }))))
        .await;
    tokio::time::sleep(Duration::from_millis(5)).await;

    let (status, again) = app
        .send(request(
            "PATCH",
            &uri,
            Some(&other.token),
            Some(json!({ "approve_status": 2, "job_title": "Staff Engineer" })),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["job_title"], "Staff Engineer");
    assert_eq!(again["approve_status_changed_by"], stamped["approve_status_changed_by"]);
    assert_eq!(again["approve_status_changed_at"], stamped["approve_status_changed_at"]);
    assert!(timestamp(&again["updated_at"]) > timestamp(&stamped["updated_at"]));
}

#[tokio::test]
async fn stamp_fields_in_body_are_ignored() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;
    let (_, created) = app
        .send(request("POST", "/api/applicants", Some(&reviewer.token), Some(john_doe())))
        .await;

    let (status, patched) = app
        .send(request(
            "PATCH",
            &format!("/api/applicants/{}", created["id"]),
            Some(&reviewer.token),
            Some(json!({
                "approve_status_changed_by": reviewer.id,
                "approve_status_changed_at": "2020-01-01T00:00:00Z",
                "created_at": "2020-01-01T00:00:00Z"
            })),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(patched["approve_status_changed_by"].is_null());
    assert!(patched["approve_status_changed_at"].is_null());
    assert_eq!(patched["created_at"], created["created_at"]);
}

#[tokio::test]
async fn list_is_oldest_first_regardless_of_updates() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;
    let mut ids = Vec::new();
    for name in ["Ada", "Grace", "Linus"] {
        let mut body = john_doe();
        body["name"] = json!(name);
        let (_, created) = app
            .send(request("POST", "/api/applicants", Some(&reviewer.token), Some(body)))
            .await;
        ids.push(created["id"].clone());
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    app.send(request(
        "PATCH",
        &format!("/api/applicants/{}", ids[0]),
        Some(&reviewer.token),
        Some(json!({ "approve_status": 1 })),
    ))
    .await;

    let (status, listed) = app
        .send(request("GET", "/api/applicants", Some(&reviewer.token), None))
        .await;

    assert_eq!(status, StatusCode::OK);
    let listed_ids: Vec<JsonValue> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].clone())
        .collect();
    assert_eq!(listed_ids, ids);
}

#[tokio::test]
async fn read_only_user_cannot_update() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;
    let viewer = app.user("viewer", &["applications.view_applicant"]).await;
    let (_, created) = app
        .send(request("POST", "/api/applicants", Some(&reviewer.token), Some(john_doe())))
        .await;
    let uri = format!("/api/applicants/{}", created["id"]);

    let (status, body) = app
        .send(request("PATCH", &uri, Some(&viewer.token), Some(json!({ "approve_status": 1 }))))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let (status, unchanged) = app.send(request("GET", &uri, Some(&viewer.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn create_without_permission_persists_nothing() {
    let app = TestApp::new().await;
    let viewer = app.user("viewer", &["applications.view_applicant"]).await;

    let (status, _) = app
        .send(request("POST", "/api/applicants", Some(&viewer.token), Some(john_doe())))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, listed) = app
        .send(request("GET", "/api/applicants", Some(&viewer.token), None))
        .await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn put_requires_every_creator_field() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;
    let (_, created) = app
        .send(request("POST", "/api/applicants", Some(&reviewer.token), Some(john_doe())))
        .await;
    let uri = format!("/api/applicants/{}", created["id"]);

    let (status, body) = app
        .send(request("PUT", &uri, Some(&reviewer.token), Some(json!({ "name": "Jane Doe" }))))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["email"], json!(["required"]));
    assert!(body["fields"].get("name").is_none());

    let mut full = john_doe();
    full["name"] = json!("Jane Doe");
    let (status, replaced) = app.send(request("PUT", &uri, Some(&reviewer.token), Some(full))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["name"], "Jane Doe");
    assert_eq!(replaced["approve_status"], 0);
}

#[tokio::test]
async fn invalid_fields_are_named() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;
    let mut body = john_doe();
    body["email"] = json!("not-an-email");
    body["phone"] = json!("1234567890123456");

    let (status, errors) = app
        .send(request("POST", "/api/applicants", Some(&reviewer.token), Some(body)))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(errors["fields"]["email"].is_array());
    assert!(errors["fields"]["phone"].is_array());
    assert!(errors["fields"].get("name").is_none());
}

#[tokio::test]
async fn out_of_range_status_is_rejected() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;
    let (_, created) = app
        .send(request("POST", "/api/applicants", Some(&reviewer.token), Some(john_doe())))
        .await;

    let (status, body) = app
        .send(request(
            "PATCH",
            &format!("/api/applicants/{}", created["id"]),
            Some(&reviewer.token),
            Some(json!({ "approve_status": 7 })),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["approve_status"].is_array());
}

#[tokio::test]
async fn unknown_applicant_is_not_found() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;

    let (status, _) = app
        .send(request("GET", "/api/applicants/4242", Some(&reviewer.token), None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(request(
            "PATCH",
            "/api/applicants/4242",
            Some(&reviewer.token),
            Some(json!({ "approve_status": 1 })),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, body) = app.send(request("GET", "/api/applicants", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_authorization");

    let (status, _) = app
        .send(request("GET", "/api/applicants", Some("not-a-jwt"), None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_is_not_exposed() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;
    let (_, created) = app
        .send(request("POST", "/api/applicants", Some(&reviewer.token), Some(john_doe())))
        .await;

    let (status, _) = app
        .send(request(
            "DELETE",
            &format!("/api/applicants/{}", created["id"]),
            Some(&reviewer.token),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn head_and_options_need_no_permission() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;
    let nobody = app.user("nobody", &[]).await;
    let (_, created) = app
        .send(request("POST", "/api/applicants", Some(&reviewer.token), Some(john_doe())))
        .await;

    for uri in [
        "/api/applicants".to_string(),
        format!("/api/applicants/{}", created["id"]),
        format!("/api/applicants/{}/comments", created["id"]),
    ] {
        let (status, body) = app.send(request("HEAD", &uri, Some(&nobody.token), None)).await;
        assert_eq!(status, StatusCode::OK, "HEAD {}", uri);
        assert!(body.is_null());
    }

    let (status, _) = app
        .send(request("OPTIONS", "/api/applicants", Some(&nobody.token), None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(request("GET", "/api/applicants", Some(&nobody.token), None))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn denial_does_not_depend_on_body() {
    let app = TestApp::new().await;
    let viewer = app.user("viewer", &["applications.view_applicant"]).await;

    for body in [json!({ "name": 5 }), json!("not an object"), json!({})] {
        let (status, error) = app
            .send(request("POST", "/api/applicants", Some(&viewer.token), Some(body)))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(error["error"].is_string());
    }
}

#[tokio::test]
async fn mistyped_body_is_a_json_client_error() {
    let app = TestApp::new().await;
    let reviewer = app.user("reviewer", REVIEWER).await;
    let (_, created) = app
        .send(request("POST", "/api/applicants", Some(&reviewer.token), Some(john_doe())))
        .await;

    let (status, error) = app
        .send(request(
            "PATCH",
            &format!("/api/applicants/{}", created["id"]),
            Some(&reviewer.token),
            Some(json!({ "approve_status": "1" })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].as_str().unwrap().contains("approve_status"));

    let (status, error) = app
        .send(request(
            "POST",
            "/api/applicants",
            Some(&reviewer.token),
            Some(json!({ "name": 5 })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].is_string());

    let (_, unchanged) = app
        .send(request(
            "GET",
            &format!("/api/applicants/{}", created["id"]),
            Some(&reviewer.token),
            None,
        ))
        .await;
    assert_eq!(unchanged["approve_status"], 0);
}
