mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{DateTime, Utc};
use common::{body_text, TestApp};
use tower::ServiceExt; // for `oneshot`

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

// One user walks the whole surface: register twice, log in with the wrong
// then the right password, create, complete, and delete a todo.
#[tokio::test]
async fn test_full_user_lifecycle() {
    let app = TestApp::new().await;

    // 1. First registration succeeds and lands on the login page.
    let response = app.register("alice", "pw1").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/auth/login"
    );

    // 2. Same username again is refused, whatever the password.
    let response = app.register("alice", "pw2").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("User alice is already registered."));

    // 3. Wrong password is refused.
    let response = app
        .post_form(
            "/auth/login",
            None,
            &[("username", "alice"), ("password", "pw2")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("Invalid username or password."));

    // 4. Right password opens a session.
    let session = app.login("alice", "pw1").await;

    // 5. Create a todo and find it in the shared listing.
    let response = app.create_todo(&session, "Buy milk", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let id: i64 = sqlx::query_scalar("SELECT id FROM todo ORDER BY id DESC LIMIT 1")
        .fetch_one(&app.pool)
        .await
        .unwrap();

    let body = body_text(app.get("/", None).await).await;
    assert!(body.contains("Buy milk"));
    assert!(body.contains("by alice"));

    // 6. Complete it with an amended description.
    let response = app
        .post_form(
            &format!("/{id}/update"),
            Some(&session),
            &[
                ("task", "Buy milk"),
                ("description", "2%"),
                ("completed", "on"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (description, completed, completed_at): (String, bool, Option<DateTime<Utc>>) =
        sqlx::query_as("SELECT description, completed, completed_at FROM todo WHERE id = ?")
            .bind(id)
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(description, "2%");
    assert!(completed);
    assert!(completed_at.is_some());

    // 7. Delete it; the listing empties and the id stops resolving.
    let response = app
        .post_form(&format!("/{id}/delete"), Some(&session), &[])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = body_text(app.get("/", None).await).await;
    assert!(!body.contains("Buy milk"));

    let response = app.get(&format!("/{id}/update"), Some(&session)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
