use crate::helpers::{created_id, error_message, spawn_app};

#[tokio::test]
async fn subscribe_returns_the_new_subscriber_id() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_subscribe(&serde_json::json!({"email": "foobar@example.com"}))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let id = created_id(response).await;

    let email = sqlx::query_scalar::<_, String>("SELECT email FROM subscribers WHERE id = $1")
        .bind(id)
        .fetch_one(&app.pg_pool)
        .await
        .expect("Failed to fetch saved subscriber");
    assert_eq!(email, "foobar@example.com");
}

#[tokio::test]
async fn subscribe_without_an_email_is_rejected_with_400() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (serde_json::json!({}), "missing email"),
        (serde_json::json!({"email": ""}), "empty email"),
        (serde_json::json!({"email": null}), "null email"),
    ];

    for (body, case) in test_cases {
        // Act
        let response = app.post_subscribe(&body).await;

        // Assert
        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not fail with 400 Bad Request for {}",
            case
        );
        assert_eq!(error_message(response).await, "Email is required");
    }
    assert_eq!(app.subscriber_count().await, 0);
}

#[tokio::test]
async fn subscribing_twice_is_rejected_as_a_duplicate() {
    // Arrange
    let app = spawn_app().await;
    let body = serde_json::json!({"email": "foobar@example.com"});

    // Act 1
    let first = app.post_subscribe(&body).await;
    assert_eq!(first.status().as_u16(), 200);

    // Act 2
    let second = app.post_subscribe(&body).await;

    // Assert
    assert_eq!(second.status().as_u16(), 400);
    assert_eq!(error_message(second).await, "Email already subscribed");
    assert_eq!(app.subscriber_count().await, 1);
}

#[tokio::test]
async fn email_format_is_not_validated() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_subscribe(&serde_json::json!({"email": "definitely not an email"}))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.subscriber_count().await, 1);
}
