use serde_json::{
    json,
    Value,
};

use crate::helpers::*;

#[actix_rt::test]
async fn admin_creates_and_reads_a_user() {
    let test_app = spawn_app().await;
    let user = test_app.create_user("ursula@example.com").await;

    let response = test_app
        .get_as(&format!("/users/{}", user.id), &test_app.admin)
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "ursula@example.com");
    assert_eq!(body["firstName"], "Ursula");
    assert_eq!(body["gender"], "FEMALE");
    assert_eq!(body["role"], "USER");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[actix_rt::test]
async fn created_user_can_authenticate() {
    let test_app = spawn_app().await;
    let user = test_app.create_user("ursula@example.com").await;

    let response = test_app.get_as("/subscriber-lists/my", &user).await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(json!([]), response.json::<Value>().await.unwrap());
}

#[actix_rt::test]
async fn regular_user_cannot_use_admin_endpoints() {
    let test_app = spawn_app().await;
    let user = test_app.create_user("ursula@example.com").await;

    let response = test_app.get_as("/users", &user).await;
    assert_eq!(403, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "forbidden");

    let response = test_app.get_as("/subscribers", &user).await;
    assert_eq!(403, response.status().as_u16());
}

#[actix_rt::test]
async fn duplicate_email_returns_a_409() {
    let test_app = spawn_app().await;
    test_app.create_user("ursula@example.com").await;

    let response = test_app
        .post_as(
            "/users",
            &json!({ "email": "ursula@example.com", "password": "another" }),
            &test_app.admin,
        )
        .await;

    assert_eq!(409, response.status().as_u16());
}

#[actix_rt::test]
async fn create_user_returns_a_400_for_invalid_data() {
    let test_app = spawn_app().await;
    let invalid_bodies = vec![
        (json!({ "password": "secret" }), "missing email"),
        (json!({ "email": "not-an-email", "password": "secret" }), "invalid email"),
        (json!({ "email": "a@example.com" }), "missing password"),
        (
            json!({ "email": "a@example.com", "password": "secret", "gender": "ROBOT" }),
            "unknown gender",
        ),
        (
            json!({ "email": "a@example.com", "password": "secret", "firstName": "<script>" }),
            "forbidden characters in name",
        ),
    ];
    for (body, error_message) in invalid_bodies {
        let response = test_app.post_as("/users", &body, &test_app.admin).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "User creation with {} did not fail",
            error_message
        );
    }
}

#[actix_rt::test]
async fn update_keeps_the_password_when_omitted() {
    let test_app = spawn_app().await;
    let mut user = test_app.create_user("ursula@example.com").await;

    let response = test_app
        .put_as(
            &format!("/users/{}", user.id),
            &json!({ "email": "le.guin@example.com", "lastName": "Le Guin" }),
            &test_app.admin,
        )
        .await;
    assert_eq!(200, response.status().as_u16());

    user.email = "le.guin@example.com".to_string();
    let response = test_app.get_as("/subscriber-lists/my", &user).await;
    assert_eq!(200, response.status().as_u16());
}

#[actix_rt::test]
async fn deleting_a_user_returns_204_and_removes_their_lists() {
    let test_app = spawn_app().await;
    let user = test_app.create_user("ursula@example.com").await;
    let list_id = test_app.create_my_list("weekly", &user).await;

    let response = test_app
        .delete_as(&format!("/users/{}", user.id), &test_app.admin)
        .await;
    assert_eq!(204, response.status().as_u16());

    let response = test_app
        .get_as(&format!("/subscriber-lists/{}", list_id), &test_app.admin)
        .await;
    assert_eq!(404, response.status().as_u16());

    let response = test_app
        .get_as(&format!("/users/{}", user.id), &test_app.admin)
        .await;
    assert_eq!(404, response.status().as_u16());
}

#[actix_rt::test]
async fn unknown_user_id_returns_a_404() {
    let test_app = spawn_app().await;
    for response in [
        test_app.get_as("/users/424242", &test_app.admin).await,
        test_app.delete_as("/users/424242", &test_app.admin).await,
        test_app
            .put_as(
                "/users/424242",
                &json!({ "email": "nobody@example.com" }),
                &test_app.admin,
            )
            .await,
    ] {
        assert_eq!(404, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "not_found");
    }
}

#[actix_rt::test]
async fn non_numeric_id_returns_a_400() {
    let test_app = spawn_app().await;

    for path in ["/users/abc", "/subscribers/abc", "/subscriber-lists/my/abc"] {
        let response = test_app.get_as(path, &test_app.admin).await;

        assert_eq!(400, response.status().as_u16(), "path: {}", path);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "validation_error", "path: {}", path);
    }
}

#[actix_rt::test]
async fn regular_user_is_rejected_before_the_body_is_validated() {
    let test_app = spawn_app().await;
    let user = test_app.create_user("ursula@example.com").await;

    let response = test_app
        .post_as(
            "/users",
            &json!({ "email": "not-an-email", "password": "secret" }),
            &user,
        )
        .await;
    assert_eq!(403, response.status().as_u16());

    let response = test_app
        .post_as("/subscriber-lists", &json!({ "name": "" }), &user)
        .await;
    assert_eq!(403, response.status().as_u16());
}
