use serde_json::{
    json,
    Value,
};

use crate::helpers::*;

#[actix_rt::test]
async fn subscriber_is_created_with_a_join_date() {
    let test_app = spawn_app().await;

    let response = test_app
        .post_as(
            "/subscribers",
            &json!({
                "email": "reader@example.com",
                "firstName": "Ursula",
                "birthDate": "1929-10-21",
                "gender": "FEMALE"
            }),
            &test_app.admin,
        )
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "reader@example.com");
    assert_eq!(body["birthDate"], "1929-10-21");
    assert!(body["joinDate"].is_string());

    let saved = sqlx::query_scalar::<_, String>("SELECT email FROM subscribers")
        .fetch_one(&test_app.pool)
        .await
        .expect("Failed to fetch saved subscriber");
    assert_eq!(saved, "reader@example.com");
}

#[actix_rt::test]
async fn subscriber_without_gender_is_unknown() {
    let test_app = spawn_app().await;
    let id = test_app.create_subscriber("reader@example.com").await;

    let body: Value = test_app
        .get_as(&format!("/subscribers/{}", id), &test_app.admin)
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["gender"], "UNKNOWN");
}

#[actix_rt::test]
async fn update_keeps_the_join_date() {
    let test_app = spawn_app().await;
    let id = test_app.create_subscriber("reader@example.com").await;
    let before: Value = test_app
        .get_as(&format!("/subscribers/{}", id), &test_app.admin)
        .await
        .json()
        .await
        .unwrap();

    let response = test_app
        .put_as(
            &format!("/subscribers/{}", id),
            &json!({ "email": "reader@example.org", "lastName": "Le Guin" }),
            &test_app.admin,
        )
        .await;

    assert_eq!(200, response.status().as_u16());
    let after: Value = response.json().await.unwrap();
    assert_eq!(after["id"], before["id"]);
    assert_eq!(after["joinDate"], before["joinDate"]);
    assert_eq!(after["email"], "reader@example.org");
}

#[actix_rt::test]
async fn delete_by_email_removes_the_subscriber_and_their_entries() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;
    let list_id = test_app.create_my_list("weekly", &owner).await;
    let subscriber_id = test_app.create_subscriber("reader@example.com").await;
    test_app.assign(list_id, subscriber_id).await;

    let response = test_app
        .delete_as("/subscribers/email/reader@example.com", &test_app.admin)
        .await;
    assert_eq!(200, response.status().as_u16());

    let response = test_app
        .get_as("/subscribers/email/reader@example.com", &test_app.admin)
        .await;
    assert_eq!(404, response.status().as_u16());

    let entries: Value = test_app
        .get_as("/subscriber-entries/my", &owner)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(entries, json!([]));
}

#[actix_rt::test]
async fn duplicate_subscriber_email_returns_a_409() {
    let test_app = spawn_app().await;
    test_app.create_subscriber("reader@example.com").await;

    let response = test_app
        .post_as(
            "/subscribers",
            &json!({ "email": "reader@example.com" }),
            &test_app.admin,
        )
        .await;

    assert_eq!(409, response.status().as_u16());
}

#[actix_rt::test]
async fn my_subscribers_lists_each_subscriber_once() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;
    let other = test_app.create_user("other@example.com").await;
    let weekly = test_app.create_my_list("weekly", &owner).await;
    let monthly = test_app.create_my_list("monthly", &owner).await;
    let theirs = test_app.create_my_list("theirs", &other).await;
    let shared = test_app.create_subscriber("shared@example.com").await;
    let stranger = test_app.create_subscriber("stranger@example.com").await;
    test_app.assign(weekly, shared).await;
    test_app.assign(monthly, shared).await;
    test_app.assign(theirs, stranger).await;

    let response = test_app.get_as("/subscribers/my", &owner).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["shared@example.com"]);
}
