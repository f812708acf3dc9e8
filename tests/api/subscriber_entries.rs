use serde_json::{
    json,
    Value,
};

use crate::helpers::*;

#[actix_rt::test]
async fn only_the_list_owner_can_delete_an_entry() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;
    let other = test_app.create_user("other@example.com").await;
    let list_id = test_app.create_my_list("weekly", &owner).await;
    let subscriber_id = test_app.create_subscriber("reader@example.com").await;
    let entry_id = test_app.assign(list_id, subscriber_id).await;
    let path = format!("/subscriber-entries/my/{}", entry_id);

    let response = test_app.delete_as(&path, &other).await;
    assert_eq!(403, response.status().as_u16());

    let response = test_app.delete_as(&path, &owner).await;
    assert_eq!(200, response.status().as_u16());

    let response = test_app
        .get_as(&format!("/subscriber-entries/{}", entry_id), &test_app.admin)
        .await;
    assert_eq!(404, response.status().as_u16());
}

#[actix_rt::test]
async fn my_entries_embed_their_subscriber() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;
    let list_id = test_app.create_my_list("weekly", &owner).await;
    let subscriber_id = test_app.create_subscriber("reader@example.com").await;
    test_app.assign(list_id, subscriber_id).await;

    let body: Value = test_app
        .get_as("/subscriber-entries/my", &owner)
        .await
        .json()
        .await
        .unwrap();

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["confirmed"], false);
    assert!(entries[0]["dateAdded"].is_string());
    assert_eq!(entries[0]["subscriber"]["id"], subscriber_id);
    assert!(entries[0].get("listId").is_none());
}

#[actix_rt::test]
async fn known_subscriber_can_be_assigned_to_another_of_my_lists() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;
    let weekly = test_app.create_my_list("weekly", &owner).await;
    let monthly = test_app.create_my_list("monthly", &owner).await;
    let subscriber_id = test_app.create_subscriber("reader@example.com").await;
    test_app.assign(weekly, subscriber_id).await;

    let response = test_app
        .post_as(
            &format!(
                "/subscriber-entries/my/assign?listId={}&subscriberId={}",
                monthly, subscriber_id
            ),
            &json!({}),
            &owner,
        )
        .await;

    assert_eq!(200, response.status().as_u16());
    let list: Value = test_app
        .get_as(&format!("/subscriber-lists/my/{}", monthly), &owner)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(list["entries"][0]["subscriber"]["id"], subscriber_id);
}

#[actix_rt::test]
async fn unknown_subscriber_cannot_be_assigned_to_my_list() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;
    let list_id = test_app.create_my_list("weekly", &owner).await;
    let subscriber_id = test_app.create_subscriber("reader@example.com").await;

    let response = test_app
        .post_as(
            &format!(
                "/subscriber-entries/my/assign?listId={}&subscriberId={}",
                list_id, subscriber_id
            ),
            &json!({}),
            &owner,
        )
        .await;

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Subscriber not found on any of your lists");
}

#[actix_rt::test]
async fn assign_requires_both_parameters() {
    let test_app = spawn_app().await;

    let response = test_app
        .post_as("/subscriber-entries/assign?listId=1", &json!({}), &test_app.admin)
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[actix_rt::test]
async fn admin_entry_crud_round_trip() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;
    let list_id = test_app.create_my_list("weekly", &owner).await;
    let subscriber_id = test_app.create_subscriber("reader@example.com").await;

    let response = test_app
        .post_as(
            "/subscriber-entries",
            &json!({ "listId": list_id, "subscriberId": subscriber_id, "source": "landing page" }),
            &test_app.admin,
        )
        .await;
    assert_eq!(200, response.status().as_u16());
    let created: Value = response.json().await.unwrap();
    let path = format!("/subscriber-entries/{}", created["id"]);

    let response = test_app
        .put_as(
            &path,
            &json!({ "listId": list_id, "subscriberId": subscriber_id, "confirmed": true }),
            &test_app.admin,
        )
        .await;
    assert_eq!(200, response.status().as_u16());
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["confirmed"], true);
    assert_eq!(updated["dateAdded"], created["dateAdded"]);

    let response = test_app.delete_as(&path, &test_app.admin).await;
    assert_eq!(200, response.status().as_u16());
    assert_eq!(404, test_app.get_as(&path, &test_app.admin).await.status().as_u16());
}

#[actix_rt::test]
async fn entry_without_a_list_returns_a_400() {
    let test_app = spawn_app().await;
    let subscriber_id = test_app.create_subscriber("reader@example.com").await;

    let response = test_app
        .post_as(
            "/subscriber-entries",
            &json!({ "subscriberId": subscriber_id }),
            &test_app.admin,
        )
        .await;

    assert_eq!(400, response.status().as_u16());
}
