use serde_json::{
    json,
    Value,
};

use crate::helpers::*;

#[actix_rt::test]
async fn my_list_is_owned_by_the_caller() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;

    let list_id = test_app.create_my_list("weekly", &owner).await;

    let owner_id = sqlx::query_scalar::<_, i64>("SELECT owner_id FROM subscriber_lists WHERE id = $1")
        .bind(list_id)
        .fetch_one(&test_app.pool)
        .await
        .expect("Failed to fetch saved list");
    assert_eq!(owner_id, owner.id);

    let body: Value = test_app
        .get_as(&format!("/subscriber-lists/my/{}", list_id), &owner)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["name"], "weekly");
    assert_eq!(body["entries"], json!([]));
    assert!(body.get("ownerId").is_none());
}

#[actix_rt::test]
async fn my_list_with_an_explicit_owner_returns_a_400() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;

    let response = test_app
        .post_as(
            "/subscriber-lists/my",
            &json!({ "name": "weekly", "ownerId": owner.id }),
            &owner,
        )
        .await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Owner is added automatically for current user");
}

#[actix_rt::test]
async fn someone_elses_list_returns_a_403() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;
    let other = test_app.create_user("other@example.com").await;
    let list_id = test_app.create_my_list("weekly", &owner).await;
    let path = format!("/subscriber-lists/my/{}", list_id);

    assert_eq!(403, test_app.get_as(&path, &other).await.status().as_u16());
    assert_eq!(
        403,
        test_app
            .put_as(&path, &json!({ "name": "mine now" }), &other)
            .await
            .status()
            .as_u16()
    );
    assert_eq!(403, test_app.delete_as(&path, &other).await.status().as_u16());
    assert_eq!(200, test_app.get_as(&path, &owner).await.status().as_u16());
}

#[actix_rt::test]
async fn missing_list_returns_a_404() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;

    let response = test_app.get_as("/subscriber-lists/my/424242", &owner).await;

    assert_eq!(404, response.status().as_u16());
}

#[actix_rt::test]
async fn deleting_a_list_removes_its_entries() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;
    let list_id = test_app.create_my_list("weekly", &owner).await;
    let subscriber_id = test_app.create_subscriber("reader@example.com").await;
    let entry_id = test_app.assign(list_id, subscriber_id).await;

    let response = test_app
        .delete_as(&format!("/subscriber-lists/my/{}", list_id), &owner)
        .await;
    assert_eq!(200, response.status().as_u16());

    let response = test_app
        .get_as(&format!("/subscriber-entries/{}", entry_id), &test_app.admin)
        .await;
    assert_eq!(404, response.status().as_u16());
    let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriber_list_entries")
        .fetch_one(&test_app.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[actix_rt::test]
async fn renaming_my_list_keeps_its_entries() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;
    let list_id = test_app.create_my_list("weekly", &owner).await;
    let subscriber_id = test_app.create_subscriber("reader@example.com").await;
    test_app.assign(list_id, subscriber_id).await;

    let response = test_app
        .put_as(
            &format!("/subscriber-lists/my/{}", list_id),
            &json!({ "name": "daily" }),
            &owner,
        )
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "daily");
    assert_eq!(body["entries"][0]["subscriber"]["email"], "reader@example.com");
}

#[actix_rt::test]
async fn admin_list_requires_an_owner() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;

    let response = test_app
        .post_as("/subscriber-lists", &json!({ "name": "weekly" }), &test_app.admin)
        .await;
    assert_eq!(400, response.status().as_u16());

    let response = test_app
        .post_as(
            "/subscriber-lists",
            &json!({ "name": "weekly", "ownerId": 424242 }),
            &test_app.admin,
        )
        .await;
    assert_eq!(404, response.status().as_u16());

    let response = test_app
        .post_as(
            "/subscriber-lists",
            &json!({ "name": "weekly", "ownerId": owner.id }),
            &test_app.admin,
        )
        .await;
    assert_eq!(200, response.status().as_u16());
    let lists: Value = test_app
        .get_as("/subscriber-lists/my", &owner)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(lists.as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn blank_list_name_returns_a_400() {
    let test_app = spawn_app().await;
    let owner = test_app.create_user("owner@example.com").await;

    let response = test_app
        .post_as("/subscriber-lists/my", &json!({ "name": "  " }), &owner)
        .await;

    assert_eq!(400, response.status().as_u16());
}
