use sqlx::{
    Connection,
    PgConnection,
};

use newsletter_lists::app::load_configuration;

use crate::helpers::*;

#[actix_rt::test]
async fn postgres_connection_works() {
    let database_options = &load_configuration()
        .unwrap()
        .database
        .pgserver_connection_options();
    PgConnection::connect_with(database_options)
        .await
        .expect("error connecting to postgres");
}

#[actix_rt::test]
async fn health_check_works() {
    let test_app = spawn_app().await;
    let response = reqwest::Client::new()
        .get(&test_app.url("/health_check"))
        .send()
        .await
        .expect("Fail to execute request.");
    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[actix_rt::test]
async fn requests_without_credentials_are_rejected() {
    let test_app = spawn_app().await;
    for path in ["/users", "/subscribers", "/subscriber-lists/my", "/subscriber-entries/my"] {
        let response = test_app
            .send(reqwest::Method::GET, path, None, None)
            .await;
        assert_eq!(401, response.status().as_u16(), "{} did not require credentials", path);
        assert!(response.headers().contains_key("WWW-Authenticate"));
    }
}

#[actix_rt::test]
async fn wrong_password_is_rejected() {
    let test_app = spawn_app().await;
    let mut intruder = test_app.admin.clone();
    intruder.password = "not-the-password".to_string();

    let response = test_app.get_as("/users", &intruder).await;

    assert_eq!(401, response.status().as_u16());
}
