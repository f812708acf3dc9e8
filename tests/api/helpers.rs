use reqwest::{
    Method,
    Response,
};
use serde_json::{
    json,
    Value,
};
use sqlx::{
    Connection,
    Executor,
    PgConnection,
    PgPool,
};
use uuid::Uuid;

use newsletter_lists::app::{
    load_configuration,
    setup_tracing,
    DatabaseSettings,
    NewsletterApp,
};

// ensure the `tracing` is instantiated only once
lazy_static::lazy_static! {
    static ref TRACING: () = {
        if std::env::var("TEST_LOG").is_ok() {
            setup_tracing("test".into(), "debug".into(), std::io::stdout);
        } else {
            setup_tracing("test".into(), "debug".into(), std::io::sink);
        }
    };
}

pub struct TestApp {
    pub address: String,
    pub pool: PgPool,
    pub admin: TestUser,
}

#[derive(Clone, Debug)]
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub password: String,
}

/// When a `tokio` runtime is shut down all tasks spawned on it are dropped.
///
/// `actix_rt::test` spins up a new runtime at the beginning of each test case
/// and they shut down at the end of each test case.
pub async fn spawn_app() -> TestApp {
    lazy_static::initialize(&TRACING);

    let configuration = {
        let mut c = load_configuration().expect("Failed to load configuration");
        c.database.name = Uuid::new_v4().to_string();
        c.application.port = 0;
        c
    };

    create_test_database(&configuration.database).await;
    let pool = NewsletterApp::postgres_pool(&configuration.database);
    let admin_email = configuration.admin.email.clone();
    let admin_password = configuration.admin.password.clone();

    let app = NewsletterApp::from(configuration)
        .await
        .expect("error building app");
    let address = format!("http://127.0.0.1:{}", app.port);
    tokio::spawn(app.server);

    let admin_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = $1")
        .bind(&admin_email)
        .fetch_one(&pool)
        .await
        .expect("seeded administrator is missing");

    TestApp {
        address,
        pool,
        admin: TestUser {
            id: admin_id,
            email: admin_email,
            password: admin_password,
        },
    }
}

async fn create_test_database(database_settings: &DatabaseSettings) {
    let mut connection =
        PgConnection::connect_with(&database_settings.pgserver_connection_options())
            .await
            .expect("error connecting to postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, database_settings.name).as_str())
        .await
        .expect("error creating test database");
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        user: Option<&TestUser>,
    ) -> Response {
        let mut request = reqwest::Client::new().request(method, &self.url(path));
        if let Some(user) = user {
            request = request.basic_auth(&user.email, Some(&user.password));
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.expect("Fail to execute request")
    }

    pub async fn get_as(&self, path: &str, user: &TestUser) -> Response {
        self.send(Method::GET, path, None, Some(user)).await
    }

    pub async fn post_as(&self, path: &str, body: &Value, user: &TestUser) -> Response {
        self.send(Method::POST, path, Some(body), Some(user)).await
    }

    pub async fn put_as(&self, path: &str, body: &Value, user: &TestUser) -> Response {
        self.send(Method::PUT, path, Some(body), Some(user)).await
    }

    pub async fn delete_as(&self, path: &str, user: &TestUser) -> Response {
        self.send(Method::DELETE, path, None, Some(user)).await
    }

    /// Create a regular user through the admin API.
    pub async fn create_user(&self, email: &str) -> TestUser {
        let password = "correct horse battery staple".to_string();
        let response = self
            .post_as(
                "/users",
                &json!({
                    "email": email,
                    "firstName": "Ursula",
                    "lastName": "Le Guin",
                    "gender": "FEMALE",
                    "password": password,
                }),
                &self.admin,
            )
            .await;
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        TestUser {
            id: body["id"].as_i64().unwrap(),
            email: email.to_string(),
            password,
        }
    }

    pub async fn create_subscriber(&self, email: &str) -> i64 {
        let response = self
            .post_as(
                "/subscribers",
                &json!({ "email": email, "firstName": "Reader" }),
                &self.admin,
            )
            .await;
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    pub async fn create_my_list(&self, name: &str, owner: &TestUser) -> i64 {
        let response = self
            .post_as("/subscriber-lists/my", &json!({ "name": name }), owner)
            .await;
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    pub async fn assign(&self, list_id: i64, subscriber_id: i64) -> i64 {
        let response = self
            .post_as(
                &format!(
                    "/subscriber-entries/assign?listId={}&subscriberId={}",
                    list_id, subscriber_id
                ),
                &json!({}),
                &self.admin,
            )
            .await;
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }
}
