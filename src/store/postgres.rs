use std::convert::TryFrom;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{
    DateTime,
    NaiveDate,
    Utc,
};
use sqlx::PgPool;

use crate::domain::{
    parse_optional_name,
    Email,
    ListName,
    NewEntry,
    NewSubscriber,
    NewUser,
    Subscriber,
    SubscriberList,
    SubscriberListEntry,
    User,
};
use crate::store::{
    Store,
    StoreError,
    StoreResult,
};

const USER_COLUMNS: &str = "id, email, first_name, last_name, gender, password_hash, role";
const SUBSCRIBER_COLUMNS: &str = "id, email, first_name, last_name, birth_date, gender, join_date";
const LIST_COLUMNS: &str = "id, name, owner_id";
const ENTRY_COLUMNS: &str = "id, date_added, confirmed, source, list_id, subscriber_id";

/// `Store` backed by the Postgres schema under `migrations/`.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DbUser {
    id: i64,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    gender: String,
    password_hash: String,
    role: String,
}

#[derive(sqlx::FromRow)]
struct DbSubscriber {
    id: i64,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    birth_date: Option<NaiveDate>,
    gender: String,
    join_date: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct DbList {
    id: i64,
    name: String,
    owner_id: i64,
}

#[derive(sqlx::FromRow)]
struct DbEntry {
    id: i64,
    date_added: DateTime<Utc>,
    confirmed: bool,
    source: Option<String>,
    list_id: i64,
    subscriber_id: i64,
}

impl TryFrom<DbUser> for User {
    type Error = StoreError;

    fn try_from(row: DbUser) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: Email::try_from(row.email).map_err(corrupted_row)?,
            first_name: parse_optional_name(row.first_name).map_err(corrupted_row)?,
            last_name: parse_optional_name(row.last_name).map_err(corrupted_row)?,
            gender: row.gender.parse().map_err(corrupted_row)?,
            role: row.role.parse().map_err(corrupted_row)?,
            password_hash: row.password_hash,
        })
    }
}

impl TryFrom<DbSubscriber> for Subscriber {
    type Error = StoreError;

    fn try_from(row: DbSubscriber) -> Result<Self, Self::Error> {
        Ok(Subscriber {
            id: row.id,
            email: Email::try_from(row.email).map_err(corrupted_row)?,
            first_name: parse_optional_name(row.first_name).map_err(corrupted_row)?,
            last_name: parse_optional_name(row.last_name).map_err(corrupted_row)?,
            birth_date: row.birth_date,
            gender: row.gender.parse().map_err(corrupted_row)?,
            join_date: row.join_date,
        })
    }
}

impl TryFrom<DbList> for SubscriberList {
    type Error = StoreError;

    fn try_from(row: DbList) -> Result<Self, Self::Error> {
        Ok(SubscriberList {
            id: row.id,
            name: ListName::try_from(row.name).map_err(corrupted_row)?,
            owner_id: row.owner_id,
        })
    }
}

impl From<DbEntry> for SubscriberListEntry {
    fn from(row: DbEntry) -> Self {
        SubscriberListEntry {
            id: row.id,
            date_added: row.date_added,
            confirmed: row.confirmed,
            source: row.source,
            list_id: row.list_id,
            subscriber_id: row.subscriber_id,
        }
    }
}

fn corrupted_row(e: impl std::fmt::Display) -> StoreError {
    StoreError::Unexpected(anyhow!("invalid row in the database: {}", e))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23505").unwrap_or(false);
    }
    false
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23503").unwrap_or(false);
    }
    false
}

/// Translate a failed write into the store error callers can react to.
fn write_error(entity: &str, e: sqlx::Error) -> StoreError {
    if is_unique_violation(&e) {
        StoreError::Conflict(format!("{} with the same email already exists", entity))
    } else if is_foreign_key_violation(&e) {
        StoreError::MissingReference(format!("{} references a row that does not exist", entity))
    } else {
        tracing::error!("Failed to execute query: {:?}", e);
        StoreError::Unexpected(anyhow::Error::new(e).context(format!("failed to write {}", entity)))
    }
}

fn read_error(entity: &str, e: sqlx::Error) -> StoreError {
    tracing::error!("Failed to execute query: {:?}", e);
    StoreError::Unexpected(anyhow::Error::new(e).context(format!("failed to read {}", entity)))
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl Store for PostgresStore {
    #[tracing::instrument(name = "listing users", skip(self))]
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("users", e))?;
        convert_all(rows)
    }

    #[tracing::instrument(name = "fetching user", skip(self))]
    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, DbUser>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("user", e))?
            .map(User::try_from)
            .transpose()
    }

    #[tracing::instrument(name = "fetching user by email", skip(self))]
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("user", e))?
        .map(User::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "inserting user", skip(self, user, password_hash), fields(email = %user.email.as_ref()))]
    async fn insert_user(&self, user: &NewUser, password_hash: &str) -> StoreResult<User> {
        let row = sqlx::query_as::<_, DbUser>(&format!(
            r#"
            INSERT INTO users (email, first_name, last_name, gender, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.email.as_ref())
        .bind(user.first_name.as_ref().map(AsRef::<str>::as_ref))
        .bind(user.last_name.as_ref().map(AsRef::<str>::as_ref))
        .bind(user.gender.as_str())
        .bind(password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("user", e))?;
        User::try_from(row)
    }

    #[tracing::instrument(name = "updating user", skip(self, user, password_hash))]
    async fn update_user(
        &self,
        id: i64,
        user: &NewUser,
        password_hash: Option<&str>,
    ) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, DbUser>(&format!(
            r#"
            UPDATE users
            SET email = $2, first_name = $3, last_name = $4, gender = $5, role = $6,
                password_hash = COALESCE($7, password_hash)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(user.email.as_ref())
        .bind(user.first_name.as_ref().map(AsRef::<str>::as_ref))
        .bind(user.last_name.as_ref().map(AsRef::<str>::as_ref))
        .bind(user.gender.as_str())
        .bind(user.role.as_str())
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("user", e))?
        .map(User::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "deleting user", skip(self))]
    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("user", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "listing subscribers", skip(self))]
    async fn list_subscribers(&self) -> StoreResult<Vec<Subscriber>> {
        let rows = sqlx::query_as::<_, DbSubscriber>(&format!(
            "SELECT {} FROM subscribers ORDER BY id",
            SUBSCRIBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("subscribers", e))?;
        convert_all(rows)
    }

    #[tracing::instrument(name = "fetching subscriber", skip(self))]
    async fn get_subscriber(&self, id: i64) -> StoreResult<Option<Subscriber>> {
        sqlx::query_as::<_, DbSubscriber>(&format!(
            "SELECT {} FROM subscribers WHERE id = $1",
            SUBSCRIBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("subscriber", e))?
        .map(Subscriber::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "fetching subscriber by email", skip(self))]
    async fn find_subscriber_by_email(&self, email: &str) -> StoreResult<Option<Subscriber>> {
        sqlx::query_as::<_, DbSubscriber>(&format!(
            "SELECT {} FROM subscribers WHERE email = $1",
            SUBSCRIBER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("subscriber", e))?
        .map(Subscriber::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "fetching subscribers by id", skip(self))]
    async fn get_subscribers_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Subscriber>> {
        let rows = sqlx::query_as::<_, DbSubscriber>(&format!(
            "SELECT {} FROM subscribers WHERE id = ANY($1) ORDER BY id",
            SUBSCRIBER_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("subscribers", e))?;
        convert_all(rows)
    }

    #[tracing::instrument(name = "inserting subscriber", skip(self, subscriber), fields(email = %subscriber.email.as_ref()))]
    async fn insert_subscriber(&self, subscriber: &NewSubscriber) -> StoreResult<Subscriber> {
        let row = sqlx::query_as::<_, DbSubscriber>(&format!(
            r#"
            INSERT INTO subscribers (email, first_name, last_name, birth_date, gender, join_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SUBSCRIBER_COLUMNS
        ))
        .bind(subscriber.email.as_ref())
        .bind(subscriber.first_name.as_ref().map(AsRef::<str>::as_ref))
        .bind(subscriber.last_name.as_ref().map(AsRef::<str>::as_ref))
        .bind(subscriber.birth_date)
        .bind(subscriber.gender.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("subscriber", e))?;
        Subscriber::try_from(row)
    }

    #[tracing::instrument(name = "updating subscriber", skip(self, subscriber))]
    async fn update_subscriber(
        &self,
        id: i64,
        subscriber: &NewSubscriber,
    ) -> StoreResult<Option<Subscriber>> {
        sqlx::query_as::<_, DbSubscriber>(&format!(
            r#"
            UPDATE subscribers
            SET email = $2, first_name = $3, last_name = $4, birth_date = $5, gender = $6
            WHERE id = $1
            RETURNING {}
            "#,
            SUBSCRIBER_COLUMNS
        ))
        .bind(id)
        .bind(subscriber.email.as_ref())
        .bind(subscriber.first_name.as_ref().map(AsRef::<str>::as_ref))
        .bind(subscriber.last_name.as_ref().map(AsRef::<str>::as_ref))
        .bind(subscriber.birth_date)
        .bind(subscriber.gender.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("subscriber", e))?
        .map(Subscriber::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "deleting subscriber", skip(self))]
    async fn delete_subscriber(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM subscribers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("subscriber", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "deleting subscriber by email", skip(self))]
    async fn delete_subscriber_by_email(&self, email: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM subscribers WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("subscriber", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "listing subscriber lists", skip(self))]
    async fn list_lists(&self) -> StoreResult<Vec<SubscriberList>> {
        let rows = sqlx::query_as::<_, DbList>(&format!(
            "SELECT {} FROM subscriber_lists ORDER BY id",
            LIST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("subscriber lists", e))?;
        convert_all(rows)
    }

    #[tracing::instrument(name = "listing subscriber lists of owner", skip(self))]
    async fn lists_owned_by(&self, owner_id: i64) -> StoreResult<Vec<SubscriberList>> {
        let rows = sqlx::query_as::<_, DbList>(&format!(
            "SELECT {} FROM subscriber_lists WHERE owner_id = $1 ORDER BY id",
            LIST_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("subscriber lists", e))?;
        convert_all(rows)
    }

    #[tracing::instrument(name = "fetching subscriber list", skip(self))]
    async fn get_list(&self, id: i64) -> StoreResult<Option<SubscriberList>> {
        sqlx::query_as::<_, DbList>(&format!(
            "SELECT {} FROM subscriber_lists WHERE id = $1",
            LIST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("subscriber list", e))?
        .map(SubscriberList::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "inserting subscriber list", skip(self, name))]
    async fn insert_list(&self, name: &ListName, owner_id: i64) -> StoreResult<SubscriberList> {
        let row = sqlx::query_as::<_, DbList>(&format!(
            "INSERT INTO subscriber_lists (name, owner_id) VALUES ($1, $2) RETURNING {}",
            LIST_COLUMNS
        ))
        .bind(name.as_ref())
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("subscriber list", e))?;
        SubscriberList::try_from(row)
    }

    #[tracing::instrument(name = "updating subscriber list", skip(self, name))]
    async fn update_list(
        &self,
        id: i64,
        name: &ListName,
        owner_id: i64,
    ) -> StoreResult<Option<SubscriberList>> {
        sqlx::query_as::<_, DbList>(&format!(
            "UPDATE subscriber_lists SET name = $2, owner_id = $3 WHERE id = $1 RETURNING {}",
            LIST_COLUMNS
        ))
        .bind(id)
        .bind(name.as_ref())
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("subscriber list", e))?
        .map(SubscriberList::try_from)
        .transpose()
    }

    #[tracing::instrument(name = "deleting subscriber list", skip(self))]
    async fn delete_list(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM subscriber_lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("subscriber list", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "listing entries", skip(self))]
    async fn list_entries(&self) -> StoreResult<Vec<SubscriberListEntry>> {
        let rows = sqlx::query_as::<_, DbEntry>(&format!(
            "SELECT {} FROM subscriber_list_entries ORDER BY id",
            ENTRY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("entries", e))?;
        Ok(rows.into_iter().map(SubscriberListEntry::from).collect())
    }

    #[tracing::instrument(name = "listing entries of lists", skip(self))]
    async fn entries_in_lists(&self, list_ids: &[i64]) -> StoreResult<Vec<SubscriberListEntry>> {
        let rows = sqlx::query_as::<_, DbEntry>(&format!(
            "SELECT {} FROM subscriber_list_entries WHERE list_id = ANY($1) ORDER BY id",
            ENTRY_COLUMNS
        ))
        .bind(list_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("entries", e))?;
        Ok(rows.into_iter().map(SubscriberListEntry::from).collect())
    }

    #[tracing::instrument(name = "fetching entry", skip(self))]
    async fn get_entry(&self, id: i64) -> StoreResult<Option<SubscriberListEntry>> {
        let row = sqlx::query_as::<_, DbEntry>(&format!(
            "SELECT {} FROM subscriber_list_entries WHERE id = $1",
            ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error("entry", e))?;
        Ok(row.map(SubscriberListEntry::from))
    }

    #[tracing::instrument(name = "inserting entry", skip(self))]
    async fn insert_entry(&self, entry: &NewEntry) -> StoreResult<SubscriberListEntry> {
        let row = sqlx::query_as::<_, DbEntry>(&format!(
            r#"
            INSERT INTO subscriber_list_entries (date_added, confirmed, source, list_id, subscriber_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(Utc::now())
        .bind(entry.confirmed)
        .bind(entry.source.as_deref())
        .bind(entry.list_id)
        .bind(entry.subscriber_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("entry", e))?;
        Ok(SubscriberListEntry::from(row))
    }

    #[tracing::instrument(name = "updating entry", skip(self))]
    async fn update_entry(
        &self,
        id: i64,
        entry: &NewEntry,
    ) -> StoreResult<Option<SubscriberListEntry>> {
        let row = sqlx::query_as::<_, DbEntry>(&format!(
            r#"
            UPDATE subscriber_list_entries
            SET confirmed = $2, source = $3, list_id = $4, subscriber_id = $5
            WHERE id = $1
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(id)
        .bind(entry.confirmed)
        .bind(entry.source.as_deref())
        .bind(entry.list_id)
        .bind(entry.subscriber_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error("entry", e))?;
        Ok(row.map(SubscriberListEntry::from))
    }

    #[tracing::instrument(name = "deleting entry", skip(self))]
    async fn delete_entry(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM subscriber_list_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("entry", e))?;
        Ok(result.rows_affected() > 0)
    }
}
