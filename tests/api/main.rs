mod health_check;
mod helpers;
mod subscriber_entries;
mod subscriber_lists;
mod subscribers;
mod users;
