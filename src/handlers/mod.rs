pub mod activity;
pub mod analytics;
pub mod conversations;
pub mod dashboard;
pub mod messages;
pub mod users;

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}
