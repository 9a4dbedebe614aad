pub mod auth;

pub async fn health() -> &'static str {
    "OK"
}
