//! HTTP surface for the Vendora login flow.

pub mod api_types;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use routes::create_app;
