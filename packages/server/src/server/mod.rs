// HTTP server setup (Axum)
pub mod app;
pub mod response;
pub mod routes;

pub use app::*;
pub use response::{FailureMode, ProxyResponse};
