pub mod axum_http;
