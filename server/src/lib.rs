pub mod app_state;
pub mod bot;
pub mod http_error;
pub mod identity;
pub mod mime_type;
pub mod openapi;
pub mod routes;
pub mod schema;
pub mod spa_serve_dir;
