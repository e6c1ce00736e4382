pub mod auth;
pub mod bing;
pub mod config;
pub mod graph;
pub mod model;
pub mod storage;
pub use deadpool_diesel;
