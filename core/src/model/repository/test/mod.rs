use super::db;

pub mod learning_module;
pub mod resource;
pub mod tab_configuration;
pub mod taxonomy;
pub mod util;
pub mod vote_bookmark;
