use std::sync::Arc;

use learnnow_core::{
    auth::Authorizer, bing::BingClient, graph::UserDirectory, model::repository::db::DbPool,
    storage::Storage,
};

pub struct AppState {
    pub pool: DbPool,
    pub storage: Storage,
    pub authorizer: Authorizer,
    pub users: Arc<dyn UserDirectory>,
    /// Not configured in development
    pub image_search: Option<BingClient>,
    /// Base URL of the tab frontend, without trailing slash
    pub app_base_url: String,
}

pub type SharedState = Arc<AppState>;
