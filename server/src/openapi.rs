use utoipa::OpenApi;
use utoipa_discover::utoipa_discover;

#[utoipa_discover(
    search_paths = [
        crate => "./server/src",
    ],
    tags((name = "learnnow"))
)]
#[derive(OpenApi)]
pub struct ApiDoc;
