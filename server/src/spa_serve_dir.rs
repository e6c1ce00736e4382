use axum::http::{Request, Uri};
use tower::Service;
use tower_http::services::ServeDir;

/// Serves the tab frontend. Client side routes like `/previewcontent` or
/// `/configtab` have no file behind them and get `index.html`.
#[derive(Debug, Clone)]
pub struct SpaServeDirService<Fallback> {
    serve_dir: ServeDir<Fallback>,
}

impl<F> SpaServeDirService<F> {
    pub fn new(serve_dir: ServeDir<F>) -> Self {
        Self { serve_dir }
    }
}

/// Paths whose last segment has no extension are routes of the SPA
pub fn is_client_route(path: &str) -> bool {
    if path == "/" || path.starts_with("/api/") || path == "/api" {
        return false;
    }
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    !last_segment.contains('.')
}

impl<ReqBody, Fallback> Service<Request<ReqBody>> for SpaServeDirService<Fallback>
where
    ServeDir<Fallback>: Service<Request<ReqBody>>,
{
    type Response = <ServeDir<Fallback> as Service<Request<ReqBody>>>::Response;
    type Error = <ServeDir<Fallback> as Service<Request<ReqBody>>>::Error;
    type Future = <ServeDir<Fallback> as Service<Request<ReqBody>>>::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        <ServeDir<Fallback> as Service<Request<ReqBody>>>::poll_ready(&mut self.serve_dir, cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        if is_client_route(req.uri().path()) {
            let mut b = Uri::builder();
            if let Some(scheme) = req.uri().scheme() {
                b = b.scheme(scheme.clone());
            }
            if let Some(authority) = req.uri().authority() {
                b = b.authority(authority.clone());
            }
            // keep the query, the preview page reads its ids from it
            let path_and_query = match req.uri().query() {
                Some(query) => format!("/index.html?{}", query),
                None => "/index.html".to_owned(),
            };
            b = b.path_and_query(path_and_query);
            if let Ok(uri) = b.build() {
                *req.uri_mut() = uri;
            }
        }
        self.serve_dir.call(req)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn client_routes() {
        assert!(is_client_route("/previewcontent"));
        assert!(is_client_route("/learningmodules/edit"));
        assert!(!is_client_route("/"));
        assert!(!is_client_route("/static/js/main.3f2a.js"));
        assert!(!is_client_route("/favicon.ico"));
        assert!(!is_client_route("/api/resources"));
    }
}
