use crate::docs::DocsRouter;
use crate::router::Router;
use http::{Request, Response};
use std::sync::Arc;

/// The complete HTTP surface: docs first, then the api router.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub docs: Option<Arc<DocsRouter>>,
}

impl AppService {
    pub fn new(router: Arc<Router>, docs: Option<Arc<DocsRouter>>) -> Self {
        AppService { router, docs }
    }

    /// Answer a request; paths matched by neither router get 404.
    pub fn call(&self, req: Request<Vec<u8>>) -> Response<Vec<u8>> {
        if let Some(docs) = &self.docs {
            if docs.matches(req.uri().path()) {
                return docs.dispatch(req);
            }
        }
        self.router.dispatch(req)
    }
}

impl std::fmt::Debug for AppService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppService")
            .field("router", &self.router)
            .field("docs", &self.docs.as_ref().map(|d| d.prefix().to_string()))
            .finish()
    }
}
