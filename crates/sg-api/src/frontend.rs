//! Single-page application fallback
//!
//! Files under the frontend directory are served as-is. Any other path gets
//! the root `index.html` with a 200 so client-side routing can take over.

use std::path::Path;

use tower_http::services::{ServeDir, ServeFile};

pub type FrontendService = ServeDir<ServeFile>;

pub fn frontend_service(root: &Path) -> FrontendService {
    ServeDir::new(root).fallback(ServeFile::new(root.join("index.html")))
}
