use std::fmt;

pub const FALLBACK_NOTICE: &str = "Oops! Something went wrong. You shouldn't be here.";

/// Client-visible pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Upload,
    Files,
    Contact,
    NotFound,
}

impl Route {
    /// Unrecognized paths resolve to [`Route::NotFound`]. A trailing slash
    /// and a leading `#` (hash-routing links) are ignored.
    pub fn resolve(path: &str) -> Route {
        let path = path.trim_start_matches('#');
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Upload,
            "/files" => Route::Files,
            "/contact" => Route::Contact,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> Option<&'static str> {
        match self {
            Route::Upload => Some("/"),
            Route::Files => Some("/files"),
            Route::Contact => Some("/contact"),
            Route::NotFound => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Upload => "Upload",
            Route::Files => "Files",
            Route::Contact => "Contact",
            Route::NotFound => FALLBACK_NOTICE,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{} ({path})", self.title()),
            None => f.write_str(FALLBACK_NOTICE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_routes() {
        assert_eq!(Route::resolve("/"), Route::Upload);
        assert_eq!(Route::resolve(""), Route::Upload);
        assert_eq!(Route::resolve("/files"), Route::Files);
        assert_eq!(Route::resolve("/files/"), Route::Files);
        assert_eq!(Route::resolve("#/contact"), Route::Contact);
    }

    #[test]
    fn test_unknown_route_falls_back() {
        let route = Route::resolve("/admin");
        assert_eq!(route, Route::NotFound);
        assert_eq!(route.path(), None);
        assert_eq!(route.to_string(), FALLBACK_NOTICE);
    }

    #[test]
    fn test_default_is_upload_page() {
        assert_eq!(Route::default(), Route::Upload);
        assert_eq!(Route::Files.to_string(), "Files (/files)");
    }

    #[test]
    fn test_path_resolves_back() {
        for route in [Route::Upload, Route::Files, Route::Contact] {
            assert_eq!(Route::resolve(route.path().unwrap()), route);
        }
    }
}
