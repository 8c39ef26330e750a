use http::Method;

/// What the transport layer knows about an inbound request.
///
/// `path` is the percent-encoded request path. Anything after `?` or `#` is
/// dropped on construction. A missing `Accept` means `*/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub accept: Option<String>,
}

impl RequestDescriptor {
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        let end = path.find(['?', '#']).unwrap_or(path.len());
        Self {
            method,
            path: path[..end].to_string(),
            content_type: None,
            accept: None,
        }
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn with_content_type(mut self, value: &str) -> Self {
        self.content_type = Some(value.to_string());
        self
    }

    #[must_use]
    pub fn with_accept(mut self, value: &str) -> Self {
        self.accept = Some(value.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_and_fragment_are_dropped() {
        assert_eq!(RequestDescriptor::get("/items?limit=10").path, "/items");
        assert_eq!(RequestDescriptor::get("/items#top").path, "/items");
        assert_eq!(RequestDescriptor::get("/items").path, "/items");
    }
}
