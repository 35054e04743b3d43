//! HTTP exchange types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate classifies `HttpResponse` values without ever touching the network;
//! the transport behind a [`Call`](crate::call::Call) is responsible for the
//! actual I/O and for buffering the response body exactly once.
//!
//! `Response<T>` is generic so the same shape carries both the raw exchange
//! (`Response<String>`) and the envelope an adapter hands back
//! (`Response<Outcome<S, E>>`).

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Held by a transport call so adapters can expose it through
/// `request()` without owning any connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }
}

/// A completed exchange: status line, headers, and an already-read body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<T> {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: T,
}

/// The raw exchange a transport produces. The body is the buffered text.
pub type HttpResponse = Response<String>;

impl<T> Response<T> {
    /// Bare envelope with no headers.
    pub fn new(status: u16, body: T) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// The transport's success predicate: 200..=299.
    pub fn is_successful(&self) -> bool {
        is_success_status(self.status)
    }

    /// Replace the body, keeping status and headers.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            status: self.status,
            headers: self.headers,
            body: f(self.body),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub(crate) fn is_success_status(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Whether `status` is a status code at all. Anything outside 100..=599 is a
/// protocol violation.
pub(crate) fn is_valid_status(status: u16) -> bool {
    (100..=599).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_predicate_covers_2xx_only() {
        assert!(Response::new(200, ()).is_successful());
        assert!(Response::new(299, ()).is_successful());
        assert!(!Response::new(199, ()).is_successful());
        assert!(!Response::new(300, ()).is_successful());
        assert!(!Response::new(401, ()).is_successful());
    }

    #[test]
    fn valid_status_range_is_inclusive() {
        assert!(!is_valid_status(0));
        assert!(!is_valid_status(99));
        assert!(is_valid_status(100));
        assert!(is_valid_status(599));
        assert!(!is_valid_status(600));
    }

    #[test]
    fn map_keeps_status_and_headers() {
        let response = HttpResponse {
            status: 201,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: "{}".to_string(),
        };
        let mapped = response.map(|body| body.len());
        assert_eq!(mapped.status, 201);
        assert_eq!(mapped.body, 2);
        assert_eq!(mapped.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn get_builds_bodyless_request() {
        let req = HttpRequest::get("http://localhost:3000/success");
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }
}
