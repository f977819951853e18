// src/mock/stub.rs
use super::error_response;
use crate::api::{ApiRequest, ApiResponse, Transport};
use crate::error::{ErrorCode, Result};
use parking_lot::Mutex;
use regex::Regex;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::collections::VecDeque;

#[derive(Debug)]
struct StubRoute {
    method: Method,
    path: Regex,
    responses: VecDeque<(StatusCode, String)>,
}

/// Scripted transport for testing against canned payloads.
///
/// Responses registered for the same method and path pattern are served in
/// order; the last one keeps answering once the others are used up.
/// Requests no route matches get a 400 `invalid_request_url`.
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: Mutex<Vec<StubRoute>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON response for requests whose path matches `path_pattern`.
    ///
    /// # Panics
    ///
    /// Panics if `path_pattern` is not a valid regular expression.
    pub fn respond(&self, method: Method, path_pattern: &str, status: u16, body: Value) -> &Self {
        self.respond_raw(method, path_pattern, status, &body.to_string())
    }

    /// Queues a response with a verbatim body, e.g. an HTML error page.
    pub fn respond_raw(&self, method: Method, path_pattern: &str, status: u16, body: &str) -> &Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut routes = self.routes.lock();
        match routes
            .iter_mut()
            .find(|route| route.method == method && route.path.as_str() == path_pattern)
        {
            Some(route) => route.responses.push_back((status, body.to_string())),
            None => routes.push(StubRoute {
                method,
                path: Regex::new(path_pattern).expect("Failed to create regex for stub path"),
                responses: VecDeque::from([(status, body.to_string())]),
            }),
        }
        self
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse<String>> {
        let url = request.url.to_string();
        let path = request.path().to_string();
        let method = request.method.clone();
        self.requests.lock().push(request);

        let mut routes = self.routes.lock();
        let Some(route) = routes
            .iter_mut()
            .find(|route| route.method == method && route.path.is_match(&path))
        else {
            log::warn!("stub has no response for {} {}", method, path);
            return Ok(error_response(
                url,
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidRequestUrl,
                format!("Invalid request URL: {} {}", method, path),
            ));
        };

        let next = if route.responses.len() > 1 {
            route.responses.pop_front()
        } else {
            route.responses.front().cloned()
        };
        let (status, data) = next.unwrap_or_else(|| (StatusCode::NO_CONTENT, String::new()));
        Ok(ApiResponse { data, status, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::json_response;
    use serde_json::json;

    fn get(path: &str) -> ApiRequest {
        ApiRequest {
            method: Method::GET,
            url: url::Url::parse(&format!("https://api.notion.com{}", path)).unwrap(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn serves_queued_responses_then_repeats_the_last() {
        let stub = StubTransport::new();
        stub.respond(Method::GET, "^/v1/blocks/b1$", 200, json!({"n": 1}))
            .respond(Method::GET, "^/v1/blocks/b1$", 200, json!({"n": 2}));

        let bodies: Vec<String> = (0..3)
            .map(|_| stub.execute(get("/v1/blocks/b1")).unwrap().data)
            .collect();
        assert_eq!(bodies, vec![r#"{"n":1}"#, r#"{"n":2}"#, r#"{"n":2}"#]);
        assert_eq!(stub.requests().len(), 3);
    }

    #[test]
    fn unmatched_request_is_invalid_url() {
        let stub = StubTransport::new();
        let response = stub.execute(get("/v1/nowhere")).unwrap();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.data.contains("invalid_request_url"));
    }

    #[test]
    fn json_helper_serializes_body() {
        let response = json_response("u".to_string(), StatusCode::OK, &json!({"ok": true}));
        assert_eq!(response.data, r#"{"ok":true}"#);
    }
}
