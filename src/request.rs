//! Incoming HTTP request type.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;

use crate::pattern::{self, Param};

/// An incoming HTTP request, lowered from the host server.
///
/// Path parameters are not resolved when the route matches. The router binds
/// the matched route's parameter *descriptors* onto the request, and
/// [`param`](Request::param) / [`params`](Request::params) re-split the path
/// on every call. Reads therefore always see the path as it currently is,
/// which also means they depend on it still having the segment shape the
/// route matched.
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    params: Arc<[Param]>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        Self { method, path, headers, body, params: Vec::new().into() }
    }

    /// Attaches the matched route's parameter descriptors.
    pub(crate) fn bind_params(&mut self, params: Arc<[Param]>) {
        self.params = params;
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, name: &str) -> Option<String> {
        pattern::extract(&self.path, &self.params).remove(name)
    }

    /// Returns every bound path parameter, name to value.
    pub fn params(&self) -> HashMap<String, String> {
        pattern::extract(&self.path, &self.params)
    }
}
