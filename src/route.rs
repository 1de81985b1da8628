//! One registered entry point: a compiled path template bound to a handler.

use std::sync::Arc;

use http::Method;
use regex::Regex;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{self, Middleware, Next};
use crate::pattern::{self, Param};

/// A registered route.
///
/// Owned by the [`Router`](crate::Router) that it was registered on, in
/// registration order. The pattern and parameter list are compiled once from
/// the template and only recomputed when the path is re-set.
pub struct Route {
    path: String,
    pattern: Regex,
    catch_all: bool,
    methods: Vec<Method>,
    params: Arc<[Param]>,
    handler: BoxedHandler,
    middleware: Option<Middleware>,
    /// Non-owning index into the router's group table, used only to look up
    /// the group's middleware at dispatch time.
    pub(crate) group: Option<usize>,
}

impl Route {
    /// Builds a route for `path`. Fails if the template cannot be compiled.
    pub fn new(path: &str, handler: impl Handler) -> Result<Self, Error> {
        Self::build(path, handler, false)
    }

    /// Builds a catch-all route: it matches `path` plus any suffix, for
    /// static-content-style serving.
    pub fn catch_all(path: &str, handler: impl Handler) -> Result<Self, Error> {
        Self::build(path, handler, true)
    }

    fn build(path: &str, handler: impl Handler, catch_all: bool) -> Result<Self, Error> {
        let (pattern, params) = pattern::compile(path, catch_all)?;
        Ok(Self {
            path: path.to_owned(),
            pattern,
            catch_all,
            methods: Vec::new(),
            params: params.into(),
            handler: handler.into_boxed_handler(),
            middleware: None,
            group: None,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Re-points the route at a new template, recompiling the pattern and
    /// parameter list. A failure here is a misconfiguration; the previous
    /// pattern stays in place only because the error aborts setup anyway.
    pub fn set_path(&mut self, path: &str) -> Result<(), Error> {
        let (pattern, params) = pattern::compile(path, self.catch_all)?;
        self.path = path.to_owned();
        self.pattern = pattern;
        self.params = params.into();
        Ok(())
    }

    pub fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    /// Replaces the route's handler.
    pub fn set_handler(&mut self, handler: impl Handler) {
        self.handler = handler.into_boxed_handler();
    }

    /// Restricts the route to the given methods, replacing any previous
    /// restriction. An empty set means every method is allowed.
    pub fn methods(&mut self, methods: impl IntoIterator<Item = Method>) -> &mut Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// The parameters compiled from the template, ordered by segment position.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Appends middleware to the route's chain, after anything already there.
    pub fn wrap(&mut self, middlewares: &[Middleware]) -> &mut Self {
        self.middleware = middleware::extend(self.middleware.take(), middlewares);
        self
    }

    pub(crate) fn params_shared(&self) -> Arc<[Param]> {
        Arc::clone(&self.params)
    }

    pub(crate) fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    pub(crate) fn method_allowed(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    /// Assembles the handler with the route's own middleware inside the
    /// owning group's middleware: group layers run first, then route layers,
    /// then the raw handler.
    pub(crate) fn effective_handler(&self, group_middleware: Option<&Middleware>) -> Next {
        let mut next = Next::new(Arc::clone(&self.handler));
        if let Some(mw) = &self.middleware {
            next = mw(next);
        }
        if let Some(mw) = group_middleware {
            next = mw(next);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::response::Response;

    async fn noop(_req: Request) -> Response {
        Response::text("ok")
    }

    #[test]
    fn malformed_template_fails_construction() {
        assert!(matches!(
            Route::new("/files/:(", noop),
            Err(Error::MalformedParam { .. })
        ));
    }

    #[test]
    fn set_path_recompiles_pattern_and_params() {
        let mut route = Route::new("/users/:id", noop).unwrap();
        assert!(route.matches("/users/42"));
        assert_eq!(route.params().len(), 1);

        route.set_path("/orgs/:org/repos/:repo").unwrap();
        assert!(!route.matches("/users/42"));
        assert!(route.matches("/orgs/acme/repos/vireo"));
        assert_eq!(route.params().len(), 2);
        assert_eq!(route.params()[1].name(), "repo");
    }

    #[test]
    fn methods_replace_the_previous_restriction() {
        let mut route = Route::new("/users", noop).unwrap();
        assert!(route.method_allowed(&Method::DELETE));

        route.methods([Method::GET, Method::HEAD]);
        assert!(route.method_allowed(&Method::GET));
        assert!(!route.method_allowed(&Method::DELETE));

        route.methods([Method::DELETE]);
        assert!(route.method_allowed(&Method::DELETE));
        assert!(!route.method_allowed(&Method::GET));

        // Emptying the set lifts the restriction entirely.
        route.methods(std::iter::empty());
        assert!(route.method_allowed(&Method::PATCH));
    }

    #[test]
    fn catch_all_route_matches_suffixes() {
        let route = Route::catch_all("/static", noop).unwrap();
        assert!(route.is_catch_all());
        assert!(route.matches("/static/css/app.css"));
        assert!(!route.matches("/assets/app.css"));
    }
}
