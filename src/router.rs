//! Request router: linear first-match dispatch over compiled templates.
//!
//! Routes are scanned in registration order and the first pattern that
//! matches wins — overlapping templates are resolved by insertion order, not
//! specificity, and there is deliberately no trie or radix index in front of
//! the scan. Register the route table once, before serving; dispatch only
//! reads it, so concurrent in-flight requests need no locking.
//!
//! Per request: match → method check → parameter binding → chain assembly
//! (router middleware, then group, then route, then the handler) → a fixed
//! permissive CORS layer around the whole thing → invocation. Unmatched
//! paths and rejected methods short-circuit into the corresponding fallback
//! handler.

use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::debug;

use crate::group::{Group, GroupEntry};
use crate::handler::Handler;
use crate::middleware::{self, Middleware};
use crate::request::Request;
use crate::response::Response;
use crate::route::Route;

/// A replaceable terminal responder for requests the route table cannot
/// serve: not-found, method-not-allowed, and the unauthorized hook.
pub type FallbackHandler = Arc<dyn Fn(Option<&str>) -> Response + Send + Sync + 'static>;

const ALLOW_METHODS: &str = "POST, GET, OPTIONS, PUT, DELETE";
const ALLOW_HEADERS: &str =
    "Accept, Authorization, Content-Type, Content-Length, Accept-Encoding";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// The application router.
///
/// Holds the route table (append-only, in registration order), the group
/// table, the three fallback handlers, and an optional top-level middleware
/// chain. Build it during startup, then hand it to
/// [`Server::serve`](crate::Server::serve) — or call
/// [`dispatch`](Router::dispatch) from your own host loop.
pub struct Router {
    routes: Vec<Route>,
    pub(crate) groups: Vec<GroupEntry>,
    not_found: FallbackHandler,
    method_not_allowed: FallbackHandler,
    unauthorized: FallbackHandler,
    middleware: Option<Middleware>,
}

impl Router {
    /// Creates a router with an empty route table and the default
    /// empty-body fallback responses (404, 405, 401).
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            groups: Vec::new(),
            not_found: Arc::new(|_| Response::status(StatusCode::NOT_FOUND)),
            method_not_allowed: Arc::new(|_| Response::status(StatusCode::METHOD_NOT_ALLOWED)),
            unauthorized: Arc::new(|_| Response::status(StatusCode::UNAUTHORIZED)),
            middleware: None,
        }
    }

    /// Registers a handler for `path`. Returns the route for further
    /// configuration, e.g. `.methods([Method::GET])`.
    ///
    /// # Panics
    ///
    /// Panics if the template cannot be compiled. A router holding a
    /// mis-registered route is not safe to serve from, so startup aborts.
    pub fn handle_fn(
        &mut self,
        path: &str,
        handler: impl Handler,
        middlewares: &[Middleware],
    ) -> &mut Route {
        let route = Route::new(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self.add_route(route, middlewares)
    }

    /// Registers a catch-all handler: `path` plus any suffix. Intended for
    /// static-content-style serving.
    ///
    /// # Panics
    ///
    /// Panics if the template cannot be compiled, like
    /// [`handle_fn`](Router::handle_fn).
    pub fn handle_file_fn(
        &mut self,
        path: &str,
        handler: impl Handler,
        middlewares: &[Middleware],
    ) -> &mut Route {
        let route = Route::catch_all(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self.add_route(route, middlewares)
    }

    /// Opens a group under `path`. Routes registered through the returned
    /// handle share the prefix and the group's middleware chain.
    pub fn add_group(&mut self, path: &str, middlewares: &[Middleware]) -> Group<'_> {
        self.groups.push(GroupEntry {
            prefix: path.to_owned(),
            middleware: middleware::chain(middlewares),
        });
        let index = self.groups.len() - 1;
        Group { router: self, index }
    }

    /// Appends a pre-built route to the table. Middleware supplied here is
    /// chained onto the route before it is appended.
    pub fn add_route(&mut self, mut route: Route, middlewares: &[Middleware]) -> &mut Route {
        route.wrap(middlewares);
        self.routes.push(route);
        let index = self.routes.len() - 1;
        &mut self.routes[index]
    }

    /// Appends middleware to the router's top-level chain. Router middleware
    /// runs outside every group and route chain.
    pub fn wrap(&mut self, middlewares: &[Middleware]) -> &mut Self {
        self.middleware = middleware::extend(self.middleware.take(), middlewares);
        self
    }

    /// Replaces the router's top-level middleware chain outright.
    pub fn set_middleware(&mut self, middleware: Option<Middleware>) {
        self.middleware = middleware;
    }

    pub fn set_not_found_handler(
        &mut self,
        handler: impl Fn(Option<&str>) -> Response + Send + Sync + 'static,
    ) {
        self.not_found = Arc::new(handler);
    }

    pub fn set_method_not_allowed_handler(
        &mut self,
        handler: impl Fn(Option<&str>) -> Response + Send + Sync + 'static,
    ) {
        self.method_not_allowed = Arc::new(handler);
    }

    pub fn set_unauthorized_handler(
        &mut self,
        handler: impl Fn(Option<&str>) -> Response + Send + Sync + 'static,
    ) {
        self.unauthorized = Arc::new(handler);
    }

    /// The unauthorized fallback, cloneable into caller-supplied middleware.
    ///
    /// The router never invokes this itself — it exists so authorization
    /// middleware can reject with the application's configured 401 response:
    ///
    /// ```rust
    /// use vireo::{middleware, Request, Response, Router};
    ///
    /// async fn secret(_req: Request) -> Response {
    ///     Response::text("hi")
    /// }
    ///
    /// let mut router = Router::new();
    /// let unauthorized = router.unauthorized_handler();
    /// let auth = middleware::from_fn(move |req: Request, next| {
    ///     let unauthorized = unauthorized.clone();
    ///     async move {
    ///         if req.header("authorization").is_none() {
    ///             return unauthorized(Some("missing credentials"));
    ///         }
    ///         next.run(req).await
    ///     }
    /// });
    /// router.handle_fn("/secret", secret, &[auth]);
    /// ```
    pub fn unauthorized_handler(&self) -> FallbackHandler {
        Arc::clone(&self.unauthorized)
    }

    pub fn not_found_handler(&self) -> FallbackHandler {
        Arc::clone(&self.not_found)
    }

    pub fn method_not_allowed_handler(&self) -> FallbackHandler {
        Arc::clone(&self.method_not_allowed)
    }

    /// Routes one request and produces its response.
    ///
    /// This is the dispatch entry point for any host loop; the built-in
    /// [`Server`](crate::Server) calls it for every inbound request.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let Some(route) = self.routes.iter().find(|route| route.matches(req.path())) else {
            debug!(path = %req.path(), "no route matched");
            return (self.not_found)(None);
        };

        if !route.method_allowed(req.method()) {
            debug!(method = %req.method(), path = %req.path(), "method not allowed");
            return (self.method_not_allowed)(None);
        }

        // Bind descriptors, not values: parameter reads re-split the live
        // request path (see `pattern::extract`).
        req.bind_params(route.params_shared());

        let group_middleware = route
            .group
            .and_then(|index| self.groups.get(index))
            .and_then(|group| group.middleware.as_ref());
        let mut next = route.effective_handler(group_middleware);
        if let Some(mw) = &self.middleware {
            next = mw(next);
        }

        // Fixed CORS layer, outermost for every matched request.
        let origin = req.header("origin").unwrap_or_default().to_owned();
        if req.method() == Method::OPTIONS {
            // Preflight short-circuits: neither middleware nor the handler runs.
            let mut response = Response::status(StatusCode::OK);
            response.set_header("access-control-max-age", PREFLIGHT_MAX_AGE);
            apply_cors(&mut response, &origin);
            return response;
        }

        let mut response = next.run(req).await;
        apply_cors(&mut response, &origin);
        response
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets the permissive CORS response headers, echoing the request's origin.
/// Headers the handler already set are left alone.
fn apply_cors(response: &mut Response, origin: &str) {
    for (name, value) in [
        ("access-control-allow-credentials", "true"),
        ("access-control-allow-origin", origin),
        ("access-control-allow-methods", ALLOW_METHODS),
        ("access-control-allow-headers", ALLOW_HEADERS),
    ] {
        if response.header(name).is_none() {
            response.set_header(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::middleware::from_fn;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn request(method: Method, path: &str) -> Request {
        Request::new(method, path.to_owned(), Vec::new(), Vec::new())
    }

    fn request_with_headers(method: Method, path: &str, headers: &[(&str, &str)]) -> Request {
        let headers = headers
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Request::new(method, path.to_owned(), headers, Vec::new())
    }

    fn tag(log: &Log, label: &'static str) -> Middleware {
        let log = Arc::clone(log);
        from_fn(move |req, next| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(label);
                next.run(req).await
            }
        })
    }

    fn reply(body: &'static str) -> impl Fn(Request) -> std::future::Ready<Response> {
        move |_req| std::future::ready(Response::text(body))
    }

    #[tokio::test]
    async fn first_match_wins_over_later_more_specific_routes() {
        let mut router = Router::new();
        router.handle_fn("/a/:x", reply("param"), &[]);
        router.handle_fn("/a/fixed", reply("fixed"), &[]);

        let response = router.dispatch(request(Method::GET, "/a/fixed")).await;
        assert_eq!(response.body, b"param");
    }

    #[tokio::test]
    async fn unmatched_path_gets_the_not_found_fallback() {
        let mut router = Router::new();
        router.handle_fn("/users", reply("users"), &[]);

        let response = router.dispatch(request(Method::GET, "/nope")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn rejected_method_gets_the_method_not_allowed_fallback() {
        let mut router = Router::new();
        router
            .handle_fn("/users", reply("users"), &[])
            .methods([Method::GET]);

        let response = router.dispatch(request(Method::POST, "/users")).await;
        assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);

        let response = router.dispatch(request(Method::GET, "/users")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn fallback_handlers_are_replaceable() {
        let mut router = Router::new();
        router.set_not_found_handler(|_msg| {
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .json(br#"{"error":"not found"}"#.to_vec())
        });

        let response = router.dispatch(request(Method::GET, "/nope")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.body, br#"{"error":"not found"}"#);
    }

    #[tokio::test]
    async fn handlers_read_path_params_bound_at_dispatch() {
        let mut router = Router::new();
        router.handle_fn(
            "/users/:id",
            |req: Request| async move {
                Response::text(req.param("id").unwrap_or_default())
            },
            &[],
        );

        let response = router.dispatch(request(Method::GET, "/users/42")).await;
        assert_eq!(response.body, b"42");
    }

    #[tokio::test]
    async fn middleware_runs_router_then_group_then_route_then_handler() {
        let log: Log = Arc::default();
        let handler = {
            let log = Arc::clone(&log);
            move |_req: Request| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push("H");
                    Response::text("done")
                }
            }
        };

        let mut router = Router::new();
        router.wrap(&[tag(&log, "R")]);
        let mut api = router.add_group("/api", &[tag(&log, "G")]);
        api.handle_fn("/thing", handler, &[tag(&log, "M")]);

        router.dispatch(request(Method::GET, "/api/thing")).await;
        assert_eq!(*log.lock().unwrap(), vec!["R", "G", "M", "H"]);
    }

    #[tokio::test]
    async fn omitting_a_layer_preserves_the_relative_order() {
        let log: Log = Arc::default();
        let handler = {
            let log = Arc::clone(&log);
            move |_req: Request| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push("H");
                    Response::text("done")
                }
            }
        };

        // No group layer at all.
        let mut router = Router::new();
        router.wrap(&[tag(&log, "R")]);
        router.handle_fn("/thing", handler, &[tag(&log, "M")]);

        router.dispatch(request(Method::GET, "/thing")).await;
        assert_eq!(*log.lock().unwrap(), vec!["R", "M", "H"]);
    }

    #[tokio::test]
    async fn group_routes_serve_under_the_prefix() {
        let mut router = Router::new();
        let mut api = router.add_group("/api", &[]);
        api.handle_fn("/users/:id", reply("user"), &[]);

        let hit = router.dispatch(request(Method::GET, "/api/users/7")).await;
        assert_eq!(hit.body, b"user");

        let miss = router.dispatch(request(Method::GET, "/users/7")).await;
        assert_eq!(miss.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn group_param_positions_count_the_prefix_segments() {
        let mut router = Router::new();
        let mut api = router.add_group("/api", &[]);
        api.handle_fn(
            "/users/:id",
            |req: Request| async move {
                Response::text(req.param("id").unwrap_or_default())
            },
            &[],
        );

        let response = router.dispatch(request(Method::GET, "/api/users/7")).await;
        assert_eq!(response.body, b"7");
    }

    #[tokio::test]
    async fn catch_all_routes_serve_any_suffix() {
        let mut router = Router::new();
        router.handle_file_fn("/assets", reply("file"), &[]);

        let response = router
            .dispatch(request(Method::GET, "/assets/css/app.css"))
            .await;
        assert_eq!(response.body, b"file");

        let miss = router.dispatch(request(Method::GET, "/asset")).await;
        assert_eq!(miss.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn matched_responses_carry_cors_headers_echoing_the_origin() {
        let mut router = Router::new();
        router.handle_fn("/users", reply("users"), &[]);

        let response = router
            .dispatch(request_with_headers(
                Method::GET,
                "/users",
                &[("origin", "https://example.com")],
            ))
            .await;

        assert_eq!(response.header("access-control-allow-credentials"), Some("true"));
        assert_eq!(
            response.header("access-control-allow-origin"),
            Some("https://example.com")
        );
        assert!(response.header("access-control-allow-methods").is_some());
        assert!(response.header("access-control-allow-headers").is_some());
    }

    #[tokio::test]
    async fn preflight_short_circuits_before_middleware_and_handler() {
        let log: Log = Arc::default();
        let mut router = Router::new();
        router.wrap(&[tag(&log, "R")]);
        router.handle_fn("/users", reply("users"), &[tag(&log, "M")]);

        let response = router
            .dispatch(request_with_headers(
                Method::OPTIONS,
                "/users",
                &[("origin", "https://example.com")],
            ))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.header("access-control-max-age"), Some("86400"));
        assert_eq!(
            response.header("access-control-allow-origin"),
            Some("https://example.com")
        );
        assert!(response.body.is_empty());
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unauthorized_hook_is_usable_from_middleware() {
        let mut router = Router::new();
        let unauthorized = router.unauthorized_handler();
        let auth = from_fn(move |req: Request, next| {
            let unauthorized = unauthorized.clone();
            async move {
                if req.header("authorization").is_none() {
                    return unauthorized(Some("missing credentials"));
                }
                next.run(req).await
            }
        });
        router.handle_fn("/secret", reply("hi"), &[auth]);

        let denied = router.dispatch(request(Method::GET, "/secret")).await;
        assert_eq!(denied.status_code(), StatusCode::UNAUTHORIZED);

        let allowed = router
            .dispatch(request_with_headers(
                Method::GET,
                "/secret",
                &[("authorization", "Bearer t")],
            ))
            .await;
        assert_eq!(allowed.body, b"hi");
    }

    #[tokio::test]
    async fn route_wrap_after_registration_is_cumulative() {
        let log: Log = Arc::default();
        let handler = {
            let log = Arc::clone(&log);
            move |_req: Request| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push("H");
                    Response::text("done")
                }
            }
        };

        let mut router = Router::new();
        let route = router.handle_fn("/thing", handler, &[tag(&log, "m1")]);
        route.wrap(&[tag(&log, "m2")]);

        router.dispatch(request(Method::GET, "/thing")).await;
        assert_eq!(*log.lock().unwrap(), vec!["m1", "m2", "H"]);
    }
}
