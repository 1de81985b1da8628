//! Route groups: a shared path prefix plus shared middleware.
//!
//! A group does not own routes. Its prefix and middleware live in a table on
//! the router; routes registered through it keep only the table index, which
//! the router consults for middleware at dispatch time. Dropping the
//! [`Group`] handle changes nothing about the routes it registered.

use crate::handler::Handler;
use crate::middleware::{self, Middleware};
use crate::route::Route;
use crate::router::Router;

/// Prefix and middleware of one group, stored on the router.
pub(crate) struct GroupEntry {
    pub(crate) prefix: String,
    pub(crate) middleware: Option<Middleware>,
}

/// A handle for registering routes under a shared prefix and middleware
/// chain. Created by [`Router::add_group`].
///
/// ```rust
/// use vireo::{Request, Response, Router};
///
/// async fn list_users(_req: Request) -> Response {
///     Response::json(b"[]".to_vec())
/// }
///
/// let mut router = Router::new();
/// let mut api = router.add_group("/api", &[]);
/// api.handle_fn("/users", list_users, &[]);      // serves /api/users
/// ```
pub struct Group<'r> {
    pub(crate) router: &'r mut Router,
    pub(crate) index: usize,
}

impl Group<'_> {
    /// The group's path prefix.
    pub fn path(&self) -> &str {
        &self.router.groups[self.index].prefix
    }

    /// Replaces the group's path prefix. Affects routes registered *after*
    /// this call; already-registered routes keep their full template.
    pub fn set_path(&mut self, path: &str) {
        self.router.groups[self.index].prefix = path.to_owned();
    }

    /// Registers a route at `prefix + path`, owned by the router and
    /// attached to this group for middleware lookup.
    ///
    /// # Panics
    ///
    /// Panics if the combined template cannot be compiled, like
    /// [`Router::handle_fn`].
    pub fn handle_fn(
        &mut self,
        path: &str,
        handler: impl Handler,
        middlewares: &[Middleware],
    ) -> &mut Route {
        let full = format!("{}{}", self.router.groups[self.index].prefix, path);
        let mut route = Route::new(&full, handler)
            .unwrap_or_else(|e| panic!("invalid route `{full}`: {e}"));
        route.group = Some(self.index);
        self.router.add_route(route, middlewares)
    }

    /// Appends middleware to the group's chain, after anything already there.
    pub fn wrap(&mut self, middlewares: &[Middleware]) -> &mut Self {
        let entry = &mut self.router.groups[self.index];
        entry.middleware = middleware::extend(entry.middleware.take(), middlewares);
        self
    }

    /// The router this group registers into.
    pub fn router(&mut self) -> &mut Router {
        self.router
    }
}
