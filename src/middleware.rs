//! Middleware: handler-wrapping transformations with deterministic order.
//!
//! A [`Middleware`] takes the rest of the chain ([`Next`]) and returns a new
//! chain head. Composing `[m0, m1, m2]` around a terminal handler `H` runs
//! `m0 → m1 → m2 → H`; any layer may short-circuit by not calling
//! [`Next::run`].
//!
//! Build one from an async closure with [`from_fn`]:
//!
//! ```rust
//! use vireo::{middleware, Request, Response, StatusCode};
//!
//! let auth = middleware::from_fn(|req: Request, next| async move {
//!     if req.header("authorization").is_none() {
//!         return Response::status(StatusCode::UNAUTHORIZED);
//!     }
//!     next.run(req).await
//! });
//! ```
//!
//! Routers, groups, and routes each hold at most one composed chain;
//! their `wrap` methods fold additional middleware onto the end of it.

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::Response;

/// A handler-transforming function: given the rest of the chain, produce the
/// new head of the chain.
pub type Middleware = Arc<dyn Fn(Next) -> Next + Send + Sync + 'static>;

/// The remainder of a middleware chain, ending in the terminal handler.
///
/// Calling [`run`](Next::run) hands the request to the next layer. Not
/// calling it short-circuits the chain.
#[derive(Clone)]
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    pub(crate) fn new(inner: BoxedHandler) -> Self {
        Self { inner }
    }

    /// Invokes the rest of the chain.
    pub async fn run(self, req: Request) -> Response {
        self.inner.call(req).await
    }
}

/// Builds a [`Middleware`] from an async function of `(Request, Next)`.
pub fn from_fn<F, Fut>(f: F) -> Middleware
where
    F: Fn(Request, Next) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |next: Next| {
        Next::new(Arc::new(FnMiddleware { f: f.clone(), next }))
    })
}

/// One applied `from_fn` layer: holds the user function and its `next`.
struct FnMiddleware<F> {
    f: F,
    next: Next,
}

impl<F, Fut> ErasedHandler for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request) -> crate::handler::BoxFuture {
        Box::pin((self.f)(req, self.next.clone()))
    }
}

/// Composes a list of middleware into a single transformation.
///
/// An empty list composes to `None`, not an identity wrapper, so owners can
/// cheaply test "is there middleware" at dispatch time. Otherwise the result
/// nests the list in order: the first element is the outermost layer and
/// runs first.
pub fn chain(middlewares: &[Middleware]) -> Option<Middleware> {
    if middlewares.is_empty() {
        return None;
    }

    let list = middlewares.to_vec();
    Some(Arc::new(move |mut next: Next| {
        for mw in list.iter().rev() {
            next = mw(next);
        }
        next
    }))
}

/// Folds `additional` onto an existing composed chain, preserving order:
/// the current chain (if any) stays outermost, new layers run after it.
pub(crate) fn extend(current: Option<Middleware>, additional: &[Middleware]) -> Option<Middleware> {
    let mut list = Vec::with_capacity(additional.len() + 1);
    if let Some(mw) = current {
        list.push(mw);
    }
    list.extend_from_slice(additional);
    chain(&list)
}
