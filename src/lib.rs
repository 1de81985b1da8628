//! # vireo
//!
//! A small HTTP router built around compiled path templates, route groups,
//! and an ordered middleware chain.
//!
//! ## The model
//!
//! Every template compiles, once, at registration time, into an anchored
//! regular expression plus a list of positional parameters. Dispatch scans
//! the route table in registration order and the first match wins — there is
//! no radix tree and no specificity ranking, so the order you register in is
//! the order requests resolve in. Middleware composes deterministically:
//! router middleware runs outside group middleware, which runs outside route
//! middleware, which runs outside the handler, and every matched request is
//! additionally wrapped in a permissive CORS layer that answers `OPTIONS`
//! preflights on its own.
//!
//! Template syntax: `/users/:id` declares a parameter matching one segment;
//! `/items/:id(\d+)` pins a custom expression; a route registered through
//! [`Router::handle_file_fn`] is a catch-all that also matches any suffix
//! below its path.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use vireo::{Method, Request, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut app = Router::new();
//!     app.handle_fn("/users/:id", get_user, &[]).methods([Method::GET]);
//!     app.handle_fn("/users", create_user, &[]).methods([Method::POST]);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or_default();
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(br#"{"id":"99"}"#.to_vec())
//! }
//! ```
//!
//! Groups share a prefix and a middleware chain:
//!
//! ```rust
//! use vireo::{middleware, Request, Response, Router};
//!
//! async fn list_users(_req: Request) -> Response {
//!     Response::json(b"[]".to_vec())
//! }
//!
//! let trace = middleware::from_fn(|req: Request, next| async move {
//!     tracing::info!(path = %req.path(), "request");
//!     next.run(req).await
//! });
//!
//! let mut app = Router::new();
//! let mut api = app.add_group("/api", &[trace]);
//! api.handle_fn("/users", list_users, &[]);      // serves /api/users
//! ```

mod error;
mod group;
mod handler;
mod pattern;
mod request;
mod response;
mod route;
mod router;
mod server;

pub mod middleware;

pub use error::Error;
pub use group::Group;
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use middleware::{Middleware, Next};
pub use pattern::Param;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use route::Route;
pub use router::{FallbackHandler, Router};
pub use server::Server;
