//! Minimal vireo example — grouped JSON endpoints, middleware, and a
//! catch-all static route.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl http://localhost:3000/api/items/7
//!   curl http://localhost:3000/api/items/abc          # 404: :id(\d+) rejects it
//!   curl http://localhost:3000/static/css/app.css
//!   curl -X OPTIONS http://localhost:3000/users/42 -i # CORS preflight

use vireo::{middleware, Method, Request, Response, Router, Server, StatusCode};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let trace = middleware::from_fn(|req: Request, next| async move {
        tracing::info!(method = %req.method(), path = %req.path(), "request");
        next.run(req).await
    });

    let mut app = Router::new();
    app.wrap(&[trace]);

    app.handle_fn("/users/:id", get_user, &[]).methods([Method::GET]);
    app.handle_fn("/users", create_user, &[]).methods([Method::POST]);
    app.handle_file_fn("/static", static_file, &[]);

    // Routes under /api share the group's auth middleware.
    let unauthorized = app.unauthorized_handler();
    let auth = middleware::from_fn(move |req: Request, next| {
        let unauthorized = unauthorized.clone();
        async move {
            if req.header("authorization").is_none() {
                return unauthorized(Some("missing credentials"));
            }
            next.run(req).await
        }
    });
    let mut api = app.add_group("/api", &[auth]);
    api.handle_fn("/items/:id(\\d+)", get_item, &[]);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/:id
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or_default();
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

// POST /users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(br#"{"id":"99","name":"new_user"}"#.to_vec())
}

// GET /api/items/:id — :id(\d+) only matches digits
async fn get_item(req: Request) -> Response {
    let id = req.param("id").unwrap_or_default();
    Response::json(format!(r#"{{"item":"{id}"}}"#).into_bytes())
}

// Anything under /static
async fn static_file(req: Request) -> Response {
    Response::text(format!("would serve {}", req.path()))
}
