//! A small pattern-matching HTTP router with middleware gates, built on hyper.
//!
//! ```no_run
//! use waymark::{Body, Config, Gate, Request, RequestExt, Response, Router};
//!
//! async fn user(req: Request) -> anyhow::Result<Response> {
//! 	let id = req.param("id")?;
//! 	Ok(Response::new(Body::from(format!("user {}", id))))
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//! 	let router = Router::builder()
//! 		.middleware("auth", |req: &Request| {
//! 			Ok(if req.headers().contains_key("authorization") {
//! 				Gate::Continue
//! 			} else {
//! 				Gate::Halt
//! 			})
//! 		})
//! 		.get("/users/:id", user)
//! 		.register_gated(waymark::Method::DELETE, "/users/:id", "auth", user)
//! 		.build(Config::default())?;
//!
//! 	router.serve().await
//! }
//! ```
//!
//! Path segments written `:name` match any single segment and are handed to the handler
//! as [`Params`], readable through [`RequestExt`]. A request matches a route only when it has the
//! same number of segments; when several routes match, the one registered last wins.
//!
//! The route table is materialized once, on the first request, and bound to a single origin for
//! the rest of the router's life. Gated routes run their middleware first: the gate either lets
//! the handler run, answers the request itself, or halts it, in which case the request resolves
//! as not found.

mod http;
pub use http::*;

mod config;
mod error;
mod middleware;
mod params;

/// Route patterns, handlers, and the matching of paths against patterns.
pub mod route;

/// Contains the core structs of the router.
///
/// Use the RouterBuilder to create a Router: pass the router to hyper as the service.
pub mod router;

/// The origin-bound route table a router builds on its first request.
pub mod table;

pub use config::*;
pub use error::*;
pub use middleware::*;
pub use params::*;
pub use route::*;
pub use router::*;
pub use table::*;
