use crate::{
	config::{Config, OriginSource},
	error::{Result, RouterError},
	middleware::Middlewares,
	params::Params,
	route::{boxed_handler, Endpoint, Gate, Handler, Method, Request, Response, Route},
	table::{request_origin, RouteEntry, RouteTable},
};
use hyper::{
	header::{HeaderValue, CONTENT_TYPE},
	Body, StatusCode,
};
use once_cell::sync::OnceCell;
use std::{
	fmt::{self, Debug, Formatter},
	future::Future,
	mem,
	pin::Pin,
	sync::{Arc, Mutex, PoisonError},
};
use tracing::trace;

/// Body of every response for a request no route answers.
pub const NOT_FOUND_BODY: &str = "URL not found";

/// A function that converts an error escaping dispatch into a response.
pub type ErrorHandler = fn(e: anyhow::Error) -> Response;

/// A function that answers requests no route matched.
pub type NotFoundHandler = fn(req: &Request) -> Response;

fn plain_text(status: StatusCode, body: impl Into<Body>) -> Response {
	let mut res = Response::new(body.into());
	*res.status_mut() = status;
	res.headers_mut().insert(
		CONTENT_TYPE,
		HeaderValue::from_static("text/plain; charset=utf-8"),
	);
	res
}

fn default_error_handler(e: anyhow::Error) -> Response {
	plain_text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn default_not_found_handler(_req: &Request) -> Response {
	plain_text(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

macro_rules! method_shorthands {
	($($name:ident => $method:ident),* $(,)?) => {
		$(
			#[doc = concat!("Registers a `", stringify!($method), "` route. See [`RouterBuilder::register`].")]
			pub fn $name<H, F>(self, pattern: &str, handler: H) -> Self
			where
				H: Fn(Request) -> F + Send + Sync + 'static,
				F: Future<Output = anyhow::Result<Response>> + Send + 'static,
			{
				self.register(Method::$method, pattern, handler)
			}
		)*
	};
}

/// Collects routes and middleware before a [`Router`] is built.
pub struct RouterBuilder {
	routes: Vec<Route>,
	middlewares: Middlewares,
	error: Option<RouterError>,
	internal_error_handler: Option<ErrorHandler>,
	not_found_handler: Option<NotFoundHandler>,
}

impl Default for RouterBuilder {
	fn default() -> Self {
		Self {
			routes: Vec::new(),
			middlewares: Middlewares::default(),
			error: None,
			internal_error_handler: None,
			not_found_handler: None,
		}
	}
}

impl RouterBuilder {
	fn push(mut self, route: Result<Route>) -> Self {
		match route {
			Ok(route) => self.routes.push(route),
			Err(e) => {
				self.error.get_or_insert(e);
			}
		}
		self
	}

	/// Registers `handler` for `method` requests matching `pattern`.
	///
	/// Patterns are `/`-separated; a segment written `:name` captures whatever single segment the
	/// request has in that position. Registering the same method and pattern twice keeps the
	/// later handler.
	pub fn register<H, F>(self, method: Method, pattern: &str, handler: H) -> Self
	where
		H: Fn(Request) -> F + Send + Sync + 'static,
		F: Future<Output = anyhow::Result<Response>> + Send + 'static,
	{
		let route = Route::new(method, pattern, Endpoint::Handler(boxed_handler(handler)));
		self.push(route)
	}

	/// Registers `handler` behind the middleware bound to `middleware`.
	///
	/// The name is resolved when a request reaches the route, so the gate may be bound before or
	/// after this call. A name that is never bound fails those requests with
	/// [`RouterError::UndefinedMiddleware`].
	pub fn register_gated<H, F>(
		self,
		method: Method,
		pattern: &str,
		middleware: &str,
		handler: H,
	) -> Self
	where
		H: Fn(Request) -> F + Send + Sync + 'static,
		F: Future<Output = anyhow::Result<Response>> + Send + 'static,
	{
		let endpoint = Endpoint::Gated {
			middleware: middleware.to_owned(),
			handler: boxed_handler(handler),
		};
		self.push(Route::new(method, pattern, endpoint))
	}

	method_shorthands! {
		get => GET,
		post => POST,
		put => PUT,
		delete => DELETE,
		head => HEAD,
		options => OPTIONS,
		patch => PATCH,
	}

	/// Binds a middleware gate to `name`.
	pub fn middleware<G>(mut self, name: &str, gate: G) -> Self
	where
		G: Fn(&Request) -> anyhow::Result<Gate> + Send + Sync + 'static,
	{
		self.middlewares.insert(name, gate);
		self
	}

	pub fn internal_error_handler(mut self, handler: ErrorHandler) -> Self {
		self.internal_error_handler = Some(handler);
		self
	}

	pub fn not_found_handler(mut self, handler: NotFoundHandler) -> Self {
		self.not_found_handler = Some(handler);
		self
	}

	/// Fails with the first registration that had an invalid pattern or method.
	pub fn build(self, config: Config) -> Result<Router> {
		if let Some(e) = self.error {
			return Err(e);
		}

		Ok(Router {
			inner: Arc::new(Inner {
				config,
				pending: Mutex::new(self.routes),
				table: OnceCell::new(),
				middlewares: self.middlewares,
				internal_error: self.internal_error_handler.unwrap_or(default_error_handler),
				not_found: self.not_found_handler.unwrap_or(default_not_found_handler),
			}),
		})
	}
}

impl Debug for RouterBuilder {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouterBuilder")
			.field("routes", &self.routes)
			.field("middlewares", &self.middlewares)
			.field("error", &self.error)
			.finish()
	}
}

struct Inner {
	config: Config,
	pending: Mutex<Vec<Route>>,
	table: OnceCell<RouteTable>,
	middlewares: Middlewares,
	internal_error: ErrorHandler,
	not_found: NotFoundHandler,
}

/// Where dispatch goes once routing and the middleware gate are done.
enum Step {
	Handle(Handler),
	Respond(Response),
}

/// Routes requests to registered handlers. Cheap to clone; clones share one route table.
#[derive(Clone)]
pub struct Router {
	inner: Arc<Inner>,
}

impl Router {
	pub fn builder() -> RouterBuilder {
		RouterBuilder::default()
	}

	pub fn config(&self) -> &Config {
		&self.inner.config
	}

	/// The route table, if a request has been dispatched yet.
	pub fn table(&self) -> Option<&RouteTable> {
		self.inner.table.get()
	}

	/// The route table, built on first use from the routes registered on the builder.
	fn table_for(&self, req: &Request) -> &RouteTable {
		self.inner.table.get_or_init(|| {
			let config = &self.inner.config;
			let origin = match config.origin {
				OriginSource::Configured => config.origin(),
				OriginSource::FirstRequest => {
					request_origin(req, &config.scheme).unwrap_or_else(|| config.origin())
				}
			};

			let mut pending = self
				.inner
				.pending
				.lock()
				.unwrap_or_else(PoisonError::into_inner);
			RouteTable::build(origin, mem::take(&mut *pending))
		})
	}

	/// The route `req` would be dispatched to.
	pub fn find(&self, req: &Request) -> Option<&RouteEntry> {
		self.table_for(req).lookup(req.method(), req.uri().path())
	}

	/// The path parameters of `req`, recovered by matching it against the route table again.
	/// Empty when no route matches.
	pub fn params(&self, req: &Request) -> Params {
		self.find(req)
			.map(|entry| entry.pattern().captures(req.uri().path()))
			.unwrap_or_default()
	}

	pub fn param(&self, name: &str, req: &Request) -> Result<String> {
		self.params(req).require(name).map(str::to_owned)
	}

	fn route(&self, req: &mut Request) -> anyhow::Result<Step> {
		let path = req.uri().path().to_owned();
		let entry = match self.table_for(req).lookup(req.method(), &path) {
			Some(entry) => entry,
			None => {
				trace!(method = %req.method(), path = %path, "no route matched");
				return Ok(Step::Respond((self.inner.not_found)(req)));
			}
		};

		trace!(method = %req.method(), path = %path, route = %entry.url(), "matched route");
		req.extensions_mut().insert(entry.pattern().captures(&path));

		match entry.endpoint() {
			Endpoint::Handler(handler) => Ok(Step::Handle(Arc::clone(handler))),
			Endpoint::Gated {
				middleware,
				handler,
			} => match self.inner.middlewares.run(middleware, req)? {
				Gate::Continue => Ok(Step::Handle(Arc::clone(handler))),
				Gate::Respond(res) => Ok(Step::Respond(res)),
				Gate::Halt => {
					trace!(middleware = %middleware, "middleware halted request");
					Ok(Step::Respond((self.inner.not_found)(req)))
				}
			},
		}
	}

	/// Dispatches `req` to its route.
	///
	/// Unmatched requests, and gated requests the middleware halts, resolve to the not-found
	/// response. Errors from the gate, the handler, or an unbound middleware name are returned
	/// as they are.
	pub async fn dispatch(&self, mut req: Request) -> anyhow::Result<Response> {
		match self.route(&mut req)? {
			Step::Handle(handler) => handler(req).await,
			Step::Respond(res) => Ok(res),
		}
	}

	/// Dispatches `req` and converts any error into a response with the internal error handler.
	pub fn handle(&self, mut req: Request) -> Pin<Box<dyn Future<Output = Response> + Send>> {
		let internal_error = self.inner.internal_error;

		match self.route(&mut req) {
			Ok(Step::Handle(handler)) => {
				let fut = handler(req);
				Box::pin(async move { fut.await.unwrap_or_else(internal_error) })
			}
			Ok(Step::Respond(res)) => Box::pin(async { res }),
			Err(e) => {
				let res = internal_error(e);
				Box::pin(async { res })
			}
		}
	}
}

impl Debug for Router {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("config", &self.inner.config)
			.field("table", &self.inner.table.get())
			.field("middlewares", &self.inner.middlewares)
			.finish()
	}
}
