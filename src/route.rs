use crate::{
	error::{Result, RouterError},
	params::Params,
};
pub use hyper::{Body, Method, StatusCode};
use std::{
	fmt::{self, Debug, Display, Formatter},
	future::Future,
	pin::Pin,
	sync::Arc,
};

pub type Request = hyper::Request<Body>;
pub type Response = hyper::Response<Body>;
pub type ResponseFuture = Pin<Box<dyn Future<Output = anyhow::Result<Response>> + Send>>;

/// A terminal route handler.
pub type Handler = Arc<dyn Fn(Request) -> ResponseFuture + Send + Sync>;

/// A middleware gate, run synchronously before the handler of a gated route.
pub type Middleware = Arc<dyn Fn(&Request) -> anyhow::Result<Gate> + Send + Sync>;

/// The methods a route may be registered for.
pub const SUPPORTED_METHODS: [Method; 7] = [
	Method::GET,
	Method::POST,
	Method::PUT,
	Method::DELETE,
	Method::HEAD,
	Method::OPTIONS,
	Method::PATCH,
];

pub(crate) fn boxed_handler<H, F>(handler: H) -> Handler
where
	H: Fn(Request) -> F + Send + Sync + 'static,
	F: Future<Output = anyhow::Result<Response>> + Send + 'static,
{
	Arc::new(move |req: Request| Box::pin(handler(req)) as ResponseFuture)
}

/// What a middleware gate decided about a request.
#[derive(Debug)]
pub enum Gate {
	/// Hand the request on to the route's handler.
	Continue,
	/// Answer the request with this response; the handler is skipped.
	Respond(Response),
	/// Stop without answering. The request resolves as not found.
	Halt,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum PathSegment {
	/// A named capture, written `:name`.
	Dynamic(String),
	Static(String),
}

impl PathSegment {
	fn matches(&self, incoming: &str) -> bool {
		match self {
			PathSegment::Static(literal) => literal == incoming,
			PathSegment::Dynamic(_) => true,
		}
	}
}

impl Display for PathSegment {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			PathSegment::Dynamic(name) => write!(f, ":{}", name),
			PathSegment::Static(literal) => f.write_str(literal),
		}
	}
}

/// Splits a request path into its segments. The leading `/` is dropped; every other `/` is
/// significant, so `/users/` has two segments, the second one empty.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
	path.strip_prefix('/').unwrap_or(path).split('/')
}

/// A registered path pattern such as `/users/:id/posts`.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct RoutePattern {
	segments: Vec<PathSegment>,
}

impl RoutePattern {
	pub fn parse(pattern: &str) -> Result<Self> {
		let invalid = |reason| RouterError::InvalidPattern {
			pattern: pattern.to_owned(),
			reason,
		};

		if !pattern.starts_with('/') {
			return Err(invalid("pattern must start with '/'"));
		}

		let mut segments: Vec<PathSegment> = Vec::new();
		for segment in split_path(pattern) {
			let segment = match segment.strip_prefix(':') {
				Some("") => return Err(invalid("capture segment has no name")),
				Some(name) => {
					let name = name.to_owned();
					if segments.contains(&PathSegment::Dynamic(name.clone())) {
						return Err(invalid("capture name is used twice"));
					}
					PathSegment::Dynamic(name)
				}
				None => PathSegment::Static(segment.to_owned()),
			};
			segments.push(segment);
		}

		Ok(Self { segments })
	}

	pub fn segments(&self) -> &[PathSegment] {
		&self.segments
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Whether `path` has exactly as many segments as this pattern and every literal segment is
	/// equal. Captures accept any segment, including an empty one.
	pub fn matches(&self, path: &str) -> bool {
		let mut incoming = split_path(path);
		let aligned = self
			.segments
			.iter()
			.all(|segment| incoming.next().map_or(false, |value| segment.matches(value)));

		aligned && incoming.next().is_none()
	}

	/// Aligns `path` against this pattern and returns the value of every capture, in pattern
	/// order. The path is assumed to match.
	pub fn captures(&self, path: &str) -> Params {
		self.segments
			.iter()
			.zip(split_path(path))
			.filter_map(|(segment, value)| match segment {
				PathSegment::Dynamic(name) => Some((name.clone(), value.to_owned())),
				PathSegment::Static(_) => None,
			})
			.collect()
	}
}

impl Display for RoutePattern {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		for segment in &self.segments {
			write!(f, "/{}", segment)?;
		}
		Ok(())
	}
}

impl Debug for RoutePattern {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "RoutePattern({})", self)
	}
}

/// What runs once a route has been matched.
#[derive(Clone)]
pub enum Endpoint {
	/// A bare handler.
	Handler(Handler),
	/// A handler behind a named middleware gate.
	Gated { middleware: String, handler: Handler },
}

impl Debug for Endpoint {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Endpoint::Handler(_) => f.write_str("Handler"),
			Endpoint::Gated { middleware, .. } => write!(f, "Gated({})", middleware),
		}
	}
}

/// A route as registered, before it is resolved against an origin.
#[derive(Debug, Clone)]
pub struct Route {
	pub method: Method,
	pub pattern: RoutePattern,
	pub endpoint: Endpoint,
}

impl Route {
	pub fn new(method: Method, pattern: &str, endpoint: Endpoint) -> Result<Self> {
		if !SUPPORTED_METHODS.contains(&method) {
			return Err(RouterError::UnsupportedMethod(method));
		}

		Ok(Self {
			method,
			pattern: RoutePattern::parse(pattern)?,
			endpoint,
		})
	}
}

#[cfg(test)]
mod test {
	use super::{Endpoint, PathSegment, Route, RoutePattern};
	use crate::RouterError;
	use hyper::Method;

	fn pattern(s: &str) -> RoutePattern {
		RoutePattern::parse(s).unwrap()
	}

	#[test]
	fn parses_segments() {
		assert_eq!(
			pattern("/users/:id/posts").segments(),
			&[
				PathSegment::Static("users".to_owned()),
				PathSegment::Dynamic("id".to_owned()),
				PathSegment::Static("posts".to_owned()),
			]
		);
		assert_eq!(pattern("/").segments(), &[PathSegment::Static(String::new())]);
		assert_eq!(pattern("/users/:id").to_string(), "/users/:id");
	}

	#[test]
	fn rejects_bad_patterns() {
		for bad in &["users", "/users/:", "/a/:id/b/:id"] {
			assert!(
				matches!(RoutePattern::parse(bad), Err(RouterError::InvalidPattern { .. })),
				"{} should not parse",
				bad
			);
		}
	}

	#[test]
	fn matches_literal_segments() {
		let p = pattern("/users/list");
		assert!(p.matches("/users/list"));
		assert!(!p.matches("/users/lists"));
		assert!(!p.matches("/users"));
		assert!(!p.matches("/users/list/"));
		assert!(pattern("/").matches("/"));
	}

	#[test]
	fn dynamic_segments_are_untyped() {
		let p = pattern("/users/:id");
		assert!(p.matches("/users/42"));
		assert!(p.matches("/users/abc"));
		assert!(!p.matches("/users/42/extra"));
		assert!(!p.matches("/users"));
		assert!(p.matches("/users/"));
	}

	#[test]
	fn captures_in_pattern_order() {
		let params = pattern("/users/:id/posts/:postId").captures("/users/42/posts/7");
		let pairs: Vec<_> = params.iter().collect();
		assert_eq!(pairs, vec![("id", "42"), ("postId", "7")]);
	}

	#[test]
	fn rejects_unsupported_methods() {
		let handler = crate::route::boxed_handler(|_| async { Ok(crate::Response::default()) });
		let err = Route::new(Method::TRACE, "/", Endpoint::Handler(handler)).unwrap_err();
		assert!(matches!(err, RouterError::UnsupportedMethod(Method::TRACE)));
	}
}
