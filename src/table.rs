use crate::route::{split_path, Endpoint, Method, Request, Route, RoutePattern};
use hyper::header::HOST;
use std::collections::HashMap;
use tracing::{debug, warn};

/// The identity of a route: two registrations with equal keys are the same route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
	pub method: Method,
	pub pattern: RoutePattern,
}

/// A route resolved against the origin the table was built for.
#[derive(Debug, Clone)]
pub struct RouteEntry {
	key: RouteKey,
	url: String,
	endpoint: Endpoint,
}

impl RouteEntry {
	pub fn key(&self) -> &RouteKey {
		&self.key
	}

	pub fn method(&self) -> &Method {
		&self.key.method
	}

	pub fn pattern(&self) -> &RoutePattern {
		&self.key.pattern
	}

	/// The fully-qualified URL of this route, captures left as written: `http://host:80/users/:id`.
	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn endpoint(&self) -> &Endpoint {
		&self.endpoint
	}
}

/// Every registered route, bound to a single origin.
#[derive(Debug)]
pub struct RouteTable {
	origin: String,
	entries: Vec<RouteEntry>,
	positions: HashMap<RouteKey, usize>,
	buckets: HashMap<(Method, usize), Vec<usize>>,
}

impl RouteTable {
	pub fn build(origin: String, routes: impl IntoIterator<Item = Route>) -> Self {
		let mut table = Self {
			origin,
			entries: Vec::new(),
			positions: HashMap::new(),
			buckets: HashMap::new(),
		};

		for route in routes {
			table.insert(route);
		}

		debug!(origin = %table.origin, routes = table.entries.len(), "built route table");
		table
	}

	fn insert(&mut self, route: Route) {
		let key = RouteKey {
			method: route.method,
			pattern: route.pattern,
		};
		let entry = RouteEntry {
			url: format!("{}{}", self.origin, key.pattern),
			key,
			endpoint: route.endpoint,
		};

		match self.positions.get(&entry.key) {
			Some(&position) => {
				warn!(method = %entry.key.method, url = %entry.url, "route registered twice, keeping the later one");
				self.entries[position] = entry;
			}
			None => {
				let position = self.entries.len();
				self.positions.insert(entry.key.clone(), position);
				self.buckets
					.entry((entry.key.method.clone(), entry.key.pattern.len()))
					.or_default()
					.push(position);
				self.entries.push(entry);
			}
		}
	}

	pub fn origin(&self) -> &str {
		&self.origin
	}

	/// Entries in registration order.
	pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
		self.entries.iter()
	}

	pub fn get(&self, key: &RouteKey) -> Option<&RouteEntry> {
		self.positions.get(key).map(|&position| &self.entries[position])
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Finds the route for `method` whose pattern matches `path`. When several patterns match,
	/// the one registered last wins.
	pub fn lookup(&self, method: &Method, path: &str) -> Option<&RouteEntry> {
		let bucket = self
			.buckets
			.get(&(method.clone(), split_path(path).count()))?;

		bucket
			.iter()
			.rev()
			.map(|&position| &self.entries[position])
			.find(|entry| entry.key.pattern.matches(path))
	}
}

/// The `scheme://authority` a request was addressed to, taken from an absolute-form URI or the
/// `Host` header.
pub(crate) fn request_origin(req: &Request, default_scheme: &str) -> Option<String> {
	let scheme = req.uri().scheme_str().unwrap_or(default_scheme);
	let authority = match req.uri().authority() {
		Some(authority) => authority.as_str(),
		None => req.headers().get(HOST)?.to_str().ok()?,
	};

	if authority.is_empty() {
		return None;
	}

	Some(format!("{}://{}", scheme, authority))
}
