use crate::{
	error::RouterError,
	route::{Gate, Middleware, Request},
};
use std::{
	collections::HashMap,
	fmt::{self, Debug, Formatter},
	sync::Arc,
};

/// Middleware gates bound by name.
#[derive(Clone, Default)]
pub struct Middlewares {
	gates: HashMap<String, Middleware>,
}

impl Middlewares {
	/// Binds `gate` to `name`, replacing any earlier binding.
	pub fn insert<G>(&mut self, name: impl Into<String>, gate: G)
	where
		G: Fn(&Request) -> anyhow::Result<Gate> + Send + Sync + 'static,
	{
		self.gates.insert(name.into(), Arc::new(gate));
	}

	pub fn get(&self, name: &str) -> Option<&Middleware> {
		self.gates.get(name)
	}

	/// Runs the gate bound to `name` against `req`, exactly once.
	///
	/// An unbound name fails with [`RouterError::UndefinedMiddleware`]. Errors from the gate itself
	/// are returned untouched.
	pub fn run(&self, name: &str, req: &Request) -> anyhow::Result<Gate> {
		let gate = self
			.get(name)
			.ok_or_else(|| RouterError::UndefinedMiddleware(name.to_owned()))?;
		gate(req)
	}
}

impl Debug for Middlewares {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.gates.keys()).finish()
	}
}

#[cfg(test)]
mod test {
	use super::Middlewares;
	use crate::{Gate, Request, RouterError};
	use anyhow::anyhow;
	use hyper::Body;
	use std::sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	};

	#[test]
	fn runs_gate_once() {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&calls);

		let mut middlewares = Middlewares::default();
		middlewares.insert("count", move |_: &Request| {
			counter.fetch_add(1, Ordering::SeqCst);
			Ok(Gate::Continue)
		});

		let req = Request::new(Body::empty());
		assert!(matches!(middlewares.run("count", &req), Ok(Gate::Continue)));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn unbound_gate_is_an_error() {
		let middlewares = Middlewares::default();
		let err = middlewares
			.run("auth", &Request::new(Body::empty()))
			.unwrap_err();

		assert!(matches!(
			err.downcast_ref::<RouterError>(),
			Some(RouterError::UndefinedMiddleware(name)) if name == "auth"
		));
	}

	#[test]
	fn gate_errors_pass_through() {
		let mut middlewares = Middlewares::default();
		middlewares.insert("deny", |_: &Request| Err(anyhow!("forbidden")));

		let err = middlewares
			.run("deny", &Request::new(Body::empty()))
			.unwrap_err();
		assert_eq!(err.to_string(), "forbidden");
		assert!(err.downcast_ref::<RouterError>().is_none());
	}
}
