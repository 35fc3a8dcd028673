use crate::{
	error::{Result, RouterError},
	http::ConnInfo,
	route::Request,
};
use std::{collections::HashMap, iter::FromIterator};

/// Path parameters captured by a route's dynamic segments, in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
	pairs: Vec<(String, String)>,
}

impl Params {
	pub fn get(&self, name: &str) -> Option<&str> {
		self.pairs
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	/// Like [`Params::get`], but an uncaptured name is an error.
	pub fn require(&self, name: &str) -> Result<&str> {
		self.get(name)
			.ok_or_else(|| RouterError::UnknownParameter(name.to_owned()))
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.pairs
			.iter()
			.map(|(name, value)| (name.as_str(), value.as_str()))
	}

	pub fn len(&self) -> usize {
		self.pairs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}

	pub fn into_map(self) -> HashMap<String, String> {
		self.pairs.into_iter().collect()
	}
}

impl FromIterator<(String, String)> for Params {
	fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
		Self {
			pairs: iter.into_iter().collect(),
		}
	}
}

/// Access to what the router attached to a dispatched request.
pub trait RequestExt {
	/// The captured parameters, empty if the request was never routed.
	fn params(&self) -> &Params;

	fn param(&self, name: &str) -> Result<&str>;

	/// The connection the request arrived on, when it was served over a socket.
	fn conn_info(&self) -> Option<&ConnInfo>;
}

static NO_PARAMS: Params = Params { pairs: Vec::new() };

impl RequestExt for Request {
	fn params(&self) -> &Params {
		self.extensions().get::<Params>().unwrap_or(&NO_PARAMS)
	}

	fn param(&self, name: &str) -> Result<&str> {
		self.params().require(name)
	}

	fn conn_info(&self) -> Option<&ConnInfo> {
		self.extensions().get::<ConnInfo>()
	}
}
