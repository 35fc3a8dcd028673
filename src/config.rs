use crate::error::Result;
use serde::Deserialize;
use std::{
	fs,
	io,
	net::{SocketAddr, ToSocketAddrs},
	path::Path,
};

/// Where the route table takes its origin (`scheme://host:port`) from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginSource {
	/// Use [`Config::origin`].
	Configured,
	/// Use whatever host the first request addressed. Falls back to the configured origin when
	/// that request carries no host at all.
	FirstRequest,
}

impl Default for OriginSource {
	fn default() -> Self {
		Self::Configured
	}
}

/// Server settings.
///
/// ```toml
/// hostname = "0.0.0.0"
/// port = 3000
/// origin = "first-request"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
	pub hostname: String,
	pub port: u16,
	pub scheme: String,
	pub origin: OriginSource,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			hostname: "localhost".to_owned(),
			port: 8000,
			scheme: "http".to_owned(),
			origin: OriginSource::default(),
		}
	}
}

impl Config {
	pub fn from_toml_str(s: &str) -> Result<Self> {
		Ok(toml::from_str(s)?)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let content = fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	/// The fully-qualified origin routes are resolved against, e.g. `http://localhost:8000`.
	pub fn origin(&self) -> String {
		format!("{}://{}:{}", self.scheme, self.hostname, self.port)
	}

	pub fn socket_addr(&self) -> Result<SocketAddr> {
		(self.hostname.as_str(), self.port)
			.to_socket_addrs()?
			.next()
			.ok_or_else(|| {
				io::Error::new(
					io::ErrorKind::AddrNotAvailable,
					format!("{} did not resolve to an address", self.hostname),
				)
				.into()
			})
	}
}
