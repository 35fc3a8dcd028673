use hyper::Method;
use std::io;
use thiserror::Error;

/// Errors raised by the router itself.
///
/// Errors returned from handlers or middleware gates are not wrapped: they travel through
/// dispatch as the [`anyhow::Error`] the gate produced.
#[derive(Debug, Error)]
pub enum RouterError {
	/// A route requires a middleware gate that was never bound.
	#[error("undefined middleware: {0}")]
	UndefinedMiddleware(String),

	/// A handler asked for a path parameter its route does not capture.
	#[error("unknown path parameter: {0}")]
	UnknownParameter(String),

	#[error("unsupported method: {0}")]
	UnsupportedMethod(Method),

	#[error("invalid route pattern {pattern:?}: {reason}")]
	InvalidPattern { pattern: String, reason: &'static str },

	#[error("invalid config: {0}")]
	Config(#[from] toml::de::Error),

	#[error(transparent)]
	Io(#[from] io::Error),
}

pub type Result<T, E = RouterError> = std::result::Result<T, E>;
