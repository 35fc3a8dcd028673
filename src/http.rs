use crate::{
	route::{Request, Response},
	Router,
};
use hyper::{server::conn::AddrStream, service::Service, Server};
use std::{
	convert::Infallible,
	future::{ready, Future, Ready},
	net::SocketAddr,
	pin::Pin,
	task::{Context, Poll},
};
use tracing::info;

pub use hyper;

/// The connection a request arrived on. Attached to every request the router serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnInfo {
	pub remote_addr: SocketAddr,
}

impl Router {
	/// The per-request service for one connection.
	pub fn connection(&self, conn: ConnInfo) -> RouteHandler {
		RouteHandler {
			router: self.clone(),
			conn,
		}
	}

	/// Binds the configured address and serves requests until the server fails.
	pub async fn serve(self) -> anyhow::Result<()> {
		let addr = self.config().socket_addr()?;
		let server = Server::try_bind(&addr)?.serve(self);
		info!("Listening on http://{}", server.local_addr());

		server.await?;
		Ok(())
	}
}

impl<'a> Service<&'a AddrStream> for Router {
	type Response = RouteHandler;
	type Error = Infallible;
	type Future = Ready<Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		Poll::Ready(Ok(()))
	}

	fn call(&mut self, stream: &'a AddrStream) -> Self::Future {
		ready(Ok(self.connection(ConnInfo {
			remote_addr: stream.remote_addr(),
		})))
	}
}

/// Responsible for handling the actual HTTP requests from hyper.
#[derive(Debug, Clone)]
pub struct RouteHandler {
	router: Router,
	conn: ConnInfo,
}

impl Service<Request> for RouteHandler {
	type Response = Response;
	type Error = Infallible;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

	fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		Poll::Ready(Ok(()))
	}

	fn call(&mut self, mut req: Request) -> Self::Future {
		req.extensions_mut().insert(self.conn);
		let fut = self.router.handle(req);
		Box::pin(async move { Ok(fut.await) })
	}
}
