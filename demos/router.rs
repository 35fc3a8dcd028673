use anyhow::anyhow;
use tracing_subscriber::EnvFilter;
use waymark::{Body, Config, Gate, Method, Request, RequestExt, Response, Router};

async fn index(_req: Request) -> anyhow::Result<Response> {
	Ok(Response::new(Body::from("hello")))
}

async fn user_post(req: Request) -> anyhow::Result<Response> {
	let params = req.params();
	let body = format!(
		"user {} post {}",
		params.require("id")?,
		params.require("postId")?
	);
	Ok(Response::new(body.into()))
}

async fn whoami(req: Request) -> anyhow::Result<Response> {
	let peer = req
		.conn_info()
		.map(|conn| conn.remote_addr.to_string())
		.unwrap_or_default();
	Ok(Response::new(peer.into()))
}

fn require_token(req: &Request) -> anyhow::Result<Gate> {
	match req.headers().get("x-token") {
		None => Ok(Gate::Halt),
		Some(token) if token == "letmein" => Ok(Gate::Continue),
		Some(_) => Err(anyhow!("bad token")),
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let config = match std::env::args().nth(1) {
		Some(path) => Config::load(path)?,
		None => Config::default(),
	};

	let router = Router::builder()
		.get("/", index)
		.get("/users/:id/posts/:postId", user_post)
		.middleware("token", require_token)
		.register_gated(Method::GET, "/whoami", "token", whoami)
		.build(config)?;

	router.serve().await
}
