use anyhow::anyhow;
use hyper::{body, service::Service, Body, Method, StatusCode};
use std::net::SocketAddr;
use waymark::{Config, ConnInfo, Gate, Request, RequestExt, Response, Router, NOT_FOUND_BODY};

fn conn() -> ConnInfo {
	ConnInfo {
		remote_addr: SocketAddr::from(([10, 0, 0, 7], 51000)),
	}
}

fn request(method: Method, uri: &str) -> Request {
	hyper::Request::builder()
		.method(method)
		.uri(uri)
		.header("host", "localhost:8000")
		.body(Body::empty())
		.unwrap()
}

async fn text(res: Response) -> String {
	let bytes = body::to_bytes(res.into_body()).await.unwrap();
	String::from_utf8(bytes.to_vec()).unwrap()
}

async fn peer(req: Request) -> anyhow::Result<Response> {
	let addr = req.conn_info().ok_or_else(|| anyhow!("no connection"))?;
	Ok(Response::new(addr.remote_addr.to_string().into()))
}

async fn post(req: Request) -> anyhow::Result<Response> {
	let body = format!("{}/{}", req.param("id")?, req.param("postId")?);
	Ok(Response::new(body.into()))
}

async fn fails(_req: Request) -> anyhow::Result<Response> {
	Err(anyhow!("handler blew up"))
}

fn router() -> Router {
	Router::builder()
		.get("/peer", peer)
		.get("/users/:id/posts/:postId", post)
		.get("/boom", fails)
		.middleware("never", |_: &Request| Ok(Gate::Halt))
		.register_gated(Method::PATCH, "/users/:id", "never", post)
		.build(Config::default())
		.unwrap()
}

#[tokio::test]
async fn attaches_connection_info() {
	let mut service = router().connection(conn());
	let res = service.call(request(Method::GET, "/peer")).await.unwrap();
	assert_eq!(text(res).await, "10.0.0.7:51000");
}

#[tokio::test]
async fn serves_params() {
	let mut service = router().connection(conn());
	let res = service
		.call(request(Method::GET, "/users/42/posts/7"))
		.await
		.unwrap();
	assert_eq!(res.status(), StatusCode::OK);
	assert_eq!(text(res).await, "42/7");
}

#[tokio::test]
async fn answers_not_found_as_plain_text() {
	let mut service = router().connection(conn());

	for req in vec![
		request(Method::GET, "/users/42"),
		request(Method::POST, "/peer"),
		request(Method::PATCH, "/users/42"),
	] {
		let res = service.call(req).await.unwrap();
		assert_eq!(res.status(), StatusCode::NOT_FOUND);
		assert_eq!(
			res.headers()["content-type"],
			"text/plain; charset=utf-8"
		);
		assert_eq!(text(res).await, NOT_FOUND_BODY);
	}
}

#[tokio::test]
async fn handler_errors_become_500() {
	let mut service = router().connection(conn());
	let res = service.call(request(Method::GET, "/boom")).await.unwrap();
	assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(text(res).await, "handler blew up");
}

#[tokio::test]
async fn custom_error_handler() {
	fn hide(_e: anyhow::Error) -> Response {
		let mut res = Response::new(Body::from("oops"));
		*res.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
		res
	}

	let router = Router::builder()
		.get("/boom", fails)
		.internal_error_handler(hide)
		.build(Config::default())
		.unwrap();

	let res = router.handle(request(Method::GET, "/boom")).await;
	assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(text(res).await, "oops");
}

#[tokio::test]
async fn connections_share_one_table() {
	let router = router();
	let mut first = router.connection(conn());
	let mut second = router.connection(ConnInfo {
		remote_addr: SocketAddr::from(([127, 0, 0, 1], 4000)),
	});

	first.call(request(Method::GET, "/peer")).await.unwrap();
	let built = router.table().map(|table| table.len());
	assert_eq!(built, Some(4));

	let res = second.call(request(Method::GET, "/peer")).await.unwrap();
	assert_eq!(text(res).await, "127.0.0.1:4000");
	assert_eq!(router.table().map(|table| table.len()), built);
}
