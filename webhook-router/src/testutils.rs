use http::StatusCode;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioExecutor;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Start a mock upstream; `respond` maps (own port, path-and-query) to a
/// status and JSON body. The port is passed back in so fixtures can mint
/// absolute URLs pointing at themselves.
pub(crate) async fn start_mock_server<F>(respond: F) -> u16
where
    F: Fn(u16, &str) -> (StatusCode, serde_json::Value) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let io = hyper_util::rt::TokioIo::new(stream);
            let respond = respond.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let respond = respond.clone();
                    async move {
                        let path_and_query = req
                            .uri()
                            .path_and_query()
                            .map(|pq| pq.as_str().to_string())
                            .unwrap_or_default();
                        let (status, body) = respond(port, &path_and_query);
                        let json = serde_json::to_vec(&body).unwrap();
                        let mut response = Response::new(Full::new(Bytes::from(json)));
                        *response.status_mut() = status;
                        Ok::<_, Infallible>(response)
                    }
                });

                let _ = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                    .serve_connection(io, service)
                    .await;
            });
        }
    });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}
