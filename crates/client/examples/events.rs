use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::header::LOCATION;
use http::{HeaderMap, HeaderValue, StatusCode};
use micro_client::transport::{Transport, TransportRequest, TransportResponse};
use micro_client::{Client, JsonParser, RequestOptions, TransportError};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// A tiny in-memory site: `/old` redirects to `/users`, `/users` returns json, anything else is a 404.
struct Site;

#[async_trait]
impl Transport for Site {
    async fn call(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let response = match request.url.path() {
            "/old" => {
                let mut headers = HeaderMap::new();
                headers.insert(LOCATION, HeaderValue::from_static("/users"));
                TransportResponse::from_chunks(StatusCode::MOVED_PERMANENTLY, headers, [])
            }
            "/users" => {
                let chunks = [Bytes::from_static(br#"[{"id":1,"name":"#), Bytes::from_static(br#""ann"}]"#)];
                TransportResponse::from_chunks(StatusCode::OK, HeaderMap::new(), chunks)
            }
            _ => TransportResponse::from_chunks(StatusCode::NOT_FOUND, HeaderMap::new(), [Bytes::from_static(b"no such page")]),
        };
        Ok(response)
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let client = Client::builder().transport(Site).timeout(Duration::from_secs(2)).build().expect("client should build");

    let _ = client
        .get("http://site.test/old", RequestOptions::new().content_parser(JsonParser))
        .on("redirect", |event| info!(kind = %event.kind(), "redirected"))
        .on("success", |event| info!(payload = ?event.payload(), "users"))
        .send()
        .await;

    let _ = client
        .del("http://site.test/missing", RequestOptions::new())
        .on("not-found", |_| info!("nothing to delete"))
        .on("4XX", |event| info!(kind = %event.kind(), "client error"))
        .send()
        .await;

    let mut events = client.get("not a url", RequestOptions::new()).spawn();
    while let Some(event) = events.next().await {
        info!(kind = %event.kind(), error = ?event.client_error(), "streamed event");
    }
}
