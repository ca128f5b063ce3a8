//! Streaming bridge between an upstream model response and the caller
//!
//! A single pump: the upstream byte stream becomes the downstream body
//! directly, preserving chunk arrival order with no intermediary buffering.
//! When the caller disconnects, axum drops the body and with it the upstream
//! connection, so no orphaned reads remain in flight.

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::infrastructure::model::ModelStream;

/// Used when the upstream streaming response does not declare a content type.
const DEFAULT_STREAM_CONTENT_TYPE: &str = "application/x-ndjson; charset=utf-8";

/// Relay an upstream streaming response to the caller.
///
/// Framing metadata is carried over, and intermediary buffering is disabled:
/// the payload is line-delimited incremental model output, so any buffering
/// delay defeats the point of streaming.
pub(super) fn relay_stream(upstream: ModelStream) -> Response {
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| DEFAULT_STREAM_CONTENT_TYPE.to_string());

    let built = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "no-cache")
        .header("x-accel-buffering", "no")
        .body(Body::from_stream(upstream.bytes));

    match built {
        Ok(response) => response,
        Err(error) => {
            error!(%error, "Failed to assemble streaming response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::StreamExt;

    fn upstream(content_type: Option<&str>, chunks: Vec<&'static [u8]>) -> ModelStream {
        let chunks: Vec<Result<Bytes, reqwest::Error>> =
            chunks.into_iter().map(|c| Ok(Bytes::from_static(c))).collect();
        ModelStream {
            content_type: content_type.map(str::to_string),
            bytes: futures::stream::iter(chunks).boxed(),
        }
    }

    #[tokio::test]
    async fn propagates_upstream_content_type_and_disables_buffering() {
        let response = relay_stream(upstream(
            Some("application/x-ndjson"),
            vec![b"{\"done\":true}\n"],
        ));

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/x-ndjson")
        );
        assert_eq!(
            headers.get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
            Some("no-cache")
        );
        assert_eq!(
            headers.get("x-accel-buffering").and_then(|v| v.to_str().ok()),
            Some("no")
        );
    }

    #[tokio::test]
    async fn falls_back_to_the_default_content_type() {
        let response = relay_stream(upstream(None, vec![b"x"]));
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some(DEFAULT_STREAM_CONTENT_TYPE)
        );
    }

    #[tokio::test]
    async fn relays_chunks_in_arrival_order() {
        let response = relay_stream(upstream(
            None,
            vec![b"first\n", b"second\n", b"third\n"],
        ));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body collects");
        assert_eq!(&body[..], b"first\nsecond\nthird\n");
    }
}
