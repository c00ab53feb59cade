use anyhow::Result;
use futures_util::{Stream, StreamExt};
use reqwest::{header, Client, Url};
use serde_json::json;

use crate::error::StreamError;
use crate::models::{Action, FlowLog};
use crate::services::config::AppConfig;
use crate::services::sse::SseDecoder;

/// Server-side selection of flow logs. The page streams unfiltered; `action`
/// is kept for a server-filtered denied view, which is not wired up yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowLogsQuery {
    pub action: Option<Action>,
}

impl FlowLogsQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("watch", "true".to_string())];
        if let Some(action) = self.action {
            params.push(("filters", json!({ "actions": [action.to_string()] }).to_string()));
        }
        params
    }
}

pub fn flows_url(config: &AppConfig, query: &FlowLogsQuery) -> Result<Url> {
    let base = format!("{}/flows", config.api_url.trim_end_matches('/'));
    Ok(Url::parse_with_params(&base, query.params())?)
}

/// Open the flow log event stream and hand every decoded record to `on_flow`.
/// `on_connected` runs once the backend answers with a success status.
///
/// Returns the number of records delivered once the server closes the stream.
pub async fn stream_flow_logs(
    client: &Client,
    config: &AppConfig,
    query: &FlowLogsQuery,
    on_connected: impl FnOnce(),
    on_flow: impl FnMut(FlowLog),
) -> Result<usize, StreamError> {
    let url = flows_url(config, query).map_err(|e| StreamError::Url(e.to_string()))?;
    tracing::info!("connecting to flow log stream {url}");

    let response = client
        .get(url)
        .header(header::ACCEPT, "text/event-stream")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StreamError::Status {
            status: status.as_u16(),
            body,
        });
    }

    on_connected();
    decode_flow_stream(response.bytes_stream(), on_flow).await
}

/// Decode an SSE byte stream into flow logs. Undecodable events are skipped.
pub async fn decode_flow_stream<S, B>(
    mut stream: S,
    mut on_flow: impl FnMut(FlowLog),
) -> Result<usize, StreamError>
where
    S: Stream<Item = reqwest::Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    let mut decoder = SseDecoder::new();
    let mut delivered = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for data in decoder.push(chunk.as_ref()) {
            match FlowLog::from_json(&data) {
                Ok(flow) => {
                    on_flow(flow);
                    delivered += 1;
                }
                Err(e) => tracing::warn!("skipping undecodable flow log: {e}"),
            }
        }
    }

    tracing::debug!("flow log stream closed after {delivered} records");
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and return the backend's base url.
    async fn one_shot_backend(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    fn config(url: &str) -> AppConfig {
        AppConfig {
            api_url: url.to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn all_flows_url_only_watches() {
        let url = flows_url(&config("http://localhost:8081/whisker-backend/"), &FlowLogsQuery::default()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/whisker-backend/flows?watch=true");
    }

    #[test]
    fn denied_url_carries_action_filter() {
        let url = flows_url(&config("http://whisker"), &FlowLogsQuery { action: Some(Action::Deny) }).unwrap();
        let filters = url
            .query_pairs()
            .find(|(k, _)| k == "filters")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(filters, r#"{"actions":["Deny"]}"#);
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(flows_url(&config("not a url"), &FlowLogsQuery::default()).is_err());
    }

    #[tokio::test]
    async fn quiet_backend_still_reports_connected() {
        let url = one_shot_backend(
            "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncontent-length: 12\r\nconnection: close\r\n\r\n: keepalive\n",
        )
        .await;
        let mut connected = false;
        let delivered = stream_flow_logs(
            &Client::new(),
            &config(&url),
            &FlowLogsQuery::default(),
            || connected = true,
            |_| panic!("no flows were sent"),
        )
        .await
        .unwrap();

        assert!(connected);
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn failed_status_is_not_a_connection() {
        let url = one_shot_backend(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 4\r\nconnection: close\r\n\r\ndown",
        )
        .await;
        let mut connected = false;
        let err = stream_flow_logs(
            &Client::new(),
            &config(&url),
            &FlowLogsQuery::default(),
            || connected = true,
            |_| {},
        )
        .await
        .unwrap_err();

        assert!(!connected);
        assert!(matches!(err, StreamError::Status { status: 503, ref body } if body == "down"));
    }

    #[tokio::test]
    async fn decodes_flows_and_skips_garbage() {
        let chunks: Vec<reqwest::Result<Vec<u8>>> = vec![
            Ok(b"data: {\"action\":\"Allow\",\"dest_port\":80}\n\n".to_vec()),
            Ok(b"data: not-json\n\n: ping\n\ndata: {\"action\":".to_vec()),
            Ok(b"\"Deny\",\"dest_name\":\"db\"}\n\n".to_vec()),
        ];
        let mut seen = Vec::new();
        let delivered = decode_flow_stream(stream::iter(chunks), |f| seen.push(f))
            .await
            .unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(seen[0].action, Action::Allow);
        assert_eq!(seen[0].dest_port, 80);
        assert_eq!(seen[1].action, Action::Deny);
        assert_eq!(seen[1].dest_name, "db");
        assert_ne!(seen[0].id, seen[1].id);
    }
}
