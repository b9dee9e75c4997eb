use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use chat_api::{ChatApiConfig, ChatApiError, ChatClient, ChatMessage, ChatRequest};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};

fn allow_local_integration() -> bool {
    std::env::var("CHAT_API_ALLOW_LOCAL_INTEGRATION")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

#[derive(Clone)]
struct ResponseChunk {
    delay_ms: u64,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct ScriptedResponse {
    status: u16,
    content_type: &'static str,
    chunks: Vec<ResponseChunk>,
}

struct ScriptedServer {
    base_url: String,
    request_count: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    async fn new(scripts: Vec<ScriptedResponse>) -> Self {
        let scripts = Arc::new(scripts);
        let request_count = Arc::new(AtomicUsize::new(0));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local TCP listener should bind");
        let addr = listener
            .local_addr()
            .expect("resolved local listener address");
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn({
            let scripts = Arc::clone(&scripts);
            let request_count = Arc::clone(&request_count);

            async move {
                loop {
                    let (socket, _) = match listener.accept().await {
                        Ok(pair) => pair,
                        Err(_) => break,
                    };
                    let scripts = Arc::clone(&scripts);
                    let request_count = Arc::clone(&request_count);
                    tokio::spawn(async move {
                        serve_one(socket, scripts, request_count).await;
                    });
                }
            }
        });

        Self {
            base_url,
            request_count,
            handle,
        }
    }

    fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Acquire)
    }

    fn shutdown(&self) {
        self.handle.abort();
    }
}

fn response_sse(status: u16, frames: &[&str]) -> ScriptedResponse {
    ScriptedResponse {
        status,
        content_type: "text/event-stream",
        chunks: vec![ResponseChunk {
            delay_ms: 0,
            bytes: sse_frames(frames),
        }],
    }
}

fn response_json(status: u16, body: &str) -> ScriptedResponse {
    ScriptedResponse {
        status,
        content_type: "application/json",
        chunks: vec![ResponseChunk {
            delay_ms: 0,
            bytes: body.as_bytes().to_vec(),
        }],
    }
}

fn sse_frames(frames: &[&str]) -> Vec<u8> {
    let mut body = String::new();

    for frame in frames {
        body.push_str("data: ");
        body.push_str(frame);
        body.push_str("\n\n");
    }

    body.into_bytes()
}

fn user_request(text: &str) -> ChatRequest {
    ChatRequest::new("deepseek-chat", vec![ChatMessage::user(text)])
}

fn local_client(base_url: &str) -> ChatClient {
    let config = ChatApiConfig::new("sk-test").with_base_url(base_url);
    ChatClient::new(config).expect("client")
}

#[tokio::test]
async fn stream_integration_successful_completion() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![response_sse(
        200,
        &[
            r##"{"choices":[{"delta":{"content":"hello "}}]}"##,
            r##"{"choices":[{"delta":{"content":"world"}}]}"##,
            "[DONE]",
        ],
    )])
    .await;

    let client = local_client(&server.base_url);
    let mut deltas = Vec::new();
    let result = client
        .stream(&user_request("hi"), None, |delta| {
            deltas.push(delta.to_string());
        })
        .await
        .expect("stream should succeed");

    assert_eq!(result, "hello world");
    assert_eq!(deltas, vec!["hello ", "world"]);

    server.shutdown();
}

#[tokio::test]
async fn stream_integration_finish_reason_terminates_without_done() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![response_sse(
        200,
        &[
            r##"{"choices":[{"delta":{"content":"done"}}]}"##,
            r##"{"choices":[{"delta":{},"finish_reason":"stop"}]}"##,
        ],
    )])
    .await;

    let client = local_client(&server.base_url);
    let result = client
        .stream(&user_request("hi"), None, |_| {})
        .await
        .expect("finish_reason should close the stream cleanly");

    assert_eq!(result, "done");

    server.shutdown();
}

#[tokio::test]
async fn stream_integration_closed_without_terminal_reports_partial() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![response_sse(
        200,
        &[r##"{"choices":[{"delta":{"content":"partial"}}]}"##],
    )])
    .await;

    let client = local_client(&server.base_url);
    let mut deltas = Vec::new();
    let error = client
        .stream(&user_request("hi"), None, |delta| {
            deltas.push(delta.to_string());
        })
        .await
        .expect_err("stream without [DONE] or finish_reason should fail");

    assert!(matches!(
        error,
        ChatApiError::StreamEndedEarly { ref partial } if partial == "partial"
    ));
    assert_eq!(deltas, vec!["partial"]);

    server.shutdown();
}

#[tokio::test]
async fn stream_integration_http_error_is_not_retried() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![response_json(
        400,
        r##"{"error":{"message":"invalid request"}}"##,
    )])
    .await;

    let client = local_client(&server.base_url);
    let error = client
        .stream(&user_request("hi"), None, |_| {})
        .await
        .expect_err("stream should fail");

    assert!(matches!(
        error,
        ChatApiError::Status(code, ref message)
            if code.as_u16() == 400 && message == "invalid request"
    ));
    assert_eq!(server.request_count(), 1);

    server.shutdown();
}

#[tokio::test]
async fn stream_integration_cancellation_during_stream() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![ScriptedResponse {
        status: 200,
        content_type: "text/event-stream",
        chunks: vec![
            ResponseChunk {
                delay_ms: 0,
                bytes: sse_frames(&[r##"{"choices":[{"delta":{"content":"stream"}}]}"##]),
            },
            ResponseChunk {
                delay_ms: 200,
                bytes: sse_frames(&["[DONE]"]),
            },
        ],
    }])
    .await;

    let client = Arc::new(local_client(&server.base_url));
    let cancellation = Arc::new(AtomicBool::new(false));
    let stream_task = tokio::spawn({
        let client = Arc::clone(&client);
        let cancellation = Arc::clone(&cancellation);
        async move {
            client
                .stream(&user_request("hi"), Some(&cancellation), |_| {})
                .await
        }
    });

    sleep(Duration::from_millis(120)).await;
    cancellation.store(true, Ordering::Release);

    let result = timeout(Duration::from_secs(5), stream_task)
        .await
        .expect("stream task should resolve")
        .expect("join handle should resolve")
        .expect_err("cancellation should abort stream");

    assert!(matches!(result, ChatApiError::Cancelled));
    server.shutdown();
}

#[tokio::test]
async fn complete_integration_returns_first_choice_content() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![response_json(
        200,
        r##"{"choices":[{"message":{"role":"assistant","content":"buffered answer"},"finish_reason":"stop"}]}"##,
    )])
    .await;

    let client = local_client(&server.base_url);
    let content = client
        .complete(&user_request("hi"), None)
        .await
        .expect("completion should succeed");

    assert_eq!(content, "buffered answer");

    server.shutdown();
}

#[tokio::test]
async fn complete_integration_decode_failure_surfaces() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![response_json(200, "{not json")]).await;

    let client = local_client(&server.base_url);
    let error = client
        .complete(&user_request("hi"), None)
        .await
        .expect_err("malformed body should fail decoding");

    assert!(matches!(error, ChatApiError::Decode(_)));

    server.shutdown();
}

#[tokio::test]
async fn complete_integration_empty_choices_is_explicit() {
    if !allow_local_integration() {
        return;
    }

    let server = ScriptedServer::new(vec![response_json(200, r##"{"choices":[]}"##)]).await;

    let client = local_client(&server.base_url);
    let error = client
        .complete(&user_request("hi"), None)
        .await
        .expect_err("empty choices should not pass silently");

    assert!(matches!(error, ChatApiError::EmptyCompletion));

    server.shutdown();
}

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        429 => "Too Many Requests",
        503 => "Service Unavailable",
        _ => "Error",
    }
}

async fn serve_one(
    mut socket: TcpStream,
    scripts: Arc<Vec<ScriptedResponse>>,
    request_count: Arc<AtomicUsize>,
) {
    if read_request_headers(&mut socket).await.is_err() {
        return;
    }

    let index = request_count.fetch_add(1, Ordering::AcqRel);
    let response = scripts
        .get(index)
        .cloned()
        .unwrap_or_else(|| response_json(500, r##"{"error":"unexpected request"}"##));

    let headers = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
        status = response.status,
        reason = status_reason(response.status),
        content_type = response.content_type,
    );

    if socket.write_all(headers.as_bytes()).await.is_err() {
        return;
    }

    for chunk in response.chunks {
        if chunk.delay_ms > 0 {
            sleep(Duration::from_millis(chunk.delay_ms)).await;
        }
        let prefix = format!("{:X}\r\n", chunk.bytes.len());
        if socket.write_all(prefix.as_bytes()).await.is_err() {
            return;
        }
        if socket.write_all(&chunk.bytes).await.is_err() {
            return;
        }
        if socket.write_all(b"\r\n").await.is_err() {
            return;
        }
    }

    let _ = socket.write_all(b"0\r\n\r\n").await;
    let _ = socket.shutdown().await;
}

async fn read_request_headers(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buffer = [0_u8; 2048];

    loop {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buffer[..n]);
        if request.windows(4).any(|window| window == b"\r\n\r\n") {
            return Ok(());
        }
    }
}
