use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, instrument, warn};

use crate::mcp::jsonrpc::JsonRpcHandler;
use crate::utils::error::{McpError, McpResult};

/// Configuration for the line transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum number of requests processed concurrently; 1 keeps arrival order
    pub max_in_flight: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { max_in_flight: 8 }
    }
}

/// Serves JSON-RPC over a pair of byte streams, one message per line
#[derive(Debug, Clone)]
pub struct StdioTransport {
    handler: Arc<JsonRpcHandler>,
    config: TransportConfig,
}

impl StdioTransport {
    /// Creates a transport dispatching frames to `handler`
    pub fn new(handler: Arc<JsonRpcHandler>, config: TransportConfig) -> Self {
        Self { handler, config }
    }

    /// Serve on the process's stdin and stdout until stdin closes
    pub async fn serve_stdio(&self) -> McpResult<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve until `reader` reaches end of stream.
    ///
    /// Requests already in flight at end of stream are allowed to finish.
    /// Their replies are written if `writer` is still open and dropped
    /// otherwise.
    #[instrument(skip_all, fields(max_in_flight = self.config.max_in_flight))]
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> McpResult<()>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let max_in_flight = self.config.max_in_flight.max(1);
        let permits = Arc::new(Semaphore::new(max_in_flight));
        let (tx, rx) = mpsc::channel::<Vec<u8>>(max_in_flight * 2);
        let writer_task = tokio::spawn(write_frames(writer, rx));

        let mut frames = BufReader::new(reader).split(b'\n');
        let mut tasks = JoinSet::new();
        info!("Transport started");

        let read_result = loop {
            tokio::select! {
                frame = frames.next_segment() => {
                    let mut frame = match frame {
                        Ok(Some(frame)) => frame,
                        Ok(None) => break Ok(()),
                        Err(e) => break Err(McpError::Io(e)),
                    };
                    if frame.last() == Some(&b'\r') {
                        frame.pop();
                    }
                    if frame.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }

                    let permit = match Arc::clone(&permits).acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => break Err(McpError::Internal("request semaphore closed".to_string())),
                    };
                    let handler = Arc::clone(&self.handler);
                    let tx = tx.clone();
                    tasks.spawn(async move {
                        if let Some(reply) = handler.process_json_message(&frame).await {
                            if tx.send(reply).await.is_err() {
                                debug!("Output closed, dropping reply");
                            }
                        }
                        drop(permit);
                    });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => log_join(joined),
            }
        };

        debug!(in_flight = tasks.len(), "Input closed, draining in-flight requests");
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        drop(tx);
        match writer_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Output stream failed: {}", e),
            Err(e) => error!("Writer task failed: {}", e),
        }

        info!("Transport stopped");
        read_result
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!("Request task failed: {}", e);
    }
}

async fn write_frames<W>(mut writer: W, mut rx: mpsc::Receiver<Vec<u8>>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut frame) = rx.recv().await {
        frame.push(b'\n');
        writer.write_all(&frame).await?;
        writer.flush().await?;
    }
    writer.shutdown().await
}
