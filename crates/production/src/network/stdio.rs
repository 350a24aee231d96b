//! Line-oriented stdio bridge.
//!
//! Each line is `<topic> <payload>`, split at the first whitespace. This lets
//! the controller sit behind any broker command-line client, e.g.
//! `mosquitto_sub -v` on stdin and a small publisher loop on stdout.

use super::{BusMessage, Transport, TransportError};
use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Writes published messages as bridge lines.
///
/// `publish` only queues the message. A dedicated task owns the writer, so a
/// slow or stalled consumer never holds up the controller.
#[derive(Debug, Clone)]
pub struct LineTransport {
    outbound: mpsc::UnboundedSender<BusMessage>,
}

impl LineTransport {
    /// Start a writer task on `writer`.
    ///
    /// The task drains the queue until every `LineTransport` clone is
    /// dropped, or stops at the first write error.
    pub fn spawn<W>(writer: W) -> (Self, JoinHandle<std::io::Result<()>>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outbound, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_lines(writer, rx));
        (Self { outbound }, handle)
    }

    /// Writer task on the process's stdout.
    pub fn stdout() -> (Self, JoinHandle<std::io::Result<()>>) {
        Self::spawn(tokio::io::stdout())
    }
}

impl Transport for LineTransport {
    fn publish(&self, message: BusMessage) -> Result<(), TransportError> {
        self.outbound
            .send(message)
            .map_err(|_| TransportError::Closed)
    }
}

async fn write_lines<W>(
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<BusMessage>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = outbound.recv().await {
        let mut line = BytesMut::with_capacity(message.topic.len() + message.payload.len() + 2);
        line.put_slice(message.topic.as_bytes());
        line.put_u8(b' ');
        line.put_slice(&message.payload);
        line.put_u8(b'\n');

        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    debug!("Outbound queue closed, stopping line writer");
    Ok(())
}

/// Parse one bridge line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Option<BusMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (topic, payload) = match line.split_once(char::is_whitespace) {
        Some((topic, payload)) => (topic, payload.trim_start()),
        None => (line, ""),
    };
    Some(BusMessage::new(topic, payload.to_owned()))
}

/// Forward bridge lines from `reader` into the runner's inbound queue.
///
/// Returns when the reader hits EOF or the runner stops receiving.
pub async fn forward_lines<R>(reader: R, inbound: mpsc::Sender<BusMessage>) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let Some(message) = parse_line(&line) else {
            continue;
        };
        trace!(topic = %message.topic, "Inbound line");
        if inbound.send(message).await.is_err() {
            debug!("Inbound queue closed, stopping line reader");
            break;
        }
    }
    Ok(())
}
