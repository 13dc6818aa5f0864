use gestpipe_core::landmarks::HandFrame;
use std::path::Path;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// One detector result per line. Blank lines yield `None`.
pub fn parse_line(line: &str, mirror: bool) -> Result<Option<HandFrame>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let frame: HandFrame = serde_json::from_str(line)?;
    Ok(Some(if mirror { frame.mirrored() } else { frame }))
}

pub async fn open_input(
    path: Option<&Path>,
) -> std::io::Result<Box<dyn AsyncRead + Unpin + Send>> {
    match path {
        Some(p) => {
            info!("Reading frames from {:?}", p);
            Ok(Box::new(tokio::fs::File::open(p).await?))
        }
        None => {
            info!("Reading frames from stdin");
            Ok(Box::new(tokio::io::stdin()))
        }
    }
}

/// Streams frames from an NDJSON reader into a bounded channel. Malformed
/// lines are logged and skipped. Frames without a timestamp are stamped with
/// the milliseconds elapsed since the reader started. Resolves to the number
/// of frames delivered.
pub fn spawn_reader<R>(
    reader: R,
    mirror: bool,
    capacity: usize,
) -> (mpsc::Receiver<HandFrame>, JoinHandle<std::io::Result<usize>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let handle = tokio::spawn(async move {
        let started = Instant::now();
        let mut lines = BufReader::new(reader).lines();
        let mut line_no = 0usize;
        let mut delivered = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let mut frame = match parse_line(&line, mirror) {
                Ok(Some(f)) => f,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping line {}: {}", line_no, e);
                    continue;
                }
            };
            if frame.timestamp_ms == 0 {
                frame.timestamp_ms = started.elapsed().as_millis() as u64;
            }
            if tx.send(frame).await.is_err() {
                // Receiver finished early (e.g. practice reached its final result).
                break;
            }
            delivered += 1;
        }
        Ok(delivered)
    });
    (rx, handle)
}
