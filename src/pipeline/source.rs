use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    process::{Child, ChildStdout, Command, Stdio},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use anyhow::{Context, Result};
use crossbeam_channel::{Sender, TrySendError};

use super::worker::FrameDelivery;
use crate::types::LandmarkFrame;

/// Anything that yields detector output one frame at a time.
pub trait LandmarkSource: Send + 'static {
    fn label(&self) -> &str;

    /// `Ok(None)` marks the end of the stream.
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>>;
}

/// One JSON-encoded [`LandmarkFrame`] per line. Malformed lines are skipped.
pub struct JsonLinesSource<R> {
    reader: R,
    label: String,
    line: String,
    line_no: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            reader,
            label: label.into(),
            line: String::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead + Send + 'static> LandmarkSource for JsonLinesSource<R> {
    fn label(&self) -> &str {
        &self.label
    }

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .with_context(|| format!("failed to read from {}", self.label))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<LandmarkFrame>(trimmed) {
                Ok(frame) => return Ok(Some(frame)),
                Err(err) => {
                    log::warn!(
                        "{}:{}: skipping malformed frame: {err}",
                        self.label,
                        self.line_no
                    );
                }
            }
        }
    }
}

/// Opens a file, or stdin for `-`.
pub fn open_input(path: &str) -> Result<JsonLinesSource<Box<dyn BufRead + Send>>> {
    if path == "-" {
        let reader: Box<dyn BufRead + Send> = Box::new(BufReader::new(io::stdin()));
        return Ok(JsonLinesSource::new(reader, "stdin"));
    }

    let file = File::open(path).with_context(|| format!("failed to open landmark input {path}"))?;
    let reader: Box<dyn BufRead + Send> = Box::new(BufReader::new(file));
    Ok(JsonLinesSource::new(reader, path))
}

/// Runs an external detector and reads its JSON-lines stdout.
pub struct SubprocessSource {
    child: Child,
    lines: JsonLinesSource<BufReader<ChildStdout>>,
}

impl SubprocessSource {
    pub fn spawn(program: &str, args: &[String]) -> Result<Self> {
        log::info!("starting landmark detector: {program} {}", args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to start landmark detector {program}"))?;

        let stdout = child
            .stdout
            .take()
            .context("landmark detector has no stdout")?;

        Ok(Self {
            child,
            lines: JsonLinesSource::new(BufReader::new(stdout), program),
        })
    }
}

impl LandmarkSource for SubprocessSource {
    fn label(&self) -> &str {
        self.lines.label()
    }

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        self.lines.next_frame()
    }
}

impl Drop for SubprocessSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Handle to the reader thread feeding the pipeline.
#[derive(Debug)]
pub struct SourceStream {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SourceStream {
    /// Asks the reader to stop after the frame in flight.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Waits for the source to run dry or stop.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SourceStream {
    fn drop(&mut self) {
        // a reader blocked on stdin cannot be joined here
        self.stop.store(true, Ordering::SeqCst);
    }
}

pub fn start_source<S: LandmarkSource>(
    mut source: S,
    frame_tx: Sender<LandmarkFrame>,
    delivery: FrameDelivery,
) -> SourceStream {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        log::info!("reading landmarks from {}", source.label());
        let mut dropped = 0u64;

        while !stop_flag.load(Ordering::Relaxed) {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::info!("{} reached end of stream", source.label());
                    break;
                }
                Err(err) => {
                    log::error!("landmark source failed: {err:?}");
                    break;
                }
            };

            match delivery {
                FrameDelivery::InOrder => {
                    if frame_tx.send(frame).is_err() {
                        break;
                    }
                }
                // Drop if the pipeline is busy, the worker only wants the newest frame.
                FrameDelivery::LatestOnly => match frame_tx.try_send(frame) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => dropped += 1,
                    Err(TrySendError::Disconnected(_)) => break,
                },
            }
        }

        if dropped > 0 {
            log::debug!("{} dropped {dropped} frames while the pipeline was busy", source.label());
        }
    });

    SourceStream {
        stop,
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_malformed_lines() {
        let input = concat!(
            "{\"timestamp_ms\":1,\"width\":640,\"height\":480,\"hands\":[]}\n",
            "\n",
            "not json\n",
            "{\"timestamp_ms\":2,\"width\":640,\"height\":480}\n",
        );
        let mut source = JsonLinesSource::new(io::Cursor::new(input), "test");

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.timestamp_ms, 1);
        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.timestamp_ms, 2);
        assert!(second.hands.is_empty());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn missing_input_file_is_an_error() {
        assert!(open_input("/nonexistent/frames.jsonl").is_err());
    }

    #[test]
    fn in_order_delivery_forwards_every_frame() {
        let input: String = (1..=20)
            .map(|t| format!("{{\"timestamp_ms\":{t},\"width\":640,\"height\":480}}\n"))
            .collect();
        let source = JsonLinesSource::new(io::Cursor::new(input), "test");
        let (tx, rx) = crossbeam_channel::bounded(1);
        let stream = start_source(source, tx, FrameDelivery::InOrder);

        let timestamps: Vec<u64> = rx.iter().map(|frame| frame.timestamp_ms).collect();
        stream.join();
        assert_eq!(timestamps, (1..=20).collect::<Vec<_>>());
    }
}
