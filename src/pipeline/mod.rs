//! Capture decode pipeline.
//!
//! Runs [`CaptureReader`] and the protocol decoder over a whole capture
//! buffer, either on the caller's thread ([`decode_capture`]) or on a
//! background thread that reports progress over a channel
//! ([`spawn_decode`]).
//!
//! ```text
//!  spawn_decode(bytes) ──► worker thread ──► Progress { percent, message } *
//!                                       └──► Complete { packets } | Failed { error }
//! ```
//!
//! A background decode ends with exactly one terminal event, unless it is
//! cancelled, in which case it ends with none.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::pcap::CaptureReader;
use crate::protocol::{Packet, LINKTYPE_ETHERNET};

/// Status message of the event sent before the header is read.
pub const INITIAL_STATUS: &str = "Parsing Global Header...";

/// Notifications sent by a background decode.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeEvent {
    /// Periodic progress: share of the buffer consumed so far.
    Progress { percent: f64, message: String },
    /// Every record was decoded (up to any truncation point).
    Complete { packets: Vec<Packet> },
    /// The capture could not be read at all.
    Failed { error: Error },
}

impl DecodeEvent {
    /// Whether this event ends the decode.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DecodeEvent::Progress { .. })
    }
}

/// Decode a complete capture on the current thread.
pub fn decode_capture(data: impl Into<Bytes>) -> Result<Vec<Packet>> {
    let reader = open(data.into())?;
    let packets: Vec<Packet> = reader
        .records()
        .enumerate()
        .map(|(index, record)| Packet::decode(index, record))
        .collect();

    tracing::info!(packets = packets.len(), "decoded capture");
    Ok(packets)
}

/// Handle to a background decode.
///
/// Dropping the handle cancels the decode.
pub struct DecodeTask {
    events: Receiver<DecodeEvent>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DecodeTask {
    /// The event stream.
    pub fn events(&self) -> &Receiver<DecodeEvent> {
        &self.events
    }

    /// Ask the worker to stop at the next record. No terminal event follows.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Whether the worker has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Block until the decode ends, skipping progress events.
    ///
    /// Returns the packets, the failure, or [`Error::Cancelled`] if the
    /// worker stopped without a terminal event.
    pub fn wait(mut self) -> Result<Vec<Packet>> {
        let outcome = loop {
            match self.events.recv() {
                Ok(DecodeEvent::Progress { .. }) => continue,
                Ok(DecodeEvent::Complete { packets }) if !self.is_cancelled() => break Ok(packets),
                Ok(DecodeEvent::Complete { .. }) => break Err(Error::Cancelled),
                Ok(DecodeEvent::Failed { error }) => break Err(error),
                Err(_) => break Err(Error::Cancelled),
            }
        };

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("decode worker panicked");
            }
        }

        outcome
    }
}

impl Drop for DecodeTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Decode a capture on a background thread.
///
/// If no thread can be spawned the decode runs on the caller's thread
/// instead; the events are still delivered through the returned task.
pub fn spawn_decode(data: impl Into<Bytes>, config: PipelineConfig) -> DecodeTask {
    let data = data.into();
    let (tx, rx) = crossbeam_channel::unbounded();
    let cancel = Arc::new(AtomicBool::new(false));

    let worker = {
        let data = data.clone();
        let config = config.clone();
        let cancel = cancel.clone();
        let tx = tx.clone();
        move || run_worker(data, &config, &cancel, &tx)
    };

    let handle = match thread::Builder::new()
        .name("capscope-decode".to_string())
        .spawn(worker)
    {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::warn!(error = %err, "could not spawn decode thread, decoding inline");
            run_worker(data, &config, &cancel, &tx);
            None
        }
    };

    DecodeTask {
        events: rx,
        cancel,
        handle,
    }
}

fn open(data: Bytes) -> Result<CaptureReader> {
    let reader = CaptureReader::new(data)?;
    let link_type = reader.header().link_type;
    if link_type != LINKTYPE_ETHERNET {
        tracing::warn!(link_type, "capture is not Ethernet; frames decoded as Ethernet anyway");
    }
    Ok(reader)
}

fn run_worker(data: Bytes, config: &PipelineConfig, cancel: &AtomicBool, tx: &Sender<DecodeEvent>) {
    tracing::debug!(bytes = data.len(), "starting capture decode");

    if config.report_initial_status {
        let status = DecodeEvent::Progress {
            percent: 0.0,
            message: INITIAL_STATUS.to_string(),
        };
        if tx.send(status).is_err() {
            return;
        }
    }

    let reader = match open(data) {
        Ok(reader) => reader,
        Err(error) => {
            tracing::debug!(%error, "capture decode failed");
            let _ = tx.send(DecodeEvent::Failed { error });
            return;
        }
    };

    let total = reader.len();
    let interval = config.progress_interval();
    let mut records = reader.records();
    let mut packets = Vec::new();
    let mut last_report = Instant::now();

    while let Some(record) = records.next() {
        if cancel.load(Ordering::Relaxed) {
            tracing::debug!(decoded = packets.len(), "capture decode cancelled");
            return;
        }

        packets.push(Packet::decode(packets.len(), record));

        if last_report.elapsed() >= interval {
            let percent = records.offset() as f64 / total as f64 * 100.0;
            let progress = DecodeEvent::Progress {
                percent,
                message: format!("Parsing... {percent:.1}%"),
            };
            if tx.send(progress).is_err() {
                tracing::debug!("progress receiver dropped, stopping decode");
                return;
            }
            last_report = Instant::now();
        }
    }

    if cancel.load(Ordering::Relaxed) {
        return;
    }

    tracing::info!(packets = packets.len(), "decoded capture");
    let _ = tx.send(DecodeEvent::Complete { packets });
}
