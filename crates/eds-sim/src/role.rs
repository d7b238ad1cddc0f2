//! Role policies: how an endpoint reacts to classified frames.
//!
//! Host and device share one [`Endpoint`](crate::endpoint::Endpoint) shape;
//! what differs is the reaction to each [`PacketKind`].  That divergence is
//! captured by the [`RolePolicy`] strategy trait rather than two endpoint
//! types, so the receive/classify/drain machinery exists exactly once.
//!
//! Reactions per role:
//!
//! | kind            | device                       | host                       |
//! |-----------------|------------------------------|----------------------------|
//! | Handshake       | send Acknowledgement         | none                       |
//! | VideoRequest    | encode capture, send chunks  | none                       |
//! | Acknowledgement | none                         | log receipt                |
//! | VideoData       | none                         | accumulate, decode at end  |
//! | Error / Unknown | none                         | none                       |
//!
//! Kinds with no reaction are logged at debug level and ignored; the
//! asymmetry is inherent to the protocol (hosts ask, devices answer).

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use eds_core::{EthernetFrame, PacketKind, MAX_PAYLOAD_SIZE};

use crate::codec_service::VideoCodec;
use crate::endpoint::Endpoint;
use crate::error::SimError;

/// Per-batch scratch state threaded through one `process` call.
///
/// The host accumulates video payloads here; the whole batch is decoded at
/// most once, after the last queued frame has been classified.
#[derive(Default)]
pub struct BatchState {
    video_stream: Vec<u8>,
    saw_video: bool,
}

/// Reaction strategy distinguishing host from device.
pub trait RolePolicy: Send + Sync {
    /// Role name used in logs.
    fn name(&self) -> &'static str;

    /// The error signalled when this endpoint's receive queue is full.
    fn queue_full_error(&self) -> SimError;

    /// Reacts to one decoded, classified frame.
    fn react(
        &self,
        endpoint: &Endpoint,
        frame: &EthernetFrame,
        kind: PacketKind,
        batch: &mut BatchState,
    ) -> Result<(), SimError>;

    /// Runs once after every queued frame has been reacted to.  Not invoked
    /// when the batch aborts on a decode failure.
    fn finish(&self, endpoint: &Endpoint, batch: BatchState) -> Result<(), SimError>;
}

// ── Host ──────────────────────────────────────────────────────────────────────

/// Host reactions: record acknowledgements, reassemble video streams.
pub struct HostPolicy {
    codec: Arc<dyn VideoCodec>,
    /// Where the reassembled transport stream is written before decoding.
    encoded_path: PathBuf,
    /// Where the decoded, viewable asset ends up.
    decoded_path: PathBuf,
}

impl HostPolicy {
    pub fn new(codec: Arc<dyn VideoCodec>, encoded_path: PathBuf, decoded_path: PathBuf) -> Self {
        Self {
            codec,
            encoded_path,
            decoded_path,
        }
    }
}

impl RolePolicy for HostPolicy {
    fn name(&self) -> &'static str {
        "host"
    }

    fn queue_full_error(&self) -> SimError {
        SimError::HostBufferFull
    }

    fn react(
        &self,
        _endpoint: &Endpoint,
        frame: &EthernetFrame,
        kind: PacketKind,
        batch: &mut BatchState,
    ) -> Result<(), SimError> {
        match kind {
            PacketKind::Acknowledgement => {
                info!("acknowledgement frame from device:\n{}", frame.describe());
            }
            PacketKind::VideoData => {
                batch.video_stream.extend_from_slice(frame.payload());
                batch.saw_video = true;
            }
            other => {
                debug!(kind = %other, "no host reaction defined; frame ignored");
            }
        }
        Ok(())
    }

    fn finish(&self, _endpoint: &Endpoint, batch: BatchState) -> Result<(), SimError> {
        if !batch.saw_video {
            return Ok(());
        }
        fs::write(&self.encoded_path, &batch.video_stream)?;
        self.codec.decode(&self.encoded_path, &self.decoded_path)?;
        info!(
            bytes = batch.video_stream.len(),
            path = %self.decoded_path.display(),
            "received video stream decoded"
        );
        Ok(())
    }
}

// ── Device ────────────────────────────────────────────────────────────────────

/// Device reactions: acknowledge handshakes, serve video captures.
pub struct DevicePolicy {
    codec: Arc<dyn VideoCodec>,
    /// The capture asset served on a video request.
    source_path: PathBuf,
    /// Where the encoded transport stream is staged before chunking.
    encoded_path: PathBuf,
}

impl DevicePolicy {
    pub fn new(codec: Arc<dyn VideoCodec>, source_path: PathBuf, encoded_path: PathBuf) -> Self {
        Self {
            codec,
            source_path,
            encoded_path,
        }
    }
}

impl RolePolicy for DevicePolicy {
    fn name(&self) -> &'static str {
        "device"
    }

    fn queue_full_error(&self) -> SimError {
        SimError::DeviceBufferFull
    }

    fn react(
        &self,
        endpoint: &Endpoint,
        _frame: &EthernetFrame,
        kind: PacketKind,
        _batch: &mut BatchState,
    ) -> Result<(), SimError> {
        match kind {
            PacketKind::Handshake => {
                info!("handshake received; sending acknowledgement");
                endpoint.send_control(PacketKind::Acknowledgement)?;
            }
            PacketKind::VideoRequest => {
                self.codec.encode(&self.source_path, &self.encoded_path)?;
                let encoded = fs::read(&self.encoded_path)?;
                info!(
                    bytes = encoded.len(),
                    chunks = encoded.len().div_ceil(MAX_PAYLOAD_SIZE),
                    "video request: encoded capture, sending chunks"
                );
                for chunk in encoded.chunks(MAX_PAYLOAD_SIZE) {
                    endpoint.send(chunk.to_vec())?;
                }
            }
            other => {
                debug!(kind = %other, "no device reaction defined; frame ignored");
            }
        }
        Ok(())
    }

    fn finish(&self, _endpoint: &Endpoint, _batch: BatchState) -> Result<(), SimError> {
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
