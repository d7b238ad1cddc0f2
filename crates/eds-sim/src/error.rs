//! Simulation-wide error type.
//!
//! Every failure in the simulation surfaces as an explicit [`SimError`]
//! result value; nothing aborts.  Frame codec failures and codec-service
//! failures are wrapped transparently so callers can still match on the
//! underlying kind.

use thiserror::Error;

use eds_core::FrameError;

use crate::codec_service::CodecError;

/// Errors returned by the fabric, the endpoints, and the video pipeline.
#[derive(Debug, Error)]
pub enum SimError {
    /// A frame failed to decode or could not be built.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The fabric's pending buffer is at capacity; the submission was
    /// rejected and must be retried after a flush.
    #[error("ethernet buffer full: fabric already holds {capacity} pending frames")]
    EthernetBufferFull { capacity: usize },

    /// The host's receive queue is at capacity; the frame was not enqueued.
    #[error("host receive buffer full")]
    HostBufferFull,

    /// The device's receive queue is at capacity; the frame was not enqueued.
    #[error("device receive buffer full")]
    DeviceBufferFull,

    /// The endpoint has no peer address configured, so outbound frames
    /// cannot be addressed.
    #[error("no peer address configured for this endpoint")]
    InvalidReceiver,

    /// The external video codec service reported a failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Reading or writing the accumulated video stream failed.
    #[error("video stream I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
