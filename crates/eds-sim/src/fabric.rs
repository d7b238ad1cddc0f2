//! The forwarding fabric: a simulated shared medium between endpoints.
//!
//! The fabric buffers serialized frames submitted by senders and, on an
//! explicit [`flush`](EthernetFabric::flush), routes each one to whichever
//! endpoint is registered for the frame's destination address.  Nothing runs
//! autonomously — an external driver loop decides when delivery happens.
//!
//! Routing goes through an address → endpoint registry rather than any raw
//! memory access: a destination address is a lookup key, and owning an
//! address means having registered a [`FrameSink`] under it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use eds_core::MAX_FRAME_SIZE;

use crate::error::SimError;

/// Total byte budget of the fabric's pending buffer.
pub const FABRIC_BUFFER_BYTES: usize = 8192;

/// Number of frame slots the pending buffer holds.  Derived from the byte
/// budget and the maximum frame size; not independently configurable.
pub const MAX_PENDING_FRAMES: usize = FABRIC_BUFFER_BYTES / MAX_FRAME_SIZE;

/// Receive entry point for anything that owns an address on the fabric.
///
/// Implementations copy the raw bytes into their own receive queue and
/// return [`SimError::HostBufferFull`] / [`SimError::DeviceBufferFull`] when
/// that queue is at capacity.
pub trait FrameSink: Send + Sync {
    /// Hands one serialized frame to the receiver.
    fn receive_frame(&self, raw: &[u8]) -> Result<(), SimError>;
}

/// The in-process simulated medium.
///
/// Both collections sit behind a `Mutex` so the fabric can be shared behind
/// an `Arc` by every endpoint.  Under the single-threaded simulation the
/// locks are uncontended; they also make `submit` and `flush` safe if the
/// simulation is ever driven from concurrent senders.
#[derive(Default)]
pub struct EthernetFabric {
    /// Serialized frames awaiting delivery, in submission order.
    pending: Mutex<Vec<Vec<u8>>>,
    /// Address ownership table.  At most one owner per address; re-registering
    /// replaces the prior owner (last write wins).  Entries are never removed.
    registry: Mutex<HashMap<[u8; 4], Arc<dyn FrameSink>>>,
}

impl EthernetFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `sink` as the owner of `address`, replacing any prior owner.
    pub fn register(&self, address: [u8; 4], sink: Arc<dyn FrameSink>) {
        let mut registry = self.registry.lock().expect("fabric registry poisoned");
        if registry.insert(address, sink).is_some() {
            warn!(address = ?address, "address re-registered; previous owner replaced");
        } else {
            debug!(address = ?address, "endpoint registered");
        }
    }

    /// Appends a serialized frame to the pending buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EthernetBufferFull`] when the buffer already holds
    /// [`MAX_PENDING_FRAMES`] frames.  The buffer is left unchanged and the
    /// submission is dropped; the caller must detect the backpressure and
    /// retry after a flush.
    pub fn submit(&self, frame: Vec<u8>) -> Result<(), SimError> {
        let mut pending = self.pending.lock().expect("fabric pending poisoned");
        if pending.len() >= MAX_PENDING_FRAMES {
            return Err(SimError::EthernetBufferFull {
                capacity: MAX_PENDING_FRAMES,
            });
        }
        pending.push(frame);
        Ok(())
    }

    /// Number of frames currently awaiting delivery.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().expect("fabric pending poisoned").len()
    }

    /// Attempts delivery of every pending frame, in submission order, then
    /// clears the buffer unconditionally.
    ///
    /// The destination is read from the frame's first four bytes.  Frames
    /// whose destination has no registered owner, and frames the receiver
    /// rejects (receive queue full), are dropped with a warning.  Returns the
    /// number of frames actually delivered.
    pub fn flush(&self) -> usize {
        // Take the whole batch up front so no lock is held across the
        // receive callbacks and the buffer ends empty regardless of outcome.
        let frames = std::mem::take(&mut *self.pending.lock().expect("fabric pending poisoned"));

        let mut delivered = 0;
        for frame in frames {
            let Some(destination) = frame.get(0..4) else {
                warn!(len = frame.len(), "pending frame too short to carry an address; dropped");
                continue;
            };
            let mut address = [0u8; 4];
            address.copy_from_slice(destination);

            let sink = self
                .registry
                .lock()
                .expect("fabric registry poisoned")
                .get(&address)
                .cloned();
            match sink {
                Some(sink) => match sink.receive_frame(&frame) {
                    Ok(()) => delivered += 1,
                    Err(err) => {
                        warn!(address = ?address, %err, "receiver rejected frame; dropped");
                    }
                },
                None => {
                    warn!(address = ?address, "no endpoint registered for destination; frame dropped");
                }
            }
        }
        delivered
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<Vec<u8>>>,
        reject: bool,
    }

    impl FrameSink for RecordingSink {
        fn receive_frame(&self, raw: &[u8]) -> Result<(), SimError> {
            if self.reject {
                return Err(SimError::HostBufferFull);
            }
            self.frames.lock().unwrap().push(raw.to_vec());
            Ok(())
        }
    }

    fn addressed_frame(destination: [u8; 4], tag: u8) -> Vec<u8> {
        let mut frame = destination.to_vec();
        frame.push(tag);
        frame
    }

    const ADDR_A: [u8; 4] = [0x0A, 0x00, 0x00, 0x01];
    const ADDR_B: [u8; 4] = [0x0A, 0x00, 0x00, 0x02];

    // ── Capacity ──────────────────────────────────────────────────────────────

    #[test]
    fn test_submit_fails_once_capacity_reached() {
        let fabric = EthernetFabric::new();

        for i in 0..MAX_PENDING_FRAMES {
            fabric
                .submit(addressed_frame(ADDR_A, i as u8))
                .expect("within capacity");
        }

        let err = fabric.submit(addressed_frame(ADDR_A, 0xFF)).unwrap_err();
        assert!(matches!(err, SimError::EthernetBufferFull { capacity } if capacity == MAX_PENDING_FRAMES));
        // Earlier submissions stay intact
        assert_eq!(fabric.pending_count(), MAX_PENDING_FRAMES);
    }

    #[test]
    fn test_capacity_is_derived_from_byte_budget() {
        assert_eq!(MAX_PENDING_FRAMES, FABRIC_BUFFER_BYTES / MAX_FRAME_SIZE);
        assert_eq!(MAX_PENDING_FRAMES, 7);
    }

    // ── Delivery ──────────────────────────────────────────────────────────────

    #[test]
    fn test_flush_delivers_in_submission_order() {
        let fabric = EthernetFabric::new();
        let sink = Arc::new(RecordingSink::default());
        fabric.register(ADDR_A, Arc::clone(&sink) as Arc<dyn FrameSink>);

        fabric.submit(addressed_frame(ADDR_A, 1)).unwrap();
        fabric.submit(addressed_frame(ADDR_A, 2)).unwrap();
        fabric.submit(addressed_frame(ADDR_A, 3)).unwrap();

        assert_eq!(fabric.flush(), 3);
        let received = sink.frames.lock().unwrap();
        let tags: Vec<u8> = received.iter().map(|f| f[4]).collect();
        assert_eq!(tags, vec![1, 2, 3]);
    }

    #[test]
    fn test_flush_routes_by_destination_address() {
        let fabric = EthernetFabric::new();
        let sink_a = Arc::new(RecordingSink::default());
        let sink_b = Arc::new(RecordingSink::default());
        fabric.register(ADDR_A, Arc::clone(&sink_a) as Arc<dyn FrameSink>);
        fabric.register(ADDR_B, Arc::clone(&sink_b) as Arc<dyn FrameSink>);

        fabric.submit(addressed_frame(ADDR_B, 0xB0)).unwrap();
        fabric.submit(addressed_frame(ADDR_A, 0xA0)).unwrap();

        assert_eq!(fabric.flush(), 2);
        assert_eq!(sink_a.frames.lock().unwrap().len(), 1);
        assert_eq!(sink_b.frames.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_flush_clears_pending_even_when_undeliverable() {
        let fabric = EthernetFabric::new();
        // Nothing registered: every frame is dropped
        fabric.submit(addressed_frame(ADDR_A, 1)).unwrap();
        fabric.submit(addressed_frame(ADDR_B, 2)).unwrap();

        assert_eq!(fabric.flush(), 0);
        assert_eq!(fabric.pending_count(), 0);
    }

    #[test]
    fn test_flush_drops_frames_rejected_by_receiver() {
        let fabric = EthernetFabric::new();
        let sink = Arc::new(RecordingSink {
            reject: true,
            ..Default::default()
        });
        fabric.register(ADDR_A, sink as Arc<dyn FrameSink>);

        fabric.submit(addressed_frame(ADDR_A, 1)).unwrap();

        assert_eq!(fabric.flush(), 0);
        assert_eq!(fabric.pending_count(), 0);
    }

    #[test]
    fn test_flush_on_empty_buffer_is_a_no_op() {
        let fabric = EthernetFabric::new();
        assert_eq!(fabric.flush(), 0);
    }

    // ── Registration ──────────────────────────────────────────────────────────

    #[test]
    fn test_re_registration_last_write_wins() {
        let fabric = EthernetFabric::new();
        let first = Arc::new(RecordingSink::default());
        let second = Arc::new(RecordingSink::default());
        fabric.register(ADDR_A, Arc::clone(&first) as Arc<dyn FrameSink>);
        fabric.register(ADDR_A, Arc::clone(&second) as Arc<dyn FrameSink>);

        fabric.submit(addressed_frame(ADDR_A, 7)).unwrap();
        fabric.flush();

        assert!(first.frames.lock().unwrap().is_empty());
        assert_eq!(second.frames.lock().unwrap().len(), 1);
    }
}
