//! Endpoint: one addressable node on the fabric.
//!
//! Host and device are the same `Endpoint` type with different
//! [`RolePolicy`] strategies.  An endpoint owns a bounded receive queue and
//! moves through three states, every transition triggered externally:
//!
//! ```text
//! Idle ──receive()──► Queued ──process()──► Processing ──► Idle
//! ```
//!
//! `process` drains the queue in arrival order: each raw frame is decoded,
//! classified, and handed to the role policy.  One malformed frame aborts
//! the remainder of the batch — the decode error is returned and the
//! already-drained queue stays cleared.  This is deliberate, testable policy,
//! not an oversight.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use eds_core::{classify, EthernetFrame, PacketKind, MAX_FRAME_SIZE};

use crate::error::SimError;
use crate::fabric::{EthernetFabric, FrameSink};
use crate::inject::{build_injected_frame, InjectionKind};
use crate::role::{BatchState, RolePolicy};

/// Total byte budget of an endpoint's receive queue.
pub const RX_BUFFER_BYTES: usize = 8192;

/// Number of frame slots the receive queue holds; derived, not configurable.
pub const MAX_QUEUED_FRAMES: usize = RX_BUFFER_BYTES / MAX_FRAME_SIZE;

/// One fabric-attached node: an address, a receive queue, and a role.
pub struct Endpoint {
    fabric: Arc<EthernetFabric>,
    own_address: [u8; 4],
    /// Fixed after the first successful set; later calls are ignored.
    peer_address: Mutex<Option<[u8; 4]>>,
    /// Raw received frame bytes in arrival order.
    rx_queue: Mutex<Vec<Vec<u8>>>,
    policy: Box<dyn RolePolicy>,
}

impl Endpoint {
    /// Creates the endpoint and registers it with the fabric under
    /// `own_address`.
    pub fn new(
        fabric: Arc<EthernetFabric>,
        own_address: [u8; 4],
        policy: Box<dyn RolePolicy>,
    ) -> Arc<Self> {
        let endpoint = Arc::new(Self {
            fabric,
            own_address,
            peer_address: Mutex::new(None),
            rx_queue: Mutex::new(Vec::new()),
            policy,
        });
        endpoint
            .fabric
            .register(own_address, Arc::clone(&endpoint) as Arc<dyn FrameSink>);
        endpoint
    }

    pub fn own_address(&self) -> [u8; 4] {
        self.own_address
    }

    pub fn peer_address(&self) -> Option<[u8; 4]> {
        *self.peer_address.lock().expect("peer address poisoned")
    }

    /// Sets the peer address.  The address is fixed for the endpoint's
    /// lifetime once set; repeated calls are ignored with a warning.
    pub fn set_peer_address(&self, address: [u8; 4]) {
        let mut peer = self.peer_address.lock().expect("peer address poisoned");
        match *peer {
            Some(existing) => {
                warn!(
                    role = self.policy.name(),
                    current = ?existing,
                    ignored = ?address,
                    "peer address already set; new value ignored"
                );
            }
            None => *peer = Some(address),
        }
    }

    /// Shared fabric handle.
    pub fn fabric(&self) -> &EthernetFabric {
        &self.fabric
    }

    /// Appends a copy of `raw` to the receive queue.
    ///
    /// # Errors
    ///
    /// Returns the role-specific buffer-full error
    /// ([`SimError::HostBufferFull`] / [`SimError::DeviceBufferFull`]) when
    /// the queue already holds [`MAX_QUEUED_FRAMES`] entries; the frame is
    /// not enqueued.  Capacity exhaustion is an explicit signal, never
    /// silent loss.
    pub fn receive(&self, raw: &[u8]) -> Result<(), SimError> {
        let mut queue = self.rx_queue.lock().expect("rx queue poisoned");
        if queue.len() >= MAX_QUEUED_FRAMES {
            return Err(self.policy.queue_full_error());
        }
        queue.push(raw.to_vec());
        Ok(())
    }

    /// Drains the receive queue, decoding, classifying, and reacting to each
    /// frame in arrival order.
    ///
    /// The queue is taken up front, so it ends empty whether the batch
    /// completes or aborts.
    ///
    /// # Errors
    ///
    /// Returns the decode error of the first malformed frame; remaining
    /// frames in that batch are discarded and the role's batch-end step does
    /// not run.  Reaction errors (codec failures, fabric backpressure)
    /// propagate the same way.
    pub fn process(&self) -> Result<(), SimError> {
        let queued = std::mem::take(&mut *self.rx_queue.lock().expect("rx queue poisoned"));
        debug!(role = self.policy.name(), frames = queued.len(), "processing receive queue");

        let mut batch = BatchState::default();
        for raw in &queued {
            let frame = match EthernetFrame::decode(raw) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(role = self.policy.name(), %err, "decode failed; aborting batch");
                    return Err(err.into());
                }
            };
            let kind = classify(&frame);
            debug!(role = self.policy.name(), kind = %kind, "frame classified");
            self.policy.react(self, &frame, kind, &mut batch)?;
        }
        self.policy.finish(self, batch)
    }

    /// Wraps `payload` in a frame addressed `own → peer`, encodes it, and
    /// submits it to the fabric.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidReceiver`] when no peer address is configured;
    /// [`SimError::EthernetBufferFull`] when the fabric rejects the
    /// submission.
    pub fn send(&self, payload: Vec<u8>) -> Result<(), SimError> {
        let peer = self.peer_address().ok_or(SimError::InvalidReceiver)?;
        let frame = EthernetFrame::new(peer, self.own_address, payload)?;
        self.fabric.submit(frame.encode())
    }

    /// Sends the 3-byte control payload for a tagged packet kind.
    pub(crate) fn send_control(&self, kind: PacketKind) -> Result<(), SimError> {
        let payload = kind
            .control_payload()
            .expect("control kinds always carry a tag payload");
        self.send(payload.to_vec())
    }

    // ── Host-side triggers for the external driver loop ───────────────────────

    /// Emits a handshake request to the peer.
    pub fn initiate_handshake(&self) -> Result<(), SimError> {
        info!(role = self.policy.name(), "initiating handshake");
        self.send_control(PacketKind::Handshake)
    }

    /// Emits a video-capture request to the peer.
    pub fn request_video(&self) -> Result<(), SimError> {
        info!(role = self.policy.name(), "requesting video capture");
        self.send_control(PacketKind::VideoRequest)
    }

    /// Submits a deliberately broken frame straight to the fabric, bypassing
    /// the codec, to drive the decode-failure paths end-to-end.
    pub fn inject_error(&self, kind: InjectionKind) -> Result<(), SimError> {
        let peer = self.peer_address().ok_or(SimError::InvalidReceiver)?;
        info!(role = self.policy.name(), kind = %kind, "injecting frame error");
        self.fabric
            .submit(build_injected_frame(peer, self.own_address, kind))
    }
}

impl FrameSink for Endpoint {
    fn receive_frame(&self, raw: &[u8]) -> Result<(), SimError> {
        self.receive(raw)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
