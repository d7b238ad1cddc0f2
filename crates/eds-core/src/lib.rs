//! # eds-core
//!
//! Shared protocol library for the Ethernet driver simulation containing the
//! frame wire format, the binary codec, and payload classification.
//!
//! This crate is used by both endpoints of the simulation (host and embedded
//! device) as well as the forwarding fabric.  It has zero dependencies on
//! file systems, clocks, or sockets — everything here is pure byte-level
//! logic.
//!
//! # Wire format overview
//!
//! Every message on the simulated medium is one fixed-format frame:
//!
//! ```text
//! [dest:4][src:4][ether_type:2][payload_len:2][delimiter:2][payload:0..=1024]
//! ```
//!
//! All multi-byte integers are big-endian.  The 14-byte header is followed by
//! at most 1024 payload bytes, giving a maximum frame size of 1040 bytes
//! (the header space is rounded up to a 16-byte slot).
//!
//! Semantics are *not* carried explicitly on the wire: a decoded frame is
//! classified into a [`PacketKind`] from its payload shape alone (see
//! [`protocol::classify`]).

pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `eds_core::EthernetFrame` instead of `eds_core::protocol::frame::EthernetFrame`.
pub use protocol::classify::{classify, PacketKind};
pub use protocol::frame::{
    EthernetFrame, FrameError, DELIMITER, ETHER_TYPE, HEADER_SIZE, MAX_FRAME_SIZE,
    MAX_PAYLOAD_SIZE,
};
