//! Protocol module containing the frame wire format and payload classification.

pub mod classify;
pub mod frame;

pub use classify::{classify, PacketKind};
pub use frame::{EthernetFrame, FrameError};
