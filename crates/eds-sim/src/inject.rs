//! Hand-built broken frames for exercising the decode error paths.
//!
//! These bypass [`EthernetFrame::encode`](eds_core::EthernetFrame::encode)
//! on purpose: the encoder cannot produce an invalid frame, so the bytes are
//! assembled by hand.  Each injected frame is fully addressed (own → peer)
//! and breaks exactly one validation rule, leaving the rest of the header
//! intact so the decode failure is unambiguous.

use std::fmt;

use eds_core::{DELIMITER, ETHER_TYPE};

/// Which validation rule the injected frame violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionKind {
    /// Correct ether type, corrupted delimiter.
    MalformedFrame,
    /// Foreign ether type (IPv4), correct delimiter.
    WrongEtherType,
}

impl InjectionKind {
    /// Human-readable name used in driver-loop logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::MalformedFrame => "Malformed Packet",
            Self::WrongEtherType => "Incorrect Ether Type Packet",
        }
    }
}

impl fmt::Display for InjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Delimiter carried by [`InjectionKind::MalformedFrame`].
const BAD_DELIMITER: u16 = 0xBBBB;

/// Ether type carried by [`InjectionKind::WrongEtherType`] (IPv4).
const FOREIGN_ETHER_TYPE: u16 = 0x0800;

/// Marker payload carried by every injected frame.
const INJECTED_PAYLOAD: [u8; 2] = [0x11, 0x22];

/// Assembles the raw bytes of a deliberately broken frame addressed
/// `source → destination`.
pub fn build_injected_frame(
    destination: [u8; 4],
    source: [u8; 4],
    kind: InjectionKind,
) -> Vec<u8> {
    let (ether_type, delimiter) = match kind {
        InjectionKind::MalformedFrame => (ETHER_TYPE, BAD_DELIMITER),
        InjectionKind::WrongEtherType => (FOREIGN_ETHER_TYPE, DELIMITER),
    };

    let mut raw = Vec::with_capacity(16);
    raw.extend_from_slice(&destination);
    raw.extend_from_slice(&source);
    raw.extend_from_slice(&ether_type.to_be_bytes());
    raw.extend_from_slice(&(INJECTED_PAYLOAD.len() as u16).to_be_bytes());
    raw.extend_from_slice(&delimiter.to_be_bytes());
    raw.extend_from_slice(&INJECTED_PAYLOAD);
    raw
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use eds_core::{EthernetFrame, FrameError, HEADER_SIZE};

    const DEST: [u8; 4] = [0x0A, 0x00, 0x00, 0x02];
    const SRC: [u8; 4] = [0x0A, 0x00, 0x00, 0x01];

    #[test]
    fn test_malformed_frame_fails_on_delimiter() {
        let raw = build_injected_frame(DEST, SRC, InjectionKind::MalformedFrame);

        let err = EthernetFrame::decode(&raw).unwrap_err();
        assert!(matches!(err, FrameError::MalformedFrame(_)));
    }

    #[test]
    fn test_wrong_ether_type_frame_fails_on_ether_type() {
        let raw = build_injected_frame(DEST, SRC, InjectionKind::WrongEtherType);

        let err = EthernetFrame::decode(&raw).unwrap_err();
        assert_eq!(err, FrameError::InvalidEtherType(0x0800));
    }

    #[test]
    fn test_injected_frames_carry_addresses_and_marker_payload() {
        let raw = build_injected_frame(DEST, SRC, InjectionKind::MalformedFrame);

        assert_eq!(raw.len(), HEADER_SIZE + 2);
        assert_eq!(&raw[0..4], &DEST);
        assert_eq!(&raw[4..8], &SRC);
        assert_eq!(&raw[HEADER_SIZE..], &INJECTED_PAYLOAD);
    }
}
