//! Payload classification for decoded frames.
//!
//! The protocol carries no explicit type field: the semantic purpose of a
//! frame is derived entirely from its payload shape.  Control frames are
//! exactly 3 bytes long and repeat a per-kind marker byte; anything longer
//! is bulk video data.
//!
//! [`classify`] is a pure function and total over every payload length
//! 0..=1024 and every byte value — each input maps to exactly one
//! [`PacketKind`], never an error.

use std::fmt;

use crate::protocol::frame::EthernetFrame;

/// Length of a tagged control payload in bytes.
pub const CONTROL_PAYLOAD_LEN: usize = 3;

// Per-kind marker bytes, repeated to fill the 3-byte control payload.
const HANDSHAKE_MARKER: u8 = 0x10;
const ACKNOWLEDGEMENT_MARKER: u8 = 0x20;
const VIDEO_REQUEST_MARKER: u8 = 0x30;
const ERROR_MARKER: u8 = 0xFF;

/// Semantic classification of a frame, derived from payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    /// Host-initiated handshake request.
    Handshake,
    /// Device acknowledgement of a handshake.
    Acknowledgement,
    /// Host request for the device's video capture.
    VideoRequest,
    /// Error notification.
    Error,
    /// One chunk of an encoded video stream.
    VideoData,
    /// Payload matches no known shape.
    Unknown,
}

impl PacketKind {
    /// Returns the marker byte for tagged control kinds.
    pub fn marker(self) -> Option<u8> {
        match self {
            PacketKind::Handshake => Some(HANDSHAKE_MARKER),
            PacketKind::Acknowledgement => Some(ACKNOWLEDGEMENT_MARKER),
            PacketKind::VideoRequest => Some(VIDEO_REQUEST_MARKER),
            PacketKind::Error => Some(ERROR_MARKER),
            PacketKind::VideoData | PacketKind::Unknown => None,
        }
    }

    /// Returns the 3-byte wire payload for tagged control kinds.
    ///
    /// `VideoData` and `Unknown` have no fixed payload and return `None`.
    pub fn control_payload(self) -> Option<[u8; CONTROL_PAYLOAD_LEN]> {
        self.marker().map(|m| [m; CONTROL_PAYLOAD_LEN])
    }

    /// Display label for logs and diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            PacketKind::Handshake => "Handshake Packet",
            PacketKind::Acknowledgement => "Acknowledgement Packet",
            PacketKind::VideoRequest => "Video Request Packet",
            PacketKind::Error => "Error Packet",
            PacketKind::VideoData => "Video Data Packet",
            PacketKind::Unknown => "Unknown Packet",
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a decoded frame by payload shape.
///
/// Ordered rule, first match wins:
/// 1. payload longer than 3 bytes → [`PacketKind::VideoData`]
/// 2. payload of exactly 3 bytes → match the first byte against the control
///    markers, otherwise [`PacketKind::Unknown`]
/// 3. any other length → [`PacketKind::Unknown`]
pub fn classify(frame: &EthernetFrame) -> PacketKind {
    let payload = frame.payload();
    if payload.len() > CONTROL_PAYLOAD_LEN {
        return PacketKind::VideoData;
    }
    if payload.len() == CONTROL_PAYLOAD_LEN {
        return match payload[0] {
            HANDSHAKE_MARKER => PacketKind::Handshake,
            ACKNOWLEDGEMENT_MARKER => PacketKind::Acknowledgement,
            VIDEO_REQUEST_MARKER => PacketKind::VideoRequest,
            ERROR_MARKER => PacketKind::Error,
            _ => PacketKind::Unknown,
        };
    }
    PacketKind::Unknown
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::MAX_PAYLOAD_SIZE;

    fn frame_with_payload(payload: Vec<u8>) -> EthernetFrame {
        EthernetFrame::new([1, 2, 3, 4], [5, 6, 7, 8], payload).expect("payload within bounds")
    }

    #[test]
    fn test_control_payloads_classify_to_their_kind() {
        for kind in [
            PacketKind::Handshake,
            PacketKind::Acknowledgement,
            PacketKind::VideoRequest,
            PacketKind::Error,
        ] {
            let payload = kind.control_payload().unwrap();
            let frame = frame_with_payload(payload.to_vec());
            assert_eq!(classify(&frame), kind);
        }
    }

    #[test]
    fn test_three_byte_payload_with_unknown_marker_is_unknown() {
        let frame = frame_with_payload(vec![0x42, 0x42, 0x42]);
        assert_eq!(classify(&frame), PacketKind::Unknown);
    }

    #[test]
    fn test_marker_only_first_byte_is_inspected() {
        // Trailing bytes of a 3-byte payload do not affect classification
        let frame = frame_with_payload(vec![0x10, 0x00, 0xFF]);
        assert_eq!(classify(&frame), PacketKind::Handshake);
    }

    #[test]
    fn test_payloads_longer_than_three_bytes_are_video_data() {
        for len in [4, 5, 100, MAX_PAYLOAD_SIZE] {
            let frame = frame_with_payload(vec![0x10; len]);
            assert_eq!(classify(&frame), PacketKind::VideoData, "length {len}");
        }
    }

    #[test]
    fn test_short_payloads_are_unknown() {
        for len in 0..CONTROL_PAYLOAD_LEN {
            let frame = frame_with_payload(vec![0x10; len]);
            assert_eq!(classify(&frame), PacketKind::Unknown, "length {len}");
        }
    }

    #[test]
    fn test_classification_is_total_over_all_lengths() {
        // Every payload length maps to exactly one kind, never a panic
        for len in 0..=MAX_PAYLOAD_SIZE {
            let frame = frame_with_payload(vec![0x00; len]);
            let kind = classify(&frame);
            if len > CONTROL_PAYLOAD_LEN {
                assert_eq!(kind, PacketKind::VideoData);
            } else {
                assert_eq!(kind, PacketKind::Unknown);
            }
        }
    }

    #[test]
    fn test_classification_is_total_over_all_marker_bytes() {
        for marker in 0..=u8::MAX {
            let frame = frame_with_payload(vec![marker; CONTROL_PAYLOAD_LEN]);
            let kind = classify(&frame);
            match marker {
                0x10 => assert_eq!(kind, PacketKind::Handshake),
                0x20 => assert_eq!(kind, PacketKind::Acknowledgement),
                0x30 => assert_eq!(kind, PacketKind::VideoRequest),
                0xFF => assert_eq!(kind, PacketKind::Error),
                _ => assert_eq!(kind, PacketKind::Unknown),
            }
        }
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(PacketKind::Handshake.label(), "Handshake Packet");
        assert_eq!(PacketKind::VideoData.to_string(), "Video Data Packet");
    }
}
