//! Binary codec for the simulated Ethernet frame.
//!
//! Wire format:
//! ```text
//! [dest:4][src:4][ether_type:2][payload_len:2][delimiter:2][payload:N]
//! ```
//! Total header size: 14 bytes.  All multi-byte integers are big-endian.
//!
//! A frame is well-formed iff the ether type matches [`ETHER_TYPE`], the
//! delimiter matches [`DELIMITER`], and the payload length does not exceed
//! [`MAX_PAYLOAD_SIZE`].  Decoding stops at the first violated invariant and
//! reports which one failed.

use std::fmt::Write as _;

use thiserror::Error;

// ── Wire constants ────────────────────────────────────────────────────────────

/// EtherType value identifying this protocol family.  Frames carrying any
/// other value are rejected at decode time.
pub const ETHER_TYPE: u16 = 0xC0AF;

/// Sentinel placed immediately before the payload; its presence with the
/// correct value is the frame's structural-integrity check.
pub const DELIMITER: u16 = 0xABAB;

/// Size of the fixed frame header in bytes.
pub const HEADER_SIZE: usize = 14;

/// Maximum number of payload bytes a single frame may carry.
pub const MAX_PAYLOAD_SIZE: usize = 1024;

/// Size of one full frame slot: the header space rounded up to 16 bytes plus
/// the maximum payload.  Buffer capacities throughout the simulation are
/// derived from this value.
pub const MAX_FRAME_SIZE: usize = 1040;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors that can occur while building or decoding a frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// A structural invariant was violated: the buffer is too short to hold
    /// the fixed header, the declared payload length exceeds the maximum, or
    /// the delimiter does not match the sentinel.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// The ether-type field does not match [`ETHER_TYPE`].
    #[error("invalid ether type: 0x{0:04X}")]
    InvalidEtherType(u16),
}

// ── Frame ─────────────────────────────────────────────────────────────────────

/// One fixed-format protocol message: 14-byte header plus payload.
///
/// The wire-level `payload_len` field is derived from `payload.len()`, so the
/// two can never disagree.  Oversized payloads are rejected at construction,
/// which keeps [`EthernetFrame::encode`] infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetFrame {
    /// 4-byte destination identifier (opaque bit pattern; reachability is the
    /// fabric's concern, not the codec's).
    pub destination: [u8; 4],
    /// 4-byte source identifier.
    pub source: [u8; 4],
    /// Payload bytes, 0..=[`MAX_PAYLOAD_SIZE`].
    payload: Vec<u8>,
}

impl EthernetFrame {
    /// Builds a frame, rejecting payloads larger than [`MAX_PAYLOAD_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::MalformedFrame`] when the payload is oversized.
    /// Exceeding the maximum is a caller contract violation, caught here so
    /// an oversized frame can never reach the wire.
    pub fn new(
        destination: [u8; 4],
        source: [u8; 4],
        payload: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::MalformedFrame(format!(
                "payload of {} bytes exceeds maximum of {MAX_PAYLOAD_SIZE}",
                payload.len()
            )));
        }
        Ok(Self {
            destination,
            source,
            payload,
        })
    }

    /// Returns the payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the value of the wire-level `payload_len` field.
    pub fn payload_length(&self) -> u16 {
        self.payload.len() as u16
    }

    /// Serializes the frame into the fixed-order byte sequence.
    ///
    /// ```rust
    /// use eds_core::{EthernetFrame, HEADER_SIZE};
    ///
    /// let frame = EthernetFrame::new([1, 2, 3, 4], [5, 6, 7, 8], vec![0xAA]).unwrap();
    /// let bytes = frame.encode();
    /// assert_eq!(bytes.len(), HEADER_SIZE + 1);
    /// assert_eq!(EthernetFrame::decode(&bytes).unwrap(), frame);
    /// ```
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        buf.extend_from_slice(&self.destination);
        buf.extend_from_slice(&self.source);
        buf.extend_from_slice(&ETHER_TYPE.to_be_bytes());
        buf.extend_from_slice(&self.payload_length().to_be_bytes());
        buf.extend_from_slice(&DELIMITER.to_be_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Decodes one frame from the beginning of `bytes`.
    ///
    /// Fields are read at the exact offsets [`encode`](Self::encode) writes
    /// them, so `decode(encode(f)) == f` for every well-formed frame.  Bytes
    /// past the declared payload length are ignored, which lets callers hand
    /// in full fixed-size buffer slots.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::MalformedFrame`] for a truncated header, an
    /// oversized declared length, a wrong delimiter, or a payload shorter
    /// than declared; [`FrameError::InvalidEtherType`] for a protocol
    /// mismatch.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FrameError::MalformedFrame(format!(
                "need at least {HEADER_SIZE} bytes for the header, got {}",
                bytes.len()
            )));
        }

        let mut destination = [0u8; 4];
        destination.copy_from_slice(&bytes[0..4]);
        let mut source = [0u8; 4];
        source.copy_from_slice(&bytes[4..8]);

        let ether_type = u16::from_be_bytes([bytes[8], bytes[9]]);
        if ether_type != ETHER_TYPE {
            return Err(FrameError::InvalidEtherType(ether_type));
        }

        let payload_len = u16::from_be_bytes([bytes[10], bytes[11]]) as usize;
        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(FrameError::MalformedFrame(format!(
                "declared payload length {payload_len} exceeds maximum of {MAX_PAYLOAD_SIZE}"
            )));
        }

        let delimiter = u16::from_be_bytes([bytes[12], bytes[13]]);
        if delimiter != DELIMITER {
            return Err(FrameError::MalformedFrame(format!(
                "delimiter 0x{delimiter:04X} does not match sentinel 0x{DELIMITER:04X}"
            )));
        }

        if bytes.len() < HEADER_SIZE + payload_len {
            return Err(FrameError::MalformedFrame(format!(
                "declared payload length {payload_len} but only {} bytes follow the header",
                bytes.len() - HEADER_SIZE
            )));
        }

        Ok(Self {
            destination,
            source,
            payload: bytes[HEADER_SIZE..HEADER_SIZE + payload_len].to_vec(),
        })
    }

    /// Human-readable header dump for diagnostics; no behavioural contract.
    pub fn describe(&self) -> String {
        let mut out = String::from("Ethernet frame:");
        let _ = write!(
            out,
            "\n\tdestination: 0x{}",
            hex_address(&self.destination)
        );
        let _ = write!(out, "\n\tsource: 0x{}", hex_address(&self.source));
        let _ = write!(out, "\n\tether type: 0x{ETHER_TYPE:04X}");
        let _ = write!(out, "\n\tdelimiter: 0x{DELIMITER:04X}");
        let _ = write!(out, "\n\tpayload length: {}", self.payload.len());
        match self.payload.first() {
            Some(first) => {
                let _ = write!(out, "\n\tpayload start: 0x{first:02X}...");
            }
            None => out.push_str("\n\tpayload start: <empty>"),
        }
        out
    }
}

fn hex_address(addr: &[u8; 4]) -> String {
    format!("{:02X}{:02X}{:02X}{:02X}", addr[0], addr[1], addr[2], addr[3])
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(payload: Vec<u8>) -> EthernetFrame {
        EthernetFrame::new([0xDE, 0xAD, 0xBE, 0xEF], [0x12, 0x34, 0x56, 0x78], payload)
            .expect("payload within bounds")
    }

    // ── Round trips ──────────────────────────────────────────────────────────

    #[test]
    fn test_round_trip_with_small_payload() {
        let frame = sample_frame(vec![0x10, 0x10, 0x10]);
        assert_eq!(EthernetFrame::decode(&frame.encode()).unwrap(), frame);
    }

    #[test]
    fn test_round_trip_with_empty_payload() {
        let frame = sample_frame(vec![]);
        assert_eq!(EthernetFrame::decode(&frame.encode()).unwrap(), frame);
    }

    #[test]
    fn test_round_trip_with_max_payload() {
        let frame = sample_frame(vec![0xAB; MAX_PAYLOAD_SIZE]);
        assert_eq!(EthernetFrame::decode(&frame.encode()).unwrap(), frame);
    }

    #[test]
    fn test_round_trip_over_all_payload_lengths() {
        for len in (0..=MAX_PAYLOAD_SIZE).step_by(97) {
            let frame = sample_frame(vec![0x5A; len]);
            assert_eq!(EthernetFrame::decode(&frame.encode()).unwrap(), frame);
        }
    }

    // ── Encoded layout ───────────────────────────────────────────────────────

    #[test]
    fn test_encode_writes_fields_at_fixed_offsets() {
        let frame = sample_frame(vec![0x11, 0x22]);
        let bytes = frame.encode();

        assert_eq!(&bytes[0..4], &[0xDE, 0xAD, 0xBE, 0xEF], "destination");
        assert_eq!(&bytes[4..8], &[0x12, 0x34, 0x56, 0x78], "source");
        assert_eq!(&bytes[8..10], &ETHER_TYPE.to_be_bytes(), "ether type");
        assert_eq!(&bytes[10..12], &2u16.to_be_bytes(), "payload length");
        assert_eq!(&bytes[12..14], &DELIMITER.to_be_bytes(), "delimiter");
        assert_eq!(&bytes[14..], &[0x11, 0x22], "payload");
    }

    #[test]
    fn test_decode_ignores_trailing_slot_padding() {
        // Fabric buffers hand whole MAX_FRAME_SIZE slots to the decoder
        let frame = sample_frame(vec![0x77; 8]);
        let mut slot = frame.encode();
        slot.resize(MAX_FRAME_SIZE, 0);
        assert_eq!(EthernetFrame::decode(&slot).unwrap(), frame);
    }

    // ── Construction guard ───────────────────────────────────────────────────

    #[test]
    fn test_new_rejects_oversized_payload() {
        let result = EthernetFrame::new(
            [0; 4],
            [0; 4],
            vec![0u8; MAX_PAYLOAD_SIZE + 1],
        );
        assert!(matches!(result, Err(FrameError::MalformedFrame(_))));
    }

    // ── Decode failures ──────────────────────────────────────────────────────

    #[test]
    fn test_decode_empty_buffer_is_malformed() {
        assert!(matches!(
            EthernetFrame::decode(&[]),
            Err(FrameError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_truncated_header_is_malformed() {
        let bytes = sample_frame(vec![0x01]).encode();
        assert!(matches!(
            EthernetFrame::decode(&bytes[..HEADER_SIZE - 1]),
            Err(FrameError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_altered_ether_type_is_rejected() {
        let mut bytes = sample_frame(vec![0x11, 0x22]).encode();
        bytes[8] = 0x08;
        bytes[9] = 0x00;
        assert_eq!(
            EthernetFrame::decode(&bytes),
            Err(FrameError::InvalidEtherType(0x0800))
        );
    }

    #[test]
    fn test_decode_altered_delimiter_is_malformed() {
        let mut bytes = sample_frame(vec![0x11, 0x22]).encode();
        bytes[12] = 0xBB;
        bytes[13] = 0xBB;
        assert!(matches!(
            EthernetFrame::decode(&bytes),
            Err(FrameError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_oversized_declared_length_is_malformed() {
        let mut bytes = sample_frame(vec![0x11, 0x22]).encode();
        bytes[10..12].copy_from_slice(&((MAX_PAYLOAD_SIZE as u16) + 1).to_be_bytes());
        assert!(matches!(
            EthernetFrame::decode(&bytes),
            Err(FrameError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_declared_length_beyond_buffer_is_malformed() {
        let mut bytes = sample_frame(vec![0x11, 0x22]).encode();
        // Declare more payload than the buffer actually carries
        bytes[10..12].copy_from_slice(&100u16.to_be_bytes());
        assert!(matches!(
            EthernetFrame::decode(&bytes),
            Err(FrameError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_reports_ether_type_before_delimiter() {
        // Both fields are wrong; ether type is read first and wins
        let mut bytes = sample_frame(vec![0x11, 0x22]).encode();
        bytes[8] = 0x08;
        bytes[9] = 0x00;
        bytes[12] = 0xBB;
        bytes[13] = 0xBB;
        assert!(matches!(
            EthernetFrame::decode(&bytes),
            Err(FrameError::InvalidEtherType(_))
        ));
    }

    // ── Diagnostics ──────────────────────────────────────────────────────────

    #[test]
    fn test_describe_includes_addresses_and_length() {
        let text = sample_frame(vec![0x10, 0x10, 0x10]).describe();
        assert!(text.contains("DEADBEEF"));
        assert!(text.contains("12345678"));
        assert!(text.contains("payload length: 3"));
        assert!(text.contains("0x10"));
    }

    #[test]
    fn test_describe_handles_empty_payload() {
        let text = sample_frame(vec![]).describe();
        assert!(text.contains("<empty>"));
    }
}
