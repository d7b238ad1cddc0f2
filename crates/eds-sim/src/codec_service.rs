//! Boundary to the external video codec service.
//!
//! The simulation treats video transcoding as an opaque collaborator: a
//! blocking file-to-file operation that either succeeds or reports a specific
//! failure reason.  The endpoints never inspect codec internals.
//!
//! [`VideoCodec`] is the seam: the device role invokes `encode` before
//! chunking a capture onto the wire, and the host role invokes `decode` after
//! reassembling the received stream.  Tests substitute a mock; the binary
//! uses [`PassthroughCodec`], a byte-for-byte copy standing in for the
//! GIF ↔ H.264 transcode.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure reasons reported by the codec service.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The input file could not be opened.
    #[error("cannot open codec input: {0}")]
    CannotOpenInput(PathBuf),

    /// The output file could not be created or written.
    #[error("cannot open codec output: {0}")]
    CannotOpenOutput(PathBuf),

    /// Encoding failed after the files were opened.
    #[error("encode failed: {0}")]
    EncodeFailed(String),

    /// Decoding failed after the files were opened.
    #[error("decode failed: {0}")]
    DecodeFailed(String),
}

/// Atomic, blocking, file-to-file transcode operations.
#[cfg_attr(test, mockall::automock)]
pub trait VideoCodec: Send + Sync {
    /// Encodes the capture at `source` into a transport stream at `dest`.
    fn encode(&self, source: &Path, dest: &Path) -> Result<(), CodecError>;

    /// Decodes the transport stream at `source` into a viewable asset at `dest`.
    fn decode(&self, source: &Path, dest: &Path) -> Result<(), CodecError>;
}

/// Stand-in codec that copies bytes unchanged.
///
/// Keeps the simulation self-contained: the chunking, reassembly, and
/// delivery-order properties under test are independent of the actual
/// compression format.
#[derive(Debug, Default)]
pub struct PassthroughCodec;

impl VideoCodec for PassthroughCodec {
    fn encode(&self, source: &Path, dest: &Path) -> Result<(), CodecError> {
        copy_bytes(source, dest)
    }

    fn decode(&self, source: &Path, dest: &Path) -> Result<(), CodecError> {
        copy_bytes(source, dest)
    }
}

fn copy_bytes(source: &Path, dest: &Path) -> Result<(), CodecError> {
    let bytes =
        fs::read(source).map_err(|_| CodecError::CannotOpenInput(source.to_path_buf()))?;
    fs::write(dest, bytes).map_err(|_| CodecError::CannotOpenOutput(dest.to_path_buf()))?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
