//! eds-sim library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

pub mod codec_service;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod fabric;
pub mod inject;
pub mod role;

pub use codec_service::{CodecError, PassthroughCodec, VideoCodec};
pub use config::{ConfigError, SimConfig};
pub use endpoint::Endpoint;
pub use error::SimError;
pub use fabric::{EthernetFabric, FrameSink};
pub use inject::InjectionKind;
pub use role::{DevicePolicy, HostPolicy, RolePolicy};
