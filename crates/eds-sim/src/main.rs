//! Ethernet driver simulation entry point.
//!
//! Wires a host and a device endpoint onto the shared fabric, then drives
//! four rounds of the protocol from the outside:
//!
//! ```text
//! main()
//!  └─ SimConfig::load()       -- config.toml, defaults when absent
//!  └─ EthernetFabric::new()
//!  └─ Endpoint::new()  x2     -- host + device, self-registering
//!  └─ driver loop
//!       ├─ handshake          -- host → device → acknowledgement → host
//!       ├─ video request      -- device encodes, chunks, host reassembles
//!       ├─ malformed frame    -- device decode fails, logged
//!       └─ wrong ether type   -- device decode fails, logged
//! ```
//!
//! Every frame movement is explicit: nothing advances until the loop calls
//! `flush` on the fabric and `process` on an endpoint.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use eds_sim::config::SimConfig;
use eds_sim::endpoint::Endpoint;
use eds_sim::fabric::EthernetFabric;
use eds_sim::inject::InjectionKind;
use eds_sim::role::{DevicePolicy, HostPolicy};
use eds_sim::PassthroughCodec;

fn main() -> anyhow::Result<()> {
    let config = SimConfig::load(Path::new("config.toml"))?;

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.simulation.log_level.clone())),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Ethernet driver simulation starting"
    );

    ensure_source_asset(&config.video.source_path)?;

    // ── Topology ──────────────────────────────────────────────────────────────
    let fabric = Arc::new(EthernetFabric::new());
    let codec = Arc::new(PassthroughCodec);

    let host = Endpoint::new(
        Arc::clone(&fabric),
        config.addresses.host,
        Box::new(HostPolicy::new(
            Arc::clone(&codec) as Arc<dyn eds_sim::VideoCodec>,
            config.video.host_encoded_path.clone(),
            config.video.host_decoded_path.clone(),
        )),
    );
    let device = Endpoint::new(
        Arc::clone(&fabric),
        config.addresses.device,
        Box::new(DevicePolicy::new(
            codec,
            config.video.source_path.clone(),
            config.video.device_encoded_path.clone(),
        )),
    );
    host.set_peer_address(device.own_address());
    device.set_peer_address(host.own_address());

    // ── Round 1: handshake ────────────────────────────────────────────────────
    info!("── round 1: handshake ──");
    host.initiate_handshake()?;
    fabric.flush();
    device.process()?;
    fabric.flush();
    host.process()?;

    // ── Round 2: video transfer ───────────────────────────────────────────────
    info!("── round 2: video transfer ──");
    host.request_video()?;
    fabric.flush();
    device.process()?;
    // The encoded stream may span several flush/process cycles when it
    // exceeds the fabric's frame budget.
    while fabric.flush() > 0 {
        host.process()?;
    }

    // ── Round 3: malformed frame injection ────────────────────────────────────
    info!("── round 3: malformed frame injection ──");
    host.inject_error(InjectionKind::MalformedFrame)?;
    fabric.flush();
    if let Err(err) = device.process() {
        warn!(%err, "device rejected injected frame as expected");
    }

    // ── Round 4: wrong ether type injection ───────────────────────────────────
    info!("── round 4: wrong ether type injection ──");
    host.inject_error(InjectionKind::WrongEtherType)?;
    fabric.flush();
    if let Err(err) = device.process() {
        warn!(%err, "device rejected injected frame as expected");
    }

    info!("Ethernet driver simulation finished");
    Ok(())
}

/// Writes a small placeholder capture asset when none exists, so the binary
/// runs out of the box.
fn ensure_source_asset(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let placeholder: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(path, placeholder)?;
    info!(path = %path.display(), "wrote placeholder capture asset");
    Ok(())
}
