//! DRM primary node discovery
//!
//! Picks the first `cardN` node of the udev `drm` subsystem when no device
//! was given on the command line.

use std::path::PathBuf;

/// Card number of a primary node sysname ("card0" -> 0)
///
/// Connector entries ("card0-HDMI-A-1") and render nodes ("renderD128")
/// live in the same subsystem and are rejected.
pub fn primary_card_number(sysname: &str) -> Option<u32> {
    let digits = sysname.strip_prefix("card")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Find the first DRM device exposing a primary node
#[cfg(target_os = "linux")]
pub fn find_primary_node() -> Option<PathBuf> {
    use log::{debug, info, warn};

    let mut cards = match scan_cards() {
        Ok(cards) => cards,
        Err(e) => {
            warn!("Failed to enumerate DRM devices: {:#}", e);
            return None;
        }
    };
    cards.sort_by_key(|(n, _)| *n);

    for (n, node) in &cards {
        debug!("DRM primary node: card{} -> {}", n, node.display());
    }

    let (_, node) = cards.into_iter().next()?;
    info!("Using DRM device: {}", node.display());
    Some(node)
}

#[cfg(target_os = "linux")]
fn scan_cards() -> anyhow::Result<Vec<(u32, PathBuf)>> {
    use anyhow::Context;

    let mut enumerator = udev::Enumerator::new().context("Failed to create udev enumerator")?;
    enumerator
        .match_subsystem("drm")
        .context("Failed to match drm subsystem")?;

    let devices = enumerator
        .scan_devices()
        .context("Failed to scan drm devices")?;

    Ok(devices
        .filter_map(|dev| {
            let n = primary_card_number(dev.sysname().to_str()?)?;
            let node = dev.devnode()?.to_path_buf();
            Some((n, node))
        })
        .collect())
}

#[cfg(not(target_os = "linux"))]
pub fn find_primary_node() -> Option<PathBuf> {
    None
}
