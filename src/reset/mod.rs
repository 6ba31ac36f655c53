//! KMS state reset
//!
//! Drives every connector, CRTC and plane to the values in [`tables`] and
//! commits the lot in a single atomic request.
//!
//! ```text
//! Start → DeviceOpened → BatchBuilt → Committed → Closed → Done
//! ```
//!
//! Only the device open can fail the run. Missing properties, objects that
//! can't be queried and a failed commit are reported and the run goes on.

pub mod tables;

use std::time::Duration;

use log::{debug, error, info};

use crate::config::Config;
use crate::constants::DEFAULT_SETTLE_DELAY_MS;
use crate::drm::{AddOutcome, AtomicBatch, Entry, KmsDevice, KmsError, ObjectKind, PropertyObject};

/// Reset run stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    DeviceOpened,
    BatchBuilt,
    Committed,
    Closed,
    Done,
}

/// Tunables for one run
#[derive(Debug, Clone)]
pub struct ResetOptions {
    /// Let the commit do a full modeset
    pub allow_modeset: bool,
    /// Wait after closing the device
    pub settle_delay: Duration,
    /// Table entries left out of this run
    pub skip_properties: Vec<String>,
}

impl Default for ResetOptions {
    fn default() -> Self {
        Self {
            allow_modeset: true,
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            skip_properties: Vec::new(),
        }
    }
}

impl From<&Config> for ResetOptions {
    fn from(config: &Config) -> Self {
        Self {
            allow_modeset: config.allow_modeset,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            skip_properties: config.skip_properties.clone(),
        }
    }
}

/// Per object kind counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStats {
    /// Objects listed in the inventory
    pub objects: usize,
    /// Objects skipped because their properties couldn't be fetched
    pub skipped: usize,
    pub queued: usize,
    pub missing: usize,
    pub rejected: usize,
}

/// Outcome of a reset run
#[derive(Debug)]
pub struct ResetReport {
    pub connectors: KindStats,
    pub crtcs: KindStats,
    pub planes: KindStats,
    /// Batch contents in commit order
    pub entries: Vec<Entry>,
    pub commit: Result<(), KmsError>,
    pub stage: Stage,
}

impl ResetReport {
    fn new() -> Self {
        Self {
            connectors: KindStats::default(),
            crtcs: KindStats::default(),
            planes: KindStats::default(),
            entries: Vec::new(),
            commit: Ok(()),
            stage: Stage::Start,
        }
    }

    pub fn stats(&self, kind: ObjectKind) -> &KindStats {
        match kind {
            ObjectKind::Connector => &self.connectors,
            ObjectKind::Crtc => &self.crtcs,
            ObjectKind::Plane => &self.planes,
        }
    }

    fn stats_mut(&mut self, kind: ObjectKind) -> &mut KindStats {
        match kind {
            ObjectKind::Connector => &mut self.connectors,
            ObjectKind::Crtc => &mut self.crtcs,
            ObjectKind::Plane => &mut self.planes,
        }
    }

    fn enter(&mut self, stage: Stage) {
        debug_assert!(stage > self.stage, "{:?} -> {:?}", self.stage, stage);
        debug!("reset: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Log a summary
    pub fn log(&self) {
        for kind in ObjectKind::ALL {
            let s = self.stats(kind);
            info!(
                "{}s: {} objects ({} skipped), {} queued, {} missing, {} rejected",
                kind, s.objects, s.skipped, s.queued, s.missing, s.rejected
            );
        }
        match &self.commit {
            Ok(()) => info!("Reset committed ({} properties)", self.entries.len()),
            Err(e) => info!("Reset not applied: {}", e),
        }
    }
}

/// Reset `device` and close it
///
/// Takes an already opened device (the run is in `DeviceOpened`). Always
/// attempts exactly one commit, even with an empty batch.
pub fn run<D: KmsDevice>(device: D, options: &ResetOptions) -> ResetReport {
    let mut report = ResetReport::new();
    report.enter(Stage::DeviceOpened);

    let mut batch = AtomicBatch::new(device.new_request());
    for kind in ObjectKind::ALL {
        queue_kind(&device, kind, options, &mut batch, report.stats_mut(kind));
    }
    debug!("Atomic batch: {} entries", batch.len());
    report.entries = batch.entries().to_vec();
    report.enter(Stage::BatchBuilt);

    report.commit = device.commit(batch.into_request(), options.allow_modeset);
    if let Err(e) = &report.commit {
        error!("{}", e);
    }
    report.enter(Stage::Committed);

    device.close();
    report.enter(Stage::Closed);

    if !options.settle_delay.is_zero() {
        debug!("Waiting {:?} for the display state to settle", options.settle_delay);
        std::thread::sleep(options.settle_delay);
    }
    report.enter(Stage::Done);

    report
}

fn queue_kind<D: KmsDevice>(
    device: &D,
    kind: ObjectKind,
    options: &ResetOptions,
    batch: &mut AtomicBatch<D::Request>,
    stats: &mut KindStats,
) {
    let table = tables::table(kind)
        .iter()
        .filter(|(name, _)| !options.skip_properties.iter().any(|s| s == name));

    for &id in device.inventory().ids(kind) {
        stats.objects += 1;

        let Some(object) = PropertyObject::fetch(device, id, kind) else {
            stats.skipped += 1;
            continue;
        };

        for &(name, value) in table.clone() {
            match batch.add_property(&object, name, value) {
                AddOutcome::Queued => stats.queued += 1,
                AddOutcome::Missing => stats.missing += 1,
                AddOutcome::Rejected => stats.rejected += 1,
            }
        }
    }
}
