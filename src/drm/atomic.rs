//! Atomic batch construction
//!
//! Property writes from many objects are accumulated into one transport
//! request and committed together. A write whose property the object
//! doesn't expose is dropped silently, so a single list of writes can
//! target drivers with different property sets.

use log::{debug, warn};

use super::object::{ObjectKind, PropertyObject};
use super::KmsError;

/// Transport side of an atomic request (allocate / add-entry / free)
pub trait AtomicRequest {
    fn add(
        &mut self,
        kind: ObjectKind,
        object: u32,
        property: u32,
        value: u64,
    ) -> Result<(), KmsError>;
}

/// One queued (object, property, value) triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub object: u32,
    pub property: u32,
    pub value: u64,
}

/// Result of a single [`AtomicBatch::add_property`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Queued,
    /// The object has no property of that name
    Missing,
    /// The transport refused the entry
    Rejected,
}

/// Pending atomic transaction
///
/// Write-only: nothing here looks at device state. Consumed by
/// [`into_request`](Self::into_request) so it can only be committed once.
pub struct AtomicBatch<R> {
    request: R,
    entries: Vec<Entry>,
}

impl<R: AtomicRequest> AtomicBatch<R> {
    pub fn new(request: R) -> Self {
        Self {
            request,
            entries: Vec::new(),
        }
    }

    /// Queue `name = value` on `object`
    ///
    /// `value` is the raw 64-bit property value; signed properties must be
    /// sign-extended by the caller.
    pub fn add_property(&mut self, object: &PropertyObject, name: &str, value: u64) -> AddOutcome {
        let Some(prop) = object.find(name) else {
            debug!("{} {}: no {} property", object.kind(), object.id(), name);
            return AddOutcome::Missing;
        };

        if let Err(e) = self
            .request
            .add(object.kind(), object.id(), prop.id, value)
        {
            warn!("Failed to set {} property: {}", name, e);
            return AddOutcome::Rejected;
        }

        debug!(
            "{} {}: {} ({}) {} -> {}",
            object.kind(),
            object.id(),
            name,
            prop.kind,
            prop.current,
            value
        );
        self.entries.push(Entry {
            object: object.id(),
            property: prop.id,
            value,
        });
        AddOutcome::Queued
    }

    /// Entries queued so far, in insertion order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_request(self) -> R {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drm::fake::FakeDevice;
    use crate::drm::KmsDevice;

    #[test]
    fn test_queue_existing_property() {
        let device = FakeDevice::new().crtc(40, &["ACTIVE", "MODE_ID"]);
        let obj = PropertyObject::fetch(&device, 40, ObjectKind::Crtc).unwrap();
        let active = obj.find("ACTIVE").unwrap().id;

        let mut batch = AtomicBatch::new(device.new_request());
        assert_eq!(batch.add_property(&obj, "ACTIVE", 0), AddOutcome::Queued);
        assert_eq!(
            batch.entries(),
            &[Entry {
                object: 40,
                property: active,
                value: 0
            }]
        );
    }

    #[test]
    fn test_missing_property_is_noop() {
        let device = FakeDevice::new().crtc(40, &["ACTIVE"]);
        let obj = PropertyObject::fetch(&device, 40, ObjectKind::Crtc).unwrap();

        let mut batch = AtomicBatch::new(device.new_request());
        assert_eq!(batch.add_property(&obj, "CTM", 0), AddOutcome::Missing);
        assert!(batch.entries().is_empty());
        assert!(batch.into_request().entries.is_empty());
    }

    #[test]
    fn test_rejected_entry_does_not_stop_later_ones() {
        let device = FakeDevice::new()
            .plane(50, &["FB_ID", "IN_FENCE_FD", "CRTC_ID"])
            .reject("IN_FENCE_FD");
        let obj = PropertyObject::fetch(&device, 50, ObjectKind::Plane).unwrap();

        let mut batch = AtomicBatch::new(device.new_request());
        assert_eq!(batch.add_property(&obj, "FB_ID", 0), AddOutcome::Queued);
        assert_eq!(
            batch.add_property(&obj, "IN_FENCE_FD", u64::MAX),
            AddOutcome::Rejected
        );
        assert_eq!(batch.add_property(&obj, "CRTC_ID", 0), AddOutcome::Queued);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_duplicate_writes_are_kept() {
        let device = FakeDevice::new().connector(31, &["CRTC_ID"]);
        let obj = PropertyObject::fetch(&device, 31, ObjectKind::Connector).unwrap();

        let mut batch = AtomicBatch::new(device.new_request());
        batch.add_property(&obj, "CRTC_ID", 0);
        batch.add_property(&obj, "CRTC_ID", 0);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_value_passed_through_unchanged() {
        let device = FakeDevice::new().plane(50, &["AMD_PLANE_HDR_MULT"]);
        let obj = PropertyObject::fetch(&device, 50, ObjectKind::Plane).unwrap();

        let mut batch = AtomicBatch::new(device.new_request());
        batch.add_property(&obj, "AMD_PLANE_HDR_MULT", 0x1_0000_0000);
        assert_eq!(batch.into_request().entries[0].value, 0x1_0000_0000);
    }
}
