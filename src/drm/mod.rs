//! DRM/KMS access
//!
//! [`KmsDevice`] is everything the reset needs from the kernel: the object
//! inventory, per-object property snapshots and a single atomic commit.
//! [`Device`] implements it on top of the `drm` crate.

pub mod atomic;
pub mod device;
pub mod discover;
pub mod error;
pub mod object;

#[cfg(test)]
pub mod fake;

pub use atomic::{AddOutcome, AtomicBatch, AtomicRequest, Entry};
pub use device::Device;
pub use discover::find_primary_node;
pub use error::KmsError;
pub use object::{ObjectKind, Property, PropertyObject};

/// Object IDs captured once when the device is opened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub connectors: Vec<u32>,
    pub crtcs: Vec<u32>,
    pub planes: Vec<u32>,
}

impl Inventory {
    pub fn ids(&self, kind: ObjectKind) -> &[u32] {
        match kind {
            ObjectKind::Connector => &self.connectors,
            ObjectKind::Crtc => &self.crtcs,
            ObjectKind::Plane => &self.planes,
        }
    }
}

/// An open KMS device with atomic support
pub trait KmsDevice {
    type Request: AtomicRequest;

    fn inventory(&self) -> &Inventory;

    /// Snapshot every property currently defined on an object
    fn object_properties(&self, id: u32, kind: ObjectKind) -> Result<Vec<Property>, KmsError>;

    /// Allocate an empty atomic request
    fn new_request(&self) -> Self::Request;

    fn commit(&self, request: Self::Request, allow_modeset: bool) -> Result<(), KmsError>;

    /// Release the device; dropping does the same
    fn close(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}
