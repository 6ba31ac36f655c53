//! DRM device management
//!
//! Opens a DRM primary node (/dev/dri/card*), enables atomic modesetting
//! and captures the connector, CRTC and plane inventory.
//!

use drm::control::atomic::AtomicModeReq;
use drm::control::{
    connector, crtc, plane, property, AtomicCommitFlags, Device as ControlDevice,
    RawResourceHandle, ResourceHandle,
};
use drm::{ClientCapability, Device as BasicDevice};
use log::{debug, info, trace};
use std::fs::{File, OpenOptions};
use std::os::unix::io::{AsFd, BorrowedFd};
use std::path::{Path, PathBuf};

use super::atomic::AtomicRequest;
use super::object::{ObjectKind, Property, ValueKind};
use super::{Inventory, KmsDevice, KmsError};

/// DRM device wrapper
pub struct Device {
    file: File,
    path: PathBuf,
    inventory: Inventory,
}

// Trait implementations required by drm crate
impl AsFd for Device {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

impl BasicDevice for Device {}
impl ControlDevice for Device {}

impl Device {
    /// Open DRM device
    ///
    /// Either returns a fully initialised device or an error with the file
    /// already closed; there is no half-open state.
    ///
    /// # Arguments
    /// * `path` - Device path (e.g., "/dev/dri/card0")
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KmsError> {
        let path = path.as_ref();
        info!("Opening DRM device: {}", path.display());

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| KmsError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        // Create temporary device wrapper to query the fd before we own it
        struct TempDevice<'a>(&'a File);
        impl AsFd for TempDevice<'_> {
            fn as_fd(&self) -> BorrowedFd<'_> {
                self.0.as_fd()
            }
        }
        impl BasicDevice for TempDevice<'_> {}
        impl ControlDevice for TempDevice<'_> {}

        let temp = TempDevice(&file);

        // Render nodes and non-KMS drivers fail GETRESOURCES
        if temp.resource_handles().is_err() {
            return Err(KmsError::NotKmsDevice {
                path: path.to_path_buf(),
            });
        }

        // Atomic also implies universal planes, so primary and cursor
        // planes show up in the plane list below
        temp.set_client_capability(ClientCapability::Atomic, true)
            .map_err(|source| KmsError::CapabilityUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        let resources = temp
            .resource_handles()
            .map_err(|source| KmsError::Resources {
                path: path.to_path_buf(),
                source,
            })?;
        let planes = temp
            .plane_handles()
            .map_err(|source| KmsError::Resources {
                path: path.to_path_buf(),
                source,
            })?;

        let inventory = Inventory {
            connectors: resources.connectors().iter().map(|&h| u32::from(h)).collect(),
            crtcs: resources.crtcs().iter().map(|&h| u32::from(h)).collect(),
            planes: planes.into_iter().map(u32::from).collect(),
        };

        info!(
            "DRM resources: connectors={}, crtcs={}, planes={}",
            inventory.connectors.len(),
            inventory.crtcs.len(),
            inventory.planes.len()
        );

        Ok(Self {
            file,
            path: path.to_path_buf(),
            inventory,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn properties_of<H: ResourceHandle>(&self, handle: H) -> std::io::Result<Vec<Property>> {
        let values = self.get_properties(handle)?;
        let (handles, raw_values) = values.as_props_and_values();

        let mut properties = Vec::new();
        for (&prop, &value) in handles.iter().zip(raw_values) {
            // Properties that vanish between the two queries are left out,
            // lookups by name will simply miss them
            let info = match self.get_property(prop) {
                Ok(info) => info,
                Err(e) => {
                    debug!("Failed to get property {:?}: {}", prop, e);
                    continue;
                }
            };

            properties.push(Property {
                name: info.name().to_string_lossy().into_owned(),
                id: u32::from(prop),
                current: value,
                kind: value_kind(&info.value_type()),
            });
        }
        Ok(properties)
    }
}

impl KmsDevice for Device {
    type Request = DrmRequest;

    fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn object_properties(&self, id: u32, kind: ObjectKind) -> Result<Vec<Property>, KmsError> {
        trace!(
            "OBJ_GETPROPERTIES obj_id={} obj_type={:#x}",
            id,
            kind.ffi_type()
        );

        let result = match kind {
            ObjectKind::Connector => {
                self.properties_of(handle::<connector::Handle>(id, kind)?)
            }
            ObjectKind::Crtc => self.properties_of(handle::<crtc::Handle>(id, kind)?),
            ObjectKind::Plane => self.properties_of(handle::<plane::Handle>(id, kind)?),
        };
        result.map_err(|source| KmsError::property_query(id, kind, source))
    }

    fn new_request(&self) -> DrmRequest {
        DrmRequest(AtomicModeReq::new())
    }

    fn commit(&self, request: DrmRequest, allow_modeset: bool) -> Result<(), KmsError> {
        let flags = if allow_modeset {
            AtomicCommitFlags::ALLOW_MODESET
        } else {
            AtomicCommitFlags::empty()
        };
        self.atomic_commit(flags, request.0)
            .map_err(KmsError::Commit)
    }

    fn close(self) {
        info!("Closing DRM device: {}", self.path.display());
    }
}

/// Inventory IDs are never 0, but a stale one is treated like a missing object
fn handle<T: From<RawResourceHandle>>(id: u32, kind: ObjectKind) -> Result<T, KmsError> {
    drm::control::from_u32(id).ok_or(KmsError::StaleObject { id, kind })
}

fn value_kind(value_type: &property::ValueType) -> ValueKind {
    use property::ValueType;

    match value_type {
        ValueType::UnsignedRange(..) => ValueKind::Range,
        ValueType::SignedRange(..) => ValueKind::SignedRange,
        ValueType::Enum(_) => ValueKind::Enum,
        ValueType::Bitmask => ValueKind::Bitmask,
        ValueType::Blob => ValueKind::Blob,
        ValueType::Boolean => ValueKind::Boolean,
        ValueType::Object
        | ValueType::CRTC
        | ValueType::Connector
        | ValueType::Framebuffer
        | ValueType::Plane => ValueKind::Object,
        _ => ValueKind::Unknown,
    }
}

/// libdrm-style atomic request backed by `drm::control::atomic::AtomicModeReq`
pub struct DrmRequest(AtomicModeReq);

impl AtomicRequest for DrmRequest {
    fn add(
        &mut self,
        kind: ObjectKind,
        object: u32,
        property: u32,
        value: u64,
    ) -> Result<(), KmsError> {
        let invalid = || KmsError::InvalidEntry { object, property };
        let prop: property::Handle = drm::control::from_u32(property).ok_or_else(invalid)?;
        let value = property::Value::Unknown(value);

        match kind {
            ObjectKind::Connector => {
                let h: connector::Handle = drm::control::from_u32(object).ok_or_else(invalid)?;
                self.0.add_property(h, prop, value);
            }
            ObjectKind::Crtc => {
                let h: crtc::Handle = drm::control::from_u32(object).ok_or_else(invalid)?;
                self.0.add_property(h, prop, value);
            }
            ObjectKind::Plane => {
                let h: plane::Handle = drm::control::from_u32(object).ok_or_else(invalid)?;
                self.0.add_property(h, prop, value);
            }
        }
        Ok(())
    }
}
