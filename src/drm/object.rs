//! KMS property objects
//!
//! A point-in-time snapshot of every property a connector, CRTC or plane
//! exposes. Snapshots are owned by the pass that fetched them and dropped
//! as soon as their writes are queued.

use std::fmt;

use log::{debug, warn};

use super::{KmsDevice, KmsError};

/// Kind of KMS object carrying properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Connector,
    Crtc,
    Plane,
}

impl ObjectKind {
    /// Reset pass order
    pub const ALL: [ObjectKind; 3] = [Self::Connector, Self::Crtc, Self::Plane];

    /// DRM_MODE_OBJECT_* value
    pub fn ffi_type(self) -> u32 {
        match self {
            Self::Connector => 0xc0c0_c0c0,
            Self::Crtc => 0xcccc_cccc,
            Self::Plane => 0xeeee_eeee,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connector => "connector",
            Self::Crtc => "CRTC",
            Self::Plane => "plane",
        })
    }
}

/// Property value type as reported by the kernel
///
/// Only used for diagnostics; writes are never refused based on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Range,
    SignedRange,
    Enum,
    Bitmask,
    Blob,
    Object,
    Boolean,
    Unknown,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Range => "range",
            Self::SignedRange => "signed range",
            Self::Enum => "enum",
            Self::Bitmask => "bitmask",
            Self::Blob => "blob",
            Self::Object => "object",
            Self::Boolean => "boolean",
            Self::Unknown => "unknown",
        })
    }
}

/// One resolved property of a KMS object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    /// Property ID
    pub id: u32,
    /// Value at fetch time
    pub current: u64,
    pub kind: ValueKind,
}

/// Snapshot of one connector, CRTC or plane and its properties
#[derive(Debug)]
pub struct PropertyObject {
    id: u32,
    kind: ObjectKind,
    properties: Vec<Property>,
}

impl PropertyObject {
    /// Fetch the property snapshot of `id`
    ///
    /// Returns `None` when the object has no properties or can't be queried
    /// (e.g. it disappeared since the inventory was taken). That is a
    /// per-object skip, never a run failure.
    pub fn fetch<D: KmsDevice + ?Sized>(device: &D, id: u32, kind: ObjectKind) -> Option<Self> {
        match device.object_properties(id, kind) {
            Ok(properties) if properties.is_empty() => {
                debug!("{} {}: no properties, skipping", kind, id);
                None
            }
            Ok(properties) => {
                debug!("{} {}: {} properties", kind, id, properties.len());
                Some(Self {
                    id,
                    kind,
                    properties,
                })
            }
            Err(e @ KmsError::StaleObject { .. }) => {
                warn!("Skipping {}", e);
                None
            }
            Err(e) => {
                warn!("Skipping {} {}: {}", kind, id, e);
                None
            }
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Case-sensitive lookup by exact name
    pub fn find(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}
