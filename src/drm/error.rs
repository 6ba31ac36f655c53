//! DRM error taxonomy
//!
//! `Open`, `NotKmsDevice`, `CapabilityUnavailable` and `Resources` can only
//! come out of [`Device::open`](super::Device::open) and end the run.
//! Everything else is contained per object or per property by the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::object::ObjectKind;

#[derive(Debug, Error)]
pub enum KmsError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a KMS device", path.display())]
    NotKmsDevice { path: PathBuf },

    #[error("DRM_CLIENT_CAP_ATOMIC not available on {}: {source}", path.display())]
    CapabilityUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to query DRM resources on {}: {source}", path.display())]
    Resources {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{kind} {id} no longer exists")]
    StaleObject { id: u32, kind: ObjectKind },

    #[error("failed to get properties of {kind} {id}: {source}")]
    PropertyQuery {
        id: u32,
        kind: ObjectKind,
        #[source]
        source: io::Error,
    },

    #[error("invalid atomic entry (object {object}, property {property})")]
    InvalidEntry { object: u32, property: u32 },

    #[error("atomic commit failed: {0}")]
    Commit(#[source] io::Error),
}

impl KmsError {
    /// Classify a failed property enumeration: ENOENT means the object ID is stale.
    pub fn property_query(id: u32, kind: ObjectKind, source: io::Error) -> Self {
        if source.raw_os_error() == Some(libc::ENOENT) {
            Self::StaleObject { id, kind }
        } else {
            Self::PropertyQuery { id, kind, source }
        }
    }
}
