//! Neutral property values per object kind
//!
//! Entries for properties a given driver doesn't have are harmless: they
//! are skipped when the batch is built. Vendor-prefixed entries (AMD_*)
//! only match on amdgpu.

use crate::constants::{ALPHA_OPAQUE, FENCE_FD_NONE, FIXED_S31_32_ONE, PROP_NONE, Rotation};
use crate::drm::ObjectKind;

/// (property name, reset value)
pub type ResetTable = &'static [(&'static str, u64)];

pub const CONNECTOR: ResetTable = &[
    ("CRTC_ID", PROP_NONE),
    // Color management / HDR
    ("Colorspace", 0), // Default
    ("HDR_OUTPUT_METADATA", PROP_NONE),
];

pub const CRTC: ResetTable = &[
    ("ACTIVE", 0),
    ("MODE_ID", PROP_NONE),
    // Color management
    ("GAMMA_LUT", PROP_NONE),
    ("DEGAMMA_LUT", PROP_NONE),
    ("CTM", PROP_NONE),
    ("VRR_ENABLED", 0),
    ("OUT_FENCE_PTR", 0),
    ("AMD_CRTC_REGAMMA_TF", 0), // Default
];

pub const PLANE: ResetTable = &[
    ("FB_ID", PROP_NONE),
    ("IN_FENCE_FD", FENCE_FD_NONE),
    ("CRTC_ID", PROP_NONE),
    ("SRC_X", 0),
    ("SRC_Y", 0),
    ("SRC_W", 0),
    ("SRC_H", 0),
    ("CRTC_X", 0),
    ("CRTC_Y", 0),
    ("CRTC_W", 0),
    ("CRTC_H", 0),
    ("rotation", Rotation::ROTATE_0.bits()),
    ("alpha", ALPHA_OPAQUE),
    // ("zpos", ?), default differs per plane and driver
    // AMD color pipeline
    ("AMD_PLANE_DEGAMMA_TF", 0),
    ("AMD_PLANE_DEGAMMA_LUT", PROP_NONE),
    ("AMD_PLANE_CTM", PROP_NONE),
    ("AMD_PLANE_HDR_MULT", FIXED_S31_32_ONE),
    ("AMD_PLANE_SHAPER_TF", 0),
    ("AMD_PLANE_SHAPER_LUT", PROP_NONE),
    ("AMD_PLANE_LUT3D", PROP_NONE),
    ("AMD_PLANE_BLEND_TF", 0),
    ("AMD_PLANE_BLEND_LUT", PROP_NONE),
];

pub fn table(kind: ObjectKind) -> ResetTable {
    match kind {
        ObjectKind::Connector => CONNECTOR,
        ObjectKind::Crtc => CRTC,
        ObjectKind::Plane => PLANE,
    }
}
