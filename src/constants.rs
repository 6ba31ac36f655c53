//! Global constants for kmsreset
//!
//! Kernel ABI values that appear in the reset tables, plus timing defaults.

use bitflags::bitflags;

// ============================================================================
// Timing Constants
// ============================================================================

/// Delay after the commit before exiting, in milliseconds.
///
/// A display server started right after us may otherwise race the kernel's
/// completion of the modeset and come up on a black screen.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

// ============================================================================
// Property Values (include/uapi/drm/drm_mode.h)
// ============================================================================

bitflags! {
    /// Plane "rotation" property bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Rotation: u64 {
        const ROTATE_0   = 1 << 0;
        const ROTATE_90  = 1 << 1;
        const ROTATE_180 = 1 << 2;
        const ROTATE_270 = 1 << 3;
        const REFLECT_X  = 1 << 4;
        const REFLECT_Y  = 1 << 5;
    }
}

/// Plane "alpha" value for a fully opaque plane (16-bit range)
pub const ALPHA_OPAQUE: u64 = 0xffff;

/// "IN_FENCE_FD" value meaning no fence (-1 sign-extended to 64 bits)
pub const FENCE_FD_NONE: u64 = -1i64 as u64;

/// 1.0 in S31.32 fixed point (AMD_PLANE_HDR_MULT)
pub const FIXED_S31_32_ONE: u64 = 1 << 32;

/// Generic "off / none / object 0 / blob 0" value
pub const PROP_NONE: u64 = 0;
