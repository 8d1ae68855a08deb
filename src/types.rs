//! Core types for spark-component.
//!
//! These types describe where an element is in its lifecycle and why an
//! update was scheduled. They flow from the state cells through the
//! scheduler to the renderer and the lifecycle hooks.

use std::fmt;

// =============================================================================
// Lifecycle
// =============================================================================

/// Lifecycle state of an element.
///
/// ```text
/// Unattached ──attach──▶ Attaching ──first render──▶ Mounted
///                            │                          │
///                            └────────detach────────────┴──▶ Unmounted
///                                                              │
///                            Attaching ◀────────attach─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    /// Constructed, never attached. The render root exists but the host
    /// has not inserted the element anywhere.
    #[default]
    Unattached,
    /// Attached by the host, waiting for the first render to settle.
    Attaching,
    /// First render after attachment settled and `component_did_mount` ran.
    Mounted,
    /// Detached by the host. `component_did_unmount` ran.
    Unmounted,
}

impl Lifecycle {
    /// Whether the host currently holds the element (attaching or mounted).
    pub fn is_attached(self) -> bool {
        matches!(self, Self::Attaching | Self::Mounted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unattached => "unattached",
            Self::Attaching => "attaching",
            Self::Mounted => "mounted",
            Self::Unmounted => "unmounted",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Update Reasons (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Why a coalescing window was opened or joined.
    ///
    /// Every request made while a window is pending ORs its reason in, so a
    /// single render can carry several: `UpdateReason::PROPS | UpdateReason::STATE`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UpdateReason: u8 {
        /// `props` was written.
        const PROPS = 1 << 0;
        /// `state` was written.
        const STATE = 1 << 1;
        /// `request_update()` was called directly.
        const REQUESTED = 1 << 2;
        /// The host attached the element.
        const ATTACH = 1 << 3;
    }
}
