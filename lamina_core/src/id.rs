// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View, layer, and surface identity types.

use core::fmt;

/// A stable identifier for a registered view, derived from its unique name.
///
/// Ids are the 64-bit FNV-1a hash of the name's UTF-8 bytes, so the same
/// name always produces the same id, across processes and across builds.
/// This lets call sites refer to views by a `const` id without holding a
/// reference to the registry.
///
/// ```
/// use lamina_core::id::ViewId;
///
/// const MAIN_MENU: ViewId = ViewId::from_name("MainMenu");
/// assert_eq!(MAIN_MENU, ViewId::from_name("MainMenu"));
/// assert_ne!(MAIN_MENU, ViewId::from_name("GameHud"));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u64);

impl ViewId {
    /// Derives the id for a view name.
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        // FNV-1a over the UTF-8 bytes of the name.
        let bytes = name.as_bytes();
        let mut hash = 0xcbf2_9ce4_8422_2325_u64;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(0x100_0000_01b3);
            i += 1;
        }
        Self(hash)
    }

    /// Returns the raw hash value (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewId({:016x})", self.0)
    }
}

/// A handle to a layer in a [`LayerTable`](crate::layer::LayerTable).
///
/// The value is the layer's order index: layers with a higher index stack
/// above layers with a lower one, and overlay scans walk indices from
/// highest to lowest.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u32);

impl LayerId {
    /// Returns the order index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

/// An opaque reference to a node in the embedder's presentation tree.
///
/// The engine mints surface ids for layer containers, the dialog container,
/// and each live view instance; the embedder maps them to whatever its UI
/// toolkit uses for parenting and sibling ordering. Core code never
/// interprets the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

/// Opaque auxiliary-channel flags carried per layer.
///
/// Registrars may attach extra channel requirements to a layer (for
/// example, additional vertex channels on the layer's canvas). Core
/// passes the mask through to the embedder without interpreting it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelMask(pub u32);

impl ChannelMask {
    /// No auxiliary channels requested.
    pub const NONE: Self = Self(0);
}

impl fmt::Debug for ChannelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelMask({:#x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_id_is_stable() {
        assert_eq!(ViewId::from_name("MainMenu"), ViewId::from_name("MainMenu"));
        assert_eq!(
            ViewId::from_name("MainMenu").raw(),
            ViewId::from_name("MainMenu").raw()
        );
    }

    #[test]
    fn view_id_distinguishes_names() {
        assert_ne!(ViewId::from_name("MainMenu"), ViewId::from_name("GameHud"));
        assert_ne!(ViewId::from_name(""), ViewId::from_name(" "));
    }

    #[test]
    fn view_id_is_const_evaluable() {
        const ID: ViewId = ViewId::from_name("Settings");
        assert_eq!(ID, ViewId::from_name("Settings"));
    }

    #[test]
    fn layer_id_orders_by_index() {
        assert!(LayerId(0) < LayerId(1));
        assert_eq!(LayerId(3).index(), 3);
    }
}
