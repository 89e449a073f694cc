//! Surface identity: stable ids, interned tags and the packed form stored on colliders.

use std::collections::HashMap;

use crate::layers::Layer;

/// Stable identifier for a level surface (static or moving).
pub type SurfaceId = u32;

/// Interned surface tag. Compared by id; names live in the [`TagRegistry`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag(u32);

/// Resolves tag names to [`Tag`]s once, during scene setup.
///
/// Motion code only ever compares interned ids, never strings per tick.
#[derive(Default, Debug)]
pub struct TagRegistry {
    names: Vec<String>,
    by_name: HashMap<String, Tag>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tag for `name`, registering it if unseen.
    pub fn intern(&mut self, name: &str) -> Tag {
        if let Some(tag) = self.by_name.get(name) {
            return *tag;
        }
        let tag = Tag(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.by_name.insert(name.to_owned(), tag);
        tag
    }

    pub fn get(&self, name: &str) -> Option<Tag> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, tag: Tag) -> Option<&str> {
        self.names.get(tag.0 as usize).map(String::as_str)
    }
}

/// Everything a query hit needs to know about the surface it struck.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SurfaceInfo {
    pub id: SurfaceId,
    pub layer: Layer,
    pub tag: Option<Tag>,
}

/// Packed form of [`SurfaceInfo`], stored in a collider's `user_data`.
///
/// # Bit layout
/// Least-significant bit = bit 0:
///
/// - bits 0..=31   : `SurfaceId` (u32)
/// - bits 32..=39  : layer bit index (u8)
/// - bits 40..=71  : tag index + 1 (u32), zero when untagged
/// - bits 72..=127 : reserved (zero)
pub type PackedSurface = u128;

const LAYER_SHIFT: u32 = SurfaceId::BITS;
const TAG_SHIFT: u32 = LAYER_SHIFT + u8::BITS;

pub fn pack_surface(info: SurfaceInfo) -> PackedSurface {
    let tag = info.tag.map(|t| t.0 as u128 + 1).unwrap_or(0);
    (info.id as u128) | ((info.layer.0 as u128) << LAYER_SHIFT) | (tag << TAG_SHIFT)
}

pub fn unpack_surface(packed: PackedSurface) -> SurfaceInfo {
    let id = (packed & SurfaceId::MAX as u128) as SurfaceId;
    let layer = Layer(((packed >> LAYER_SHIFT) & u8::MAX as u128) as u8);
    let tag = ((packed >> TAG_SHIFT) & u32::MAX as u128) as u32;
    SurfaceInfo {
        id,
        layer,
        tag: tag.checked_sub(1).map(Tag),
    }
}
