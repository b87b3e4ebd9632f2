//! Texture resources as seen by composites

use crate::placeholder::PlaceholderKind;
use kiln_core::AssetId;
use std::rc::Rc;

/// Shape of a texture resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Texture2D,
    Cubemap,
}

/// A resolved texture. Backend upload is not modeled here.
#[derive(Debug)]
pub struct Texture {
    pub label: String,
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    /// The asset this texture was loaded from
    pub source: Option<AssetId>,
    /// Set only on textures created by the placeholder table
    pub placeholder: Option<PlaceholderKind>,
    /// Single texel for 1x1 textures
    pub texel: Option<[u8; 4]>,
}

impl Texture {
    pub fn new(label: impl Into<String>, kind: TextureKind, width: u32, height: u32) -> Self {
        Self {
            label: label.into(),
            kind,
            width,
            height,
            source: None,
            placeholder: None,
            texel: None,
        }
    }

    pub fn from_asset(mut self, id: AssetId) -> Self {
        self.source = Some(id);
        self
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    pub fn into_handle(self) -> TextureHandle {
        Rc::new(self)
    }
}

/// Shared handle to a texture. Identity (not contents) decides whether two bindings are the same.
pub type TextureHandle = Rc<Texture>;

/// Identity comparison of two texture handles
pub fn same_texture(a: &TextureHandle, b: &TextureHandle) -> bool {
    Rc::ptr_eq(a, b)
}

/// Number of prefiltered levels carried by a cubemap asset
pub const PREFILTERED_LEVELS: usize = 6;

/// The resources of a cubemap asset: the cubemap itself plus its prefiltered mip chain.
///
/// Any member may be missing while the asset is partially available.
#[derive(Debug, Clone, Default)]
pub struct CubemapSet {
    pub cubemap: Option<TextureHandle>,
    pub prefiltered: Vec<Option<TextureHandle>>,
}

impl CubemapSet {
    pub fn new(cubemap: TextureHandle) -> Self {
        Self {
            cubemap: Some(cubemap),
            prefiltered: Vec::new(),
        }
    }

    pub fn with_prefiltered(mut self, levels: Vec<Option<TextureHandle>>) -> Self {
        self.prefiltered = levels;
        self
    }

    /// The whole prefiltered chain, only when every level is present
    pub fn complete_chain(&self) -> Option<Vec<TextureHandle>> {
        if self.prefiltered.is_empty() {
            return None;
        }
        self.prefiltered.iter().cloned().collect()
    }

    /// The first prefiltered level, used as an environment atlas
    pub fn first_level(&self) -> Option<TextureHandle> {
        self.prefiltered.first().cloned().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(i: usize) -> Option<TextureHandle> {
        Some(Texture::new(format!("level{}", i), TextureKind::Cubemap, 128 >> i, 128 >> i).into_handle())
    }

    #[test]
    fn test_same_texture_is_identity() {
        let a = Texture::new("a", TextureKind::Texture2D, 1, 1).into_handle();
        let b = Texture::new("a", TextureKind::Texture2D, 1, 1).into_handle();
        assert!(same_texture(&a, &a.clone()));
        assert!(!same_texture(&a, &b));
    }

    #[test]
    fn test_complete_chain_requires_all_levels() {
        let cube = Texture::new("sky", TextureKind::Cubemap, 256, 256).into_handle();
        let full = CubemapSet::new(cube.clone())
            .with_prefiltered((0..PREFILTERED_LEVELS).map(level).collect());
        assert_eq!(full.complete_chain().map(|c| c.len()), Some(PREFILTERED_LEVELS));

        let mut partial_levels: Vec<_> = (0..PREFILTERED_LEVELS).map(level).collect();
        partial_levels[3] = None;
        let partial = CubemapSet::new(cube).with_prefiltered(partial_levels);
        assert!(partial.complete_chain().is_none());
        assert!(partial.first_level().is_some());
    }

    #[test]
    fn test_empty_chain_is_not_complete() {
        let cube = Texture::new("sky", TextureKind::Cubemap, 256, 256).into_handle();
        let set = CubemapSet::new(cube);
        assert!(set.complete_chain().is_none());
        assert!(set.first_level().is_none());
    }
}
