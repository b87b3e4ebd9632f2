//! Resource provider contract and its notifications

use crate::material::MaterialData;
use crate::texture::{CubemapSet, TextureHandle};
use crate::types::{AssetMeta, AssetRef};
use kiln_core::{AssetId, Result};

/// The loaded value of an asset
#[derive(Debug, Clone)]
pub enum AssetResource {
    Texture(TextureHandle),
    Cubemap(CubemapSet),
    Material(MaterialData),
}

impl AssetResource {
    pub fn as_texture(&self) -> Option<&TextureHandle> {
        match self {
            AssetResource::Texture(tex) => Some(tex),
            _ => None,
        }
    }

    pub fn as_cubemap(&self) -> Option<&CubemapSet> {
        match self {
            AssetResource::Cubemap(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_material(&self) -> Option<&MaterialData> {
        match self {
            AssetResource::Material(data) => Some(data),
            _ => None,
        }
    }
}

/// Kind of provider notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    /// The asset now exists in the provider (not necessarily loaded)
    Add,
    /// The asset finished loading
    Load,
    /// The asset was removed from the provider
    Remove,
    /// The asset's resource was released; the asset still exists
    Unload,
    /// The asset's source data changed
    Change,
}

/// A notification about one asset.
///
/// `resource` carries the value the event refers to: the newly loaded value for `Load`,
/// the value being released for `Remove`/`Unload`.
#[derive(Debug, Clone)]
pub struct ProviderEvent {
    pub kind: ProviderEventKind,
    pub asset: AssetId,
    pub path: Option<String>,
    pub resource: Option<AssetResource>,
}

impl ProviderEvent {
    pub fn new(kind: ProviderEventKind, asset: AssetId) -> Self {
        Self {
            kind,
            asset,
            path: None,
            resource: None,
        }
    }

    pub fn with_path(mut self, path: Option<String>) -> Self {
        self.path = path;
        self
    }

    pub fn with_resource(mut self, resource: Option<AssetResource>) -> Self {
        self.resource = resource;
        self
    }

    /// True if this event names the asset addressed by `target`
    pub fn matches(&self, target: &AssetRef) -> bool {
        match target {
            AssetRef::Id(id) => *id == self.asset,
            AssetRef::Path(path) => self.path.as_deref() == Some(path.as_str()),
        }
    }
}

/// Subsystem owning identity and load state of addressable resources.
///
/// Loads are fire-and-forget: `load` only requests; completion arrives later as a
/// `Load` event.
pub trait ResourceProvider {
    /// Look up an asset by id or path
    fn find(&self, target: &AssetRef) -> Option<AssetId>;

    /// The loaded value of an asset, `None` while unloaded or loading
    fn resource(&self, id: AssetId) -> Option<AssetResource>;

    /// Request an asynchronous load. Repeated requests for a loading or loaded asset are no-ops.
    fn load(&mut self, id: AssetId);

    fn is_loaded(&self, id: AssetId) -> bool {
        self.resource(id).is_some()
    }
}

/// Produces the resource for an asset when the provider processes its load queue
pub trait ResourceLoader {
    fn load(&mut self, id: AssetId, meta: &AssetMeta) -> Result<AssetResource>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{Texture, TextureKind};

    #[test]
    fn test_event_matches_by_id_and_path() {
        let id = AssetId::from_raw(5);
        let event = ProviderEvent::new(ProviderEventKind::Add, id)
            .with_path(Some("textures/a.png".into()));

        assert!(event.matches(&AssetRef::Id(id)));
        assert!(event.matches(&AssetRef::Path("textures/a.png".into())));
        assert!(!event.matches(&AssetRef::Id(AssetId::from_raw(6))));
        assert!(!event.matches(&AssetRef::Path("textures/b.png".into())));
    }

    #[test]
    fn test_resource_accessors() {
        let tex = Texture::new("a", TextureKind::Texture2D, 1, 1).into_handle();
        let res = AssetResource::Texture(tex);
        assert!(res.as_texture().is_some());
        assert!(res.as_cubemap().is_none());
        assert!(res.as_material().is_none());
    }
}
