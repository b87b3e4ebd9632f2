//! A single named dependency slot of a composite

use crate::provider::ProviderEvent;
use crate::texture::TextureKind;
use crate::types::AssetRef;
use kiln_core::AssetId;

/// Tracks which asset one slot of a composite depends on.
///
/// A reference is created the first time its slot names a dependency and stays subscribed
/// to provider events for that dependency until it is cleared.
#[derive(Debug, Clone)]
pub struct ResourceReference {
    name: String,
    shape: TextureKind,
    target: Option<AssetRef>,
    /// Provider entry the target resolved to, once known
    asset: Option<AssetId>,
    subscribed: bool,
    load_requested: bool,
}

impl ResourceReference {
    pub fn new(name: impl Into<String>, shape: TextureKind) -> Self {
        Self {
            name: name.into(),
            shape,
            target: None,
            asset: None,
            subscribed: true,
            load_requested: false,
        }
    }

    /// Point the reference at `target`. Returns true if the target changed, in which case
    /// load bookkeeping starts over.
    pub fn set_target(&mut self, target: AssetRef) -> bool {
        if self.target.as_ref() == Some(&target) {
            return false;
        }
        self.target = Some(target);
        self.asset = None;
        self.load_requested = false;
        self.subscribed = true;
        true
    }

    /// Drop the target and stop listening for events
    pub fn clear(&mut self) {
        self.target = None;
        self.asset = None;
        self.subscribed = false;
        self.load_requested = false;
    }

    /// True if `event` concerns this reference's dependency
    pub fn matches(&self, event: &ProviderEvent) -> bool {
        if !self.subscribed {
            return false;
        }
        if self.asset == Some(event.asset) {
            return true;
        }
        self.target.as_ref().is_some_and(|t| event.matches(t))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> TextureKind {
        self.shape
    }

    pub fn target(&self) -> Option<&AssetRef> {
        self.target.as_ref()
    }

    pub fn asset(&self) -> Option<AssetId> {
        self.asset
    }

    pub fn set_asset(&mut self, asset: Option<AssetId>) {
        self.asset = asset;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn load_requested(&self) -> bool {
        self.load_requested
    }

    pub fn mark_load_requested(&mut self) {
        self.load_requested = true;
    }

    /// Forget a previous load request so the next resolve may issue a new one
    pub fn reset_load(&mut self) {
        self.load_requested = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderEventKind;

    #[test]
    fn test_set_target_resets_bookkeeping() {
        let mut reference = ResourceReference::new("diffuseMap", TextureKind::Texture2D);
        assert!(reference.set_target(AssetRef::Id(AssetId::from_raw(1))));
        reference.mark_load_requested();
        reference.set_asset(Some(AssetId::from_raw(1)));

        assert!(!reference.set_target(AssetRef::Id(AssetId::from_raw(1))));
        assert!(reference.load_requested());

        assert!(reference.set_target(AssetRef::Id(AssetId::from_raw(2))));
        assert!(!reference.load_requested());
        assert_eq!(reference.asset(), None);
    }

    #[test]
    fn test_matches_by_target_path() {
        let mut reference = ResourceReference::new("normalMap", TextureKind::Texture2D);
        reference.set_target(AssetRef::Path("tex/n.png".into()));

        let hit = ProviderEvent::new(ProviderEventKind::Load, AssetId::from_raw(9))
            .with_path(Some("tex/n.png".into()));
        let miss = ProviderEvent::new(ProviderEventKind::Load, AssetId::from_raw(10))
            .with_path(Some("tex/other.png".into()));
        assert!(reference.matches(&hit));
        assert!(!reference.matches(&miss));
    }

    #[test]
    fn test_cleared_reference_ignores_events() {
        let id = AssetId::from_raw(3);
        let mut reference = ResourceReference::new("aoMap", TextureKind::Texture2D);
        reference.set_target(AssetRef::Id(id));
        reference.clear();

        assert!(!reference.is_subscribed());
        assert!(!reference.matches(&ProviderEvent::new(ProviderEventKind::Load, id)));
    }
}
