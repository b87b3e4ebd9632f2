//! In-memory asset registry implementing the resource provider contract

use crate::provider::{
    AssetResource, ProviderEvent, ProviderEventKind, ResourceLoader, ResourceProvider,
};
use crate::material::MaterialData;
use crate::types::{AssetManifest, AssetMeta, AssetRef, AssetType};
use kiln_core::{AssetId, EventBus, KilnError, Result};
use std::collections::{HashMap, VecDeque};
use std::path::Path;

/// Load state of a registered asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug)]
struct AssetEntry {
    meta: AssetMeta,
    state: LoadState,
    resource: Option<AssetResource>,
}

/// Registry of known assets, their load state, and pending notifications.
///
/// Every mutation that other subsystems care about is queued as a [`ProviderEvent`];
/// consumers drain the queue with [`AssetRegistry::drain_events`].
#[derive(Default)]
pub struct AssetRegistry {
    assets: HashMap<AssetId, AssetEntry>,
    /// Path to id index for path-addressed lookups
    path_index: HashMap<String, AssetId>,
    /// Name to id index
    name_index: HashMap<String, AssetId>,
    load_queue: VecDeque<AssetId>,
    events: EventBus<ProviderEvent>,
    load_requests: usize,
}

impl AssetRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every asset listed in a TOML manifest
    pub fn load_manifest_str(&mut self, content: &str) -> Result<Vec<AssetId>> {
        let manifest: AssetManifest = toml::from_str(content)?;
        Ok(manifest
            .assets
            .into_iter()
            .map(|meta| self.register(meta))
            .collect())
    }

    /// Register every asset listed in a TOML manifest file
    pub fn load_manifest_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<AssetId>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        self.load_manifest_str(&content).map_err(|e| {
            KilnError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Register an asset and announce it with an `Add` event
    pub fn register(&mut self, meta: AssetMeta) -> AssetId {
        let id = match meta.id {
            Some(id) => {
                AssetId::ensure_counter_above(id.raw());
                id
            }
            None => AssetId::new(),
        };

        if let Some(previous) = self.unindex(id) {
            log::warn!("asset {} registered twice, replacing previous entry", id);
            self.load_queue.retain(|queued| *queued != id);
            self.events.push(
                ProviderEvent::new(ProviderEventKind::Remove, id)
                    .with_path(previous.meta.path)
                    .with_resource(previous.resource),
            );
        }

        let mut meta = meta;
        meta.id = Some(id);
        if let Some(path) = &meta.path {
            self.path_index.insert(path.clone(), id);
        }
        self.name_index.insert(meta.name.clone(), id);

        let path = meta.path.clone();
        self.assets.insert(
            id,
            AssetEntry {
                meta,
                state: LoadState::Unloaded,
                resource: None,
            },
        );

        log::debug!("asset {} added", id);
        self.events
            .push(ProviderEvent::new(ProviderEventKind::Add, id).with_path(path));
        id
    }

    /// Register an asset whose resource is already available
    pub fn register_loaded(&mut self, meta: AssetMeta, resource: AssetResource) -> AssetId {
        let id = self.register(meta);
        self.complete_load(id, resource);
        id
    }

    /// Remove an asset, releasing its resource
    pub fn remove(&mut self, id: AssetId) -> bool {
        let Some(entry) = self.unindex(id) else {
            return false;
        };
        self.load_queue.retain(|queued| *queued != id);

        log::debug!("asset {} removed", id);
        self.events.push(
            ProviderEvent::new(ProviderEventKind::Remove, id)
                .with_path(entry.meta.path)
                .with_resource(entry.resource),
        );
        true
    }

    /// Release an asset's resource while keeping it registered
    pub fn unload(&mut self, id: AssetId) -> bool {
        let Some(entry) = self.assets.get_mut(&id) else {
            return false;
        };
        let Some(resource) = entry.resource.take() else {
            return false;
        };
        entry.state = LoadState::Unloaded;

        log::debug!("asset {} unloaded", id);
        let path = entry.meta.path.clone();
        self.events.push(
            ProviderEvent::new(ProviderEventKind::Unload, id)
                .with_path(path)
                .with_resource(Some(resource)),
        );
        true
    }

    /// Store a loaded resource and announce it with a `Load` event
    pub fn complete_load(&mut self, id: AssetId, resource: AssetResource) -> bool {
        let Some(entry) = self.assets.get_mut(&id) else {
            log::warn!("load completed for unknown asset {}", id);
            return false;
        };
        entry.state = LoadState::Loaded;
        entry.resource = Some(resource.clone());

        log::debug!("asset {} loaded", id);
        let path = entry.meta.path.clone();
        self.events.push(
            ProviderEvent::new(ProviderEventKind::Load, id)
                .with_path(path)
                .with_resource(Some(resource)),
        );
        true
    }

    /// Mark a load as failed. Consumers keep whatever fallback they hold.
    pub fn fail_load(&mut self, id: AssetId, error: &KilnError) {
        if let Some(entry) = self.assets.get_mut(&id) {
            entry.state = LoadState::Failed;
            log::warn!("failed to load asset '{}' ({}): {}", entry.meta.name, id, error);
        }
    }

    /// Replace a material asset's data and announce it with a `Change` event
    pub fn set_material_data(&mut self, id: AssetId, data: MaterialData) -> bool {
        let Some(entry) = self.assets.get_mut(&id) else {
            return false;
        };
        if entry.meta.asset_type != AssetType::Material {
            return false;
        }
        entry.resource = Some(AssetResource::Material(data));
        entry.state = LoadState::Loaded;

        let path = entry.meta.path.clone();
        self.events
            .push(ProviderEvent::new(ProviderEventKind::Change, id).with_path(path));
        true
    }

    /// Run queued loads through `loader`. Returns the number of completed loads.
    pub fn process_loads(&mut self, loader: &mut dyn ResourceLoader) -> usize {
        self.process_loads_limited(loader, usize::MAX)
    }

    /// Run at most `max` queued loads through `loader`, oldest first
    pub fn process_loads_limited(&mut self, loader: &mut dyn ResourceLoader, max: usize) -> usize {
        let mut completed = 0;
        let mut attempted = 0;
        while attempted < max {
            let Some(id) = self.load_queue.pop_front() else {
                break;
            };
            attempted += 1;
            let Some(entry) = self.assets.get(&id) else {
                continue;
            };
            if entry.state != LoadState::Loading {
                continue;
            }
            let meta = entry.meta.clone();
            match loader.load(id, &meta) {
                Ok(resource) => {
                    self.complete_load(id, resource);
                    completed += 1;
                }
                Err(e) => self.fail_load(id, &e),
            }
        }
        completed
    }

    /// Assets waiting in the load queue
    pub fn pending_loads(&self) -> Vec<AssetId> {
        self.load_queue.iter().copied().collect()
    }

    /// Number of load requests accepted so far
    pub fn load_requests(&self) -> usize {
        self.load_requests
    }

    /// Drain queued notifications, oldest first
    pub fn drain_events(&mut self) -> Vec<ProviderEvent> {
        self.events.drain()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get asset metadata by id
    pub fn get(&self, id: AssetId) -> Option<&AssetMeta> {
        self.assets.get(&id).map(|e| &e.meta)
    }

    /// Get an asset id by name
    pub fn id_by_name(&self, name: &str) -> Option<AssetId> {
        self.name_index.get(name).copied()
    }

    pub fn state(&self, id: AssetId) -> Option<LoadState> {
        self.assets.get(&id).map(|e| e.state)
    }

    /// Get all asset ids of a given type
    pub fn by_type(&self, asset_type: AssetType) -> Vec<AssetId> {
        self.assets
            .iter()
            .filter(|(_, e)| e.meta.asset_type == asset_type)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Get the number of registered assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn unindex(&mut self, id: AssetId) -> Option<AssetEntry> {
        let entry = self.assets.remove(&id)?;
        if let Some(path) = &entry.meta.path {
            if self.path_index.get(path) == Some(&id) {
                self.path_index.remove(path);
            }
        }
        if self.name_index.get(&entry.meta.name) == Some(&id) {
            self.name_index.remove(&entry.meta.name);
        }
        Some(entry)
    }
}

impl ResourceProvider for AssetRegistry {
    fn find(&self, target: &AssetRef) -> Option<AssetId> {
        match target {
            AssetRef::Id(id) => self.assets.contains_key(id).then_some(*id),
            AssetRef::Path(path) => self.path_index.get(path).copied(),
        }
    }

    fn resource(&self, id: AssetId) -> Option<AssetResource> {
        self.assets
            .get(&id)
            .filter(|e| e.state == LoadState::Loaded)
            .and_then(|e| e.resource.clone())
    }

    fn load(&mut self, id: AssetId) {
        let Some(entry) = self.assets.get_mut(&id) else {
            log::warn!("load requested for unknown asset {}", id);
            return;
        };
        match entry.state {
            LoadState::Loading | LoadState::Loaded => {}
            LoadState::Unloaded | LoadState::Failed => {
                entry.state = LoadState::Loading;
                self.load_queue.push_back(id);
                self.load_requests += 1;
                log::trace!("asset {} queued for load", id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{Texture, TextureKind};

    struct TextureLoader {
        fail: bool,
    }

    impl ResourceLoader for TextureLoader {
        fn load(&mut self, id: AssetId, meta: &AssetMeta) -> Result<AssetResource> {
            if self.fail {
                return Err(KilnError::AssetLoadFailed(meta.name.clone()));
            }
            Ok(AssetResource::Texture(
                Texture::new(meta.name.clone(), TextureKind::Texture2D, 4, 4)
                    .from_asset(id)
                    .into_handle(),
            ))
        }
    }

    fn stone() -> AssetMeta {
        AssetMeta::new("stone", AssetType::Texture).with_path("textures/stone.png")
    }

    #[test]
    fn test_register_emits_add() {
        let mut registry = AssetRegistry::new();
        let id = registry.register(stone());

        let events = registry.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ProviderEventKind::Add);
        assert_eq!(events[0].asset, id);
        assert_eq!(events[0].path.as_deref(), Some("textures/stone.png"));
        assert_eq!(registry.state(id), Some(LoadState::Unloaded));
    }

    #[test]
    fn test_find_by_id_and_path() {
        let mut registry = AssetRegistry::new();
        let id = registry.register(stone());

        assert_eq!(registry.find(&AssetRef::Id(id)), Some(id));
        assert_eq!(
            registry.find(&AssetRef::Path("textures/stone.png".into())),
            Some(id)
        );
        assert_eq!(registry.find(&AssetRef::Path("missing.png".into())), None);
        assert_eq!(registry.id_by_name("stone"), Some(id));
    }

    #[test]
    fn test_load_is_queued_once() {
        let mut registry = AssetRegistry::new();
        let id = registry.register(stone());

        registry.load(id);
        registry.load(id);
        assert_eq!(registry.pending_loads(), vec![id]);
        assert_eq!(registry.load_requests(), 1);
        assert_eq!(registry.state(id), Some(LoadState::Loading));
        assert!(registry.resource(id).is_none());
    }

    #[test]
    fn test_process_loads_emits_load() {
        let mut registry = AssetRegistry::new();
        let id = registry.register(stone());
        registry.drain_events();

        registry.load(id);
        let completed = registry.process_loads(&mut TextureLoader { fail: false });

        assert_eq!(completed, 1);
        assert!(registry.is_loaded(id));
        let events = registry.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ProviderEventKind::Load);
        assert!(events[0].resource.is_some());
    }

    #[test]
    fn test_limited_processing_keeps_queue_order() {
        let mut registry = AssetRegistry::new();
        let a = registry.register(AssetMeta::new("a", AssetType::Texture));
        let b = registry.register(AssetMeta::new("b", AssetType::Texture));
        registry.load(a);
        registry.load(b);

        assert_eq!(registry.process_loads_limited(&mut TextureLoader { fail: false }, 1), 1);
        assert!(registry.is_loaded(a));
        assert_eq!(registry.pending_loads(), vec![b]);
    }

    #[test]
    fn test_failed_load_keeps_asset_unloaded() {
        let mut registry = AssetRegistry::new();
        let id = registry.register(stone());
        registry.drain_events();

        registry.load(id);
        let completed = registry.process_loads(&mut TextureLoader { fail: true });

        assert_eq!(completed, 0);
        assert_eq!(registry.state(id), Some(LoadState::Failed));
        assert!(!registry.has_pending_events());

        // A failed asset may be requested again
        registry.load(id);
        assert_eq!(registry.state(id), Some(LoadState::Loading));
    }

    #[test]
    fn test_unload_carries_released_resource() {
        let mut registry = AssetRegistry::new();
        let tex = Texture::new("stone", TextureKind::Texture2D, 4, 4).into_handle();
        let id = registry.register_loaded(stone(), AssetResource::Texture(tex.clone()));
        registry.drain_events();

        assert!(registry.unload(id));
        assert!(!registry.unload(id));

        let events = registry.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ProviderEventKind::Unload);
        let released = events[0].resource.as_ref().and_then(|r| r.as_texture()).unwrap();
        assert!(std::rc::Rc::ptr_eq(released, &tex));
        assert_eq!(registry.state(id), Some(LoadState::Unloaded));
    }

    #[test]
    fn test_remove_unindexes() {
        let mut registry = AssetRegistry::new();
        let id = registry.register(stone());
        registry.load(id);

        assert!(registry.remove(id));
        assert!(registry.is_empty());
        assert!(registry.pending_loads().is_empty());
        assert_eq!(
            registry.find(&AssetRef::Path("textures/stone.png".into())),
            None
        );
        let kinds: Vec<_> = registry.drain_events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ProviderEventKind::Add, ProviderEventKind::Remove]);
    }

    #[test]
    fn test_reregister_removes_previous_entry() {
        let mut registry = AssetRegistry::new();
        let id = registry.register_loaded(
            stone(),
            AssetResource::Texture(Texture::new("stone", TextureKind::Texture2D, 4, 4).into_handle()),
        );
        registry.drain_events();

        let again = registry.register(
            AssetMeta::new("granite", AssetType::Texture)
                .with_id(id)
                .with_path("textures/granite.png"),
        );
        assert_eq!(again, id);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.state(id), Some(LoadState::Unloaded));
        assert_eq!(
            registry.find(&AssetRef::Path("textures/stone.png".into())),
            None
        );

        let events = registry.drain_events();
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ProviderEventKind::Remove, ProviderEventKind::Add]);
        assert_eq!(events[0].path.as_deref(), Some("textures/stone.png"));
        assert!(events[0].resource.is_some());
        assert_eq!(events[1].path.as_deref(), Some("textures/granite.png"));
    }

    #[test]
    fn test_manifest_registration() {
        let mut registry = AssetRegistry::new();
        let ids = registry
            .load_manifest_str(
                r#"
[[asset]]
id = 900
name = "stone"
type = "texture"
path = "textures/stone.png"

[[asset]]
name = "stone_mat"
type = "material"
"#,
            )
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], AssetId::from_raw(900));
        assert_eq!(registry.by_type(AssetType::Material), vec![ids[1]]);
        assert!(ids[1].raw() > 900);
    }

    #[test]
    fn test_set_material_data_emits_change() {
        let mut registry = AssetRegistry::new();
        let id = registry.register(AssetMeta::new("mat", AssetType::Material));
        registry.drain_events();

        assert!(registry.set_material_data(id, MaterialData::default()));
        let events = registry.drain_events();
        assert_eq!(events[0].kind, ProviderEventKind::Change);
        assert!(registry.resource(id).and_then(|r| r.as_material().cloned()).is_some());
    }

    #[test]
    fn test_manifest_file() {
        let path = std::env::temp_dir().join(format!("kiln-manifest-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[[asset]]\nname = \"sky\"\ntype = \"cubemap\"\npath = \"env/sky.hdr\"\n",
        )
        .unwrap();

        let mut registry = AssetRegistry::new();
        let ids = registry.load_manifest_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ids.len(), 1);
        assert_eq!(registry.get(ids[0]).unwrap().asset_type, AssetType::Cubemap);
        assert!(registry.load_manifest_file("/nonexistent/kiln.toml").is_err());
    }
}
