//! Material library: owns materials and routes provider events to their resolvers

use crate::material::{Composite, Material, MaterialData};
use crate::placeholder::PlaceholderTextures;
use crate::provider::{AssetResource, ProviderEvent, ProviderEventKind, ResourceProvider};
use crate::registry::AssetRegistry;
use crate::resolver::DependencyResolver;
use crate::slot::{SlotDecl, SlotSchema};
use kiln_core::{AssetId, Result};
use std::collections::BTreeMap;
use std::rc::Rc;

/// An open material together with the data it was built from
pub struct MaterialAsset {
    pub id: AssetId,
    pub path: Option<String>,
    pub data: MaterialData,
    pub material: Material,
    resolver: DependencyResolver,
}

impl MaterialAsset {
    pub fn resolver(&self) -> &DependencyResolver {
        &self.resolver
    }
}

/// Every open material shares one placeholder table and one pair of slot schemas
pub struct MaterialLibrary {
    materials: BTreeMap<AssetId, MaterialAsset>,
    placeholders: Rc<PlaceholderTextures>,
    textures: Rc<SlotSchema>,
    cubemaps: Rc<SlotSchema>,
}

impl MaterialLibrary {
    /// Library over the standard material slots
    pub fn new() -> Self {
        Self {
            materials: BTreeMap::new(),
            placeholders: Rc::new(PlaceholderTextures::new()),
            textures: Rc::new(SlotSchema::standard_textures()),
            cubemaps: Rc::new(SlotSchema::standard_cubemaps()),
        }
    }

    /// Library whose texture schema is extended with declared slots
    pub fn with_texture_slots(decls: &[SlotDecl]) -> Result<Self> {
        let mut library = Self::new();
        library.textures = Rc::new(SlotSchema::standard_textures().with_declared(decls)?);
        Ok(library)
    }

    /// Open a material from its data and resolve its dependencies
    pub fn open(
        &mut self,
        id: AssetId,
        path: Option<String>,
        data: MaterialData,
        provider: &mut dyn ResourceProvider,
    ) -> Result<&Material> {
        let mut resolver = DependencyResolver::new(
            Rc::clone(&self.textures),
            Rc::clone(&self.cubemaps),
            Rc::clone(&self.placeholders),
        )?
        .with_base_path(path.clone());

        let name = data
            .name
            .clone()
            .unwrap_or_else(|| format!("material-{}", id));
        let mut material = Material::new(name);
        resolver.resolve(&data, provider, &mut material);
        log::debug!("material {} opened", id);

        if let Some(mut previous) = self.materials.insert(
            id,
            MaterialAsset {
                id,
                path,
                data,
                material,
                resolver,
            },
        ) {
            previous.resolver.clear();
        }
        Ok(&self.materials[&id].material)
    }

    /// Replace a material's data and re-resolve. Returns true if bindings changed.
    pub fn update(
        &mut self,
        id: AssetId,
        data: MaterialData,
        provider: &mut dyn ResourceProvider,
    ) -> bool {
        let Some(asset) = self.materials.get_mut(&id) else {
            return false;
        };
        asset.data = data;
        let changed = asset.resolver.resolve(&asset.data, provider, &mut asset.material);
        if !changed {
            // Bindings are unchanged but parameters may not be
            asset.material.reinitialize(&asset.data);
        }
        changed
    }

    /// Tear down a material and unsubscribe its references
    pub fn close(&mut self, id: AssetId) -> bool {
        match self.materials.remove(&id) {
            Some(mut asset) => {
                asset.resolver.clear();
                log::debug!("material {} closed", id);
                true
            }
            None => false,
        }
    }

    /// Drain the registry's notifications and deliver each one. Returns the number handled.
    pub fn process_events(&mut self, registry: &mut AssetRegistry) -> usize {
        let events = registry.drain_events();
        for event in &events {
            self.handle_event(event, registry);
        }
        events.len()
    }

    /// Deliver one provider notification
    pub fn handle_event(&mut self, event: &ProviderEvent, provider: &mut dyn ResourceProvider) {
        match event.kind {
            ProviderEventKind::Load => {
                if let Some(AssetResource::Material(data)) = &event.resource {
                    if self.materials.contains_key(&event.asset) {
                        self.update(event.asset, data.clone(), provider);
                    } else if let Err(e) =
                        self.open(event.asset, event.path.clone(), data.clone(), provider)
                    {
                        log::error!("failed to open material {}: {}", event.asset, e);
                    }
                    return;
                }
            }
            ProviderEventKind::Change if self.materials.contains_key(&event.asset) => {
                if let Some(AssetResource::Material(data)) = provider.resource(event.asset) {
                    self.update(event.asset, data, provider);
                }
                return;
            }
            ProviderEventKind::Remove | ProviderEventKind::Unload
                if self.materials.contains_key(&event.asset) =>
            {
                self.close(event.asset);
                return;
            }
            _ => {}
        }

        for asset in self.materials.values_mut() {
            asset
                .resolver
                .handle_event(event, &asset.data, provider, &mut asset.material);
        }
    }

    pub fn get(&self, id: AssetId) -> Option<&Material> {
        self.materials.get(&id).map(|a| &a.material)
    }

    pub fn asset(&self, id: AssetId) -> Option<&MaterialAsset> {
        self.materials.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.materials.keys().copied()
    }

    pub fn placeholders(&self) -> &Rc<PlaceholderTextures> {
        &self.placeholders
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}
