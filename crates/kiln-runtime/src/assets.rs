//! Asset system: streams queued loads and delivers provider events each frame

use crate::app::AppHandle;
use crate::events::FrameEvent;
use crate::system::RuntimeSystem;
use kiln_asset::{AssetRegistry, MaterialLibrary, ResourceLoader};
use kiln_core::Result;
use std::cell::RefCell;
use std::rc::Rc;

/// Runtime system that owns the asset loader and keeps materials in sync with the registry
pub struct AssetSystem {
    registry: Rc<RefCell<AssetRegistry>>,
    library: Rc<RefCell<MaterialLibrary>>,
    loader: Box<dyn ResourceLoader>,
    /// Maximum loads completed per frame; 0 means no limit
    loads_per_frame: usize,
}

impl AssetSystem {
    pub fn new(
        registry: Rc<RefCell<AssetRegistry>>,
        library: Rc<RefCell<MaterialLibrary>>,
        loader: Box<dyn ResourceLoader>,
    ) -> Self {
        Self {
            registry,
            library,
            loader,
            loads_per_frame: 0,
        }
    }

    pub fn with_loads_per_frame(mut self, max: usize) -> Self {
        self.loads_per_frame = max;
        self
    }

    fn deliver(&mut self) -> usize {
        let mut registry = self.registry.borrow_mut();
        self.library.borrow_mut().process_events(&mut registry)
    }
}

impl RuntimeSystem for AssetSystem {
    fn initialize(&mut self, app: &AppHandle) -> Result<()> {
        let delivered = self.deliver();
        log::debug!("{}: asset system delivered {} startup events", app.id(), delivered);
        Ok(())
    }

    fn update(&mut self, frame: &FrameEvent) -> Result<()> {
        self.deliver();

        let loaded = {
            let mut registry = self.registry.borrow_mut();
            if self.loads_per_frame == 0 {
                registry.process_loads(self.loader.as_mut())
            } else {
                registry.process_loads_limited(self.loader.as_mut(), self.loads_per_frame)
            }
        };
        if loaded > 0 {
            log::trace!("frame {}: {} assets loaded", frame.frame, loaded);
        }

        self.deliver();
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        let library = self.library.borrow();
        log::debug!("asset system shut down with {} open materials", library.len());
        Ok(())
    }

    fn name(&self) -> &str {
        "assets"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Application;
    use crate::config::AppConfig;
    use crate::frame::ManualFrameSource;
    use kiln_asset::{
        AssetMeta, AssetResource, AssetType, Composite, MaterialData, SlotValue, Texture,
        TextureKind,
    };
    use kiln_core::AssetId;
    use kiln_render::HeadlessBackend;

    struct TextureLoader;

    impl ResourceLoader for TextureLoader {
        fn load(&mut self, id: AssetId, meta: &AssetMeta) -> Result<AssetResource> {
            Ok(AssetResource::Texture(
                Texture::new(meta.name.clone(), TextureKind::Texture2D, 8, 8)
                    .from_asset(id)
                    .into_handle(),
            ))
        }
    }

    #[test]
    fn test_textures_stream_into_material() {
        let registry = Rc::new(RefCell::new(AssetRegistry::new()));
        let library = Rc::new(RefCell::new(MaterialLibrary::new()));

        let (diffuse, normal, material) = {
            let mut reg = registry.borrow_mut();
            let diffuse = reg.register(AssetMeta::new("albedo", AssetType::Texture));
            let normal = reg.register(AssetMeta::new("bumps", AssetType::Texture));
            let data = MaterialData::default()
                .with_texture("diffuseMap", SlotValue::Id(diffuse.raw()))
                .with_texture("normalMap", SlotValue::Id(normal.raw()));
            let material = reg.register_loaded(
                AssetMeta::new("crate", AssetType::Material),
                AssetResource::Material(data),
            );
            (diffuse, normal, material)
        };

        let mut app = Application::new(HeadlessBackend::new(64, 64), ManualFrameSource::new());
        app.add_system(Box::new(
            AssetSystem::new(
                Rc::clone(&registry),
                Rc::clone(&library),
                Box::new(TextureLoader),
            )
            .with_loads_per_frame(1),
        ));
        app.initialize(AppConfig::default()).unwrap();
        app.start(0.0).unwrap();

        {
            let lib = library.borrow();
            let mat = lib.get(material).unwrap();
            let bound = [diffuse, normal]
                .into_iter()
                .filter(|id| mat.bindings().any(|(_, tex)| tex.source == Some(*id)))
                .count();
            assert_eq!(bound, 1);
        }

        app.tick(16.0).unwrap();

        let lib = library.borrow();
        let mat = lib.get(material).unwrap();
        assert_eq!(mat.binding("diffuseMap").unwrap().source, Some(diffuse));
        assert_eq!(mat.binding("normalMap").unwrap().source, Some(normal));
        assert!(!registry.borrow().has_pending_events());
    }
}
