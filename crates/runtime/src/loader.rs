use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, OnceLock};
use std::thread;

use pixel_novel::{story, Bitmap, SceneStore};
use tracing::{info, warn};

use crate::assets::ImageSource;

/// Shared slot for one requested image.
///
/// Set at most once by the loader thread; a failed load leaves it empty for
/// good, so the renderer keeps drawing the fallback.
#[derive(Clone, Debug)]
pub struct ImageHandle {
    path: Arc<str>,
    slot: Arc<OnceLock<Bitmap>>,
}

impl ImageHandle {
    pub fn pending(path: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            slot: Arc::new(OnceLock::new()),
        }
    }

    pub fn ready(path: impl Into<Arc<str>>, image: Bitmap) -> Self {
        let handle = Self::pending(path);
        let _ = handle.slot.set(image);
        handle
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn image(&self) -> Option<&Bitmap> {
        self.slot.get()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image().map(Bitmap::dimensions)
    }
}

enum LoadRequest {
    Prefetch(Vec<String>),
    Image(ImageHandle),
}

/// Background image decoder: one thread, requests served in order.
pub struct AsyncImageLoader {
    sender: Sender<LoadRequest>,
    inflight: Arc<AtomicUsize>,
}

impl AsyncImageLoader {
    pub fn new<S: ImageSource + 'static>(source: S) -> Self {
        let (sender, request_rx) = mpsc::channel::<LoadRequest>();
        let inflight = Arc::new(AtomicUsize::new(0));
        let inflight_thread = inflight.clone();
        thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                match request {
                    LoadRequest::Prefetch(paths) => source.prefetch(&paths),
                    LoadRequest::Image(handle) => match source.load_image(handle.path()) {
                        Ok(image) => {
                            info!("Loaded: {} ({}x{})", handle.path(), image.width(), image.height());
                            let _ = handle.slot.set(image);
                        }
                        Err(err) => warn!("Failed to load {}: {err}", handle.path()),
                    },
                }
                inflight_thread.fetch_sub(1, Ordering::Release);
            }
        });
        Self { sender, inflight }
    }

    pub fn prefetch(&self, paths: Vec<String>) {
        self.send(LoadRequest::Prefetch(paths));
    }

    /// Queues `path` and returns its handle right away.
    pub fn request(&self, path: &str) -> ImageHandle {
        let handle = ImageHandle::pending(path);
        self.send(LoadRequest::Image(handle.clone()));
        handle
    }

    pub fn is_loading(&self) -> bool {
        self.inflight.load(Ordering::Acquire) > 0
    }

    fn send(&self, request: LoadRequest) {
        self.inflight.fetch_add(1, Ordering::Release);
        if self.sender.send(request).is_err() {
            self.inflight.fetch_sub(1, Ordering::Release);
            warn!("image loader thread is gone");
        }
    }
}

/// Every image the story uses: one background per scene plus the sprite.
#[derive(Clone, Debug)]
pub struct SceneImages {
    pub backgrounds: Vec<ImageHandle>,
    pub sprite: ImageHandle,
}

impl SceneImages {
    /// Installs the manifest into the offline cache, then requests every image.
    pub fn request_all(loader: &AsyncImageLoader, store: &SceneStore) -> Self {
        loader.prefetch(story::asset_manifest(store.len()));
        let backgrounds = store
            .scenes()
            .iter()
            .map(|scene| loader.request(&scene.background))
            .collect();
        let sprite = loader.request(story::SPRITE_PATH);
        Self { backgrounds, sprite }
    }

    /// Handles that never resolve; everything draws with the fallback.
    pub fn unloaded(store: &SceneStore) -> Self {
        Self {
            backgrounds: store
                .scenes()
                .iter()
                .map(|scene| ImageHandle::pending(scene.background.as_str()))
                .collect(),
            sprite: ImageHandle::pending(story::SPRITE_PATH),
        }
    }

    pub fn background(&self, index: usize) -> Option<&Bitmap> {
        self.backgrounds.get(index).and_then(ImageHandle::image)
    }
}
