use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::assets::decode::{PreparedImage, decode_asset};
use crate::config::settings::SplashConfig;
use crate::foundation::error::{SplashError, SplashResult};

/// Stable index of an image asset within one [`SceneAssets`] set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u32);

/// Shared handle to an image that may still be loading.
///
/// Readiness is a one-way latch: a handle is resolved at most once, either with a decoded image
/// or with a failure. A failed handle never becomes ready, so draw code treats it exactly like a
/// pending one.
#[derive(Clone, Debug)]
pub struct AssetHandle {
    id: AssetId,
    source: Arc<str>,
    slot: Arc<OnceLock<Result<PreparedImage, String>>>,
}

impl AssetHandle {
    /// A handle that has not been resolved yet.
    pub fn pending(id: AssetId, source: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            source: source.into(),
            slot: Arc::new(OnceLock::new()),
        }
    }

    /// A handle that is already ready.
    pub fn ready(id: AssetId, source: impl Into<Arc<str>>, image: PreparedImage) -> Self {
        let h = Self::pending(id, source);
        h.fulfil(image);
        h
    }

    /// Asset id.
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Source path the handle was created for.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// `true` once a decoded image is available. Never blocks.
    pub fn is_ready(&self) -> bool {
        matches!(self.slot.get(), Some(Ok(_)))
    }

    /// `true` if loading finished with an error.
    pub fn is_failed(&self) -> bool {
        matches!(self.slot.get(), Some(Err(_)))
    }

    /// Decoded image, if ready.
    pub fn get(&self) -> Option<&PreparedImage> {
        match self.slot.get() {
            Some(Ok(img)) => Some(img),
            _ => None,
        }
    }

    /// Resolve with a decoded image. Returns `false` if the handle was already resolved.
    pub fn fulfil(&self, image: PreparedImage) -> bool {
        self.slot.set(Ok(image)).is_ok()
    }

    /// Resolve with a failure. Returns `false` if the handle was already resolved.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.slot.set(Err(reason.into())).is_ok()
    }
}

/// The image handles the falling-element pool draws from.
#[derive(Clone, Debug)]
pub struct SceneAssets {
    /// Photo handles, ids `0..photos.len()`.
    pub photos: Vec<AssetHandle>,
    /// Decorative icon handle, id `photos.len()`.
    pub icon: AssetHandle,
}

impl SceneAssets {
    /// Pending handles named after `cfg`'s sources, for hosts that load images themselves.
    pub fn pending(cfg: &SplashConfig) -> Self {
        let photos = cfg
            .photos
            .iter()
            .enumerate()
            .map(|(i, src)| AssetHandle::pending(AssetId(i as u32), src.as_str()))
            .collect::<Vec<_>>();
        let icon = AssetHandle::pending(AssetId(photos.len() as u32), cfg.icon.as_str());
        Self { photos, icon }
    }

    /// Iterate over every handle (photos first, then the icon).
    pub fn iter(&self) -> impl Iterator<Item = &AssetHandle> {
        self.photos.iter().chain(std::iter::once(&self.icon))
    }

    /// Number of handles that are ready.
    pub fn ready_count(&self) -> usize {
        self.iter().filter(|h| h.is_ready()).count()
    }
}

/// Background loader for the configured photos, icon and font.
///
/// Images are read and decoded on the rayon pool; the returned handles flip to ready as each
/// finishes. The font is read eagerly since text layout needs it up front.
pub struct AssetStore {
    root: PathBuf,
    assets: SceneAssets,
    font: Option<Arc<Vec<u8>>>,
    settled_tx: Sender<AssetId>,
    settled_rx: Receiver<AssetId>,
    settled: usize,
}

impl AssetStore {
    /// Start loading every asset named by `cfg`, relative to `root`.
    #[tracing::instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn load(root: impl AsRef<Path>, cfg: &SplashConfig) -> SplashResult<Self> {
        let root = root.as_ref().to_path_buf();
        for src in cfg.photos.iter().chain(std::iter::once(&cfg.icon)) {
            normalize_rel_path(src)?;
        }

        let font = match &cfg.font {
            Some(rel) => {
                let p = root.join(normalize_rel_path(rel)?);
                let bytes =
                    std::fs::read(&p).with_context(|| format!("read font '{}'", p.display()))?;
                Some(Arc::new(bytes))
            }
            None => None,
        };

        let (settled_tx, settled_rx) = channel();
        let store = Self {
            root,
            assets: SceneAssets::pending(cfg),
            font,
            settled_tx,
            settled_rx,
            settled: 0,
        };
        for handle in store.assets.iter() {
            store.spawn_decode(handle.clone());
        }
        Ok(store)
    }

    fn spawn_decode(&self, handle: AssetHandle) {
        let root = self.root.clone();
        let tx = self.settled_tx.clone();
        rayon::spawn(move || {
            let result = read_and_decode(&root, handle.source());
            match result {
                Ok(img) => {
                    tracing::debug!(
                        source = handle.source(),
                        width = img.width,
                        height = img.height,
                        "asset ready"
                    );
                    handle.fulfil(img);
                }
                Err(e) => {
                    tracing::warn!(source = handle.source(), error = %e, "asset failed to load");
                    handle.fail(e.to_string());
                }
            }
            // The store may already be gone; nobody is waiting then.
            let _ = tx.send(handle.id());
        });
    }

    /// Handles for the engine. Clones share readiness with the store.
    pub fn scene_assets(&self) -> SceneAssets {
        self.assets.clone()
    }

    /// Font bytes, if a font was configured.
    pub fn font_bytes(&self) -> Option<Arc<Vec<u8>>> {
        self.font.clone()
    }

    /// Block until every image has either loaded or failed, or `timeout` elapses.
    ///
    /// Only offline hosts call this; the engine itself never waits on assets. Returns `true` when
    /// all loads settled in time.
    pub fn wait_settled(&mut self, timeout: Duration) -> bool {
        let total = self.assets.photos.len() + 1;
        let deadline = Instant::now() + timeout;
        while self.settled < total {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match self.settled_rx.recv_timeout(deadline - now) {
                Ok(_) => self.settled += 1,
                Err(_) => return false,
            }
        }
        true
    }
}

fn read_and_decode(root: &Path, source: &str) -> SplashResult<PreparedImage> {
    let p = root.join(normalize_rel_path(source)?);
    let bytes = std::fs::read(&p)
        .map_err(|e| SplashError::asset(format!("failed to read '{}': {e}", p.display())))?;
    decode_asset(source, &bytes)
}

/// Normalize and validate config-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> SplashResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(SplashError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(SplashError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(SplashError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(SplashError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
