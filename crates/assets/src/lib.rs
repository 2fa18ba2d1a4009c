//! Sandboxed image loading for the presenter: relative-path sanitizing,
//! optional sha256 manifests and a cache-first byte store that doubles as the
//! offline cache.

mod cache;
mod error;
mod manifest;
mod store;

pub use error::AssetError;
pub use manifest::{sha256_hex, AssetEntry, AssetManifest, MANIFEST_VERSION};
pub use store::{
    sanitize_rel_path, AssetLimits, AssetStore, InstallFailure, InstallReport, LoadedImage,
    SecurityMode,
};
