//! Docker-save archive construction
//!
//! The archive carries two views of the same image:
//!
//! - the modern one: `manifest.json` pointing at `<config hex>.json` and the
//!   physical `<layer hex>.tar` blobs;
//! - the legacy one: one `<chain id hex>/` directory per layer holding
//!   `VERSION`, `json` and a `layer.tar` symlink back to the physical blob,
//!   plus a `repositories` index from tags to the top layer.
//!
//! Blobs live at the archive root, named by digest, so a layer shared between
//! positions or images is stored once. All entries have fixed metadata and the
//! output is reproducible.

pub mod blobs;
pub mod chain;
pub mod entry;
pub mod index;
pub mod legacy;
pub mod writer;

pub use blobs::BlobRegistry;
pub use chain::{ChainIds, chain_ids};
pub use entry::{EntryDescriptor, EntryEmitter};
pub use legacy::{LegacyLayerConfig, LegacyLayers};
pub use writer::{ArchiveWriter, BlobKind};

use crate::config::{CONFIG_PATH_SUFFIX, LAYER_PATH_SUFFIX};
use crate::image::Digest;

/// Path of the config blob with `digest`.
///
/// An internal layout choice, not a format property.
pub fn config_path(digest: &Digest) -> String {
    format!("{}{}", digest.hex(), CONFIG_PATH_SUFFIX)
}

/// Path of the regular file holding the layer with `digest`.
///
/// Layers stay at the archive root rather than under their legacy directory:
/// legacy IDs are chain IDs, not layer digests, and (docker load) treats every
/// subdirectory as an image that must carry its own metadata.
pub fn physical_layer_path(digest: &Digest) -> String {
    format!("{}{}", digest.hex(), LAYER_PATH_SUFFIX)
}
