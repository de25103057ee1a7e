//! Top-level `manifest.json` and legacy `repositories` index

use super::config_path;
use super::entry::EntryEmitter;
use crate::config::{LEGACY_REPOSITORIES_FILE_NAME, MANIFEST_FILE_NAME};
use crate::error::{ArchiveError, Result};
use crate::image::{Digest, ManifestItem, NamedTagged};
use std::collections::BTreeMap;
use std::io::Write;

/// repository name -> tag -> legacy top layer ID
pub type RepositoriesIndex = BTreeMap<String, BTreeMap<String, String>>;

/// Builds the single manifest item describing an image.
pub fn manifest_item(
    config_digest: &Digest,
    layer_paths: Vec<String>,
    repo_tags: &[NamedTagged],
) -> ManifestItem {
    ManifestItem {
        config: config_path(config_digest),
        // Name and tag exactly as given, so registry-qualified references
        // stay distinguishable from unqualified ones.
        repo_tags: repo_tags.iter().map(ToString::to_string).collect(),
        layers: layer_paths,
        parent: String::new(),
        layer_sources: None,
    }
}

/// Folds tags into the repositories index; a repeated name:tag keeps the last ID.
pub fn fold_repositories(
    index: &mut RepositoriesIndex,
    top_layer_id: &str,
    repo_tags: &[NamedTagged],
) {
    for repo_tag in repo_tags {
        index
            .entry(repo_tag.name().to_string())
            .or_default()
            .insert(repo_tag.tag().to_string(), top_layer_id.to_string());
    }
}

pub fn create_manifest<W: Write>(
    emitter: &mut EntryEmitter<W>,
    config_digest: &Digest,
    layer_paths: Vec<String>,
    repo_tags: &[NamedTagged],
) -> Result<()> {
    let items = [manifest_item(config_digest, layer_paths, repo_tags)];
    let json = serde_json::to_vec(&items).map_err(|e| ArchiveError::serialization("manifest", e))?;
    emitter.send_bytes(MANIFEST_FILE_NAME, &json)
}

pub fn create_repositories_file<W: Write>(
    emitter: &mut EntryEmitter<W>,
    top_layer_id: &str,
    repo_tags: &[NamedTagged],
) -> Result<()> {
    let mut repositories = RepositoriesIndex::new();
    fold_repositories(&mut repositories, top_layer_id, repo_tags);

    let json = serde_json::to_vec(&repositories)
        .map_err(|e| ArchiveError::serialization("repositories", e))?;
    emitter.send_bytes(LEGACY_REPOSITORIES_FILE_NAME, &json)
}
