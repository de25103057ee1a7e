//! Archive writer: the public surface for building a docker-save tarball

use super::blobs::BlobRegistry;
use super::entry::EntryEmitter;
use super::index::{create_manifest, create_repositories_file};
use super::legacy::write_legacy_layer_metadata;
use super::{config_path, physical_layer_path};
use crate::error::{ArchiveError, Result};
use crate::image::{BlobInfo, Digest, NamedTagged, Schema2Descriptor};
use std::io::{Read, Write};

/// What a stored blob is, which decides its path in the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    /// Image configuration, stored at `<hex>.json`.
    Config,
    /// Filesystem layer, stored at `<hex>.tar`.
    Layer,
}

/// Writes a (docker save)-formatted tar archive.
///
/// Blobs are stored first, each exactly once, then [`finalize_image`] writes
/// the legacy layer directories, `repositories` and `manifest.json`.
/// [`close`] must be called to produce a valid archive. Any error leaves the
/// archive unusable; the caller should discard the destination.
///
/// [`finalize_image`]: ArchiveWriter::finalize_image
/// [`close`]: ArchiveWriter::close
pub struct ArchiveWriter<W: Write> {
    emitter: EntryEmitter<W>,
    blobs: BlobRegistry,
    image_finalized: bool,
}

impl<W: Write> ArchiveWriter<W> {
    pub fn new(dest: W) -> Self {
        Self {
            emitter: EntryEmitter::new(dest),
            blobs: BlobRegistry::new(),
            image_finalized: false,
        }
    }

    /// Checks whether the archive already contains a blob.
    ///
    /// `info.digest` must be known. On a hit the returned info carries the
    /// size that was stored, which callers must use instead of their own.
    pub fn try_reusing_blob(&self, info: &BlobInfo) -> Result<Option<BlobInfo>> {
        self.blobs.try_reuse(info)
    }

    /// Stores a blob at the path derived from its digest and records it.
    ///
    /// Exactly `size` bytes must come out of `stream`. A digest that is
    /// already stored is not written again; the recorded info is returned.
    pub fn store_blob<R: Read>(
        &mut self,
        kind: BlobKind,
        digest: &Digest,
        size: u64,
        stream: R,
    ) -> Result<BlobInfo> {
        if let Some(reused) = self.blobs.try_reuse(&BlobInfo::new(digest.clone(), size))? {
            tracing::debug!("Blob {} already in archive, skipping", digest);
            return Ok(reused);
        }

        let path = match kind {
            BlobKind::Config => config_path(digest),
            BlobKind::Layer => physical_layer_path(digest),
        };
        self.emitter.send_file(&path, size, stream)?;
        self.blobs.record(digest.clone(), size);
        Ok(BlobInfo::new(digest.clone(), size))
    }

    /// Writes legacy layer metadata, the repositories index and the manifest
    /// for one image whose config and layers have been stored.
    ///
    /// An archive holds a single image; a second call is rejected.
    pub fn finalize_image(
        &mut self,
        config_digest: &Digest,
        config_bytes: &[u8],
        layers: &[Schema2Descriptor],
        repo_tags: &[NamedTagged],
    ) -> Result<()> {
        if self.image_finalized {
            return Err(ArchiveError::invalid_input(
                "Archive already contains an image manifest",
            ));
        }
        self.ensure_stored(config_digest)?;
        for layer in layers {
            self.ensure_stored(&layer.digest)?;
        }
        self.image_finalized = true;

        let legacy = write_legacy_layer_metadata(&mut self.emitter, layers, config_bytes)?;
        if let Some(top_layer_id) = &legacy.top_layer_id {
            create_repositories_file(&mut self.emitter, top_layer_id, repo_tags)?;
        }
        create_manifest(&mut self.emitter, config_digest, legacy.layer_paths, repo_tags)?;

        tracing::info!(
            "Wrote image {} with {} layers and {} tags",
            config_digest,
            layers.len(),
            repo_tags.len()
        );
        Ok(())
    }

    /// Finishes the tar stream and returns the destination.
    ///
    /// No more blobs or images can be added after this.
    pub fn close(self) -> Result<W> {
        self.emitter.finish()
    }

    fn ensure_stored(&self, digest: &Digest) -> Result<()> {
        match self.blobs.try_reuse(&BlobInfo::with_unknown_size(digest.clone()))? {
            Some(_) => Ok(()),
            None => Err(ArchiveError::invalid_input(format!(
                "Blob {} has not been stored in the archive",
                digest
            ))),
        }
    }
}
