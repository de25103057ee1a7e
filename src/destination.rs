//! Image destination backed by an archive writer
//!
//! Adapts the blob-then-manifest protocol of an image copy to [`ArchiveWriter`]:
//! blobs arrive one by one (possibly with unknown size or digest), the config
//! blob is kept for the legacy metadata, and the schema 2 manifest triggers the
//! metadata write.

use crate::archive::{ArchiveWriter, BlobKind};
use crate::config::DOCKER_V2_SCHEMA2_MEDIA_TYPE;
use crate::error::{ArchiveError, Result};
use crate::image::{BlobInfo, Digest, NamedTagged, Schema2Manifest};
use sha2::{Digest as _, Sha256};
use std::io::{Read, Write};

pub struct ImageDestination<W: Write> {
    archive: ArchiveWriter<W>,
    repo_tags: Vec<NamedTagged>,
    config: Option<(Digest, Vec<u8>)>,
}

impl<W: Write> ImageDestination<W> {
    pub fn new(archive: ArchiveWriter<W>, repo_tags: Vec<NamedTagged>) -> Self {
        Self {
            archive,
            repo_tags,
            config: None,
        }
    }

    pub fn supported_manifest_mime_types(&self) -> &'static [&'static str] {
        &[DOCKER_V2_SCHEMA2_MEDIA_TYPE]
    }

    pub fn supports_signatures(&self) -> Result<()> {
        Err(ArchiveError::invalid_input(
            "Storing signatures for docker tar files is not supported",
        ))
    }

    /// Stores a blob read from `stream`.
    ///
    /// A blob with unknown size or digest is read into memory first; a missing
    /// digest is computed as SHA-256 of the content. Returns the digest and
    /// size the archive now holds for this blob.
    pub fn put_blob<R: Read>(
        &mut self,
        mut stream: R,
        info: BlobInfo,
        is_config: bool,
    ) -> Result<BlobInfo> {
        let (digest, size, mut spooled) = match info {
            BlobInfo {
                digest: Some(digest),
                size: Some(size),
            } => (digest, size, None),
            BlobInfo { digest, .. } => {
                tracing::debug!(
                    "docker archive: input with unknown size, reading into memory first"
                );
                let (data, computed) = spool(&mut stream)?;
                tracing::debug!("... read {} bytes", data.len());
                (digest.unwrap_or(computed), data.len() as u64, Some(data))
            }
        };

        if let Some(reused) = self
            .archive
            .try_reusing_blob(&BlobInfo::new(digest.clone(), size))?
        {
            return Ok(reused);
        }

        if is_config {
            let data = match spooled.take() {
                Some(data) => data,
                None => {
                    let mut data = Vec::new();
                    stream
                        .read_to_end(&mut data)
                        .map_err(|e| ArchiveError::io("config stream", e))?;
                    data
                }
            };
            let stored = self
                .archive
                .store_blob(BlobKind::Config, &digest, size, data.as_slice())?;
            self.config = Some((digest, data));
            Ok(stored)
        } else {
            match spooled {
                Some(data) => self
                    .archive
                    .store_blob(BlobKind::Layer, &digest, size, data.as_slice()),
                None => self.archive.store_blob(BlobKind::Layer, &digest, size, stream),
            }
        }
    }

    pub fn try_reusing_blob(&self, info: &BlobInfo) -> Result<Option<BlobInfo>> {
        self.archive.try_reusing_blob(info)
    }

    /// Writes the image metadata described by a Docker schema 2 manifest.
    ///
    /// The config blob must have been put first. Manifest lists
    /// (`instance_digest` set) are not supported.
    pub fn put_manifest(
        &mut self,
        manifest: &[u8],
        instance_digest: Option<&Digest>,
    ) -> Result<()> {
        if instance_digest.is_some() {
            return Err(ArchiveError::invalid_input(
                "Manifest lists are not supported for docker tar files",
            ));
        }
        let manifest = Schema2Manifest::from_slice(manifest)?;
        manifest.validate()?;

        let Some((config_digest, config_bytes)) = &self.config else {
            return Err(ArchiveError::invalid_input(
                "Manifest written before its config blob",
            ));
        };
        if *config_digest != manifest.config.digest {
            return Err(ArchiveError::invalid_input(format!(
                "Manifest config {} does not match stored config {}",
                manifest.config.digest, config_digest
            )));
        }

        self.archive.finalize_image(
            config_digest,
            config_bytes,
            &manifest.layers,
            &self.repo_tags,
        )
    }

    pub fn put_signatures(&self, signatures: &[Vec<u8>]) -> Result<()> {
        if !signatures.is_empty() {
            return Err(ArchiveError::invalid_input(
                "Storing signatures for docker tar files is not supported",
            ));
        }
        Ok(())
    }

    /// Closes the archive and returns its destination.
    pub fn commit(self) -> Result<W> {
        self.archive.close()
    }
}

fn spool<R: Read>(stream: &mut R) -> Result<(Vec<u8>, Digest)> {
    let mut hasher = Sha256::new();
    let mut data = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = stream
            .read(&mut chunk)
            .map_err(|e| ArchiveError::io("blob stream", e))?;
        if n == 0 {
            break;
        }
        hasher.update(&chunk[..n]);
        data.extend_from_slice(&chunk[..n]);
    }
    Ok((data, Digest::from_sha256(hasher)))
}
