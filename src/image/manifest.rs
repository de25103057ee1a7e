use crate::config::DOCKER_V2_SCHEMA2_MEDIA_TYPE;
use crate::error::{ArchiveError, Result};
use crate::image::digest::Digest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity and size of a blob as known to the caller.
///
/// Either field may be unknown on input; blobs recorded in an archive always
/// carry both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobInfo {
    pub digest: Option<Digest>,
    pub size: Option<u64>,
}

impl BlobInfo {
    pub fn new(digest: Digest, size: u64) -> Self {
        Self {
            digest: Some(digest),
            size: Some(size),
        }
    }

    pub fn with_unknown_size(digest: Digest) -> Self {
        Self {
            digest: Some(digest),
            size: None,
        }
    }
}

/// Blob reference inside a Docker schema 2 manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema2Descriptor {
    pub media_type: String,
    pub size: u64,
    pub digest: Digest,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
}

impl Schema2Descriptor {
    pub fn new(media_type: impl Into<String>, size: u64, digest: Digest) -> Self {
        Self {
            media_type: media_type.into(),
            size,
            digest,
            urls: Vec::new(),
        }
    }
}

/// Docker schema 2 image manifest, layers ordered base to top
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema2Manifest {
    pub schema_version: u32,
    #[serde(default)]
    pub media_type: String,
    pub config: Schema2Descriptor,
    #[serde(default)]
    pub layers: Vec<Schema2Descriptor>,
}

impl Schema2Manifest {
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(ArchiveError::ManifestParse)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != 2 || self.media_type != DOCKER_V2_SCHEMA2_MEDIA_TYPE {
            return Err(ArchiveError::invalid_input(
                "Unsupported manifest type, need a Docker schema 2 manifest",
            ));
        }
        Ok(())
    }
}

/// One entry of the archive's `manifest.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestItem {
    pub config: String,
    pub repo_tags: Vec<String>,
    pub layers: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_sources: Option<BTreeMap<Digest, Schema2Descriptor>>,
}
