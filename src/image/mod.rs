//! Docker image value types
//!
//! This module provides the types the archive writer consumes from its
//! collaborators: content [`Digest`]s, blob metadata ([`BlobInfo`]), Docker
//! schema 2 manifests and their descriptors, and the [`NamedTagged`]
//! references an image is saved under. It also defines [`ManifestItem`], the
//! shape of one entry of an archive's `manifest.json`.
//!
//! # Examples
//!
//! ```
//! use docker_archive_writer::image::{Digest, NamedTagged};
//!
//! let digest = Digest::canonical_from_str("hello");
//! assert_eq!(digest.algorithm(), "sha256");
//!
//! let tag = NamedTagged::new("docker.io/library/hello", "latest");
//! assert_eq!(tag.to_string(), "docker.io/library/hello:latest");
//! ```

pub mod digest;
pub mod manifest;
pub mod reference;

pub use digest::Digest;
pub use manifest::{BlobInfo, ManifestItem, Schema2Descriptor, Schema2Manifest};
pub use reference::NamedTagged;
