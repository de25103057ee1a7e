//! Docker Archive Writer Library
//!
//! Builds single-file tar archives in the (docker save) format, readable both
//! by tooling that follows `manifest.json` and by legacy loaders that expect
//! per-layer directories, a `repositories` index and `VERSION` markers.
//!
//! ```
//! use docker_archive_writer::archive::{ArchiveWriter, BlobKind};
//! use docker_archive_writer::image::{Digest, NamedTagged, Schema2Descriptor};
//!
//! # fn main() -> docker_archive_writer::Result<()> {
//! let config = br#"{"architecture":"amd64","os":"linux"}"#;
//! let layer = b"layer tarball bytes";
//! let config_digest = Digest::canonical_from_bytes(config);
//! let layer_digest = Digest::canonical_from_bytes(layer);
//!
//! let mut writer = ArchiveWriter::new(Vec::new());
//! writer.store_blob(BlobKind::Config, &config_digest, config.len() as u64, &config[..])?;
//! writer.store_blob(BlobKind::Layer, &layer_digest, layer.len() as u64, &layer[..])?;
//! writer.finalize_image(
//!     &config_digest,
//!     config,
//!     &[Schema2Descriptor::new(
//!         "application/vnd.docker.image.rootfs.diff.tar",
//!         layer.len() as u64,
//!         layer_digest,
//!     )],
//!     &[NamedTagged::new("docker.io/library/example", "latest")],
//! )?;
//! let tarball: Vec<u8> = writer.close()?;
//! # assert!(!tarball.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod destination;
pub mod error;
pub mod image;

pub use archive::{ArchiveWriter, BlobKind};
pub use destination::ImageDestination;
pub use error::{ArchiveError, ErrorClass, Result};
