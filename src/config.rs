//! Fixed names and modes used when laying out a docker-save archive
//!
//! None of these are runtime-configurable: the legacy loaders look for the
//! exact names, and reproducible output depends on the fixed modes/mtime.

/// Modern index listing config and layer paths per image.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Legacy repository -> tag -> top layer ID index.
pub const LEGACY_REPOSITORIES_FILE_NAME: &str = "repositories";

/// Per-layer legacy format version marker.
pub const LEGACY_VERSION_FILE_NAME: &str = "VERSION";

/// Per-layer legacy configuration.
pub const LEGACY_CONFIG_FILE_NAME: &str = "json";

/// Per-layer legacy symlink to the physical layer blob.
pub const LEGACY_LAYER_FILE_NAME: &str = "layer.tar";

/// Contents of every legacy `VERSION` file.
pub const LEGACY_VERSION: &[u8] = b"1.0";

/// Suffix of the physical config blob path.
pub const CONFIG_PATH_SUFFIX: &str = ".json";

/// Suffix of the physical layer blob path.
pub const LAYER_PATH_SUFFIX: &str = ".tar";

/// Mode of every regular file entry: read-only, never executable.
pub const REGULAR_FILE_MODE: u32 = 0o444;

/// Mode of every symlink entry (only the permission bits of a symlink, which are empty).
pub const SYMLINK_MODE: u32 = 0;

/// Modification time stamped on every entry (Unix epoch).
pub const ENTRY_MTIME: u64 = 0;

/// Image configuration fields copied (compacted, otherwise unparsed) into the top layer's legacy `json`.
pub const TOP_LAYER_CONFIG_FIELDS: [&str; 7] = [
    "architecture",
    "config",
    "container",
    "container_config",
    "created",
    "docker_version",
    "os",
];

/// The only manifest type a docker-save archive can describe.
pub const DOCKER_V2_SCHEMA2_MEDIA_TYPE: &str =
    "application/vnd.docker.distribution.manifest.v2+json";

/// Algorithm used for chain IDs and for digests computed while spooling.
pub const CANONICAL_ALGORITHM: &str = "sha256";
