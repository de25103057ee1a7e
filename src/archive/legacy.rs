//! Legacy per-layer metadata (`<id>/VERSION`, `<id>/json`, `<id>/layer.tar`)

use super::chain::ChainIds;
use super::entry::EntryEmitter;
use super::physical_layer_path;
use crate::config::{
    LEGACY_CONFIG_FILE_NAME, LEGACY_LAYER_FILE_NAME, LEGACY_VERSION, LEGACY_VERSION_FILE_NAME,
};
use crate::error::{ArchiveError, Result};
use crate::image::Schema2Descriptor;
use serde::Serialize;
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::io::Write;

/// A field lifted from the image configuration without parsing it.
/// `None` is written as `null`, which is what a missing field becomes.
type Inherited = Option<Box<RawValue>>;

/// Contents of a legacy `<id>/json` file.
///
/// Fields are declared in key order so the output matches what the legacy
/// loaders were fed historically. The inherited fields are only present on the
/// top layer.
#[derive(Debug, Default, Serialize)]
pub struct LegacyLayerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Inherited>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Inherited>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<Inherited>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_config: Option<Inherited>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Inherited>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_version: Option<Inherited>,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<Inherited>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl LegacyLayerConfig {
    pub fn new(id: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            id: id.into(),
            parent,
            ..Default::default()
        }
    }

    /// Copies the top-level image fields the legacy format keeps on the top layer.
    pub fn inherit_image_config(&mut self, config_bytes: &[u8]) -> Result<()> {
        let mut image_config: HashMap<String, Box<RawValue>> =
            serde_json::from_slice(config_bytes).map_err(ArchiveError::ConfigUnmarshal)?;
        let mut take = |key: &str| -> Result<Option<Inherited>> {
            Ok(Some(image_config.remove(key).map(|raw| compact(&raw)).transpose()?))
        };

        self.architecture = take("architecture")?;
        self.config = take("config")?;
        self.container = take("container")?;
        self.container_config = take("container_config")?;
        self.created = take("created")?;
        self.docker_version = take("docker_version")?;
        self.os = take("os")?;
        Ok(())
    }
}

/// Re-emits a raw JSON value without insignificant whitespace.
///
/// String contents are kept as written, except that `<`, `>`, `&`, U+2028 and
/// U+2029 are escaped, which is how the legacy tooling's encoder writes them.
fn compact(raw: &RawValue) -> Result<Box<RawValue>> {
    let text = raw.get();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if !in_string {
            match c {
                ' ' | '\t' | '\n' | '\r' => {}
                '"' => {
                    in_string = true;
                    out.push(c);
                }
                _ => out.push(c),
            }
            continue;
        }
        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }

    RawValue::from_string(out).map_err(ArchiveError::ConfigUnmarshal)
}

/// Result of writing legacy metadata for one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyLayers {
    /// Physical layer paths, base to top, for the modern manifest.
    pub layer_paths: Vec<String>,
    /// Legacy ID of the top layer; `None` for an image without layers.
    pub top_layer_id: Option<String>,
}

/// Writes the legacy directory of every layer, base to top.
///
/// Layer blobs must already be stored at their physical paths; the legacy
/// `layer.tar` is a symlink to that copy.
pub fn write_legacy_layer_metadata<W: Write>(
    emitter: &mut EntryEmitter<W>,
    layers: &[Schema2Descriptor],
    config_bytes: &[u8],
) -> Result<LegacyLayers> {
    let mut chain = ChainIds::new();
    let mut layer_paths = Vec::with_capacity(layers.len());
    let mut last_layer_id: Option<String> = None;

    for (i, layer) in layers.iter().enumerate() {
        let layer_id = chain.push(&layer.digest).hex().to_string();

        let physical_path = physical_layer_path(&layer.digest);
        emitter.send_symlink(
            &format!("{}/{}", layer_id, LEGACY_LAYER_FILE_NAME),
            &format!("../{}", physical_path),
        )?;
        layer_paths.push(physical_path);

        emitter.send_bytes(
            &format!("{}/{}", layer_id, LEGACY_VERSION_FILE_NAME),
            LEGACY_VERSION,
        )?;

        let mut layer_config = LegacyLayerConfig::new(layer_id.as_str(), last_layer_id.take());
        if i == layers.len() - 1 {
            layer_config.inherit_image_config(config_bytes)?;
        }
        let json = serde_json::to_vec(&layer_config)
            .map_err(|e| ArchiveError::serialization("layer config", e))?;
        emitter.send_bytes(
            &format!("{}/{}", layer_id, LEGACY_CONFIG_FILE_NAME),
            &json,
        )?;

        last_layer_id = Some(layer_id);
    }

    Ok(LegacyLayers {
        layer_paths,
        top_layer_id: last_layer_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_layer_config_has_only_id_and_parent() {
        let config = LegacyLayerConfig::new("bbb", Some("aaa".to_string()));
        assert_eq!(
            serde_json::to_string(&config).unwrap(),
            r#"{"id":"bbb","parent":"aaa"}"#
        );
        let root = LegacyLayerConfig::new("aaa", None);
        assert_eq!(serde_json::to_string(&root).unwrap(), r#"{"id":"aaa"}"#);
    }

    #[test]
    fn test_top_layer_inherits_fields_compacted_and_sorted() {
        let mut config = LegacyLayerConfig::new("ccc", Some("bbb".to_string()));
        config
            .inherit_image_config(
                br#"{"os":"linux","architecture":"amd64","config":{"Env":["A=1"], "Cmd":null},
                    "rootfs":{"type":"layers"}}"#,
            )
            .unwrap();
        let expected = concat!(
            r#"{"architecture":"amd64","config":{"Env":["A=1"],"Cmd":null},"#,
            r#""container":null,"container_config":null,"created":null,"#,
            r#""docker_version":null,"id":"ccc","os":"linux","parent":"bbb"}"#,
        );
        assert_eq!(serde_json::to_string(&config).unwrap(), expected);
    }

    #[test]
    fn test_compact_keeps_string_contents_and_key_order() {
        let raw: Box<RawValue> = serde_json::from_str(
            "{ \"Cmd\": [ \"sh\", \"-c\", \"a  b \\\" && c > d\" ],\n  \"B\": 1.50, \"A\": 1e3 }",
        )
        .unwrap();
        assert_eq!(
            compact(&raw).unwrap().get(),
            r#"{"Cmd":["sh","-c","a  b \" \u0026\u0026 c \u003e d"],"B":1.50,"A":1e3}"#
        );
    }

    #[test]
    fn test_unparsable_config_is_config_unmarshal_error() {
        let mut config = LegacyLayerConfig::new("aaa", None);
        let err = config.inherit_image_config(b"[1, 2]").unwrap_err();
        assert!(matches!(err, ArchiveError::ConfigUnmarshal(_)));
        let err = config.inherit_image_config(b"not json").unwrap_err();
        assert!(matches!(err, ArchiveError::ConfigUnmarshal(_)));
    }
}
