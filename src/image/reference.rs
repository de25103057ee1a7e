//! Name/tag pairs attached to an image in the archive

use std::fmt;

/// A fully-qualified repository name with a tag, e.g. `docker.io/library/busybox` + `latest`.
///
/// Parsing and normalizing references is the caller's business; the name is
/// written exactly as given, registry and namespace included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedTagged {
    name: String,
    tag: String,
}

impl NamedTagged {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for NamedTagged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}
