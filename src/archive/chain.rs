//! Chain IDs over a layer stack
//!
//! `chain(L0) = L0` and `chain(L0..Li) = sha256(chain(L0..Li-1) + " " + Li)`,
//! the same computation docker uses for its layer store. Legacy layer
//! directories are named after the hex part, so a layer digest that appears
//! twice in one history still gets two distinct, loop-free IDs.

use crate::image::Digest;

/// Incremental chain ID computation, fed layer digests base to top
#[derive(Debug, Clone, Default)]
pub struct ChainIds {
    current: Option<Digest>,
}

impl ChainIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the chain with the next layer and returns the new chain ID.
    pub fn push(&mut self, layer: &Digest) -> &Digest {
        let next = match self.current.take() {
            None => layer.clone(),
            Some(parent) => Digest::canonical_from_str(&format!("{} {}", parent, layer)),
        };
        self.current.insert(next)
    }

    /// Chain ID of the layers pushed so far, if any.
    pub fn current(&self) -> Option<&Digest> {
        self.current.as_ref()
    }
}

/// Chain IDs for every prefix of `layers`.
pub fn chain_ids<'a, I>(layers: I) -> Vec<Digest>
where
    I: IntoIterator<Item = &'a Digest>,
{
    let mut chain = ChainIds::new();
    layers
        .into_iter()
        .map(|layer| chain.push(layer).clone())
        .collect()
}
