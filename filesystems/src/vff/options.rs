use serde::{Deserialize, Serialize};

/// Load-time settings for a VFF volume
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VffOptions {
    /// Longest chain accepted. Chains are always bounded by the table
    /// length; this lowers that bound.
    pub max_chain_clusters: Option<usize>,
}

impl VffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_chain_clusters(mut self, clusters: usize) -> Self {
        self.max_chain_clusters = Some(clusters);
        self
    }
}
