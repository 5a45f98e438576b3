// VFF allocation table
// 16-bit cluster codes and chain resolution with guaranteed termination

use super::constants::*;
use super::header::Endianness;
use log::trace;
use vff_core::VffError;

/// Classification of one allocation table code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterStatus {
    Available,
    /// In use, holding the index of the next cluster
    InUse(u16),
    Reserved(u16),
    Bad,
    EndOfChain(u16),
}

impl ClusterStatus {
    pub fn classify(code: u16) -> Self {
        match code {
            CLUSTER_AVAILABLE => ClusterStatus::Available,
            CLUSTER_RESERVED_MIN..=CLUSTER_RESERVED_MAX => ClusterStatus::Reserved(code),
            CLUSTER_BAD => ClusterStatus::Bad,
            CLUSTER_END_MIN..=u16::MAX => ClusterStatus::EndOfChain(code),
            next => ClusterStatus::InUse(next),
        }
    }

    pub fn is_end_of_chain(&self) -> bool {
        matches!(self, ClusterStatus::EndOfChain(_))
    }
}

/// Ordered cluster indices of one file or directory
pub type ClusterChain = Vec<u16>;

/// Per-status code counts across the whole table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub available: u32,
    pub in_use: u32,
    pub reserved: u32,
    pub bad: u32,
    pub end_of_chain: u32,
}

#[derive(Debug, Clone)]
pub struct AllocationTable {
    entries: Vec<u16>,
    max_chain: Option<usize>,
}

impl AllocationTable {
    /// Decode `data` as consecutive codes in the volume byte order
    pub fn parse(data: &[u8], endianness: Endianness) -> Result<Self, VffError> {
        if data.len() % 2 != 0 {
            return Err(VffError::Size(format!(
                "allocation table is {} bytes, not a whole number of 16-bit entries",
                data.len()
            )));
        }

        let entries = data
            .chunks_exact(2)
            .map(|pair| endianness.read_u16(pair))
            .collect();

        Ok(Self {
            entries,
            max_chain: None,
        })
    }

    /// Cap chains below the table length
    pub fn with_max_chain(mut self, max_chain: Option<usize>) -> Self {
        self.max_chain = max_chain;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn code(&self, cluster: u16) -> Result<u16, VffError> {
        self.entries.get(cluster as usize).copied().ok_or_else(|| {
            VffError::Bounds(format!(
                "cluster {} is outside the {}-entry allocation table",
                cluster,
                self.entries.len()
            ))
        })
    }

    pub fn status(&self, cluster: u16) -> Result<ClusterStatus, VffError> {
        Ok(ClusterStatus::classify(self.code(cluster)?))
    }

    /// Follow links from `start` until the end-of-chain code.
    ///
    /// Every cluster may appear once, so a chain can never be longer than
    /// the table itself; a revisit means the table loops.
    pub fn chain(&self, start: u16) -> Result<ClusterChain, VffError> {
        if start < FIRST_DATA_CLUSTER {
            return Err(VffError::Chain(format!(
                "chain cannot start at reserved cluster {}",
                start
            )));
        }
        self.code(start)?;

        let limit = self
            .max_chain
            .map_or(self.entries.len(), |cap| cap.min(self.entries.len()));
        let mut visited = vec![false; self.entries.len()];
        let mut chain = vec![start];
        visited[start as usize] = true;
        let mut current = start;

        loop {
            match self.status(current)? {
                ClusterStatus::EndOfChain(_) => break,
                ClusterStatus::InUse(next) => {
                    if next < FIRST_DATA_CLUSTER {
                        return Err(VffError::Chain(format!(
                            "cluster {} links to reserved cluster {}",
                            current, next
                        )));
                    }
                    self.code(next)?;
                    if visited[next as usize] {
                        return Err(VffError::Chain(format!(
                            "cycle detected: cluster {} links back to {}",
                            current, next
                        )));
                    }
                    if chain.len() >= limit {
                        return Err(VffError::Chain(format!(
                            "chain from {} exceeds {} clusters",
                            start, limit
                        )));
                    }
                    visited[next as usize] = true;
                    chain.push(next);
                    current = next;
                }
                other => {
                    return Err(VffError::Chain(format!(
                        "cluster {} ends in {:?} instead of an end-of-chain code",
                        current, other
                    )));
                }
            }
        }

        trace!("Chain from cluster {}: {} clusters", start, chain.len());
        Ok(chain)
    }

    pub fn stats(&self) -> TableStats {
        let mut stats = TableStats::default();
        // Indices 0 and 1 hold media and format markers, not cluster state
        for &code in self.entries.iter().skip(FIRST_DATA_CLUSTER as usize) {
            match ClusterStatus::classify(code) {
                ClusterStatus::Available => stats.available += 1,
                ClusterStatus::InUse(_) => stats.in_use += 1,
                ClusterStatus::Reserved(_) => stats.reserved += 1,
                ClusterStatus::Bad => stats.bad += 1,
                ClusterStatus::EndOfChain(_) => stats.end_of_chain += 1,
            }
        }
        stats
    }
}
