// Cluster-level access to the in-memory image
// Every range is checked against the image before slicing

use super::constants::*;
use super::header::VolumeHeader;
use log::trace;
use vff_core::VffError;

/// Borrow `len` bytes at `offset`, or fail without touching the image
pub fn checked_range(image: &[u8], offset: u64, len: usize) -> Result<&[u8], VffError> {
    let start = usize::try_from(offset).ok();
    let end = start.and_then(|s| s.checked_add(len));
    match (start, end) {
        (Some(start), Some(end)) if end <= image.len() => Ok(&image[start..end]),
        _ => Err(VffError::Bounds(format!(
            "range {:#x}+{:#x} lies outside the {:#x}-byte image",
            offset,
            len,
            image.len()
        ))),
    }
}

pub struct ClusterReader<'a> {
    image: &'a [u8],
    header: &'a VolumeHeader,
}

impl<'a> ClusterReader<'a> {
    pub fn new(image: &'a [u8], header: &'a VolumeHeader) -> Self {
        Self { image, header }
    }

    /// Byte offset of a stored cluster index
    pub fn cluster_offset(&self, cluster: u16) -> Result<u64, VffError> {
        let adjusted = cluster.checked_sub(FIRST_DATA_CLUSTER).ok_or_else(|| {
            VffError::Bounds(format!("cluster {} precedes the data region", cluster))
        })?;

        (self.header.cluster_size as u64)
            .checked_mul(adjusted as u64)
            .and_then(|rel| rel.checked_add(self.header.data_offset()))
            .ok_or_else(|| VffError::Bounds(format!("cluster {} offset overflows", cluster)))
    }

    pub fn read_cluster(&self, cluster: u16) -> Result<&'a [u8], VffError> {
        let offset = self.cluster_offset(cluster)?;
        trace!("Reading cluster {} at offset {:#x}", cluster, offset);
        checked_range(self.image, offset, self.header.cluster_size as usize)
    }

    /// Concatenate the data of every cluster in `chain`
    pub fn read_chain(&self, chain: &[u16]) -> Result<Vec<u8>, VffError> {
        let mut data = Vec::with_capacity(chain.len() * self.header.cluster_size as usize);
        for &cluster in chain {
            data.extend_from_slice(self.read_cluster(cluster)?);
        }
        Ok(data)
    }

    /// The fixed root directory block
    pub fn read_root(&self) -> Result<&'a [u8], VffError> {
        checked_range(self.image, self.header.root_offset(), ROOT_DIR_SIZE)
    }

    /// First allocation table copy; the backup is never read
    pub fn read_table(&self) -> Result<&'a [u8], VffError> {
        checked_range(
            self.image,
            self.header.table_offset(),
            self.header.table_entries_len(),
        )
    }
}
