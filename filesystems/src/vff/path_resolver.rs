// VFF Path Resolver
// Walks slash-separated paths from the fixed root region through cluster chains

use super::cluster_io::ClusterReader;
use super::directory::{decode_directory, FileRecord};
use super::fat_table::AllocationTable;
use super::header::VolumeHeader;
use log::{debug, trace};
use std::collections::HashSet;
use vff_core::VffError;

/// Target of a resolved path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    Root,
    Entry(FileRecord),
}

impl ResolvedPath {
    pub fn is_directory(&self) -> bool {
        match self {
            ResolvedPath::Root => true,
            ResolvedPath::Entry(record) => record.is_directory(),
        }
    }
}

/// Split a path into components.
///
/// No leading or trailing slash, no empty components, no `.` or `..`
/// components. The empty path and a lone `.` name the root.
pub fn split_path(path: &str) -> Result<Vec<&str>, VffError> {
    if path.is_empty() || path == "." {
        return Ok(Vec::new());
    }

    let components: Vec<&str> = path.split('/').collect();
    for component in &components {
        match *component {
            "" => {
                return Err(VffError::Invalid(format!(
                    "'{}' has an empty path component",
                    path
                )))
            }
            "." | ".." => {
                return Err(VffError::Invalid(format!(
                    "'{}' uses a relative component '{}'",
                    path, component
                )))
            }
            _ => {}
        }
    }
    Ok(components)
}

pub struct VffPathResolver<'a> {
    header: &'a VolumeHeader,
    table: &'a AllocationTable,
    clusters: ClusterReader<'a>,
}

impl<'a> VffPathResolver<'a> {
    pub fn new(image: &'a [u8], header: &'a VolumeHeader, table: &'a AllocationTable) -> Self {
        Self {
            header,
            table,
            clusters: ClusterReader::new(image, header),
        }
    }

    /// Resolve a path to its directory entry
    pub fn resolve_path(&self, path: &str) -> Result<ResolvedPath, VffError> {
        debug!("Resolving VFF path: '{}'", path);

        let components = split_path(path)?;
        let Some((last, parents)) = components.split_last() else {
            return Ok(ResolvedPath::Root);
        };

        let mut listing = self.read_root_directory()?;
        for component in parents {
            trace!("Descending into '{}'", component);
            let entry = find_entry(&listing, component)?;
            if !entry.is_directory() {
                return Err(VffError::Invalid(format!("'{}' is not a directory", component)));
            }
            listing = self.read_subdirectory(entry)?;
        }

        let entry = find_entry(&listing, last)?;
        Ok(ResolvedPath::Entry(entry.clone()))
    }

    /// Entries of the fixed root block
    pub fn read_root_directory(&self) -> Result<Vec<FileRecord>, VffError> {
        let data = self.clusters.read_root()?;
        decode_directory(data)
    }

    /// Entries of a directory stored in a cluster chain
    pub fn read_subdirectory(&self, dir: &FileRecord) -> Result<Vec<FileRecord>, VffError> {
        if !dir.is_directory() {
            return Err(VffError::Invalid(format!("'{}' is not a directory", dir.name())));
        }
        let chain = self.table.chain(dir.cluster())?;
        debug!(
            "Reading directory '{}' from {} cluster(s) starting at {}",
            dir.name(),
            chain.len(),
            dir.cluster()
        );
        let data = self.clusters.read_chain(&chain)?;
        decode_directory(&data)
    }

    pub fn read_directory(&self, target: &ResolvedPath) -> Result<Vec<FileRecord>, VffError> {
        match target {
            ResolvedPath::Root => self.read_root_directory(),
            ResolvedPath::Entry(record) => self.read_subdirectory(record),
        }
    }

    /// Contents of a file, exactly its declared size
    pub fn read_file(&self, file: &FileRecord) -> Result<Vec<u8>, VffError> {
        if file.is_directory() {
            return Err(VffError::Invalid(format!("'{}' is a directory", file.name())));
        }
        if file.size() == 0 {
            return Ok(Vec::new());
        }

        let chain = self.file_chain(file)?;
        let mut data = self.clusters.read_chain(&chain)?;
        data.truncate(file.size() as usize);
        Ok(data)
    }

    /// Copy file bytes starting at `offset` into `buf`, returning the count copied
    pub fn read_file_at(&self, file: &FileRecord, offset: u64, buf: &mut [u8]) -> Result<usize, VffError> {
        if file.is_directory() {
            return Err(VffError::Invalid(format!("'{}' is a directory", file.name())));
        }
        if offset >= file.size() as u64 || buf.is_empty() {
            return Ok(0);
        }

        let chain = self.file_chain(file)?;
        self.read_chain_at(file, &chain, offset, buf)
    }

    /// Same as `read_file_at` over a chain already returned by `file_chain`
    pub fn read_chain_at(
        &self,
        file: &FileRecord,
        chain: &[u16],
        offset: u64,
        buf: &mut [u8],
    ) -> Result<usize, VffError> {
        let size = file.size() as u64;
        if offset >= size || buf.is_empty() {
            return Ok(0);
        }

        let cluster_size = self.header.cluster_size as u64;
        let wanted = (buf.len() as u64).min(size - offset) as usize;
        let mut copied = 0;

        while copied < wanted {
            let pos = offset + copied as u64;
            let index = (pos / cluster_size) as usize;
            let within = (pos % cluster_size) as usize;
            let cluster = chain.get(index).copied().ok_or_else(|| {
                VffError::Size(format!(
                    "'{}' has no cluster for byte offset {}",
                    file.name(),
                    pos
                ))
            })?;
            let data = self.clusters.read_cluster(cluster)?;
            let n = (data.len() - within).min(wanted - copied);
            buf[copied..copied + n].copy_from_slice(&data[within..within + n]);
            copied += n;
        }

        Ok(copied)
    }

    /// Chain of a non-empty file, checked to cover the declared size
    pub fn file_chain(&self, file: &FileRecord) -> Result<Vec<u16>, VffError> {
        let chain = self.table.chain(file.cluster())?;
        let capacity = chain.len() as u64 * self.header.cluster_size as u64;
        if capacity < file.size() as u64 {
            return Err(VffError::Size(format!(
                "'{}' declares {} bytes but its chain holds only {}",
                file.name(),
                file.size(),
                capacity
            )));
        }
        Ok(chain)
    }

    /// Depth-first traversal below `path`, directories before their contents.
    /// The visitor receives each entry's full path.
    pub fn walk<F>(&self, path: &str, visitor: &mut F) -> Result<(), VffError>
    where
        F: FnMut(&str, &FileRecord) -> Result<(), VffError>,
    {
        let start = self.resolve_path(path)?;
        if !start.is_directory() {
            return Err(VffError::Invalid(format!("'{}' is not a directory", path)));
        }

        let prefix = if start == ResolvedPath::Root {
            String::new()
        } else {
            path.to_string()
        };
        let mut active = HashSet::new();
        if let ResolvedPath::Entry(record) = &start {
            active.insert(record.cluster());
        }
        self.walk_listing(&prefix, &self.read_directory(&start)?, &mut active, visitor)
    }

    fn walk_listing<F>(
        &self,
        prefix: &str,
        listing: &[FileRecord],
        active: &mut HashSet<u16>,
        visitor: &mut F,
    ) -> Result<(), VffError>
    where
        F: FnMut(&str, &FileRecord) -> Result<(), VffError>,
    {
        for record in listing {
            let full = if prefix.is_empty() {
                record.name().to_string()
            } else {
                format!("{}/{}", prefix, record.name())
            };
            visitor(&full, record)?;

            if record.is_directory() {
                // A directory whose chain is already being walked would recurse forever
                if !active.insert(record.cluster()) {
                    return Err(VffError::Chain(format!(
                        "directory '{}' loops back to cluster {}",
                        full,
                        record.cluster()
                    ))
                    .with_path(&full));
                }
                let children = self
                    .read_subdirectory(record)
                    .map_err(|e| e.with_path(&full))?;
                self.walk_listing(&full, &children, active, visitor)?;
                active.remove(&record.cluster());
            }
        }
        Ok(())
    }
}

fn find_entry<'r>(listing: &'r [FileRecord], name: &str) -> Result<&'r FileRecord, VffError> {
    listing
        .iter()
        .find(|record| record.name() == name)
        .ok_or_else(|| VffError::NotFound(format!("'{}' does not exist", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("").unwrap(), Vec::<&str>::new());
        assert_eq!(split_path(".").unwrap(), Vec::<&str>::new());
        assert_eq!(split_path("MB").unwrap(), vec!["MB"]);
        assert_eq!(split_path("MB/R0000032.MSG").unwrap(), vec!["MB", "R0000032.MSG"]);
    }

    #[test]
    fn test_split_path_rejects_relative_and_empty_components() {
        for bad in ["/MB", "MB/", "MB//X", "./MB", "MB/..", "..", "MB/./X"] {
            assert!(
                matches!(split_path(bad), Err(VffError::Invalid(_))),
                "'{}' should be rejected",
                bad
            );
        }
    }
}
