// VFF filesystem reader
// Owns the image and exposes open/stat/read/list over it

use super::cluster_io::ClusterReader;
use super::directory::FileRecord;
use super::fat_table::AllocationTable;
use super::header::{Endianness, VolumeHeader};
use super::options::VffOptions;
use super::path_resolver::{ResolvedPath, VffPathResolver};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::Path;
use vff_core::{FileKind, FileStat, VffError};

/// Geometry and allocation summary
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VolumeInfo {
    pub endianness: Endianness,
    pub image_size: u64,
    pub volume_size: u32,
    pub cluster_size: u32,
    pub cluster_count: u32,
    pub table_size: u64,
    pub root_offset: u64,
    pub data_offset: u64,
    pub free_clusters: u32,
    pub used_clusters: u32,
    pub bad_clusters: u32,
    pub reserved_clusters: u32,
}

/// Read-only VFF volume, immutable after load
pub struct VffFilesystem {
    image: Vec<u8>,
    header: VolumeHeader,
    table: AllocationTable,
}

impl fmt::Debug for VffFilesystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VffFilesystem")
            .field("image_len", &self.image.len())
            .field("header", &self.header)
            .field("table_entries", &self.table.len())
            .finish()
    }
}

impl VffFilesystem {
    pub fn load(image: Vec<u8>) -> Result<Self, VffError> {
        Self::load_with_options(image, &VffOptions::default())
    }

    pub fn load_with_options(image: Vec<u8>, options: &VffOptions) -> Result<Self, VffError> {
        let header = VolumeHeader::parse(&image)?;

        let clusters = ClusterReader::new(&image, &header);
        let table = AllocationTable::parse(clusters.read_table()?, header.endianness)?
            .with_max_chain(options.max_chain_clusters);

        // The root block must be present even if nothing is listed yet
        clusters.read_root()?;

        debug!(
            "Loaded VFF volume: {} clusters of {} bytes, data at {:#x}",
            header.cluster_count,
            header.cluster_size,
            header.data_offset()
        );

        Ok(Self {
            image,
            header,
            table,
        })
    }

    /// Read a whole image file from disk and load it
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, VffError> {
        Self::open_path_with_options(path, &VffOptions::default())
    }

    pub fn open_path_with_options<P: AsRef<Path>>(path: P, options: &VffOptions) -> Result<Self, VffError> {
        let image = std::fs::read(path.as_ref())?;
        Self::load_with_options(image, options)
    }

    pub fn header(&self) -> &VolumeHeader {
        &self.header
    }

    pub fn table(&self) -> &AllocationTable {
        &self.table
    }

    pub fn info(&self) -> VolumeInfo {
        let stats = self.table.stats();
        VolumeInfo {
            endianness: self.header.endianness,
            image_size: self.image.len() as u64,
            volume_size: self.header.volume_size,
            cluster_size: self.header.cluster_size,
            cluster_count: self.header.cluster_count,
            table_size: self.header.table_size(),
            root_offset: self.header.root_offset(),
            data_offset: self.header.data_offset(),
            free_clusters: stats.available,
            used_clusters: stats.in_use + stats.end_of_chain,
            bad_clusters: stats.bad,
            reserved_clusters: stats.reserved,
        }
    }

    fn resolver(&self) -> VffPathResolver<'_> {
        VffPathResolver::new(&self.image, &self.header, &self.table)
    }

    pub fn open(&self, path: &str) -> Result<FileHandle<'_>, VffError> {
        let target = self.resolver().resolve_path(path).map_err(|e| e.with_path(path))?;
        Ok(FileHandle {
            fs: self,
            path: path.to_string(),
            target,
            position: 0,
            chain: None,
        })
    }

    pub fn stat(&self, path: &str) -> Result<FileStat, VffError> {
        Ok(self.open(path)?.stat())
    }

    /// Decoded records of a directory, in on-disk order
    pub fn read_dir(&self, path: &str) -> Result<Vec<FileRecord>, VffError> {
        let resolver = self.resolver();
        resolver
            .resolve_path(path)
            .and_then(|target| {
                if !target.is_directory() {
                    return Err(VffError::Invalid("not a directory".to_string()));
                }
                resolver.read_directory(&target)
            })
            .map_err(|e| e.with_path(path))
    }

    pub fn list_directory(&self, path: &str) -> Result<Vec<FileStat>, VffError> {
        Ok(self.read_dir(path)?.iter().map(FileRecord::stat).collect())
    }

    pub fn read_file(&self, path: &str) -> Result<Vec<u8>, VffError> {
        self.open(path)?.read_all()
    }

    /// Visit every entry below `path` depth-first with its full path
    pub fn walk<F>(&self, path: &str, mut visitor: F) -> Result<(), VffError>
    where
        F: FnMut(&str, &FileRecord) -> Result<(), VffError>,
    {
        self.resolver()
            .walk(path, &mut visitor)
            .map_err(|e| e.with_path(path))
    }
}

/// An opened file or directory
pub struct FileHandle<'a> {
    fs: &'a VffFilesystem,
    path: String,
    target: ResolvedPath,
    position: u64,
    chain: Option<Vec<u16>>,
}

impl fmt::Debug for FileHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &self.path)
            .field("target", &self.target)
            .field("position", &self.position)
            .finish()
    }
}

impl<'a> FileHandle<'a> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn record(&self) -> Option<&FileRecord> {
        match &self.target {
            ResolvedPath::Root => None,
            ResolvedPath::Entry(record) => Some(record),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.target.is_directory()
    }

    pub fn stat(&self) -> FileStat {
        match &self.target {
            ResolvedPath::Root => FileStat {
                name: ".".to_string(),
                size: 0,
                kind: FileKind::Directory,
                modified: None,
            },
            ResolvedPath::Entry(record) => record.stat(),
        }
    }

    fn file(&self) -> Result<&FileRecord, VffError> {
        match &self.target {
            ResolvedPath::Entry(record) if !record.is_directory() => Ok(record),
            _ => Err(VffError::Invalid("is a directory".to_string()).with_path(&self.path)),
        }
    }

    /// Whole contents, exactly the declared size
    pub fn read_all(&self) -> Result<Vec<u8>, VffError> {
        let file = self.file()?;
        self.fs
            .resolver()
            .read_file(file)
            .map_err(|e| e.with_path(&self.path))
    }

    /// Positional read that leaves the handle's cursor alone
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize, VffError> {
        let file = self.file()?;
        self.fs
            .resolver()
            .read_file_at(file, offset, buf)
            .map_err(|e| e.with_path(&self.path))
    }

    /// Entries of an opened directory
    pub fn entries(&self) -> Result<Vec<FileRecord>, VffError> {
        self.fs
            .resolver()
            .read_directory(&self.target)
            .map_err(|e| e.with_path(&self.path))
    }
}

impl FileHandle<'_> {
    /// Sequential read; the chain is resolved on first use and kept
    fn read_next(&mut self, buf: &mut [u8]) -> Result<usize, VffError> {
        let file = match &self.target {
            ResolvedPath::Entry(record) if !record.is_directory() => record,
            _ => return Err(VffError::Invalid("is a directory".to_string()).with_path(&self.path)),
        };
        if self.position >= file.size() as u64 || buf.is_empty() {
            return Ok(0);
        }

        let resolver = self.fs.resolver();
        if self.chain.is_none() {
            let chain = resolver.file_chain(file).map_err(|e| e.with_path(&self.path))?;
            self.chain = Some(chain);
        }
        let chain = self.chain.as_deref().unwrap_or_default();

        let n = resolver
            .read_chain_at(file, chain, self.position, buf)
            .map_err(|e| e.with_path(&self.path))?;
        self.position += n as u64;
        Ok(n)
    }
}

impl io::Read for FileHandle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_next(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
