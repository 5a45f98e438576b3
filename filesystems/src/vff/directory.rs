// VFF directory blocks
// Decodes 32-byte short-name entries into file records

use super::constants::*;
use super::timestamps::dos_datetime;
use byteorder::{ByteOrder, LittleEndian};
use chrono::NaiveDateTime;
use log::trace;
use vff_core::{FileKind, FileStat, VffError};

/// Directory entry exactly as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDirEntry {
    pub name: [u8; 8],
    pub extension: [u8; 3],
    pub attributes: u8,
    pub reserved: u8,
    pub creation_tenths: u8,
    pub creation_time: u16,
    pub creation_date: u16,
    pub access_date: u16,
    pub ea_index: u16,
    pub write_time: u16,
    pub write_date: u16,
    pub cluster: u16,
    pub size: u32,
}

impl RawDirEntry {
    /// `bytes` must be one whole entry. Entry fields are little-endian
    /// whatever the volume's byte-order marker says.
    pub fn parse(bytes: &[u8]) -> Result<Self, VffError> {
        if bytes.len() != DIR_ENTRY_SIZE {
            return Err(VffError::Size(format!(
                "directory entry is {} bytes, expected {}",
                bytes.len(),
                DIR_ENTRY_SIZE
            )));
        }

        let mut name = [0u8; 8];
        name.copy_from_slice(&bytes[DIR_NAME..DIR_NAME + 8]);
        let mut extension = [0u8; 3];
        extension.copy_from_slice(&bytes[DIR_EXT..DIR_EXT + 3]);

        Ok(Self {
            name,
            extension,
            attributes: bytes[DIR_ATTR],
            reserved: bytes[DIR_RESERVED],
            creation_tenths: bytes[DIR_CREATE_TENTHS],
            creation_time: LittleEndian::read_u16(&bytes[DIR_CREATE_TIME..]),
            creation_date: LittleEndian::read_u16(&bytes[DIR_CREATE_DATE..]),
            access_date: LittleEndian::read_u16(&bytes[DIR_ACCESS_DATE..]),
            ea_index: LittleEndian::read_u16(&bytes[DIR_EA_INDEX..]),
            write_time: LittleEndian::read_u16(&bytes[DIR_WRITE_TIME..]),
            write_date: LittleEndian::read_u16(&bytes[DIR_WRITE_DATE..]),
            cluster: LittleEndian::read_u16(&bytes[DIR_CLUSTER..]),
            size: LittleEndian::read_u32(&bytes[DIR_SIZE..]),
        })
    }

    pub fn is_free(&self) -> bool {
        self.name[0] == ENTRY_FREE
    }

    pub fn is_deleted(&self) -> bool {
        self.name[0] == ENTRY_DELETED
    }

    pub fn is_long_name(&self) -> bool {
        self.attributes & ATTR_LONG_NAME == ATTR_LONG_NAME
    }

    pub fn is_directory(&self) -> bool {
        self.attributes & ATTR_DIRECTORY != 0
    }

    /// `.` or `..` with a blank extension
    pub fn is_dot_entry(&self) -> bool {
        (self.name == FORBIDDEN_SINGLE_DOT || self.name == FORBIDDEN_DOUBLE_DOT)
            && self.extension == FORBIDDEN_EXTENSION
    }

    /// Name as presented to callers: `NAME` for directories and
    /// extensionless files, `NAME.EXT` otherwise
    pub fn display_name(&self) -> String {
        let mut name = short_field(&self.name);
        if name.as_bytes().first() == Some(&ENTRY_KANJI_E5) {
            name.replace_range(..1, &char::from(ENTRY_DELETED).to_string());
        }
        if self.is_directory() {
            return name;
        }

        let extension = short_field(&self.extension);
        if extension.is_empty() {
            name
        } else {
            format!("{}.{}", name, extension)
        }
    }
}

/// Fixed-width field with trailing pad spaces removed, bytes read as Latin-1
fn short_field(field: &[u8]) -> String {
    let end = field
        .iter()
        .rposition(|&b| b != b' ')
        .map_or(0, |last| last + 1);
    field[..end].iter().map(|&b| b as char).collect()
}

/// Decoded, user-visible directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    name: String,
    kind: FileKind,
    size: u32,
    cluster: u16,
    modified: Option<NaiveDateTime>,
}

impl FileRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Declared size from the entry
    pub fn size(&self) -> u32 {
        self.size
    }

    /// First cluster of the record's chain
    pub fn cluster(&self) -> u16 {
        self.cluster
    }

    pub fn modified(&self) -> Option<NaiveDateTime> {
        self.modified
    }

    pub fn stat(&self) -> FileStat {
        FileStat {
            name: self.name.clone(),
            size: self.size as u64,
            kind: self.kind,
            modified: self.modified,
        }
    }
}

impl From<&RawDirEntry> for FileRecord {
    fn from(entry: &RawDirEntry) -> Self {
        Self {
            name: entry.display_name(),
            kind: if entry.is_directory() {
                FileKind::Directory
            } else {
                FileKind::File
            },
            size: entry.size,
            cluster: entry.cluster,
            modified: dos_datetime(entry.write_date, entry.write_time),
        }
    }
}

/// Decode every visible record of a directory block, in on-disk order
pub fn decode_directory(data: &[u8]) -> Result<Vec<FileRecord>, VffError> {
    if data.len() % DIR_ENTRY_SIZE != 0 {
        return Err(VffError::Size(format!(
            "directory block of {} bytes is not a multiple of {}",
            data.len(),
            DIR_ENTRY_SIZE
        )));
    }

    let mut records = Vec::new();
    for chunk in data.chunks_exact(DIR_ENTRY_SIZE) {
        let entry = RawDirEntry::parse(chunk)?;

        // Nothing after a free slot is meaningful
        if entry.is_free() {
            break;
        }
        if entry.is_deleted() || entry.is_long_name() || entry.is_dot_entry() {
            continue;
        }

        let record = FileRecord::from(&entry);
        trace!(
            "Entry {} ({:?}, {} bytes, cluster {})",
            record.name,
            record.kind,
            record.size,
            record.cluster
        );
        records.push(record);
    }

    Ok(records)
}
