use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
}

/// What `stat` and directory listings report for one entry
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileStat {
    pub name: String,
    pub size: u64,
    pub kind: FileKind,
    pub modified: Option<NaiveDateTime>,
}

impl FileStat {
    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }
}
