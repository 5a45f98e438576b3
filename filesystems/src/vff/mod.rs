// VFF module - header, allocation table, directories and path resolution

pub mod constants;
pub mod header;
pub mod fat_table;
pub mod cluster_io;
pub mod timestamps;
pub mod directory;
pub mod path_resolver;
pub mod options;
pub mod reader;

pub use directory::{decode_directory, FileRecord, RawDirEntry};
pub use fat_table::{AllocationTable, ClusterChain, ClusterStatus, TableStats};
pub use header::{Endianness, VolumeHeader};
pub use options::VffOptions;
pub use path_resolver::{split_path, ResolvedPath, VffPathResolver};
pub use reader::{FileHandle, VffFilesystem, VolumeInfo};
