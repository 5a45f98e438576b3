// Read-only driver for VFF container images
pub mod vff;

pub use vff::{
    AllocationTable, ClusterStatus, Endianness, FileHandle, FileRecord, VffFilesystem,
    VffOptions, VolumeHeader, VolumeInfo,
};
pub use vff_core::{ErrorKind, FileKind, FileStat, VffError};
