// VFF on-disk layout constants

use static_assertions::const_assert_eq;

/// ASCII "VFF "
pub const VFF_MAGIC: [u8; 4] = [0x56, 0x46, 0x46, 0x20];

// Endianness markers, read big-endian from offset 4
pub const VFF_BIG_ENDIAN: u16 = 0xFEFF;
pub const VFF_LITTLE_ENDIAN: u16 = 0xFFFE;

// Header field offsets
pub const HDR_MAGIC: usize = 0x00;
pub const HDR_ENDIANNESS: usize = 0x04;
pub const HDR_MARKER: usize = 0x06; // observed to always be 0x0100
pub const HDR_VOLUME_SIZE: usize = 0x08;
pub const HDR_CLUSTER_UNIT: usize = 0x0C;
pub const HDR_FLAGS: usize = 0x10;
pub const HEADER_SIZE: usize = 0x20;

/// Anything smaller cannot hold a header, two tables and the root block
pub const MIN_IMAGE_SIZE: usize = 0x1000;

// Cluster unit scale per encoder
pub const BIG_ENDIAN_CLUSTER_SCALE: u32 = 16;
pub const LITTLE_ENDIAN_CLUSTER_SCALE: u32 = 128;

/// Cluster counts at or above this belong to the 32-bit table class
pub const FAT16_CLUSTER_LIMIT: u32 = 0xFFF5;

// Allocation table codes
pub const CLUSTER_AVAILABLE: u16 = 0x0000;
pub const CLUSTER_RESERVED_MIN: u16 = 0xFFF0;
pub const CLUSTER_RESERVED_MAX: u16 = 0xFFF6;
pub const CLUSTER_BAD: u16 = 0xFFF7;
pub const CLUSTER_END_MIN: u16 = 0xFFF8;

/// Indices 0 and 1 never address data
pub const FIRST_DATA_CLUSTER: u16 = 2;

pub const TABLE_COPIES: u64 = 2;

// Directory entries
pub const DIR_ENTRY_SIZE: usize = 32;
pub const ROOT_DIR_ENTRIES: usize = 32;
pub const ROOT_DIR_SIZE: usize = DIR_ENTRY_SIZE * ROOT_DIR_ENTRIES;
const_assert_eq!(ROOT_DIR_SIZE, 1024);

// Directory entry field offsets
pub const DIR_NAME: usize = 0x00;
pub const DIR_EXT: usize = 0x08;
pub const DIR_ATTR: usize = 0x0B;
pub const DIR_RESERVED: usize = 0x0C;
pub const DIR_CREATE_TENTHS: usize = 0x0D;
pub const DIR_CREATE_TIME: usize = 0x0E;
pub const DIR_CREATE_DATE: usize = 0x10;
pub const DIR_ACCESS_DATE: usize = 0x12;
pub const DIR_EA_INDEX: usize = 0x14;
pub const DIR_WRITE_TIME: usize = 0x16;
pub const DIR_WRITE_DATE: usize = 0x18;
pub const DIR_CLUSTER: usize = 0x1A;
pub const DIR_SIZE: usize = 0x1C;

// First name byte markers
pub const ENTRY_FREE: u8 = 0x00;
pub const ENTRY_DELETED: u8 = 0xE5;
pub const ENTRY_KANJI_E5: u8 = 0x05;

// Attributes
pub const ATTR_LONG_NAME: u8 = 0x0F;
pub const ATTR_DIRECTORY: u8 = 0x10;

// Self and parent links, skipped when their extension is blank
pub const FORBIDDEN_SINGLE_DOT: [u8; 8] = *b".       ";
pub const FORBIDDEN_DOUBLE_DOT: [u8; 8] = *b"..      ";
pub const FORBIDDEN_EXTENSION: [u8; 3] = *b"   ";
