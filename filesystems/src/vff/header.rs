// VFF volume header
// Signature check, byte-order detection and geometry derivation

use super::constants::*;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;
use serde::Serialize;
use vff_core::VffError;

/// Byte order of every multi-byte field after the endianness marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    pub fn from_marker(marker: u16) -> Option<Self> {
        match marker {
            VFF_BIG_ENDIAN => Some(Endianness::Big),
            VFF_LITTLE_ENDIAN => Some(Endianness::Little),
            _ => None,
        }
    }

    /// `buf` must hold at least two bytes
    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Endianness::Big => BigEndian::read_u16(buf),
            Endianness::Little => LittleEndian::read_u16(buf),
        }
    }

    /// `buf` must hold at least four bytes
    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Endianness::Big => BigEndian::read_u32(buf),
            Endianness::Little => LittleEndian::read_u32(buf),
        }
    }

    /// The two historical encoders scale the stored unit differently
    fn cluster_size(self, unit: u16) -> u32 {
        match self {
            Endianness::Big => unit as u32 * BIG_ENDIAN_CLUSTER_SCALE,
            Endianness::Little => unit.reverse_bits() as u32 * LITTLE_ENDIAN_CLUSTER_SCALE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeHeader {
    pub endianness: Endianness,
    pub marker: u16,
    pub volume_size: u32,
    pub cluster_unit: u16,
    pub cluster_size: u32,
    pub cluster_count: u32,
    pub flags: u8,
}

impl VolumeHeader {
    pub fn parse(image: &[u8]) -> Result<Self, VffError> {
        if image.len() < MIN_IMAGE_SIZE {
            return Err(VffError::Format(format!(
                "image is {} bytes, expected at least {}",
                image.len(),
                MIN_IMAGE_SIZE
            )));
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&image[HDR_MAGIC..HDR_MAGIC + 4]);
        if magic != VFF_MAGIC {
            return Err(VffError::Magic(magic));
        }

        let raw_marker = BigEndian::read_u16(&image[HDR_ENDIANNESS..]);
        let endianness = Endianness::from_marker(raw_marker).ok_or_else(|| {
            VffError::Format(format!("unknown endianness marker {:#06x}", raw_marker))
        })?;

        let marker = endianness.read_u16(&image[HDR_MARKER..]);
        let volume_size = endianness.read_u32(&image[HDR_VOLUME_SIZE..]);
        let cluster_unit = endianness.read_u16(&image[HDR_CLUSTER_UNIT..]);
        let flags = image[HDR_FLAGS];

        let cluster_size = endianness.cluster_size(cluster_unit);
        if cluster_size == 0 {
            return Err(VffError::Format(format!(
                "cluster size unit {:#06x} yields an empty cluster",
                cluster_unit
            )));
        }

        let cluster_count = volume_size / cluster_size;
        if cluster_count == 0 || cluster_count >= FAT16_CLUSTER_LIMIT {
            return Err(VffError::UnsupportedVariant(format!(
                "{} clusters does not fit a 16-bit allocation table",
                cluster_count
            )));
        }

        debug!(
            "VFF header: {:?}-endian, volume {} bytes, cluster {} bytes, {} clusters",
            endianness, volume_size, cluster_size, cluster_count
        );

        Ok(Self {
            endianness,
            marker,
            volume_size,
            cluster_unit,
            cluster_size,
            cluster_count,
            flags,
        })
    }

    /// Bytes actually holding table codes
    pub fn table_entries_len(&self) -> usize {
        self.cluster_count as usize * 2
    }

    /// One table copy on disk, rounded up to a whole cluster
    pub fn table_size(&self) -> u64 {
        let raw = self.table_entries_len() as u64;
        let cluster = self.cluster_size as u64;
        raw.div_ceil(cluster) * cluster
    }

    pub fn table_offset(&self) -> u64 {
        HEADER_SIZE as u64
    }

    pub fn root_offset(&self) -> u64 {
        self.table_offset() + TABLE_COPIES * self.table_size()
    }

    /// Where cluster 2 begins
    pub fn data_offset(&self) -> u64 {
        self.root_offset() + ROOT_DIR_SIZE as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_image(endian: [u8; 2], volume_size: [u8; 4], unit: [u8; 2]) -> Vec<u8> {
        let mut image = vec![0u8; MIN_IMAGE_SIZE];
        image[0..4].copy_from_slice(&VFF_MAGIC);
        image[4..6].copy_from_slice(&endian);
        image[8..12].copy_from_slice(&volume_size);
        image[12..14].copy_from_slice(&unit);
        image
    }

    #[test]
    fn test_big_endian_header() {
        let mut image = header_image([0xFE, 0xFF], 8192u32.to_be_bytes(), 32u16.to_be_bytes());
        image[6..8].copy_from_slice(&0x0100u16.to_be_bytes());
        let header = VolumeHeader::parse(&image).unwrap();

        assert_eq!(header.endianness, Endianness::Big);
        assert_eq!(header.marker, 0x0100);
        assert_eq!(header.volume_size, 8192);
        assert_eq!(header.cluster_size, 512);
        assert_eq!(header.cluster_count, 16);
        assert_eq!(header.table_size(), 512);
        assert_eq!(header.root_offset(), 32 + 1024);
        assert_eq!(header.data_offset(), 32 + 1024 + 1024);
    }

    #[test]
    fn test_little_endian_header_reverses_unit() {
        // 0x2000 bit-reversed is 4, times 128
        let image = header_image([0xFF, 0xFE], 8192u32.to_le_bytes(), 0x2000u16.to_le_bytes());
        let header = VolumeHeader::parse(&image).unwrap();

        assert_eq!(header.endianness, Endianness::Little);
        assert_eq!(header.volume_size, 8192);
        assert_eq!(header.cluster_unit, 0x2000);
        assert_eq!(header.cluster_size, 512);
        assert_eq!(header.cluster_count, 16);
    }

    #[test]
    fn test_unknown_marker_is_format_error() {
        let image = header_image([0x12, 0x34], 8192u32.to_be_bytes(), 32u16.to_be_bytes());
        assert!(matches!(VolumeHeader::parse(&image), Err(VffError::Format(_))));
    }

    #[test]
    fn test_bad_magic() {
        let mut image = header_image([0xFE, 0xFF], 8192u32.to_be_bytes(), 32u16.to_be_bytes());
        image[3] = b'!';
        match VolumeHeader::parse(&image) {
            Err(VffError::Magic(found)) => assert_eq!(&found, b"VFF!"),
            other => panic!("expected magic error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_image_rejected() {
        let image = header_image([0xFE, 0xFF], 8192u32.to_be_bytes(), 32u16.to_be_bytes());
        assert!(matches!(
            VolumeHeader::parse(&image[..MIN_IMAGE_SIZE - 1]),
            Err(VffError::Format(_))
        ));
    }

    #[test]
    fn test_zero_cluster_unit_rejected() {
        let image = header_image([0xFE, 0xFF], 8192u32.to_be_bytes(), [0, 0]);
        assert!(matches!(VolumeHeader::parse(&image), Err(VffError::Format(_))));
    }

    #[test]
    fn test_cluster_count_outside_fat16() {
        // 0xFFF5 clusters of 16 bytes
        let image = header_image([0xFE, 0xFF], (0xFFF5u32 * 16).to_be_bytes(), 1u16.to_be_bytes());
        assert!(matches!(
            VolumeHeader::parse(&image),
            Err(VffError::UnsupportedVariant(_))
        ));

        let image = header_image([0xFE, 0xFF], 100u32.to_be_bytes(), 32u16.to_be_bytes());
        assert!(matches!(
            VolumeHeader::parse(&image),
            Err(VffError::UnsupportedVariant(_))
        ));
    }

    #[test]
    fn test_table_size_rounds_to_cluster() {
        let image = header_image([0xFE, 0xFF], (300u32 * 512).to_be_bytes(), 32u16.to_be_bytes());
        let header = VolumeHeader::parse(&image).unwrap();
        // 600 bytes of codes occupy two clusters
        assert_eq!(header.table_entries_len(), 600);
        assert_eq!(header.table_size(), 1024);
    }
}
