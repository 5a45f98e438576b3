// In-memory VFF image builder shared by the integration tests
#![allow(dead_code)]

use std::collections::BTreeMap;
use vff_filesystems::Endianness;

pub const ATTR_ARCHIVE: u8 = 0x20;
pub const ATTR_DIRECTORY: u8 = 0x10;
pub const ATTR_LONG_NAME: u8 = 0x0F;

/// Slack byte after file contents; `pattern` never produces it
pub const FILLER: u8 = 0xFF;

pub struct ImageBuilder {
    endianness: Endianness,
    cluster_size: u32,
    cluster_count: u32,
    table: Vec<u16>,
    root: Vec<[u8; 32]>,
    clusters: BTreeMap<u16, Vec<u8>>,
}

impl ImageBuilder {
    /// 32 clusters of 512 bytes
    pub fn new(endianness: Endianness) -> Self {
        Self::with_geometry(endianness, 512, 32)
    }

    pub fn with_geometry(endianness: Endianness, cluster_size: u32, cluster_count: u32) -> Self {
        let mut table = vec![0u16; cluster_count as usize];
        table[0] = 0xFFF8;
        table[1] = 0xFFFF;
        Self {
            endianness,
            cluster_size,
            cluster_count,
            table,
            root: Vec::new(),
            clusters: BTreeMap::new(),
        }
    }

    fn u16_bytes(&self, value: u16) -> [u8; 2] {
        match self.endianness {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        }
    }

    fn u32_bytes(&self, value: u32) -> [u8; 4] {
        match self.endianness {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        }
    }

    pub fn set_code(&mut self, cluster: u16, code: u16) -> &mut Self {
        self.table[cluster as usize] = code;
        self
    }

    /// Link `chain` in order and terminate it
    pub fn link(&mut self, chain: &[u16]) -> &mut Self {
        for pair in chain.windows(2) {
            self.table[pair[0] as usize] = pair[1];
        }
        if let Some(&last) = chain.last() {
            self.table[last as usize] = 0xFFFF;
        }
        self
    }

    pub fn root_entry(&mut self, entry: [u8; 32]) -> &mut Self {
        assert!(self.root.len() < 32, "root directory holds 32 entries");
        self.root.push(entry);
        self
    }

    pub fn cluster_data(&mut self, cluster: u16, data: &[u8]) -> &mut Self {
        assert!(data.len() <= self.cluster_size as usize);
        self.clusters.insert(cluster, data.to_vec());
        self
    }

    /// Spread `contents` over `chain`; the tail of the last cluster is
    /// filled with `FILLER` so reads past the declared size are detectable
    pub fn file(&mut self, chain: &[u16], contents: &[u8]) -> &mut Self {
        self.link(chain);
        let cs = self.cluster_size as usize;
        for (i, &cluster) in chain.iter().enumerate() {
            let mut data = vec![FILLER; cs];
            let start = (i * cs).min(contents.len());
            let end = ((i + 1) * cs).min(contents.len());
            data[..end - start].copy_from_slice(&contents[start..end]);
            self.clusters.insert(cluster, data);
        }
        self
    }

    /// Lay out directory entries across `chain`
    pub fn directory(&mut self, chain: &[u16], entries: &[[u8; 32]]) -> &mut Self {
        self.link(chain);
        let per_cluster = self.cluster_size as usize / 32;
        assert!(entries.len() <= chain.len() * per_cluster);
        for (i, &cluster) in chain.iter().enumerate() {
            let block: Vec<u8> = entries
                .iter()
                .skip(i * per_cluster)
                .take(per_cluster)
                .flatten()
                .copied()
                .collect();
            self.clusters.insert(cluster, block);
        }
        self
    }

    pub fn entry(&self, name: &[u8; 8], ext: &[u8; 3], attributes: u8, cluster: u16, size: u32) -> [u8; 32] {
        let mut raw = [0u8; 32];
        raw[0..8].copy_from_slice(name);
        raw[8..11].copy_from_slice(ext);
        raw[11] = attributes;
        raw[26..28].copy_from_slice(&cluster.to_le_bytes());
        raw[28..32].copy_from_slice(&size.to_le_bytes());
        raw
    }

    pub fn table_size(&self) -> usize {
        let raw = self.cluster_count as usize * 2;
        let cs = self.cluster_size as usize;
        raw.div_ceil(cs) * cs
    }

    pub fn data_offset(&self) -> usize {
        32 + 2 * self.table_size() + 1024
    }

    pub fn build(&self) -> Vec<u8> {
        let cs = self.cluster_size as usize;
        let data_end = self.data_offset() + (self.cluster_count as usize - 2) * cs;
        let mut image = vec![0u8; data_end.max(0x1000)];

        image[0..4].copy_from_slice(b"VFF ");
        match self.endianness {
            Endianness::Big => image[4..6].copy_from_slice(&[0xFE, 0xFF]),
            Endianness::Little => image[4..6].copy_from_slice(&[0xFF, 0xFE]),
        }
        image[6..8].copy_from_slice(&self.u16_bytes(0x0100));
        image[8..12].copy_from_slice(&self.u32_bytes(self.cluster_count * self.cluster_size));
        let unit = match self.endianness {
            Endianness::Big => (self.cluster_size / 16) as u16,
            Endianness::Little => ((self.cluster_size / 128) as u16).reverse_bits(),
        };
        image[12..14].copy_from_slice(&self.u16_bytes(unit));

        let table: Vec<u8> = self.table.iter().flat_map(|&c| self.u16_bytes(c)).collect();
        let first = 32;
        let backup = 32 + self.table_size();
        image[first..first + table.len()].copy_from_slice(&table);
        image[backup..backup + table.len()].copy_from_slice(&table);

        let root = backup + self.table_size();
        for (i, entry) in self.root.iter().enumerate() {
            image[root + i * 32..root + (i + 1) * 32].copy_from_slice(entry);
        }

        for (&cluster, data) in &self.clusters {
            let offset = self.data_offset() + (cluster as usize - 2) * cs;
            image[offset..offset + data.len()].copy_from_slice(data);
        }

        image
    }
}

/// Deterministic, non-repeating-per-cluster file contents, all below 0xFB
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// The mailbox layout used throughout the tests:
///
/// ```text
/// MB/                 chain 3 -> 7
///   (15 deleted)      cluster 3
///   R0000031.MSG      cluster 3, chain 4, 100 bytes
///   R0000032.MSG      cluster 7, chain 5 -> 6, 700 bytes
///   ARCHIVE/          cluster 7, chain 8
///     OLD.MSG         chain 9, 10 bytes
/// WC24MISC.BIN        no chain, 0 bytes
/// EMPTY/              chain 11
/// ```
pub fn mailbox(endianness: Endianness) -> ImageBuilder {
    let mut b = ImageBuilder::new(endianness);

    let mut deleted = b.entry(b"GONE    ", b"MSG", ATTR_ARCHIVE, 0, 0);
    deleted[0] = 0xE5;
    let mut mb = vec![deleted; 15];
    mb.push(b.entry(b"R0000031", b"MSG", ATTR_ARCHIVE, 4, 100));
    mb.push(b.entry(b"R0000032", b"MSG", ATTR_ARCHIVE, 5, 700));
    mb.push(b.entry(b"ARCHIVE ", b"   ", ATTR_DIRECTORY, 8, 0));
    b.directory(&[3, 7], &mb);

    let archive = [
        b.entry(b".       ", b"   ", ATTR_DIRECTORY, 8, 0),
        b.entry(b"..      ", b"   ", ATTR_DIRECTORY, 3, 0),
        b.entry(b"OLD     ", b"MSG", ATTR_ARCHIVE, 9, 10),
    ];
    b.directory(&[8], &archive);

    b.file(&[4], &pattern(100));
    b.file(&[5, 6], &pattern(700));
    b.file(&[9], b"old letter");

    let mb_entry = b.entry(b"MB      ", b"   ", ATTR_DIRECTORY, 3, 0);
    let misc = b.entry(b"WC24MISC", b"BIN", ATTR_ARCHIVE, 0, 0);
    let empty = b.entry(b"EMPTY   ", b"   ", ATTR_DIRECTORY, 11, 0);
    b.root_entry(mb_entry).root_entry(misc).root_entry(empty);
    b.directory(&[11], &[]);

    b
}
