//! Builds small ZIP archives in memory for the integration tests.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

pub const STORED: u16 = 0;
pub const DEFLATE: u16 = 8;

const DOS_DATE_1980_01_01: u16 = (1 << 5) | 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    None,
    Bare,
    Signed,
}

#[derive(Debug, Clone)]
pub struct TestEntry {
    /// Stored name bytes, not necessarily UTF-8
    pub name: Vec<u8>,
    pub data: Vec<u8>,
    pub method: u16,
    /// Use these bytes as the stored payload instead of encoding `data`
    pub payload: Option<Vec<u8>>,
    pub descriptor: Descriptor,
    pub flags: u16,
    pub crc_override: Option<u32>,
    /// Compressed size written to both headers in place of the real one
    pub declared_compressed: Option<u32>,
    /// Values written to the central directory only
    pub central_crc: Option<u32>,
    pub central_compressed: Option<u32>,
    pub central_uncompressed: Option<u32>,
}

impl TestEntry {
    pub fn stored(name: &str, data: &[u8]) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            data: data.to_vec(),
            method: STORED,
            payload: None,
            descriptor: Descriptor::None,
            flags: 0,
            crc_override: None,
            declared_compressed: None,
            central_crc: None,
            central_compressed: None,
            central_uncompressed: None,
        }
    }

    pub fn deflated(name: &str, data: &[u8]) -> Self {
        Self {
            method: DEFLATE,
            ..Self::stored(name, data)
        }
    }

    /// A deflate entry whose compressed stream is given verbatim.
    pub fn raw_deflate(name: &str, data: &[u8], stream: &[u8]) -> Self {
        Self {
            payload: Some(stream.to_vec()),
            ..Self::deflated(name, data)
        }
    }

    pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    pub fn with_method(mut self, method: u16) -> Self {
        self.method = method;
        self
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_crc(mut self, crc: u32) -> Self {
        self.crc_override = Some(crc);
        self
    }

    pub fn with_raw_name(mut self, name: &[u8]) -> Self {
        self.name = name.to_vec();
        self
    }

    pub fn with_declared_compressed(mut self, size: u32) -> Self {
        self.declared_compressed = Some(size);
        self
    }

    pub fn with_central_crc(mut self, crc: u32) -> Self {
        self.central_crc = Some(crc);
        self
    }

    pub fn with_central_compressed(mut self, size: u32) -> Self {
        self.central_compressed = Some(size);
        self
    }

    pub fn with_central_uncompressed(mut self, size: u32) -> Self {
        self.central_uncompressed = Some(size);
        self
    }
}

pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// An entry's local record (header, payload, descriptor) plus the values
/// its central record needs.
pub struct Encoded {
    pub local: Vec<u8>,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub flags: u16,
}

pub fn encode(entry: &TestEntry) -> Encoded {
    let payload = match (&entry.payload, entry.method) {
        (Some(p), _) => p.clone(),
        (None, DEFLATE) => compress(&entry.data),
        (None, _) => entry.data.clone(),
    };
    let crc32 = entry
        .crc_override
        .unwrap_or_else(|| crc32fast::hash(&entry.data));
    let compressed_size = entry
        .declared_compressed
        .unwrap_or(payload.len() as u32);
    let uncompressed_size = entry.data.len() as u32;
    let mut flags = entry.flags;
    if entry.descriptor != Descriptor::None {
        flags |= 0x0008;
    }

    let mut local = Vec::new();
    local.extend_from_slice(b"PK\x03\x04");
    put16(&mut local, 20);
    put16(&mut local, flags);
    put16(&mut local, entry.method);
    put16(&mut local, 0);
    put16(&mut local, DOS_DATE_1980_01_01);
    if entry.descriptor == Descriptor::None {
        put32(&mut local, crc32);
        put32(&mut local, compressed_size);
        put32(&mut local, uncompressed_size);
    } else {
        local.extend_from_slice(&[0u8; 12]);
    }
    put16(&mut local, entry.name.len() as u16);
    put16(&mut local, 0);
    local.extend_from_slice(&entry.name);
    local.extend_from_slice(&payload);

    if entry.descriptor == Descriptor::Signed {
        local.extend_from_slice(b"PK\x07\x08");
    }
    if entry.descriptor != Descriptor::None {
        put32(&mut local, crc32);
        put32(&mut local, compressed_size);
        put32(&mut local, uncompressed_size);
    }

    Encoded {
        local,
        crc32,
        compressed_size,
        uncompressed_size,
        flags,
    }
}

pub fn central_record(entry: &TestEntry, encoded: &Encoded, disk: u16, offset: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"PK\x01\x02");
    put16(&mut out, 20);
    put16(&mut out, 20);
    put16(&mut out, encoded.flags);
    put16(&mut out, entry.method);
    put16(&mut out, 0);
    put16(&mut out, DOS_DATE_1980_01_01);
    put32(&mut out, entry.central_crc.unwrap_or(encoded.crc32));
    put32(
        &mut out,
        entry.central_compressed.unwrap_or(encoded.compressed_size),
    );
    put32(
        &mut out,
        entry
            .central_uncompressed
            .unwrap_or(encoded.uncompressed_size),
    );
    put16(&mut out, entry.name.len() as u16);
    put16(&mut out, 0);
    put16(&mut out, 0);
    put16(&mut out, disk);
    put16(&mut out, 0);
    put32(&mut out, 0);
    put32(&mut out, offset);
    out.extend_from_slice(&entry.name);
    out
}

pub fn eocdr(
    disk: u16,
    cd_disk: u16,
    disk_entries: u16,
    total_entries: u16,
    cd_size: u32,
    cd_offset: u32,
    comment: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"PK\x05\x06");
    put16(&mut out, disk);
    put16(&mut out, cd_disk);
    put16(&mut out, disk_entries);
    put16(&mut out, total_entries);
    put32(&mut out, cd_size);
    put32(&mut out, cd_offset);
    put16(&mut out, comment.len() as u16);
    out.extend_from_slice(comment);
    out
}

/// A complete single-disk archive.
pub fn build(entries: &[TestEntry], comment: &[u8]) -> Vec<u8> {
    let mut archive = Vec::new();
    let mut central = Vec::new();
    for entry in entries {
        let encoded = encode(entry);
        central.extend(central_record(entry, &encoded, 0, archive.len() as u32));
        archive.extend(encoded.local);
    }
    let cd_offset = archive.len() as u32;
    let cd_size = central.len() as u32;
    archive.extend(central);
    let n = entries.len() as u16;
    archive.extend(eocdr(0, 0, n, n, cd_size, cd_offset, comment));
    archive
}

fn put16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
