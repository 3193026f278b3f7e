//! In-memory PNG / PPM builders for the integration tests.

#![allow(dead_code)]

use miniz_oxide::deflate::compress_to_vec_zlib;

pub const PNG_SIG: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn crc32(parts: &[&[u8]]) -> u32 {
    let mut crc = !0u32;
    for part in parts {
        for &b in *part {
            crc ^= b as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
            }
        }
    }
    !crc
}

/// Incremental PNG writer; chunks are emitted in call order.
pub struct PngBuilder {
    out: Vec<u8>,
}

impl PngBuilder {
    pub fn new() -> Self {
        Self { out: PNG_SIG.to_vec() }
    }

    pub fn chunk(mut self, ctype: &[u8; 4], data: &[u8]) -> Self {
        self.out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        self.out.extend_from_slice(ctype);
        self.out.extend_from_slice(data);
        self.out.extend_from_slice(&crc32(&[&ctype[..], data]).to_be_bytes());
        self
    }

    pub fn ihdr(self, w: u32, h: u32, depth: u8, color: u8) -> Self {
        let mut d = Vec::with_capacity(13);
        d.extend_from_slice(&w.to_be_bytes());
        d.extend_from_slice(&h.to_be_bytes());
        d.extend_from_slice(&[depth, color, 0, 0, 0]);
        self.chunk(b"IHDR", &d)
    }

    /// Compress `raw` and split the zlib stream at the given sizes; any
    /// remainder goes into a final chunk.
    pub fn idat_split(mut self, raw: &[u8], sizes: &[usize]) -> Self {
        let z = compress_to_vec_zlib(raw, 6);
        let mut rest = &z[..];
        for &n in sizes {
            let n = n.min(rest.len());
            let (head, tail) = rest.split_at(n);
            self = self.chunk(b"IDAT", head);
            rest = tail;
        }
        if !rest.is_empty() {
            self = self.chunk(b"IDAT", rest);
        }
        self
    }

    pub fn idat(self, raw: &[u8]) -> Self {
        self.idat_split(raw, &[])
    }

    pub fn iend(self) -> Vec<u8> {
        self.chunk(b"IEND", &[]).out
    }
}

/// Prefix every row of `rows` with a filter tag.
pub fn with_filter(tag: u8, rows: &[&[u8]]) -> Vec<u8> {
    let mut raw = Vec::new();
    for r in rows {
        raw.push(tag);
        raw.extend_from_slice(r);
    }
    raw
}

/// Write `data` to a unique file under the system temp dir.
pub fn temp_file(name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("smol-raster-{}-{}", std::process::id(), name));
    std::fs::write(&path, data).expect("write temp file");
    path
}
