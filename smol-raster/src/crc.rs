// CRC-32 (ISO-HDLC, poly 0xEDB88320) as used for chunk integrity codes.
// Chunk CRCs cover the 4 type bytes followed by the payload.

const CRC_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB8_8320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

#[derive(Clone, Copy)]
pub(crate) struct Crc32(u32);

impl Crc32 {
    pub(crate) fn new() -> Self {
        Self(!0)
    }

    pub(crate) fn update(mut self, data: &[u8]) -> Self {
        for &b in data {
            self.0 = (self.0 >> 8) ^ CRC_TABLE[((self.0 ^ b as u32) & 0xFF) as usize];
        }
        self
    }

    pub(crate) fn finish(self) -> u32 {
        !self.0
    }
}

pub(crate) fn chunk_crc(ctype: &[u8; 4], payload: &[u8]) -> u32 {
    Crc32::new().update(ctype).update(payload).finish()
}
