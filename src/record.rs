/// A single decoded instruction, or a lone byte the decoder gave up on.
///
/// `bytes` is always an owned copy; patching it never touches the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRecord {
    pub address: u64,
    pub bytes: Vec<u8>,
    pub disasm: String,
    pub decode_failed: bool,
    // Relative to `address`
    pub placeholder_offset: Option<usize>,
}

impl InstructionRecord {
    pub fn decoded(address: u64, bytes: Vec<u8>, disasm: String) -> Self {
        Self {
            address,
            bytes,
            disasm,
            decode_failed: false,
            placeholder_offset: None,
        }
    }

    /// Fallback record for a byte that could not be decoded.
    pub fn data_byte(address: u64, byte: u8) -> Self {
        Self {
            address,
            bytes: vec![byte],
            disasm: format!("db {:02X}h", byte),
            decode_failed: true,
            placeholder_offset: None,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn next_address(&self) -> u64 {
        self.address + self.size() as u64
    }

    /// Image address of the patched slot.
    pub fn placeholder_address(&self) -> Option<u64> {
        self.placeholder_offset
            .map(|offset| self.address + offset as u64)
    }
}
