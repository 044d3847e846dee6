//! In-memory `CodeImage` for unit tests. Instructions are scripted by address;
//! anything not scripted fails to decode.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::image::{CodeImage, DecodedInstruction};
use crate::memory::{MemoryRegion, RegionClass};

struct Scripted {
    size: usize,
    text: String,
    ignore_bound: bool,
}

pub struct ScriptedImage {
    base: u64,
    data: Vec<u8>,
    insns: BTreeMap<u64, Scripted>,
    names: BTreeMap<u64, String>,
    regions: Vec<MemoryRegion>,
    bounds: RefCell<Vec<(u64, usize)>>,
}

impl ScriptedImage {
    pub fn new(base: u64, data: &[u8]) -> Self {
        Self {
            base,
            data: data.to_vec(),
            insns: BTreeMap::new(),
            names: BTreeMap::new(),
            regions: Vec::new(),
            bounds: RefCell::new(Vec::new()),
        }
    }

    pub fn insn(mut self, address: u64, size: usize, text: &str) -> Self {
        self.insns.insert(
            address,
            Scripted {
                size,
                text: text.to_string(),
                ignore_bound: false,
            },
        );
        self
    }

    /// Reports `size` even when it exceeds the bound the walker passes in.
    pub fn oversized(mut self, address: u64, size: usize, text: &str) -> Self {
        self.insns.insert(
            address,
            Scripted {
                size,
                text: text.to_string(),
                ignore_bound: true,
            },
        );
        self
    }

    pub fn name(mut self, address: u64, name: &str) -> Self {
        self.names.insert(address, name.to_string());
        self
    }

    pub fn region(mut self, name: &str, start: u64, size: u64) -> Self {
        self.regions
            .push(MemoryRegion::new(name.to_string(), start, size));
        self
    }

    pub fn whole(&self) -> MemoryRegion {
        MemoryRegion::new("whole".to_string(), self.base, self.data.len() as u64)
    }

    pub fn bounds_seen(&self) -> Vec<(u64, usize)> {
        self.bounds.borrow().clone()
    }
}

impl CodeImage for ScriptedImage {
    fn code_regions(&self, class: RegionClass) -> Vec<MemoryRegion> {
        match class {
            RegionClass::Code if self.regions.is_empty() => vec![self.whole()],
            RegionClass::Code => self.regions.clone(),
            RegionClass::Data => Vec::new(),
        }
    }

    fn decode_instruction_at(
        &self,
        address: u64,
        max_size: usize,
    ) -> Option<DecodedInstruction> {
        self.bounds.borrow_mut().push((address, max_size));
        let scripted = self.insns.get(&address)?;
        if scripted.size > max_size && !scripted.ignore_bound {
            return None;
        }
        let start = (address - self.base) as usize;
        let end = (start + scripted.size).min(self.data.len());
        Some(DecodedInstruction {
            size: scripted.size,
            bytes: self.data[start..end].to_vec(),
            text: scripted.text.clone(),
        })
    }

    fn lookup_symbol_name(&self, address: u64) -> Option<String> {
        self.names.get(&address).cloned()
    }

    fn read_byte(&self, address: u64) -> u8 {
        self.data[(address - self.base) as usize]
    }
}
