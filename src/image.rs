// Copyright (c) 2026 Stub-Array Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The capability the generator pulls everything from.
//!
//! The generator never reaches for files, disassemblers or symbol tables on its
//! own. Whatever loaded the code hands in something implementing [`CodeImage`],
//! and the pipeline only ever talks to that.

use std::borrow::Cow;

use crate::memory::{MemoryRegion, RegionClass};

/// One instruction as reported by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub size: usize,
    pub bytes: Vec<u8>,
    pub text: String,
}

pub trait CodeImage {
    /// Regions of the requested class, in image order.
    fn code_regions(&self, class: RegionClass) -> Vec<MemoryRegion>;

    /// Decode a single instruction at `address`, looking at no more than
    /// `max_size` bytes. Implementations are expected to honour the bound; the
    /// walker only checks that the reported size does not exceed it.
    fn decode_instruction_at(&self, address: u64, max_size: usize)
        -> Option<DecodedInstruction>;

    /// Name bound exactly at `address`, if any.
    fn lookup_symbol_name(&self, address: u64) -> Option<String>;

    /// Byte at `address`. Only called for addresses inside a region handed out
    /// by `code_regions`.
    fn read_byte(&self, address: u64) -> u8;
}

/// Bytes of one loaded section together with where they live. The bytes are
/// borrowed from the input unless the section had to be decompressed.
#[derive(Debug, Clone)]
pub struct MappedSection<'data> {
    pub region: MemoryRegion,
    pub class: RegionClass,
    pub data: Cow<'data, [u8]>,
}

impl<'data> MappedSection<'data> {
    pub fn new(
        region: MemoryRegion,
        class: RegionClass,
        data: impl Into<Cow<'data, [u8]>>,
    ) -> Self {
        Self {
            region,
            class,
            data: data.into(),
        }
    }

    /// Up to `max` bytes starting at `address`, stopping at the section end.
    pub fn bytes_at(&self, address: u64, max: usize) -> Option<&[u8]> {
        if !self.region.contains(address) {
            return None;
        }
        let start = (address - self.region.start) as usize;
        let end = start.saturating_add(max).min(self.data.len());
        self.data.get(start..end)
    }

    pub fn byte_at(&self, address: u64) -> Option<u8> {
        self.bytes_at(address, 1)?.first().copied()
    }
}
