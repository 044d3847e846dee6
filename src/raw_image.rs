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

use anyhow::{anyhow, Context, Result};

use crate::capstone::Disassembler;
use crate::config::ImageOptions;
use crate::image::{CodeImage, DecodedInstruction, MappedSection};
use crate::memory::{MemoryRegion, RegionClass};

pub const RAW_REGION_NAME: &str = "raw";

/// A flat binary: the whole file is one code region loaded at `base`. There
/// is no symbol information, so no label lines are produced.
pub struct RawImage<'data> {
    section: MappedSection<'data>,
    disasm: Disassembler,
    options: ImageOptions,
}

impl<'data> RawImage<'data> {
    pub fn new(data: &'data [u8], options: ImageOptions) -> Result<Self> {
        let arch = options
            .arch
            .context("raw input needs an explicit --arch")?;
        let disasm = Disassembler::new(arch)
            .map_err(|e| anyhow!("failed to initialise capstone for {:?}: {}", arch, e))?;

        let region = MemoryRegion::new(
            RAW_REGION_NAME.to_string(),
            options.base,
            data.len() as u64,
        );
        Ok(Self {
            section: MappedSection::new(region, RegionClass::Code, data),
            disasm,
            options,
        })
    }
}

impl CodeImage for RawImage<'_> {
    fn code_regions(&self, class: RegionClass) -> Vec<MemoryRegion> {
        if class != self.section.class || self.section.region.is_empty() {
            return Vec::new();
        }
        self.options.select(vec![self.section.region.clone()])
    }

    fn decode_instruction_at(
        &self,
        address: u64,
        max_size: usize,
    ) -> Option<DecodedInstruction> {
        let code = self.section.bytes_at(address, max_size)?;
        self.disasm.decode_one(code, address)
    }

    fn lookup_symbol_name(&self, _address: u64) -> Option<String> {
        None
    }

    fn read_byte(&self, address: u64) -> u8 {
        self.section.byte_at(address).unwrap_or(0)
    }
}
