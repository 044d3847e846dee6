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

use log::debug;

use crate::image::CodeImage;
use crate::memory::MemoryRegion;
use crate::record::InstructionRecord;

/// Walks a region front to back, one record at a time.
///
/// Every byte of the region ends up in exactly one record. Where the decoder
/// has nothing to say, or claims an instruction running past the region end,
/// the walker emits a single `db` byte and moves on.
///
/// The decoder is trusted to hand back exactly `size` bytes. One that reports
/// a small size but returns more bytes can make the last record stick out past
/// the region end; the walker does not correct that.
pub struct InstructionWalker<'a, I: CodeImage + ?Sized> {
    image: &'a I,
    cursor: u64,
    end: u64,
}

impl<'a, I: CodeImage + ?Sized> InstructionWalker<'a, I> {
    pub fn new(image: &'a I, region: &MemoryRegion) -> Self {
        Self {
            image,
            cursor: region.start,
            end: region.end(),
        }
    }

    fn record_at(&self, address: u64) -> InstructionRecord {
        let limit = (self.end - address) as usize;
        match self.image.decode_instruction_at(address, limit) {
            Some(insn) if insn.size > 0 && insn.size <= limit => {
                InstructionRecord::decoded(address, insn.bytes, insn.text)
            }
            Some(insn) => {
                debug!(
                    "0x{:x}: {}-byte instruction does not fit {} remaining bytes, emitting data byte",
                    address, insn.size, limit
                );
                InstructionRecord::data_byte(address, self.image.read_byte(address))
            }
            None => {
                debug!("0x{:x}: no instruction decoded, emitting data byte", address);
                InstructionRecord::data_byte(address, self.image.read_byte(address))
            }
        }
    }
}

impl<I: CodeImage + ?Sized> Iterator for InstructionWalker<'_, I> {
    type Item = InstructionRecord;

    fn next(&mut self) -> Option<InstructionRecord> {
        if self.cursor >= self.end {
            return None;
        }
        let record = self.record_at(self.cursor);
        self.cursor = record.next_address();
        Some(record)
    }
}
