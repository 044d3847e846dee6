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

//! Glues the pipeline together: regions are walked, scanned for sentinels and
//! rendered into one C array, followed by the offset and size macros.

use std::fmt::Write;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::GeneratorConfig;
use crate::formatter::ByteArrayFormatter;
use crate::image::CodeImage;
use crate::memory::{MemoryRegion, RegionClass};
use crate::record::InstructionRecord;
use crate::scanner::extract_placeholder;
use crate::walker::InstructionWalker;

/// A zeroed sentinel slot in the generated array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    pub index: usize,
    /// Byte offset from the start of the array.
    pub offset: u64,
    /// Where the slot sits in the source image.
    pub address: u64,
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub identifier: String,
    pub text: String,
    pub placeholders: Vec<Placeholder>,
    pub regions: Vec<MemoryRegion>,
    pub size: u64,
}

pub struct CodeGenerator<'a, I: CodeImage + ?Sized> {
    image: &'a I,
    config: &'a GeneratorConfig,
}

impl<'a, I: CodeImage + ?Sized> CodeGenerator<'a, I> {
    pub fn new(image: &'a I, config: &'a GeneratorConfig) -> Self {
        Self { image, config }
    }

    /// Generate from every region of `class` the image hands out.
    pub fn generate(&self, class: RegionClass) -> Generated {
        let regions = self.image.code_regions(class);
        self.generate_regions(regions)
    }

    /// Generate from an explicit region list, in the order given.
    pub fn generate_regions(&self, regions: Vec<MemoryRegion>) -> Generated {
        let ident = &self.config.identifier;
        let mut text = String::new();
        let mut placeholders: Vec<Placeholder> = Vec::new();
        let mut size: u64 = 0;

        if regions.iter().all(|r| r.is_empty()) {
            warn!("No regions to convert, {} will be an empty array", ident);
        }

        let _ = writeln!(text, "static const uint8_t {}[] = {{", ident);
        for region in regions.iter().filter(|r| !r.is_empty()) {
            let records = self.scan_region(region);
            let formatter = ByteArrayFormatter::measure(&records);
            debug!(
                "{} [0x{:x}-0x{:x}): {} records, comment column {}",
                region.name,
                region.start,
                region.end(),
                records.len(),
                formatter.width()
            );

            for record in &records {
                let label = self.image.lookup_symbol_name(record.address);
                text.push_str(&formatter.render(record, label.as_deref()));

                if let (Some(relative), Some(address)) =
                    (record.placeholder_offset, record.placeholder_address())
                {
                    let placeholder = Placeholder {
                        index: placeholders.len(),
                        offset: size + relative as u64,
                        address,
                    };
                    info!(
                        "Located a placeholder at offset: {:X}h (address 0x{:x})",
                        placeholder.offset, placeholder.address
                    );
                    placeholders.push(placeholder);
                }
                size += record.size() as u64;
            }
        }
        text.push_str("};\n");

        if !placeholders.is_empty() {
            text.push('\n');
            for p in &placeholders {
                let _ = writeln!(text, "#define {}_OFFSET_{} 0x{:02X}", ident, p.index, p.offset);
            }
        }
        let _ = write!(text, "\n#define {0}_SIZE sizeof({0})\n", ident);

        info!(
            "Generated {} bytes with {} placeholder(s) from {} region(s)",
            size,
            placeholders.len(),
            regions.len()
        );

        Generated {
            identifier: ident.clone(),
            text,
            placeholders,
            regions,
            size,
        }
    }

    // Walk and scan the whole region up front; the formatter needs every
    // record before it can render the first one.
    fn scan_region(&self, region: &MemoryRegion) -> Vec<InstructionRecord> {
        InstructionWalker::new(self.image, region)
            .map(|mut record| {
                extract_placeholder(&mut record, &self.config.sentinel);
                record
            })
            .collect()
    }
}

/// Convenience wrapper over [`CodeGenerator`] for the common case.
pub fn generate_code<I: CodeImage + ?Sized>(
    image: &I,
    config: &GeneratorConfig,
    class: RegionClass,
) -> Generated {
    CodeGenerator::new(image, config).generate(class)
}
