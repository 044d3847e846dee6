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

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info, warn};
use object::{Object, ObjectKind, ObjectSection, ObjectSymbol, SectionIndex, SectionKind, SymbolKind};

use crate::capstone::{Arch, Disassembler};
use crate::config::ImageOptions;
use crate::image::{CodeImage, DecodedInstruction, MappedSection};
use crate::memory::{MemoryRegion, RegionClass};
use crate::symbols::{demangle, Symbol, SymbolTable, SymbolType};

fn section_class(kind: SectionKind) -> Option<RegionClass> {
    match kind {
        SectionKind::Text => Some(RegionClass::Code),
        SectionKind::Data | SectionKind::ReadOnlyData | SectionKind::ReadOnlyString => {
            Some(RegionClass::Data)
        }
        _ => None,
    }
}

fn symbol_type(kind: SymbolKind) -> Option<SymbolType> {
    match kind {
        SymbolKind::Text => Some(SymbolType::Function),
        SymbolKind::Label => Some(SymbolType::Label),
        SymbolKind::Data => Some(SymbolType::Data),
        SymbolKind::Unknown => Some(SymbolType::Unknown),
        _ => None,
    }
}

/// Code and symbols pulled out of an ELF/PE/Mach-O/COFF file.
///
/// Sections of a relocatable object all claim address 0, so they are laid out
/// back to back (respecting alignment) and symbols are shifted along with
/// their section. Linked images keep their real addresses.
pub struct ObjectImage<'data> {
    sections: Vec<MappedSection<'data>>,
    symbols: SymbolTable,
    disasm: Disassembler,
    arch: Arch,
    options: ImageOptions,
}

impl<'data> ObjectImage<'data> {
    pub fn parse(data: &'data [u8], options: ImageOptions) -> Result<Self> {
        let obj_file = object::File::parse(data).context("failed to parse object file")?;
        let arch = match options.arch {
            Some(arch) => arch,
            None => detect_arch(&obj_file)?,
        };
        let disasm = Disassembler::new(arch)
            .map_err(|e| anyhow!("failed to initialise capstone for {:?}: {}", arch, e))?;

        let relocatable = obj_file.kind() == ObjectKind::Relocatable;
        let mut bases: HashMap<SectionIndex, u64> = HashMap::new();
        let mut sections = Vec::new();
        let mut cursor: u64 = 0;

        for section in obj_file.sections() {
            let Some(class) = section_class(section.kind()) else {
                continue;
            };
            let name = section.name().unwrap_or("").to_string();
            let bytes = section
                .uncompressed_data()
                .with_context(|| format!("failed to read section {}", name))?;
            if bytes.is_empty() {
                continue;
            }

            let start = if relocatable {
                let align = section.align().max(1);
                cursor = cursor.div_ceil(align) * align;
                let start = cursor;
                cursor += bytes.len() as u64;
                start
            } else {
                section.address()
            };
            bases.insert(section.index(), start);

            debug!(
                "Section {} [0x{:x}-0x{:x}) {:?}",
                name,
                start,
                start + bytes.len() as u64,
                class
            );
            let region = MemoryRegion::new(name, start, bytes.len() as u64);
            sections.push(MappedSection::new(region, class, bytes));
        }

        let is_arm = obj_file.architecture() == object::Architecture::Arm;
        let mut symbols = SymbolTable::new();
        for sym in obj_file.symbols() {
            let Some(kind) = symbol_type(sym.kind()) else {
                continue;
            };
            let Ok(raw_name) = sym.name() else {
                continue;
            };
            // ARM/AArch64 mapping symbols ($a, $t, $d, $x) are not names
            if raw_name.is_empty() || raw_name.starts_with('$') {
                continue;
            }
            let mut value = sym.address();
            // Thumb function symbols carry the mode in bit 0
            if is_arm && sym.kind() == SymbolKind::Text {
                value &= !1;
            }
            let address = match (relocatable, sym.section_index()) {
                (true, Some(index)) => match bases.get(&index) {
                    Some(base) => base + value,
                    None => continue,
                },
                (true, None) => continue,
                (false, _) => value,
            };
            let name = if options.demangle {
                demangle(raw_name)
            } else {
                raw_name.to_string()
            };
            symbols.insert(Symbol {
                name,
                address,
                kind,
            });
        }
        if symbols.is_empty() {
            debug!("No usable symbols, output will have no label lines");
        }

        info!(
            "Loaded {:?} object: {} section(s), {} symbol(s), decoding as {:?}",
            obj_file.format(),
            sections.len(),
            symbols.len(),
            arch
        );

        Ok(Self {
            sections,
            symbols,
            disasm,
            arch,
            options,
        })
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    fn section_at(&self, address: u64) -> Option<&MappedSection<'data>> {
        self.sections.iter().find(|s| s.region.contains(address))
    }
}

fn detect_arch(obj_file: &object::File) -> Result<Arch> {
    let machine = obj_file.architecture();
    match Arch::from_object(machine) {
        Some(Arch::Arm) if is_thumb(obj_file) => Ok(Arch::Thumb),
        Some(arch) => Ok(arch),
        None => bail!(
            "unsupported architecture {:?}, pass --arch to pick a decoder",
            machine
        ),
    }
}

/// A Thumb entry point or Thumb function symbol has bit 0 set. Relocatable
/// objects have no entry point, so the `$t`/`$a` mapping symbols are counted
/// as well and the majority wins.
fn is_thumb(obj_file: &object::File) -> bool {
    if obj_file.entry() & 1 == 1 {
        return true;
    }
    let mut thumb = 0usize;
    let mut arm = 0usize;
    for sym in obj_file.symbols() {
        let Ok(name) = sym.name() else {
            continue;
        };
        if name == "$t" || name.starts_with("$t.") {
            thumb += 1;
        } else if name == "$a" || name.starts_with("$a.") {
            arm += 1;
        } else if sym.kind() == SymbolKind::Text && sym.address() & 1 == 1 {
            thumb += 1;
        }
    }
    if thumb > 0 && arm > 0 {
        warn!(
            "Object mixes ARM ({}) and Thumb ({}) code, pass --arch to pick the decoder",
            arm, thumb
        );
    }
    thumb > arm
}

impl CodeImage for ObjectImage<'_> {
    fn code_regions(&self, class: RegionClass) -> Vec<MemoryRegion> {
        let regions = self
            .sections
            .iter()
            .filter(|s| s.class == class)
            .map(|s| s.region.clone())
            .collect();
        self.options.select(regions)
    }

    fn decode_instruction_at(
        &self,
        address: u64,
        max_size: usize,
    ) -> Option<DecodedInstruction> {
        let code = self.section_at(address)?.bytes_at(address, max_size)?;
        self.disasm.decode_one(code, address)
    }

    fn lookup_symbol_name(&self, address: u64) -> Option<String> {
        self.symbols.name_at(address).map(str::to_string)
    }

    fn read_byte(&self, address: u64) -> u8 {
        self.section_at(address)
            .and_then(|s| s.byte_at(address))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object::write::{Object as ObjectWriter, StandardSection, Symbol as WriteSymbol, SymbolSection};
    use object::{Architecture, BinaryFormat, Endianness, SymbolFlags, SymbolScope};

    fn add_symbol(obj: &mut ObjectWriter, name: &str, section: object::write::SectionId, value: u64, size: u64) {
        obj.add_symbol(WriteSymbol {
            name: name.as_bytes().to_vec(),
            value,
            size,
            kind: SymbolKind::Text,
            scope: SymbolScope::Linkage,
            weak: false,
            section: SymbolSection::Section(section),
            flags: SymbolFlags::None,
        });
    }

    fn build_elf() -> Vec<u8> {
        let mut obj = ObjectWriter::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
        let data = obj.section_id(StandardSection::Data);
        obj.append_section_data(data, &[1, 2, 3, 4], 8);

        let text = obj.section_id(StandardSection::Text);
        // nop; mov eax, 0xdeadbeef; ret
        let code = [0x90, 0xb8, 0xde, 0xad, 0xbe, 0xef, 0xc3];
        let offset = obj.append_section_data(text, &code, 16);
        add_symbol(&mut obj, "stub_entry", text, offset, code.len() as u64);
        add_symbol(&mut obj, "_ZN4stub4body17h0123456789abcdefE", text, offset + 1, 6);
        obj.write().unwrap()
    }

    #[test]
    fn relocatable_sections_get_distinct_addresses() {
        let bytes = build_elf();
        let image = ObjectImage::parse(&bytes, ImageOptions::default()).unwrap();
        assert_eq!(image.arch(), Arch::X86_64);

        let code = image.code_regions(RegionClass::Code);
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].name, ".text");
        assert_eq!(code[0].size, 7);

        let data = image.code_regions(RegionClass::Data);
        assert_eq!(data.len(), 1);
        assert!(data[0].end() <= code[0].start || code[0].end() <= data[0].start);

        let start = code[0].start;
        assert_eq!(image.lookup_symbol_name(start).as_deref(), Some("stub_entry"));
        assert_eq!(image.read_byte(start + 6), 0xc3);

        let insn = image.decode_instruction_at(start + 1, 6).unwrap();
        assert_eq!(insn.size, 5);
    }

    #[test]
    fn demangled_names_on_request() {
        let bytes = build_elf();
        let plain = ObjectImage::parse(&bytes, ImageOptions::default()).unwrap();
        let start = plain.code_regions(RegionClass::Code)[0].start;
        assert_eq!(
            plain.lookup_symbol_name(start + 1).as_deref(),
            Some("_ZN4stub4body17h0123456789abcdefE")
        );

        let options = ImageOptions {
            demangle: true,
            ..Default::default()
        };
        let demangled = ObjectImage::parse(&bytes, options).unwrap();
        assert_eq!(demangled.lookup_symbol_name(start + 1).as_deref(), Some("stub::body"));
    }

    #[test]
    fn section_filter_applies() {
        let bytes = build_elf();
        let options = ImageOptions {
            sections: vec![".init".to_string()],
            ..Default::default()
        };
        let image = ObjectImage::parse(&bytes, options).unwrap();
        assert!(image.code_regions(RegionClass::Code).is_empty());
    }

    fn build_thumb_elf(function: bool) -> Vec<u8> {
        let mut obj = ObjectWriter::new(BinaryFormat::Elf, Architecture::Arm, Endianness::Little);
        let text = obj.section_id(StandardSection::Text);
        // movs r0, #0; bx lr
        let offset = obj.append_section_data(text, &[0x00, 0x20, 0x70, 0x47], 4);
        if function {
            add_symbol(&mut obj, "thumb_stub", text, offset | 1, 4);
        } else {
            obj.add_symbol(WriteSymbol {
                name: b"$t".to_vec(),
                value: offset,
                size: 0,
                kind: SymbolKind::Label,
                scope: SymbolScope::Compilation,
                weak: false,
                section: SymbolSection::Section(text),
                flags: SymbolFlags::None,
            });
        }
        obj.write().unwrap()
    }

    #[test]
    fn thumb_function_gets_label_and_thumb_decoding() {
        let bytes = build_thumb_elf(true);
        let image = ObjectImage::parse(&bytes, ImageOptions::default()).unwrap();
        assert_eq!(image.arch(), Arch::Thumb);

        let start = image.code_regions(RegionClass::Code)[0].start;
        assert_eq!(image.lookup_symbol_name(start).as_deref(), Some("thumb_stub"));
        assert_eq!(image.lookup_symbol_name(start + 1), None);

        let out = crate::generate_code(&image, &crate::GeneratorConfig::new("T"), RegionClass::Code);
        let lines: Vec<&str> = out.text.lines().collect();
        assert!(lines[1].ends_with("// thumb_stub:"));
        assert!(lines[2].starts_with("\t0x00, 0x20, "));
        assert!(lines[2].ends_with("//   movs r0, #0"));
        assert!(lines[3].starts_with("\t0x70, 0x47, "));
        assert!(lines[3].ends_with("//   bx lr"));
    }

    #[test]
    fn thumb_mapping_symbol_selects_thumb() {
        let bytes = build_thumb_elf(false);
        let image = ObjectImage::parse(&bytes, ImageOptions::default()).unwrap();
        assert_eq!(image.arch(), Arch::Thumb);
        let start = image.code_regions(RegionClass::Code)[0].start;
        assert_eq!(image.decode_instruction_at(start, 4).map(|i| i.size), Some(2));

        let options = ImageOptions {
            arch: Some(Arch::Arm),
            ..Default::default()
        };
        let forced = ObjectImage::parse(&bytes, options).unwrap();
        assert_eq!(forced.arch(), Arch::Arm);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = ObjectImage::parse(b"not an object file", ImageOptions::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("failed to parse object file"));
    }
}
