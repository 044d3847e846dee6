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

use capstone::prelude::*;

use crate::image::DecodedInstruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Arch {
    #[value(name = "x86-16")]
    X86_16,
    #[value(name = "x86-32")]
    X86_32,
    #[value(name = "x86-64")]
    X86_64,
    Arm,
    Thumb,
}

impl Arch {
    /// Map an object file's machine type onto something we can decode.
    pub fn from_object(arch: object::Architecture) -> Option<Self> {
        match arch {
            object::Architecture::I386 => Some(Arch::X86_32),
            object::Architecture::X86_64 | object::Architecture::X86_64_X32 => Some(Arch::X86_64),
            object::Architecture::Arm => Some(Arch::Arm),
            _ => None,
        }
    }
}

pub struct Disassembler {
    cs: Capstone,
}

impl Disassembler {
    pub fn new(target: Arch) -> Result<Self, capstone::Error> {
        let cs = match target {
            Arch::X86_16 | Arch::X86_32 | Arch::X86_64 => {
                let mode = match target {
                    Arch::X86_16 => arch::x86::ArchMode::Mode16,
                    Arch::X86_32 => arch::x86::ArchMode::Mode32,
                    _ => arch::x86::ArchMode::Mode64,
                };
                Capstone::new()
                    .x86()
                    .mode(mode)
                    .syntax(arch::x86::ArchSyntax::Intel)
                    .detail(false)
                    .build()?
            }
            Arch::Arm => Capstone::new()
                .arm()
                .mode(arch::arm::ArchMode::Arm)
                .detail(false)
                .build()?,
            Arch::Thumb => Capstone::new()
                .arm()
                .mode(arch::arm::ArchMode::Thumb)
                .detail(false)
                .build()?,
        };

        Ok(Self { cs })
    }

    /// Decode the first instruction of `code`, which is assumed to start at
    /// `address`. Capstone never reads past the slice, so callers bound the
    /// decode by slicing.
    pub fn decode_one(&self, code: &[u8], address: u64) -> Option<DecodedInstruction> {
        if code.is_empty() {
            return None;
        }
        let insns = self.cs.disasm_count(code, address, 1).ok()?;
        let insn = insns.iter().next()?;

        let mnemonic = insn.mnemonic().unwrap_or("");
        let text = match insn.op_str() {
            Some(ops) if !ops.is_empty() => format!("{}\t{}", mnemonic, ops),
            _ => mnemonic.to_string(),
        };
        let bytes = insn.bytes().to_vec();

        Some(DecodedInstruction {
            size: bytes.len(),
            bytes,
            text,
        })
    }
}
