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

//! Renders instruction records as lines of a C byte array.
//!
//! Each record becomes one data line, the bytes as `0x%02X` literals followed
//! by a `//` comment carrying the disassembly. Comments line up in a single
//! column per region, so the widest byte list of the region has to be known
//! before anything is written: build the formatter with `ByteArrayFormatter::measure`
//! over the whole region first, then call `ByteArrayFormatter::render` per record.
//!
//! ```text
//! 	0x90,                               //   nop
//! 	0xB8, 0x00, 0x00, 0x00, 0x00,       //   mov eax, 0DEADBEEFh
//! ```

use std::fmt::Write;
use std::sync::OnceLock;

use regex::Regex;

use crate::record::InstructionRecord;

const COMMENT_PREFIX: &str = "//   ";

fn re_spaces() -> &'static Regex {
    static RE_SPACES: OnceLock<Regex> = OnceLock::new();
    RE_SPACES.get_or_init(|| Regex::new(" {2,}").expect("static regex"))
}

/// Tabs become spaces, then any run of spaces collapses to one.
pub fn clean_disasm(text: &str) -> String {
    let spaced = text.replace('\t', " ");
    re_spaces().replace_all(&spaced, " ").trim_end().to_string()
}

/// `\t0x90, 0xC3,` for the bytes of one record.
pub fn c_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(1 + bytes.len() * 6);
    out.push('\t');
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "0x{:02X}", b);
    }
    out.push(',');
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteArrayFormatter {
    width: usize,
}

impl ByteArrayFormatter {
    /// Measure pass: the comment column sits one past the widest byte list.
    pub fn measure<'a, R>(records: R) -> Self
    where
        R: IntoIterator<Item = &'a InstructionRecord>,
    {
        let widest = records
            .into_iter()
            .map(|r| c_bytes(&r.bytes).len())
            .max()
            .unwrap_or(0);
        Self { width: widest + 1 }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Render pass. `label` is the symbol bound at the record's address, if any.
    pub fn render(&self, record: &InstructionRecord, label: Option<&str>) -> String {
        let width = self.width;
        let mut out = String::new();
        if let Some(name) = label {
            let _ = writeln!(out, "{:<width$}// {}:", "\t", name);
        }
        let comment = if record.decode_failed {
            record.disasm.clone()
        } else {
            clean_disasm(&record.disasm)
        };
        let _ = writeln!(
            out,
            "{:<width$}{}{}",
            c_bytes(&record.bytes),
            COMMENT_PREFIX,
            comment
        );
        out
    }
}
