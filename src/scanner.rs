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

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};

use crate::record::InstructionRecord;

pub const SENTINEL_SIZE: usize = 4;

/// The 4-byte marker that flags a patchable slot inside an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentinel(pub [u8; SENTINEL_SIZE]);

impl Default for Sentinel {
    fn default() -> Self {
        Sentinel([0xDE, 0xAD, 0xBE, 0xEF])
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for b in self.0 {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

/// Parses the bytes in the order they are written, so `DEADBEEF` means
/// `DE AD BE EF` in memory regardless of target endianness. Exactly eight hex
/// digits are required.
impl FromStr for Sentinel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != SENTINEL_SIZE * 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!(
                "sentinel must be {} hex digits, got {:?}",
                SENTINEL_SIZE * 2,
                s
            );
        }
        let value = u32::from_str_radix(digits, 16)?;
        Ok(Sentinel(value.to_be_bytes()))
    }
}

/// Zero the first sentinel in `record` and remember where it was.
///
/// Only the record's own bytes are searched, so a sentinel split across two
/// instructions is never seen. Records of `SENTINEL_SIZE` bytes or fewer are
/// left alone. Later occurrences in the same record are neither patched nor
/// reported.
pub fn extract_placeholder(record: &mut InstructionRecord, sentinel: &Sentinel) -> Option<usize> {
    if record.size() <= SENTINEL_SIZE {
        return None;
    }

    let idx = record
        .bytes
        .windows(SENTINEL_SIZE)
        .position(|window| window == sentinel.0.as_slice())?;

    record.bytes[idx..idx + SENTINEL_SIZE].fill(0);
    record.placeholder_offset = Some(idx);
    Some(idx)
}
