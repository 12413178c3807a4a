// Copyright 2025 The Pigweed Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License. You may obtain a copy of
// the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
// License for the specific language governing permissions and limitations under
// the License.

//! Bank register layouts and address encodings.
//!
//! Both banks store an address register holding bits 33:2 of a physical
//! address and a configuration field whose two-bit `A` field selects how the
//! address register is matched.[^pmp]
//!
//! [^pmp]: Section 3.7. Physical Memory Protection in
//!   [The RISC-V Instruction Set Manual Volume II: Privileged Architecture](https://github.com/riscv/riscv-isa-manual/releases/download/20250508/riscv-privileged-20250508.pdf)

use crate::memory_map::AddressRange;
use crate::{Error, Result};

pub mod pma;
pub mod pmp;

/// Address matching mode of a bank entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressMode {
    /// Null region (disabled)
    Off = 0,

    /// Top of Range
    Tor = 1,

    /// Naturally aligned four-byte region
    Na4 = 2,

    /// Naturally aligned power-of-two region, ≥8 bytes
    Napot = 3,
}

impl AddressMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AddressMode::Off => "---",
            AddressMode::Tor => "TOR",
            AddressMode::Na4 => "NA4",
            AddressMode::Napot => "NPT",
        }
    }
}

/// Encodes `address` for an address register, used both as the top of a
/// TOR range and as the lower bound held by the entry preceding it.
#[must_use]
pub const fn tor_address(address: u64) -> u32 {
    (address >> 2) as u32
}

/// Encodes `range` as a NAPOT address register value.
pub const fn napot_address(range: AddressRange) -> Result<u32> {
    if !range.is_napot() {
        return Err(Error::InvalidArgument);
    }
    Ok(((range.start >> 2) | ((range.size() - 1) >> 3)) as u32)
}

/// Encodes the four byte `range` as an NA4 address register value.
pub const fn na4_address(range: AddressRange) -> Result<u32> {
    if range.size() != 4 || range.start & 0x3 != 0 {
        return Err(Error::InvalidArgument);
    }
    Ok((range.start >> 2) as u32)
}

/// Decodes a NAPOT address register value back into its range.
#[must_use]
pub const fn napot_range(address: u32) -> AddressRange {
    let ones = address.trailing_ones();
    let size = 1u64 << (ones + 3);
    let start = ((address as u64) & !((1u64 << ones) - 1)) << 2;
    AddressRange::new(start, start + size)
}

/// Issues `$insn` (`csrw`, `csrs` or `csrc`) on CSR `$base + $index` for an
/// index only known at run time.  CSR numbers are immediates, so every index
/// gets its own instruction.
#[cfg(target_arch = "riscv32")]
macro_rules! csr_indexed {
    (@op $insn:literal, $base:path, $offset:literal, $val:ident) => {
        unsafe {
            core::arch::asm!(
                concat!($insn, " {csr}, {val}"),
                csr = const $base + $offset,
                val = in(reg) $val,
                options(nostack),
            )
        }
    };
    ($insn:literal, $base:path, $index:expr, $val:expr) => {{
        let val: usize = $val;
        match $index {
            0 => csr_indexed!(@op $insn, $base, 0, val),
            1 => csr_indexed!(@op $insn, $base, 1, val),
            2 => csr_indexed!(@op $insn, $base, 2, val),
            3 => csr_indexed!(@op $insn, $base, 3, val),
            4 => csr_indexed!(@op $insn, $base, 4, val),
            5 => csr_indexed!(@op $insn, $base, 5, val),
            6 => csr_indexed!(@op $insn, $base, 6, val),
            7 => csr_indexed!(@op $insn, $base, 7, val),
            8 => csr_indexed!(@op $insn, $base, 8, val),
            9 => csr_indexed!(@op $insn, $base, 9, val),
            10 => csr_indexed!(@op $insn, $base, 10, val),
            11 => csr_indexed!(@op $insn, $base, 11, val),
            12 => csr_indexed!(@op $insn, $base, 12, val),
            13 => csr_indexed!(@op $insn, $base, 13, val),
            14 => csr_indexed!(@op $insn, $base, 14, val),
            15 => csr_indexed!(@op $insn, $base, 15, val),
            _ => unreachable!("CSR index out of range"),
        }
    }};
}

#[cfg(target_arch = "riscv32")]
pub(crate) use csr_indexed;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_map::LAST_WORD;

    #[test]
    fn napot_encoding_matches_privileged_manual() {
        let range = AddressRange::new(0x0001_0000, 0x0002_0000);
        assert_eq!(napot_address(range), Ok(0x5FFF));
        assert_eq!(napot_range(0x5FFF), range);
    }

    #[test]
    fn napot_encoding_of_low_and_large_ranges() {
        let bottom = AddressRange::new(0, 0x2000_0000);
        assert_eq!(napot_address(bottom), Ok(0x03FF_FFFF));
        assert_eq!(napot_range(0x03FF_FFFF), bottom);

        let smallest = AddressRange::new(0x1000, 0x1008);
        assert_eq!(napot_address(smallest), Ok(0x400));
        assert_eq!(napot_range(0x400), smallest);
    }

    #[test]
    fn napot_rejects_unaligned_range() {
        assert_eq!(
            napot_address(AddressRange::new(0x0001_0000, 0x0001_3330)),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            napot_address(AddressRange::new(0x1000, 0x1004)),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn tor_address_drops_low_bits() {
        assert_eq!(tor_address(0x0001_3330), 0x4ccc);
        assert_eq!(tor_address(0xffff_fffc), 0x3fff_ffff);
    }

    #[test]
    fn last_word_fits_in_32_bit_register() {
        assert_eq!(na4_address(LAST_WORD), Ok(0x3fff_ffff));
        assert_eq!(
            na4_address(AddressRange::new(0x1000, 0x1008)),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            na4_address(AddressRange::new(0x1002, 0x1006)),
            Err(Error::InvalidArgument)
        );
    }
}
