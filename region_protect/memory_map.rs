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

//! SoC memory map and boundary markers.
//!
//! Addresses are carried as `u64` so the top of the 32-bit address space,
//! `1 << 32`, can be the end of a range.  That bound is never written to an
//! address register: registers may only implement bits 31:2.

use crate::{Error, Result};

/// One past the last byte of the 32-bit physical address space.
pub const ADDRESS_SPACE_END: u64 = 1 << 32;

/// The last four bytes of the address space.  A TOR entry can't reach them
/// without address bit 32, so they get an NA4 entry of their own.
pub const LAST_WORD: AddressRange =
    AddressRange::new(ADDRESS_SPACE_END - 4, ADDRESS_SPACE_END);

/// A half open physical address range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressRange {
    /// First address of the range (inclusive).
    pub start: u64,

    /// End address of the range (exclusive).
    pub end: u64,
}

impl AddressRange {
    /// Creates a range.  `start` may equal `end` for an empty range.
    ///
    /// # Panics
    /// Panics if `start > end`.  In a `const` context this is a build error.
    #[must_use]
    pub const fn new(start: u64, end: u64) -> Self {
        assert!(start <= end, "address range ends before it starts");
        Self { start, end }
    }

    /// Like [`AddressRange::new`] but reports an inverted range as
    /// [`Error::OutOfRange`].  Used for ranges built from run-time markers.
    pub const fn try_new(start: u64, end: u64) -> Result<Self> {
        if start > end {
            return Err(Error::OutOfRange);
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn size(&self) -> u64 {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if the range can be encoded as one NAPOT entry: its size
    /// is a power of two of at least eight bytes and its start is aligned to
    /// its size.
    #[must_use]
    pub const fn is_napot(&self) -> bool {
        let size = self.size();
        size >= 8 && size.is_power_of_two() && self.start & (size - 1) == 0
    }

    /// Returns `true` if `address` lies in `[start, end]`.  The end is
    /// included so a boundary marker may sit on either edge of the range.
    #[must_use]
    pub const fn bounds(&self, address: u64) -> bool {
        self.start <= address && address <= self.end
    }

    #[must_use]
    pub const fn contains(&self, address: u64) -> bool {
        self.start <= address && address < self.end
    }
}

/// Rounds `address` up to the next multiple of `align`, a power of two.
#[must_use]
pub const fn align_up(address: u64, align: u64) -> u64 {
    (address + align - 1) & !(align - 1)
}

/// Fixed address map of the valid memory areas of a SoC, in increasing
/// address order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SocMemoryMap {
    /// CPU subsystem: interrupt controller and debug configuration registers.
    pub cpu_subsystem: AddressRange,
    /// Mask ROM, instruction and read-only data images.
    pub rom: AddressRange,
    /// Unified internal RAM, reachable through both instruction and data bus.
    pub ram: AddressRange,
    /// Cache mapped external memory window (flash and PSRAM).
    pub cache: AddressRange,
    /// Low power RAM shared with the LP co-processor.
    pub lp_ram: AddressRange,
    /// Peripheral register space.
    pub peripheral: AddressRange,
    /// Alignment in bytes a permission entry address must have to be exact.
    pub pmp_granularity: u64,
    /// Page size of the cache MMU.
    pub mmu_page_size: u64,
    /// Whether the cache window can be backed by writable memory.
    pub cache_writable: bool,
}

impl SocMemoryMap {
    /// Validates the map and returns it unchanged.
    ///
    /// Intended for `const` items, where a violated assertion stops the
    /// build:
    ///
    /// ```compile_fail
    /// use region_protect::{AddressRange, SocMemoryMap};
    ///
    /// // RAM overlaps the ROM.
    /// const MAP: SocMemoryMap = SocMemoryMap {
    ///     cpu_subsystem: AddressRange::new(0x00, 0x10),
    ///     rom: AddressRange::new(0x10, 0x30),
    ///     ram: AddressRange::new(0x20, 0x40),
    ///     cache: AddressRange::new(0x40, 0x80),
    ///     lp_ram: AddressRange::new(0x100, 0x200),
    ///     peripheral: AddressRange::new(0x1000, 0x2000),
    ///     pmp_granularity: 4,
    ///     mmu_page_size: 0x10,
    ///     cache_writable: true,
    /// }
    /// .checked();
    /// ```
    ///
    /// # Panics
    /// Panics if an area is empty, areas are out of order or overlap, an
    /// area encoded as a single NAPOT entry is not naturally aligned, or the
    /// alignment parameters are not powers of two.
    #[must_use]
    pub const fn checked(self) -> Self {
        assert!(!self.cpu_subsystem.is_empty(), "empty CPU subsystem region");
        assert!(!self.rom.is_empty(), "empty ROM region");
        assert!(!self.ram.is_empty(), "empty RAM region");
        assert!(!self.cache.is_empty(), "empty cache region");
        assert!(!self.lp_ram.is_empty(), "empty LP RAM region");
        assert!(!self.peripheral.is_empty(), "empty peripheral region");

        assert!(self.cpu_subsystem.end <= self.rom.start, "ROM overlaps CPU subsystem");
        assert!(self.rom.end <= self.ram.start, "RAM overlaps ROM");
        assert!(self.ram.end <= self.cache.start, "cache overlaps RAM");
        assert!(self.cache.end <= self.lp_ram.start, "LP RAM overlaps cache");
        assert!(self.lp_ram.end <= self.peripheral.start, "peripherals overlap LP RAM");
        assert!(self.peripheral.end <= LAST_WORD.start, "peripherals overlap last word");

        let bottom_gap = self.bottom_gap();
        assert!(
            bottom_gap.is_empty() || bottom_gap.is_napot(),
            "gap below CPU subsystem is not NAPOT encodable"
        );
        assert!(self.cpu_subsystem.is_napot(), "CPU subsystem is not NAPOT encodable");
        assert!(self.cache.is_napot(), "cache is not NAPOT encodable");
        assert!(self.lp_ram.is_napot(), "LP RAM is not NAPOT encodable");
        assert!(self.peripheral.is_napot(), "peripherals are not NAPOT encodable");

        assert!(self.pmp_granularity.is_power_of_two(), "invalid PMP granularity");
        assert!(self.mmu_page_size.is_power_of_two(), "invalid MMU page size");
        self
    }

    /// The unused range between address zero and the CPU subsystem.
    #[must_use]
    pub const fn bottom_gap(&self) -> AddressRange {
        AddressRange::new(0, self.cpu_subsystem.start)
    }
}

/// Addresses resolved at link or boot time that split an area into ranges
/// with different permissions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundaryMarkers {
    /// End of the executable text placed in internal RAM.
    pub iram_text_end: u64,
    /// End of the instruction section reserved in the cache window.
    pub instruction_reserved_end: u64,
    /// End of the read-only data section reserved in the cache window.
    pub rodata_reserved_end: u64,
    /// Start of the main core's text in LP RAM.  LP RAM below it belongs to
    /// the LP co-processor.
    pub lp_text_start: u64,
    /// End of the main core's text in LP RAM.
    pub lp_text_end: u64,
    /// Start of the ROM's read-only data image, from the ROM layout table.
    pub rom_data_start: u64,
}
