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

//! Permission bank configuration.
//!
//! Every valid memory area gets a fixed group of slots:
//!
//! | Area          | Slots   |
//! |---------------|---------|
//! | CPU subsystem | 0       |
//! | Boot ROM      | 1 - 2   |
//! | Unified RAM   | 3 - 5   |
//! | Cache window  | 6 - 8   |
//! | LP RAM        | 9 - 12  |
//! | Peripherals   | 13      |
//!
//! The bootloader locks the entries whose content does not depend on the
//! boot stage.  Keeping their index fixed lets the application rewrite the
//! bank with those locked slots in place.

use crate::bank::RegionBank;
use crate::memory_map::{AddressRange, BoundaryMarkers, SocMemoryMap, align_up};
use crate::policy::{Permissions, ProtectionConfig};
use crate::regs::pmp::PmpCfgVal;
use crate::table::TableBuilder;
use crate::{BANK_ENTRIES, Error, Result};

pub const SUBSYSTEM_SLOTS: usize = 1;
pub const ROM_SLOTS: usize = 2;
pub const RAM_SLOTS: usize = 3;
pub const CACHE_SLOTS: usize = 3;
pub const LP_RAM_SLOTS: usize = 4;
pub const PERIPHERAL_SLOTS: usize = 1;

const _: () = assert!(
    SUBSYSTEM_SLOTS + ROM_SLOTS + RAM_SLOTS + CACHE_SLOTS + LP_RAM_SLOTS + PERIPHERAL_SLOTS
        <= BANK_ENTRIES
);

/// Reports whether an external debugger is attached to the core.
///
/// Reads must be free of side effects: a second read right after the first
/// is expected to return the same value.
pub trait DebugProbe {
    fn is_attached(&self) -> bool;
}

impl<F: Fn() -> bool> DebugProbe for F {
    fn is_attached(&self) -> bool {
        self()
    }
}

/// Fills `bank` from slot 0 and returns the number of slots used before the
/// trailing padding.
///
/// With a debug probe attached the RAM, cache and LP RAM areas are mapped
/// RWX so the debugger can load and run code from them, even if `config`
/// asks for the text/data split.
pub fn build_permission_table<B, P>(
    bank: &mut B,
    map: &SocMemoryMap,
    markers: &BoundaryMarkers,
    config: &ProtectionConfig,
    probe: &P,
) -> Result<usize>
where
    B: RegionBank<Cfg = PmpCfgVal>,
    P: DebugProbe + ?Sized,
{
    let debug_attached = probe.is_attached();
    if debug_attached {
        // Don't let a single faulted read open RAM up.
        crate::fault_assert!(probe.is_attached());
    }

    let split = config.split_enabled() && !debug_attached;
    if debug_attached && config.split_enabled() {
        log::warn!("pmp: debug probe attached, text/data split disabled");
    }

    let mut table = TableBuilder::new(bank, config.resets_before_write());

    table.area(SUBSYSTEM_SLOTS, |t| {
        t.napot(map.cpu_subsystem, Permissions::RWX.locked())
    })?;

    table.area(ROM_SLOTS, |t| {
        let data_start = markers.rom_data_start;
        if data_start & (map.pmp_granularity - 1) == 0 {
            // The attribute bank already marks the whole image RX, so only
            // the data part needs its own entry.
            let [_, data] = split_at(map.rom, data_start)?;
            t.tor(data, Permissions::R.locked())
        } else {
            t.tor(map.rom, Permissions::RX.locked())
        }
    })?;

    table.area(RAM_SLOTS, |t| {
        if split {
            let [text, data] = split_at(map.ram, markers.iram_text_end)?;
            t.tor(text, Permissions::RX.locked())?;
            t.tor(data, Permissions::RW.locked())
        } else {
            t.tor(map.ram, config.conditional(Permissions::RWX))
        }
    })?;

    table.area(CACHE_SLOTS, |t| {
        let data_permissions = Permissions::R.with_write(map.cache_writable);
        if split {
            let text_end = align_up(markers.instruction_reserved_end, map.mmu_page_size);
            let data_end = align_up(markers.rodata_reserved_end, map.mmu_page_size);
            let [text, data, _] = partition(map.cache, text_end, data_end)?;
            t.tor(text, Permissions::RX.locked())?;
            t.tor(data, data_permissions.locked())
        } else {
            let permissions = Permissions::RWX.with_write(map.cache_writable);
            t.napot(map.cache, config.conditional(permissions))
        }
    })?;

    table.area(LP_RAM_SLOTS, |t| {
        if split {
            // LP RAM below the main core's text belongs to the LP core.
            let [lp_core, text, data] =
                partition(map.lp_ram, markers.lp_text_start, markers.lp_text_end)?;
            t.tor(lp_core, Permissions::RW.locked())?;
            t.tor(text, Permissions::RX.locked())?;
            t.tor(data, Permissions::RW.locked())
        } else {
            t.napot(map.lp_ram, config.conditional(Permissions::RWX))
        }
    })?;

    table.area(PERIPHERAL_SLOTS, |t| {
        t.napot(map.peripheral, Permissions::RW.locked())
    })?;

    let used = table.finish()?;
    log::debug!(
        "pmp: {} slots in use (split: {}, debug: {})",
        used,
        split,
        debug_attached
    );
    Ok(used)
}

/// Splits `area` at `marker`.
fn split_at(area: AddressRange, marker: u64) -> Result<[AddressRange; 2]> {
    let [below, _, above] = partition(area, marker, marker)?;
    Ok([below, above])
}

/// Splits `area` into three consecutive ranges at `first` and `second`.
///
/// Markers outside `area` or out of order are [`Error::OutOfRange`].
fn partition(area: AddressRange, first: u64, second: u64) -> Result<[AddressRange; 3]> {
    if !area.bounds(first) || !area.bounds(second) {
        log::error!(
            "boundary marker {:#x}/{:#x} outside {:#x}..{:#x}",
            first,
            second,
            area.start,
            area.end
        );
        return Err(Error::OutOfRange);
    }
    Ok([
        AddressRange::try_new(area.start, first)?,
        AddressRange::try_new(first, second)?,
        AddressRange::try_new(second, area.end)?,
    ])
}
