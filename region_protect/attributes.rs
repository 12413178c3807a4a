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

//! Attribute bank configuration.
//!
//! Every range of the address space that holds no memory is made invalid so
//! that any access to it faults, whatever the permission bank says.  The ROM
//! image and the cache window get valid entries: the boot ROM has already set
//! their cacheability and these entries lock it.

use crate::bank::RegionBank;
use crate::memory_map::{AddressRange, LAST_WORD, SocMemoryMap};
use crate::policy::Permissions;
use crate::regs::pma::PmaCfgVal;
use crate::table::TableBuilder;
use crate::Result;

/// Enabled, locked, and granting nothing.
const DENY: Permissions = Permissions::NONE.locked();

/// Fills `bank` from slot 0 and returns the number of slots used.
///
/// Every attribute entry is locked, in every boot stage.  Areas of `map` that
/// are out of order are [`Error::OutOfRange`](crate::Error::OutOfRange).
pub fn build_attribute_table<B>(bank: &mut B, map: &SocMemoryMap) -> Result<usize>
where
    B: RegionBank<Cfg = PmaCfgVal>,
{
    let mut table = TableBuilder::new(bank, false);

    let bottom_gap = map.bottom_gap();
    if !bottom_gap.is_empty() {
        table.napot(bottom_gap, DENY)?;
    }

    table.tor(gap(map.cpu_subsystem, map.rom)?, DENY)?;
    table.tor(map.rom, Permissions::RX.locked())?;
    table.tor(gap(map.rom, map.ram)?, DENY)?;
    table.tor(gap(map.ram, map.cache)?, DENY)?;

    // The permission bank can't spare a slot for a valid PMA entry, so the
    // whole window is made valid here and narrowed by the permission bank.
    table.napot(map.cache, Permissions::RWX.locked())?;

    table.tor(gap(map.cache, map.lp_ram)?, DENY)?;
    table.tor(gap(map.lp_ram, map.peripheral)?, DENY)?;

    // Address registers may only implement bits 31:2, so the catch-all stops
    // at the last word and the last word gets an NA4 entry.
    table.tor(gap(map.peripheral, LAST_WORD)?, DENY)?;
    table.na4(LAST_WORD, DENY)?;

    let used = table.finish()?;
    log::debug!("pma: {} slots in use", used);
    Ok(used)
}

const fn gap(below: AddressRange, above: AddressRange) -> Result<AddressRange> {
    AddressRange::try_new(below.end, above.start)
}
