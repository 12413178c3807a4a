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

use core::fmt;

use crate::memory_map::AddressRange;
use crate::policy::Permissions;
use crate::regs::{AddressMode, napot_range};

/// Configuration value of one bank entry.
pub trait EntryConfig: Copy + Default + PartialEq + fmt::Debug {
    /// Short bank name used in logs.
    const BANK: &'static str;

    fn new(permissions: Permissions, mode: AddressMode) -> Self;

    fn mode(&self) -> AddressMode;

    fn permissions(&self) -> Permissions;

    /// Returns the configuration an entry holds after `written` is written
    /// over `self`.
    fn merge(self, written: Self) -> Self;
}

/// A fixed size bank of address matching entries.
pub trait RegionBank {
    type Cfg: EntryConfig;

    /// Number of entries in the bank.
    const ENTRIES: usize;

    /// Clears the configuration of entry `index`, removing every permission
    /// it grants.  The address register is left untouched.
    fn reset(&mut self, index: usize);

    /// Writes the address register of entry `index`, then writes `cfg` with
    /// the bank's write semantics (see [`EntryConfig::merge`]).
    fn set(&mut self, index: usize, cfg: Self::Cfg, address: u32);
}

/// One entry of a bank, decoded into the range it matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedEntry {
    pub index: usize,
    pub mode: AddressMode,
    /// Matched range.  Empty for `Off` entries and TOR entries whose top is
    /// not above their bound.
    pub range: AddressRange,
    pub permissions: Permissions,
}

impl DecodedEntry {
    /// Returns `true` if the entry matches at least one address.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.mode, AddressMode::Off) && !self.range.is_empty()
    }
}

/// A bank kept in memory, with the write and lock behavior of the hardware.
///
/// Writes to a locked entry are ignored, as are writes to the address
/// register below a locked TOR entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulatedBank<C, const N: usize> {
    cfg: [C; N],
    addr: [u32; N],
}

impl<C: EntryConfig, const N: usize> SimulatedBank<C, N> {
    /// Creates a bank in its reset state: every entry `Off` at address zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cfg: [C::default(); N],
            addr: [0; N],
        }
    }

    #[must_use]
    pub fn cfg(&self, index: usize) -> C {
        self.cfg[index]
    }

    #[must_use]
    pub fn address(&self, index: usize) -> u32 {
        self.addr[index]
    }

    fn cfg_locked(&self, index: usize) -> bool {
        self.cfg[index].permissions().locked
    }

    fn address_locked(&self, index: usize) -> bool {
        self.cfg_locked(index)
            || (index + 1 < N
                && self.cfg_locked(index + 1)
                && self.cfg[index + 1].mode() == AddressMode::Tor)
    }

    /// Decodes entry `index`.
    #[must_use]
    pub fn entry(&self, index: usize) -> DecodedEntry {
        let cfg = self.cfg[index];
        let address = self.addr[index];
        let range = match cfg.mode() {
            AddressMode::Off => {
                let bound = u64::from(address) << 2;
                AddressRange::new(bound, bound)
            }
            AddressMode::Tor => {
                let start = if index == 0 {
                    0
                } else {
                    u64::from(self.addr[index - 1]) << 2
                };
                let end = u64::from(address) << 2;
                if start < end {
                    AddressRange::new(start, end)
                } else {
                    AddressRange::new(end, end)
                }
            }
            AddressMode::Na4 => {
                let start = u64::from(address) << 2;
                AddressRange::new(start, start + 4)
            }
            AddressMode::Napot => napot_range(address),
        };
        DecodedEntry {
            index,
            mode: cfg.mode(),
            range,
            permissions: cfg.permissions(),
        }
    }

    /// Entries that match at least one address, in priority order.
    pub fn active_entries(&self) -> impl Iterator<Item = DecodedEntry> + '_ {
        (0..N).map(|index| self.entry(index)).filter(DecodedEntry::is_active)
    }

    /// Returns the highest priority entry matching `address`, if any.
    #[must_use]
    pub fn matching(&self, address: u64) -> Option<DecodedEntry> {
        self.active_entries()
            .find(|entry| entry.range.contains(address))
    }

    /// Log the details of the bank configuration.
    pub fn dump(&self) {
        for index in 0..N {
            let entry = self.entry(index);
            log::debug!(
                "{}{:2}: {:#011x}..{:#011x} {} {}",
                C::BANK,
                index,
                entry.range.start,
                entry.range.end,
                entry.mode.name(),
                entry.permissions,
            );
        }
    }
}

impl<C: EntryConfig, const N: usize> Default for SimulatedBank<C, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: EntryConfig, const N: usize> RegionBank for SimulatedBank<C, N> {
    type Cfg = C;
    const ENTRIES: usize = N;

    fn reset(&mut self, index: usize) {
        if !self.cfg_locked(index) {
            self.cfg[index] = C::default();
        }
    }

    fn set(&mut self, index: usize, cfg: C, address: u32) {
        if !self.address_locked(index) {
            self.addr[index] = address;
        }
        if !self.cfg_locked(index) {
            self.cfg[index] = self.cfg[index].merge(cfg);
        }
    }
}
