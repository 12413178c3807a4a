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

//! Sequential slot allocation for a [`RegionBank`].
//!
//! Ranges are appended in increasing address order.  A TOR range needs the
//! entry before it to hold its lower bound; the builder remembers the bound
//! held by the last written slot and only spends a slot on an `Off` floor
//! entry when the new range does not start there.

use crate::bank::{EntryConfig, RegionBank};
use crate::memory_map::AddressRange;
use crate::policy::Permissions;
use crate::regs::{AddressMode, na4_address, napot_address, tor_address};
use crate::{Error, Result};

pub struct TableBuilder<'a, B: RegionBank> {
    bank: &'a mut B,
    next: usize,
    limit: usize,
    /// Address register value of the last written slot when it can serve as
    /// the lower bound of a TOR entry.
    floor: Option<u32>,
    reset_first: bool,
}

impl<'a, B: RegionBank> TableBuilder<'a, B> {
    /// Starts filling `bank` at slot 0.  With `reset_first`, every slot is
    /// reset before it is written so no bits from an earlier configuration
    /// survive.
    pub fn new(bank: &'a mut B, reset_first: bool) -> Self {
        Self {
            bank,
            next: 0,
            limit: B::ENTRIES,
            // Slot 0 of a TOR entry is bounded below by address zero.
            floor: Some(0),
            reset_first,
        }
    }

    /// Index of the next slot to be written.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.next
    }

    fn write(&mut self, cfg: B::Cfg, address: u32) -> Result<()> {
        if self.next >= self.limit {
            log::error!(
                "{}: out of slots at index {} (limit {})",
                B::Cfg::BANK,
                self.next,
                self.limit
            );
            return Err(Error::ResourceExhausted);
        }
        if self.reset_first {
            self.bank.reset(self.next);
        }
        self.bank.set(self.next, cfg, address);
        log::debug!(
            "{}{:2}: {:?} @ {:#010x}",
            B::Cfg::BANK,
            self.next,
            cfg,
            address
        );
        self.next += 1;
        Ok(())
    }

    /// Appends a single NAPOT entry covering `range`.
    pub fn napot(&mut self, range: AddressRange, permissions: Permissions) -> Result<()> {
        let address = napot_address(range)?;
        self.write(B::Cfg::new(permissions, AddressMode::Napot), address)?;
        self.floor = None;
        Ok(())
    }

    /// Appends a single NA4 entry covering the four byte `range`.
    pub fn na4(&mut self, range: AddressRange, permissions: Permissions) -> Result<()> {
        let address = na4_address(range)?;
        self.write(B::Cfg::new(permissions, AddressMode::Na4), address)?;
        self.floor = None;
        Ok(())
    }

    /// Appends a TOR entry covering `range`, preceded by an `Off` entry
    /// holding `range.start` unless the previous slot already holds it.
    ///
    /// An empty range uses no slot.
    pub fn tor(&mut self, range: AddressRange, permissions: Permissions) -> Result<()> {
        if range.is_empty() {
            return Ok(());
        }

        let start = tor_address(range.start);
        if self.floor != Some(start) {
            let floor = Permissions::NONE.with_lock(permissions.locked);
            self.write(B::Cfg::new(floor, AddressMode::Off), start)?;
        }

        let end = tor_address(range.end);
        self.write(B::Cfg::new(permissions, AddressMode::Tor), end)?;
        self.floor = Some(end);
        Ok(())
    }

    /// Writes an unused slot: no permissions, `Off`, holding the current
    /// floor so a TOR entry after it keeps its lower bound.
    fn pad(&mut self) -> Result<()> {
        let address = self.floor.unwrap_or(0);
        self.write(B::Cfg::default(), address)?;
        self.floor = Some(address);
        Ok(())
    }

    /// Runs `fill` with the builder confined to the next `slots` slots, then
    /// pads whatever `fill` left unused.
    ///
    /// Fixing the number of slots of an area keeps the index of every later
    /// entry independent of how the area was split.
    pub fn area<F>(&mut self, slots: usize, fill: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let end = self.next + slots;
        if end > self.limit {
            return Err(Error::ResourceExhausted);
        }

        let outer_limit = self.limit;
        self.limit = end;
        let filled = fill(self);
        self.limit = outer_limit;
        filled?;

        while self.next < end {
            self.pad()?;
        }
        Ok(())
    }

    /// Pads the rest of the bank and returns the number of slots used before
    /// the trailing padding.
    pub fn finish(mut self) -> Result<usize> {
        let used = self.next;
        while self.next < self.limit {
            self.pad()?;
        }
        Ok(used)
    }
}
