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

//! Physical Memory Attributes (attribute bank).
//!
//! Each entry has its own 32 bit `pmacfg` register.  An enabled entry that
//! grants none of R/W/X makes its range invalid: every access faults,
//! independently of the permission bank.  The cacheability of the valid
//! ranges is set up by the boot ROM and kept as long as the entry stays
//! valid.

use core::fmt;

use regs::{rw_bool_field, rw_enum_field};

use super::AddressMode;
use crate::bank::EntryConfig;
use crate::policy::Permissions;

#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct PmaCfgVal(pub u32);
impl PmaCfgVal {
    rw_bool_field!(u32, en, 0, "enabled");
    rw_bool_field!(u32, x, 2, "executable");
    rw_bool_field!(u32, w, 3, "writable");
    rw_bool_field!(u32, r, 4, "readable");
    rw_bool_field!(u32, l, 29, "locked");
    rw_enum_field!(u32, a, 30, 31, AddressMode, "addressing mode");

    #[must_use]
    pub const fn from_permissions(permissions: Permissions, mode: AddressMode) -> Self {
        Self(0)
            .with_en(true)
            .with_r(permissions.read)
            .with_w(permissions.write)
            .with_x(permissions.execute)
            .with_l(permissions.locked)
            .with_a(mode)
    }

    /// Returns `true` if accesses to the range may reach memory.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.r() || self.w() || self.x()
    }
}

impl fmt::Debug for PmaCfgVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.a().name(),
            self.permissions(),
            if self.is_valid() { "valid" } else { "invalid" }
        )
    }
}

impl EntryConfig for PmaCfgVal {
    const BANK: &'static str = "pma";

    fn new(permissions: Permissions, mode: AddressMode) -> Self {
        Self::from_permissions(permissions, mode)
    }

    fn mode(&self) -> AddressMode {
        self.a()
    }

    fn permissions(&self) -> Permissions {
        Permissions::new(self.r(), self.w(), self.x()).with_lock(self.l())
    }

    /// `pmacfg` is written whole.
    fn merge(self, written: Self) -> Self {
        written
    }
}

#[cfg(target_arch = "riscv32")]
pub use hw::PmaBank;

#[cfg(target_arch = "riscv32")]
mod hw {
    use super::PmaCfgVal;
    use crate::BANK_ENTRIES;
    use crate::bank::RegionBank;
    use crate::regs::csr_indexed;

    const PMACFG0: u16 = 0xbc0;
    const PMAADDR0: u16 = 0xbd0;

    /// The PMA CSRs of the executing hart.
    pub struct PmaBank {
        _private: (),
    }

    impl PmaBank {
        /// # Safety
        /// Must run in machine mode, and no other code may access this hart's
        /// PMA CSRs while the handle is alive.
        pub const unsafe fn steal() -> Self {
            Self { _private: () }
        }
    }

    impl RegionBank for PmaBank {
        type Cfg = PmaCfgVal;
        const ENTRIES: usize = BANK_ENTRIES;

        fn reset(&mut self, index: usize) {
            csr_indexed!("csrw", PMACFG0, index, 0);
        }

        fn set(&mut self, index: usize, cfg: PmaCfgVal, address: u32) {
            csr_indexed!("csrw", PMAADDR0, index, address as usize);
            csr_indexed!("csrw", PMACFG0, index, cfg.0 as usize);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_entry_is_enabled_locked_and_invalid() {
        let cfg = PmaCfgVal::from_permissions(Permissions::NONE.locked(), AddressMode::Tor);
        assert_eq!(cfg.0, 0x6000_0001);
        assert!(!cfg.is_valid());
    }

    #[test]
    fn napot_rwx_entry_layout() {
        let cfg = PmaCfgVal::from_permissions(Permissions::RWX.locked(), AddressMode::Napot);
        assert_eq!(cfg.0, 0xe000_001d);
        assert!(cfg.is_valid());
        assert_eq!(cfg.permissions(), Permissions::RWX.locked());
    }

    #[test]
    fn merge_replaces_previous_value() {
        let old = PmaCfgVal::from_permissions(Permissions::RWX, AddressMode::Napot);
        let new = PmaCfgVal::from_permissions(Permissions::NONE.locked(), AddressMode::Tor);
        assert_eq!(old.merge(new), new);
    }
}
