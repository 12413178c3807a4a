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

//! Physical Memory Protection (permission bank).

use core::fmt;

use regs::{rw_bool_field, rw_enum_field};

use super::AddressMode;
use crate::bank::EntryConfig;
use crate::policy::Permissions;

/// Number of entry configurations packed in one `pmpcfg` register on RV32.
pub const CFGS_PER_REGISTER: usize = 4;

#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct PmpCfgVal(pub u8);
impl PmpCfgVal {
    rw_bool_field!(u8, r, 0, "readable");
    rw_bool_field!(u8, w, 1, "writable");
    rw_bool_field!(u8, x, 2, "executable");
    rw_enum_field!(u8, a, 3, 4, AddressMode, "addressing mode");
    rw_bool_field!(u8, l, 7, "locked");

    #[must_use]
    pub const fn from_permissions(permissions: Permissions, mode: AddressMode) -> Self {
        Self(0)
            .with_r(permissions.read)
            .with_w(permissions.write)
            .with_x(permissions.execute)
            .with_a(mode)
            .with_l(permissions.locked)
    }
}

impl fmt::Debug for PmpCfgVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.a().name(), self.permissions())
    }
}

impl EntryConfig for PmpCfgVal {
    const BANK: &'static str = "pmp";

    fn new(permissions: Permissions, mode: AddressMode) -> Self {
        Self::from_permissions(permissions, mode)
    }

    fn mode(&self) -> AddressMode {
        self.a()
    }

    fn permissions(&self) -> Permissions {
        Permissions::new(self.r(), self.w(), self.x()).with_lock(self.l())
    }

    /// `pmpcfg` is written with `csrs`: new bits are added to the old ones.
    fn merge(self, written: Self) -> Self {
        Self(self.0 | written.0)
    }
}

/// Returns the `pmpcfg` register holding entry `index` and the bit offset of
/// the entry in it.
#[must_use]
pub const fn cfg_position(index: usize) -> (usize, usize) {
    (index / CFGS_PER_REGISTER, (index % CFGS_PER_REGISTER) * 8)
}

#[cfg(target_arch = "riscv32")]
pub use hw::PmpBank;

#[cfg(target_arch = "riscv32")]
mod hw {
    use super::{PmpCfgVal, cfg_position};
    use crate::BANK_ENTRIES;
    use crate::bank::RegionBank;
    use crate::regs::csr_indexed;

    const PMPCFG0: u16 = 0x3a0;
    const PMPADDR0: u16 = 0x3b0;

    /// The PMP CSRs of the executing hart.
    pub struct PmpBank {
        _private: (),
    }

    impl PmpBank {
        /// # Safety
        /// Must run in machine mode, and no other code may access this hart's
        /// PMP CSRs while the handle is alive.
        pub const unsafe fn steal() -> Self {
            Self { _private: () }
        }
    }

    impl RegionBank for PmpBank {
        type Cfg = PmpCfgVal;
        const ENTRIES: usize = BANK_ENTRIES;

        fn reset(&mut self, index: usize) {
            let (register, shift) = cfg_position(index);
            csr_indexed!("csrc", PMPCFG0, register, 0xff << shift);
        }

        fn set(&mut self, index: usize, cfg: PmpCfgVal, address: u32) {
            // The address goes first so a TOR entry never matches with a
            // stale bound.
            csr_indexed!("csrw", PMPADDR0, index, address as usize);
            let (register, shift) = cfg_position(index);
            csr_indexed!("csrs", PMPCFG0, register, (cfg.0 as usize) << shift);
        }
    }
}
