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

//! ESP32-C5 high performance core.

use regs::{ro_bool_field, ro_reg};

use crate::memory_map::{AddressRange, SocMemoryMap};
use crate::permissions::DebugProbe;
use crate::policy::ProtectionConfig;

pub const MEMORY_MAP: SocMemoryMap = SocMemoryMap {
    cpu_subsystem: AddressRange::new(0x2000_0000, 0x3000_0000),
    rom: AddressRange::new(0x4000_0000, 0x4005_0000),
    ram: AddressRange::new(0x4080_0000, 0x4086_0000),
    cache: AddressRange::new(0x4200_0000, 0x4400_0000),
    lp_ram: AddressRange::new(0x5000_0000, 0x5000_4000),
    peripheral: AddressRange::new(0x6000_0000, 0x6010_0000),
    pmp_granularity: 128,
    mmu_page_size: 0x1_0000,
    // PSRAM is mapped through the same window as flash.
    cache_writable: true,
}
.checked();

pub const CONFIG: ProtectionConfig = ProtectionConfig::from_features();

#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct CoreDebugModeVal(pub u32);
impl CoreDebugModeVal {
    ro_bool_field!(u32, debug_mode, 0, "core debug mode");
    ro_bool_field!(u32, module_active, 1, "debug module active");
}

ro_reg!(
    CoreDebugMode,
    CoreDebugModeVal,
    0x600c_2098,
    "Assist debug: debug mode status of core 0."
);

impl DebugProbe for CoreDebugMode {
    fn is_attached(&self) -> bool {
        self.read().module_active()
    }
}

#[cfg(target_arch = "riscv32")]
pub use hw::configure_region_protection;

#[cfg(target_arch = "riscv32")]
mod hw {
    use super::{CONFIG, CoreDebugMode, MEMORY_MAP};
    use crate::fault;
    use crate::memory_map::BoundaryMarkers;
    use crate::protection::{ProtectionState, RegionProtection};
    use crate::regs::pma::PmaBank;
    use crate::regs::pmp::PmpBank;

    unsafe extern "C" {
        static _iram_text_end: u8;
        static _instruction_reserved_end: u8;
        static _rodata_reserved_end: u8;
        static _rtc_text_start: u8;
        static _rtc_text_end: u8;
    }

    fn symbol_address(symbol: &u8) -> u64 {
        core::ptr::from_ref(symbol).addr() as u64
    }

    /// Configures the attribute and permission banks of the executing core.
    ///
    /// `rom_data_start` is the start of the ROM's read-only data image, as
    /// found in the ROM layout table.
    ///
    /// Halts the core if the configuration can't be built.
    ///
    /// # Safety
    /// Must be called once per core, in machine mode, with interrupts
    /// disabled, before any code relying on the final protection runs.
    pub unsafe fn configure_region_protection(rom_data_start: u32) -> ProtectionState {
        // Safety: the symbols are defined by the linker script; only their
        // addresses are used.
        let markers = unsafe {
            BoundaryMarkers {
                iram_text_end: symbol_address(&_iram_text_end),
                instruction_reserved_end: symbol_address(&_instruction_reserved_end),
                rodata_reserved_end: symbol_address(&_rodata_reserved_end),
                lp_text_start: symbol_address(&_rtc_text_start),
                lp_text_end: symbol_address(&_rtc_text_end),
                rom_data_start: u64::from(rom_data_start),
            }
        };

        // Safety: exclusive access to the banks is guaranteed by the caller.
        let mut pma = unsafe { PmaBank::steal() };
        let mut pmp = unsafe { PmpBank::steal() };

        log::info!(
            "Configuring region protection on hart {}",
            riscv::register::mhartid::read()
        );
        let protection = RegionProtection::new(&MEMORY_MAP, markers, CONFIG);
        match protection.configure(&mut pma, &mut pmp, &CoreDebugMode) {
            Ok(state) => state,
            Err(error) => fault::halt_on_error(error),
        }
    }
}
