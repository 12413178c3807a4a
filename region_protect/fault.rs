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

//! Irrecoverable halts.
//!
//! Nothing that goes wrong while the protection state is being built can be
//! handed to a caller: the caller runs before any protection is in place.

use crate::Error;

/// Checks a condition a second time and halts the core if it does not hold.
///
/// Used to re-verify a security relevant decision right before acting on it,
/// so a single glitched read can't flip the branch.
#[macro_export]
macro_rules! fault_assert {
    ($condition:expr $(,)?) => {{
        if !core::hint::black_box($condition) {
            $crate::fault::halt(concat!("fault check failed: ", stringify!($condition)))
        }
    }};
}

/// Halts the core.  Never returns.
#[cold]
#[inline(never)]
pub fn halt(reason: &'static str) -> ! {
    log::error!("region protection: {}", reason);
    halt_core(reason)
}

/// Halts the core after a builder returned `error`.
#[cold]
pub fn halt_on_error(error: Error) -> ! {
    log::error!("region protection: configuration failed: {:?}", error);
    halt_core("region protection configuration failed")
}

#[cfg(target_arch = "riscv32")]
#[allow(unused_unsafe)]
fn halt_core(_reason: &'static str) -> ! {
    loop {
        unsafe { riscv::asm::wfi() };
    }
}

#[cfg(not(target_arch = "riscv32"))]
fn halt_core(reason: &'static str) -> ! {
    panic!("{}", reason)
}
