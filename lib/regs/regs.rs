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

//! Register value helpers.
//!
//! Register values are modelled as `#[repr(transparent)]` newtypes over their
//! raw integer.  The macros in this crate generate `const` accessors and
//! `with_*` builders for the fields of such a newtype:
//!
//! ```
//! use regs::{rw_bool_field, rw_enum_field};
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq)]
//! #[repr(u8)]
//! pub enum Mode {
//!     A = 0,
//!     B = 1,
//!     C = 2,
//!     D = 3,
//! }
//!
//! #[derive(Clone, Copy)]
//! #[repr(transparent)]
//! pub struct CfgVal(u8);
//! impl CfgVal {
//!     rw_bool_field!(u8, enabled, 0, "enabled");
//!     rw_enum_field!(u8, mode, 3, 4, Mode, "mode");
//! }
//!
//! let cfg = CfgVal(0).with_enabled(true).with_mode(Mode::C);
//! assert_eq!(cfg.0, 0b1_0001);
//! assert_eq!(cfg.mode(), Mode::C);
//! ```
//!
//! Field values are computed on `u32`, so the macros support register widths
//! up to 32 bits.

#![no_std]

#[doc(hidden)]
pub use paste;

/// A read-only memory-mapped register.
pub trait RO<T> {
    const ADDR: usize;

    /// Read a raw value from the register
    ///
    /// # Safety
    /// The caller must guarantee that provided `ADDR` is accessible.
    #[inline]
    unsafe fn raw_read(&self) -> T {
        unsafe { (Self::ADDR as *const T).read_volatile() }
    }
}

#[macro_export]
macro_rules! ro_bool_field {
    ($ty:ty, $name:ident, $offset:literal, $desc:literal) => {
        #[doc = concat!("Returns `true` if the ", $desc, " bit is set.")]
        #[inline]
        pub const fn $name(&self) -> bool {
            $crate::ops::get_bool(self.0 as u32, $offset)
        }
    };
}

#[macro_export]
macro_rules! rw_bool_field {
    ($ty:ty, $name:ident, $offset:literal, $desc:literal) => {
        $crate::ro_bool_field!($ty, $name, $offset, $desc);
        $crate::paste::paste! {
            #[doc = concat!("Returns a copy of this value with the ", $desc, " bit set to `val`.")]
            #[inline]
            pub const fn [<with_ $name>](self, val: bool) -> Self {
                Self($crate::ops::set_bool(self.0 as u32, $offset, val) as $ty)
            }
        }
    };
}

/// Generates accessors for a multi-bit field holding a fieldless enum.
///
/// The enum must be `#[repr(u8)]` and have a variant for every value the
/// field can hold.
#[macro_export]
macro_rules! rw_enum_field {
    ($ty:ty, $name:ident, $start:literal, $end:literal, $enum:ty, $desc:literal) => {
        #[doc = concat!("Extracts the ", $desc, " field.")]
        #[inline]
        pub const fn $name(&self) -> $enum {
            let bits = $crate::ops::get_u32(self.0 as u32, $start, $end) as u8;
            // Safety: `$enum` is `repr(u8)` and covers every value of the field.
            unsafe { core::mem::transmute::<u8, $enum>(bits) }
        }

        $crate::paste::paste! {
            #[doc = concat!("Returns a copy of this value with the ", $desc, " field set to `val`.")]
            #[inline]
            pub const fn [<with_ $name>](self, val: $enum) -> Self {
                Self($crate::ops::set_u32(self.0 as u32, $start, $end, val as u32) as $ty)
            }
        }
    };
}

/// Declares a zero sized handle for a read-only 32 bit register at `$addr`.
#[macro_export]
macro_rules! ro_reg {
    ($name:ident, $val_type:ident, $addr:literal, $doc:literal) => {
        #[doc = $doc]
        pub struct $name;
        impl $crate::RO<u32> for $name {
            const ADDR: usize = $addr;
        }
        impl $name {
            #[inline]
            pub fn read(&self) -> $val_type {
                $val_type(unsafe { <Self as $crate::RO<u32>>::raw_read(self) })
            }
        }
    };
}

pub mod ops {
    /// Returns a mask with bits `start..=end` set.
    #[inline]
    pub const fn mask(start: u32, end: u32) -> u32 {
        let length = end - start + 1;
        (((1u64 << length) - 1) as u32) << start
    }

    #[inline]
    pub const fn get_bool(value: u32, bit: u32) -> bool {
        (value >> bit) & 0x1 == 0x1
    }

    #[inline]
    pub const fn set_bool(value: u32, bit: u32, field_value: bool) -> u32 {
        value & !(1 << bit) | ((field_value as u32) << bit)
    }

    #[inline]
    pub const fn get_u32(value: u32, start: u32, end: u32) -> u32 {
        (value & mask(start, end)) >> start
    }

    #[inline]
    pub const fn set_u32(value: u32, start: u32, end: u32, field_value: u32) -> u32 {
        let mask = mask(start, end);
        (value & !mask) | ((field_value << start) & mask)
    }
}
