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

//! Boot-time RISC-V region protection.
//!
//! Partitions the 32-bit physical address space into the attribute (PMA) and
//! permission (PMP) banks of the executing core before any untrusted code runs.
//! [`RegionProtection::configure`] first denies every gap between valid
//! memory areas through the attribute bank, then grants each valid area its
//! permissions through the permission bank.
//!
//! Banks are accessed through the [`RegionBank`] trait.  On the target the
//! banks are the CSRs of the core; on a host, [`SimulatedBank`] records the
//! written entries so a configuration can be decoded and checked.

#![cfg_attr(not(test), no_std)]

pub mod attributes;
pub mod bank;
mod error;
pub mod fault;
pub mod memory_map;
pub mod permissions;
pub mod policy;
mod protection;
pub mod regs;
pub mod soc;
pub mod table;

// Re-exports to simplify the public API.
pub use bank::{DecodedEntry, EntryConfig, RegionBank, SimulatedBank};
pub use error::{Error, Result};
pub use memory_map::{AddressRange, BoundaryMarkers, SocMemoryMap};
pub use permissions::DebugProbe;
pub use policy::{BuildStage, Permissions, ProtectionConfig};
pub use protection::{ProtectionState, RegionProtection};
pub use regs::AddressMode;
pub use regs::pma::PmaCfgVal;
pub use regs::pmp::PmpCfgVal;

/// Number of slots in each of the attribute and permission banks.
pub const BANK_ENTRIES: usize = 16;

/// Attribute bank as simulated on a host.
pub type SimulatedPmaBank = SimulatedBank<PmaCfgVal, BANK_ENTRIES>;

/// Permission bank as simulated on a host.
pub type SimulatedPmpBank = SimulatedBank<PmpCfgVal, BANK_ENTRIES>;
