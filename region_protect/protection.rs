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

use crate::Result;
use crate::attributes::build_attribute_table;
use crate::bank::RegionBank;
use crate::memory_map::{BoundaryMarkers, SocMemoryMap};
use crate::permissions::{DebugProbe, build_permission_table};
use crate::policy::ProtectionConfig;
use crate::regs::pma::PmaCfgVal;
use crate::regs::pmp::PmpCfgVal;

/// State of the permission bank once both banks are committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtectionState {
    /// Every populated permission entry is locked until reset.
    Locked,
    /// Stage dependent entries may still be rewritten by the next stage.
    Unlocked,
}

/// Region protection for one SoC and boot stage.
pub struct RegionProtection<'a> {
    map: &'a SocMemoryMap,
    markers: BoundaryMarkers,
    config: ProtectionConfig,
}

impl<'a> RegionProtection<'a> {
    #[must_use]
    pub const fn new(
        map: &'a SocMemoryMap,
        markers: BoundaryMarkers,
        config: ProtectionConfig,
    ) -> Self {
        Self {
            map,
            markers,
            config,
        }
    }

    /// Commits the attribute bank, then the permission bank.
    ///
    /// Must run once per core, before any code that is not trusted with the
    /// whole address space.
    pub fn configure<A, B, P>(
        &self,
        attributes: &mut A,
        permissions: &mut B,
        probe: &P,
    ) -> Result<ProtectionState>
    where
        A: RegionBank<Cfg = PmaCfgVal>,
        B: RegionBank<Cfg = PmpCfgVal>,
        P: DebugProbe + ?Sized,
    {
        build_attribute_table(attributes, self.map)?;
        build_permission_table(permissions, self.map, &self.markers, &self.config, probe)?;

        let state = if self.config.is_application() {
            ProtectionState::Locked
        } else {
            ProtectionState::Unlocked
        };
        log::info!("Region protection committed ({:?}, {:?})", self.config.stage, state);
        Ok(state)
    }
}
