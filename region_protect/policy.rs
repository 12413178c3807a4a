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

/// Access granted by a single bank entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    /// Enforce the entry in machine mode and ignore further writes to it
    /// until the bank is reset.
    pub locked: bool,
}

impl Permissions {
    pub const NONE: Self = Self::new(false, false, false);
    pub const R: Self = Self::new(true, false, false);
    pub const RW: Self = Self::new(true, true, false);
    pub const RX: Self = Self::new(true, false, true);
    pub const RWX: Self = Self::new(true, true, true);

    #[must_use]
    pub const fn new(read: bool, write: bool, execute: bool) -> Self {
        Self {
            read,
            write,
            execute,
            locked: false,
        }
    }

    #[must_use]
    pub const fn locked(self) -> Self {
        self.with_lock(true)
    }

    #[must_use]
    pub const fn with_lock(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    #[must_use]
    pub const fn with_write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Returns `true` if any of read, write or execute is granted.
    #[must_use]
    pub const fn grants_access(&self) -> bool {
        self.read || self.write || self.execute
    }

    /// Returns `true` if every access granted by `request` is also granted by
    /// `self`.  The lock bit is ignored.
    #[must_use]
    pub const fn allows(&self, request: Self) -> bool {
        (self.read || !request.read)
            && (self.write || !request.write)
            && (self.execute || !request.execute)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.locked { 'L' } else { '-' },
            if self.execute { 'X' } else { '-' },
            if self.write { 'W' } else { '-' },
            if self.read { 'R' } else { '-' },
        )
    }
}

/// Boot stage the configurator runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStage {
    /// Second stage bootloader.  The application reconfigures the banks after
    /// it, so stage dependent entries must stay unlocked.
    Bootloader,
    /// The application.  Every populated permission entry is locked.
    Application,
}

/// Build configuration switches consumed by the permission builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtectionConfig {
    pub stage: BuildStage,
    /// Split unified RAM, the cache window and LP RAM into separate text
    /// (no write) and data (no execute) ranges.  Only honoured in the
    /// application stage.
    pub idram_split: bool,
}

impl ProtectionConfig {
    #[must_use]
    pub const fn new(stage: BuildStage, idram_split: bool) -> Self {
        Self { stage, idram_split }
    }

    /// Configuration selected by the `bootloader` and `idram-split` cargo
    /// features.
    #[must_use]
    pub const fn from_features() -> Self {
        let stage = if cfg!(feature = "bootloader") {
            BuildStage::Bootloader
        } else {
            BuildStage::Application
        };
        Self::new(stage, cfg!(feature = "idram-split"))
    }

    #[must_use]
    pub const fn is_application(&self) -> bool {
        matches!(self.stage, BuildStage::Application)
    }

    /// Returns `true` if the text/data split applies in this stage.
    #[must_use]
    pub const fn split_enabled(&self) -> bool {
        self.idram_split && self.is_application()
    }

    /// Applies the stage dependent lock bit to `permissions`: locked in the
    /// application, unlocked in the bootloader.
    #[must_use]
    pub const fn conditional(&self, permissions: Permissions) -> Permissions {
        permissions.with_lock(self.is_application())
    }

    /// Whether slots must be reset before they are rewritten.
    ///
    /// Permission writes only ever add bits, so the application has to clear
    /// whatever the bootloader left in a slot.
    #[must_use]
    pub const fn resets_before_write(&self) -> bool {
        self.is_application()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditional_lock_follows_stage() {
        let bootloader = ProtectionConfig::new(BuildStage::Bootloader, true);
        let application = ProtectionConfig::new(BuildStage::Application, false);

        assert!(!bootloader.conditional(Permissions::RWX).locked);
        assert!(application.conditional(Permissions::RWX).locked);
        assert_eq!(
            application.conditional(Permissions::RX),
            Permissions::RX.locked()
        );
    }

    #[test]
    fn split_only_applies_to_application() {
        assert!(!ProtectionConfig::new(BuildStage::Bootloader, true).split_enabled());
        assert!(ProtectionConfig::new(BuildStage::Application, true).split_enabled());
        assert!(!ProtectionConfig::new(BuildStage::Application, false).split_enabled());
    }

    #[test]
    fn allows_ignores_lock() {
        assert!(Permissions::RWX.allows(Permissions::RX.locked()));
        assert!(Permissions::RX.allows(Permissions::R));
        assert!(!Permissions::RX.allows(Permissions::RW));
        assert!(Permissions::NONE.allows(Permissions::NONE));
        assert!(!Permissions::NONE.grants_access());
    }

    #[test]
    fn display_matches_pmp_dump_order() {
        assert_eq!(format!("{}", Permissions::RX.locked()), "LX-R");
        assert_eq!(format!("{}", Permissions::RW), "--WR");
    }
}
