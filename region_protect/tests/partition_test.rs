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

use std::cell::Cell;

use region_protect::memory_map::ADDRESS_SPACE_END;
use region_protect::regs::tor_address;
use region_protect::soc::esp32c5::MEMORY_MAP;
use region_protect::{
    AddressMode, BoundaryMarkers, BuildStage, DebugProbe, EntryConfig, Error, Permissions,
    PmpCfgVal, ProtectionConfig, ProtectionState, RegionBank, RegionProtection, SimulatedPmaBank,
    SimulatedPmpBank,
};

const MARKERS: BoundaryMarkers = BoundaryMarkers {
    iram_text_end: 0x4081_2a40,
    instruction_reserved_end: 0x4202_1f00,
    rodata_reserved_end: 0x4203_8000,
    lp_text_start: 0x5000_0400,
    lp_text_end: 0x5000_1000,
    rom_data_start: 0x4004_8000,
};

const CONFIGS: [ProtectionConfig; 4] = [
    ProtectionConfig::new(BuildStage::Bootloader, false),
    ProtectionConfig::new(BuildStage::Bootloader, true),
    ProtectionConfig::new(BuildStage::Application, false),
    ProtectionConfig::new(BuildStage::Application, true),
];

const APP_SPLIT: ProtectionConfig = ProtectionConfig::new(BuildStage::Application, true);
const BOOTLOADER: ProtectionConfig = ProtectionConfig::new(BuildStage::Bootloader, false);

fn detached() -> bool {
    false
}

fn attached() -> bool {
    true
}

fn configure_on(
    pma: &mut SimulatedPmaBank,
    pmp: &mut SimulatedPmpBank,
    config: ProtectionConfig,
    probe: &dyn DebugProbe,
) -> ProtectionState {
    RegionProtection::new(&MEMORY_MAP, MARKERS, config)
        .configure(pma, pmp, probe)
        .unwrap()
}

fn configure(
    config: ProtectionConfig,
    probe: &dyn DebugProbe,
) -> (SimulatedPmaBank, SimulatedPmpBank) {
    let mut pma = SimulatedPmaBank::new();
    let mut pmp = SimulatedPmpBank::new();
    configure_on(&mut pma, &mut pmp, config, probe);
    pma.dump();
    pmp.dump();
    (pma, pmp)
}

/// Every address at which the decision of either bank may change.
fn boundaries(pma: &SimulatedPmaBank, pmp: &SimulatedPmpBank) -> Vec<u64> {
    let mut points: Vec<u64> = pma
        .active_entries()
        .chain(pmp.active_entries())
        .flat_map(|entry| [entry.range.start, entry.range.end])
        .chain([0])
        .filter(|&address| address < ADDRESS_SPACE_END)
        .collect();
    points.sort_unstable();
    points.dedup();
    points
}

#[test]
fn entries_are_ordered_and_disjoint() {
    for config in CONFIGS {
        for probe in [detached as fn() -> bool, attached] {
            let (pma, pmp) = configure(config, &probe);
            for entries in [
                pma.active_entries().collect::<Vec<_>>(),
                pmp.active_entries().collect::<Vec<_>>(),
            ] {
                for pair in entries.windows(2) {
                    assert!(
                        pair[0].range.end <= pair[1].range.start,
                        "{config:?}: slot {} overlaps or follows slot {}",
                        pair[0].index,
                        pair[1].index
                    );
                }
            }
        }
    }
}

#[test]
fn banks_cover_address_space_without_conflict() {
    for config in CONFIGS {
        for probe in [detached as fn() -> bool, attached] {
            let (pma, pmp) = configure(config, &probe);
            for address in boundaries(&pma, &pmp) {
                let attribute = pma.matching(address);
                let permission = pmp.matching(address);
                assert!(
                    attribute.is_some() || permission.is_some(),
                    "{config:?}: {address:#x} is not covered"
                );
                // A grant never exceeds the attributes of its range, and a
                // denied range is never granted.
                if let (Some(attribute), Some(permission)) = (attribute, permission) {
                    assert!(
                        attribute.permissions.allows(permission.permissions),
                        "{config:?}: {address:#x} granted {} over attribute {}",
                        permission.permissions,
                        attribute.permissions
                    );
                }
            }
            assert!(pma.matching(ADDRESS_SPACE_END - 1).is_some());
        }
    }
}

#[test]
fn configuration_is_idempotent() {
    for config in CONFIGS {
        let first = configure(config, &detached);
        let second = configure(config, &detached);
        assert_eq!(first, second);
    }
}

#[test]
fn rerun_on_configured_application_banks_changes_nothing() {
    let (mut pma, mut pmp) = configure(APP_SPLIT, &detached);
    let before = (pma.clone(), pmp.clone());
    configure_on(&mut pma, &mut pmp, APP_SPLIT, &detached);
    assert_eq!((pma, pmp), before);
}

#[test]
fn split_separates_text_from_data() {
    let (_, pmp) = configure(APP_SPLIT, &detached);

    let ram_text = pmp.matching(MEMORY_MAP.ram.start).unwrap();
    assert_eq!(ram_text.permissions, Permissions::RX.locked());
    assert_eq!(ram_text.range.end, MARKERS.iram_text_end);
    let ram_data = pmp.matching(MARKERS.iram_text_end).unwrap();
    assert_eq!(ram_data.permissions, Permissions::RW.locked());
    assert_eq!(ram_data.range.end, MEMORY_MAP.ram.end);

    let cache_text = pmp.matching(MEMORY_MAP.cache.start).unwrap();
    assert!(!cache_text.permissions.write);
    assert_eq!(cache_text.range.end, 0x4203_0000);
    let cache_data = pmp.matching(0x4203_0000).unwrap();
    assert!(!cache_data.permissions.execute);
    assert_eq!(cache_data.range.end, 0x4204_0000);
    assert_eq!(pmp.matching(0x4204_0000), None);

    let lp_core = pmp.matching(MEMORY_MAP.lp_ram.start).unwrap();
    assert_eq!(lp_core.permissions, Permissions::RW.locked());
    let lp_text = pmp.matching(MARKERS.lp_text_start).unwrap();
    assert_eq!(lp_text.permissions, Permissions::RX.locked());
    assert_eq!(lp_text.range.end, MARKERS.lp_text_end);
    let lp_data = pmp.matching(MARKERS.lp_text_end).unwrap();
    assert_eq!(lp_data.permissions, Permissions::RW.locked());
}

#[test]
fn debug_probe_opens_ram_regardless_of_split() {
    for config in [
        ProtectionConfig::new(BuildStage::Application, false),
        APP_SPLIT,
    ] {
        let (_, pmp) = configure(config, &attached);
        let ram = pmp.matching(MARKERS.iram_text_end).unwrap();
        assert_eq!(ram.range, MEMORY_MAP.ram);
        assert_eq!(ram.permissions, Permissions::RWX.locked());

        let lp_ram = pmp.matching(MARKERS.lp_text_end).unwrap();
        assert_eq!(lp_ram.range, MEMORY_MAP.lp_ram);
        assert_eq!(lp_ram.permissions, Permissions::RWX.locked());
    }
}

#[test]
fn application_locks_every_populated_entry() {
    for config in [
        ProtectionConfig::new(BuildStage::Application, false),
        APP_SPLIT,
    ] {
        let (pma, pmp) = configure(config, &detached);
        assert!(pma.active_entries().all(|entry| entry.permissions.locked));
        assert!(pmp.active_entries().all(|entry| entry.permissions.locked));
    }
}

#[test]
fn bootloader_leaves_stage_dependent_entries_unlocked() {
    for config in [BOOTLOADER, ProtectionConfig::new(BuildStage::Bootloader, true)] {
        for probe in [detached as fn() -> bool, attached] {
            let (_, pmp) = configure(config, &probe);
            for address in [
                MEMORY_MAP.ram.start,
                MEMORY_MAP.cache.start,
                MEMORY_MAP.lp_ram.start,
            ] {
                let entry = pmp.matching(address).unwrap();
                assert!(!entry.permissions.locked, "{address:#x} locked");
                assert!(entry.permissions.execute);
            }
            for address in [MEMORY_MAP.cpu_subsystem.start, MEMORY_MAP.peripheral.start] {
                assert!(pmp.matching(address).unwrap().permissions.locked);
            }
        }
    }
}

#[test]
fn application_after_bootloader_matches_fresh_configuration() {
    let mut pma = SimulatedPmaBank::new();
    let mut pmp = SimulatedPmpBank::new();
    assert_eq!(
        configure_on(&mut pma, &mut pmp, BOOTLOADER, &detached),
        ProtectionState::Unlocked
    );
    assert_eq!(
        configure_on(&mut pma, &mut pmp, APP_SPLIT, &detached),
        ProtectionState::Locked
    );

    let fresh = configure(APP_SPLIT, &detached);
    assert_eq!((pma, pmp), fresh);
}

#[test]
fn writes_without_reset_keep_bootloader_grants() {
    let (_, mut pmp) = configure(BOOTLOADER, &detached);
    let mut reset_first = pmp.clone();
    let text = PmpCfgVal::new(Permissions::RX.locked(), AddressMode::Tor);

    pmp.set(4, text, tor_address(MARKERS.iram_text_end));
    let entry = pmp.entry(4);
    assert_eq!(entry.range.end, MARKERS.iram_text_end);
    assert!(entry.permissions.write, "bootloader W bit survives");

    reset_first.reset(4);
    reset_first.set(4, text, tor_address(MARKERS.iram_text_end));
    assert_eq!(reset_first.entry(4).permissions, Permissions::RX.locked());
}

#[test]
fn locked_entries_ignore_later_writes() {
    let (_, mut pmp) = configure(APP_SPLIT, &detached);
    let before = pmp.clone();

    pmp.reset(4);
    pmp.set(
        4,
        PmpCfgVal::new(Permissions::RWX, AddressMode::Tor),
        tor_address(MEMORY_MAP.ram.end),
    );
    // Slot 3 holds the lower bound of the locked TOR entry in slot 4.
    pmp.set(
        3,
        PmpCfgVal::new(Permissions::NONE, AddressMode::Off),
        tor_address(0),
    );
    assert_eq!(pmp, before);
}

#[test]
#[should_panic(expected = "fault check failed")]
fn flaky_probe_halts() {
    let reads = Cell::new(0);
    let flaky = || {
        reads.set(reads.get() + 1);
        reads.get() == 1
    };
    configure(APP_SPLIT, &flaky);
}

#[test]
fn misplaced_marker_is_out_of_range() {
    let markers = BoundaryMarkers {
        lp_text_end: MEMORY_MAP.lp_ram.end + 0x100,
        ..MARKERS
    };
    let mut pma = SimulatedPmaBank::new();
    let mut pmp = SimulatedPmpBank::new();
    let result = RegionProtection::new(&MEMORY_MAP, markers, APP_SPLIT).configure(
        &mut pma,
        &mut pmp,
        &detached,
    );
    assert_eq!(result, Err(Error::OutOfRange));

    // The marker is unused without the split.
    let config = ProtectionConfig::new(BuildStage::Application, false);
    let mut pmp = SimulatedPmpBank::new();
    let result = RegionProtection::new(&MEMORY_MAP, markers, config).configure(
        &mut pma,
        &mut pmp,
        &detached,
    );
    assert_eq!(result, Ok(ProtectionState::Locked));
}

#[test]
fn permission_entries_chain_on_floor_entries() {
    let (_, pmp) = configure(APP_SPLIT, &detached);
    // ROM data, RAM, cache and LP RAM each start with an `Off` floor entry.
    for index in [1, 3, 6, 9] {
        assert_eq!(pmp.cfg(index).mode(), AddressMode::Off, "slot {index}");
        assert_eq!(pmp.entry(index + 1).mode, AddressMode::Tor, "slot {index}");
    }
}
