// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Candidate ESP enumeration
//!
//! Two sources feed the candidate list: GPT entries carrying the ESP type
//! GUID, and FAT filesystems the OS already has mounted at a well-known ESP
//! mountpoint. The first is authoritative for ordering, the second catches
//! partitions on disks we cannot read the label of.

use std::path::{Path, PathBuf};

use topology::disk::{mounts::Table, probe::Probe};

use crate::{Error, NoEspSnafu, Partition};

/// Mountpoints the OS conventionally uses for the ESP
const ESP_MOUNTPOINTS: &[&str] = &["/boot/efi", "/efi"];

/// Filesystem identifiers an ESP mount may carry
const ESP_FILESYSTEMS: &[&str] = &["vfat", "fat"];

/// Discover all candidate ESPs, deduplicated by device node.
///
/// Ordering is GPT scan order first, then unique already-mounted additions.
/// The order only drives operator-facing numbering.
pub fn enumerate(probe: &Probe) -> Result<Vec<Partition>, Error> {
    let from_gpt = probe.esp_partitions()?;
    let from_mounts = mounted_esps(&probe.mounts);

    let mut partitions = merge_candidates(from_gpt, from_mounts);
    if partitions.is_empty() {
        return NoEspSnafu.fail();
    }

    for partition in &mut partitions {
        partition.parent_disk = probe.get_device_parent(&partition.device);
    }

    log::debug!("enumerated {} candidate ESP(s)", partitions.len());
    Ok(partitions)
}

/// FAT filesystems mounted at a conventional ESP mountpoint
fn mounted_esps(table: &Table) -> Vec<(PathBuf, PathBuf)> {
    table
        .iter()
        .filter(|m| ESP_FILESYSTEMS.contains(&m.filesystem.as_str()))
        .filter(|m| ESP_MOUNTPOINTS.iter().any(|candidate| m.mountpoint.as_path() == Path::new(candidate)))
        .map(|m| (PathBuf::from(&m.device), m.mountpoint.clone()))
        .collect()
}

/// Fold both sources into one list keyed by device node. A device seen by
/// both keeps its GPT-scan position and gains the known mountpoint.
fn merge_candidates(from_gpt: Vec<PathBuf>, from_mounts: Vec<(PathBuf, PathBuf)>) -> Vec<Partition> {
    let mut partitions: Vec<Partition> = vec![];

    for device in from_gpt {
        if partitions.iter().any(|p| p.device == device) {
            continue;
        }
        partitions.push(Partition::new(device));
    }

    for (device, mountpoint) in from_mounts {
        if let Some(existing) = partitions.iter_mut().find(|p| p.device == device) {
            existing.mountpoint = Some(mountpoint);
        } else {
            log::debug!("adding mounted ESP not visible to GPT scan: {}", device.display());
            let mut partition = Partition::new(device);
            partition.mountpoint = Some(mountpoint);
            partitions.push(partition);
        }
    }

    partitions
}
