// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Boot role classification over mounted ESP trees
//!
//! Detection is a declarative table of marker paths per role, consumed by a
//! single scan routine. Anything matching both roles reports `Role::Both`.

use std::path::Path;

use crate::{DriveLayout, Error, Partition, Role, Scratch};

/// Marker files identifying a boot chain, relative to the ESP root.
/// Any one present claims the role.
const ROLE_MARKERS: &[(Role, &[&str])] = &[
    (
        Role::Windows,
        &[
            "EFI/Microsoft/Boot/bootmgfw.efi",
            "EFI/Microsoft/Boot/winload.efi",
        ],
    ),
    (
        Role::Linux,
        &[
            "EFI/GRUB/grubx64.efi",
            "EFI/Gentoo/grubx64.efi",
            "EFI/systemd/systemd-bootx64.efi",
            "EFI/BOOT/bootx64.efi",
        ],
    ),
];

/// Classify one candidate, mounting it via `scratch` if nothing already
/// exposes it. The recorded mountpoint is reused on subsequent calls.
pub fn classify(partition: &mut Partition, scratch: &mut Scratch) -> Result<Role, Error> {
    let root = match &partition.mountpoint {
        Some(existing) => existing.clone(),
        None => {
            let target = scratch.mount(&partition.device)?;
            partition.mountpoint = Some(target.clone());
            target
        }
    };

    let role = scan_markers(&root);
    log::debug!("{} classified as {role}", partition.device.display());
    Ok(role)
}

/// Scan an ESP tree for role markers
pub fn scan_markers(root: &Path) -> Role {
    let mut verdict = None;

    for (role, markers) in ROLE_MARKERS {
        let hit = markers.iter().any(|marker| root.join(marker).exists());
        if !hit {
            continue;
        }
        verdict = match verdict {
            None => Some(*role),
            Some(_) => Some(Role::Both),
        };
    }

    verdict.unwrap_or(Role::Unknown)
}

/// The distinct physical drives backing recognized-role partitions
pub fn drive_layout(classified: &[(Partition, Role)]) -> DriveLayout {
    let mut layout = DriveLayout::default();
    for (partition, role) in classified {
        if role.is_recognized() {
            layout.insert(partition.physical_drive());
        }
    }
    layout
}
