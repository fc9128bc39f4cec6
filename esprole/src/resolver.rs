// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Run orchestration: enumerate, classify, derive the drive layout

use serde::Serialize;
use topology::disk::probe::Probe;

use crate::{classify, drive_layout, enumerate, DriveLayout, Error, Partition, Role, Scratch};

/// Drives one resolution run. Owns the scratch mounts, which are unwound
/// when the resolver is dropped, on every exit path.
#[derive(Debug)]
pub struct Resolver<'a> {
    probe: &'a Probe,
    scratch: Scratch,
}

/// The resolved state handed to downstream configuration writers
#[derive(Debug, Serialize)]
pub struct Resolution {
    /// First partition hosting a Windows boot manager, in enumeration order
    pub windows: Option<Partition>,

    /// First partition hosting a Linux bootloader, in enumeration order.
    /// May name the same partition as `windows` when its role is `Both`.
    pub linux: Option<Partition>,

    /// Every classified candidate, in enumeration order
    pub roles: Vec<(Partition, Role)>,

    /// Distinct drives backing the recognized roles
    pub layout: DriveLayout,
}

impl<'a> Resolver<'a> {
    pub fn new(probe: &'a Probe, scratch: Scratch) -> Self {
        Self { probe, scratch }
    }

    /// Enumerate and classify every candidate ESP.
    ///
    /// Mount failures skip that candidate only; everything else propagates.
    pub fn resolve(&mut self) -> Result<Resolution, Error> {
        let partitions = enumerate(self.probe)?;

        let mut roles = Vec::with_capacity(partitions.len());
        for mut partition in partitions {
            match classify(&mut partition, &mut self.scratch) {
                Ok(role) => roles.push((partition, role)),
                Err(Error::Mount { device, source }) => {
                    log::warn!("cannot inspect {}: {source}, skipping", device.display());
                }
                Err(e) => return Err(e),
            }
        }

        let layout = drive_layout(&roles);
        let windows = roles.iter().find(|(_, r)| r.hosts_windows()).map(|(p, _)| p.clone());
        let linux = roles.iter().find(|(_, r)| r.hosts_linux()).map(|(p, _)| p.clone());

        Ok(Resolution {
            windows,
            linux,
            roles,
            layout,
        })
    }

    /// Tear down all scratch mounts created by this run
    pub fn finish(mut self) {
        self.scratch.unwind();
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use fs_err as fs;

    use crate::{advise, classify, drive_layout, Architecture, Partition, Role, Scratch, Verdict};

    fn esp_tree(markers: &[&str]) -> tempfile::TempDir {
        let root = tempfile::tempdir().expect("tempdir");
        for marker in markers {
            let path = root.path().join(marker);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"").unwrap();
        }
        root
    }

    fn mounted_partition(device: &str, disk: &str, tree: &tempfile::TempDir) -> Partition {
        let mut p = Partition::new(device);
        p.parent_disk = Some(PathBuf::from(disk));
        p.mountpoint = Some(tree.path().to_path_buf());
        p
    }

    /// Full pipeline over two pre-mounted candidates on separate drives:
    /// classification, layout and advice, no prompt shown
    #[test]
    fn two_drive_dual_boot_resolves_cleanly() {
        let windows_tree = esp_tree(&["EFI/Microsoft/Boot/bootmgfw.efi"]);
        let linux_tree = esp_tree(&["EFI/GRUB/grubx64.efi"]);

        let mut sda1 = mounted_partition("/dev/sda1", "/dev/sda", &windows_tree);
        let mut sdb1 = mounted_partition("/dev/sdb1", "/dev/sdb", &linux_tree);

        let mut scratch = Scratch::new("/nonexistent/scratch");
        let roles = vec![
            (sda1.clone(), classify(&mut sda1, &mut scratch).unwrap()),
            (sdb1.clone(), classify(&mut sdb1, &mut scratch).unwrap()),
        ];

        assert_eq!(roles[0].1, Role::Windows);
        assert_eq!(roles[1].1, Role::Linux);

        let layout = drive_layout(&roles);
        assert_eq!(layout.len(), 2);
        assert!(layout.drives().any(|d| d == Path::new("/dev/sda")));
        assert!(layout.drives().any(|d| d == Path::new("/dev/sdb")));

        let verdict = advise(&layout, Architecture::X86_64, |_| panic!("no prompt expected")).unwrap();
        assert_eq!(verdict, Verdict::Proceed);
    }

    #[test]
    fn role_selection_is_first_match_in_order() {
        let windows_a = esp_tree(&["EFI/Microsoft/Boot/bootmgfw.efi"]);
        let windows_b = esp_tree(&["EFI/Microsoft/Boot/bootmgfw.efi"]);

        let mut first = mounted_partition("/dev/sda1", "/dev/sda", &windows_a);
        let mut second = mounted_partition("/dev/sdb1", "/dev/sdb", &windows_b);

        let mut scratch = Scratch::new("/nonexistent/scratch");
        let roles = vec![
            (first.clone(), classify(&mut first, &mut scratch).unwrap()),
            (second.clone(), classify(&mut second, &mut scratch).unwrap()),
        ];

        let pick = roles
            .iter()
            .find(|(_, r)| r.hosts_windows())
            .map(|(p, _)| p.device.clone());
        assert_eq!(pick.as_deref(), Some(Path::new("/dev/sda1")));
    }

    #[test]
    fn both_role_satisfies_either_pick() {
        let dual_tree = esp_tree(&["EFI/Microsoft/Boot/bootmgfw.efi", "EFI/systemd/systemd-bootx64.efi"]);

        let mut only = mounted_partition("/dev/sda1", "/dev/sda", &dual_tree);
        let mut scratch = Scratch::new("/nonexistent/scratch");
        let role = classify(&mut only, &mut scratch).unwrap();

        assert_eq!(role, Role::Both);
        assert!(role.hosts_windows());
        assert!(role.hosts_linux());
    }
}
