// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Disk probe/query APIs

use std::path::{Path, PathBuf};

use fs_err as fs;
use nix::sys::stat;
use snafu::ResultExt as _;

use super::{mounts::Table, GptSnafu, IoSnafu};

/// A Disk probe to query disks
#[derive(Debug)]
pub struct Probe {
    /// location of /sys
    pub(super) sysfs: PathBuf,

    /// location of /dev
    pub(super) devfs: PathBuf,

    /// location of /proc
    pub(super) procfs: PathBuf,

    /// Mountpoints
    pub mounts: Table,
}

impl Probe {
    /// Initial startup loads
    pub(super) fn init_scan(&mut self) -> Result<(), super::Error> {
        let mounts = Table::new_from_path(self.procfs.join("self").join("mounts")).context(IoSnafu)?;
        self.mounts = mounts;

        Ok(())
    }

    /// Retrieve the parent device, such as the disk of a partition, if possible
    pub fn get_device_parent(&self, device: impl AsRef<Path>) -> Option<PathBuf> {
        let device = fs::canonicalize(device.as_ref()).ok()?;
        let child = fs::canonicalize(
            device
                .file_name()
                .map(|f| self.sysfs.join("class").join("block").join(f))?,
        )
        .ok()?;
        let parent = child.parent()?.file_name()?;
        if parent == "block" {
            None
        } else {
            fs::canonicalize(self.devfs.join(parent)).ok()
        }
    }

    /// Every ESP-typed partition across all whole disks known to sysfs.
    ///
    /// Best-effort: disks that cannot be opened or carry no GPT label are
    /// logged and skipped rather than failing the scan.
    pub fn esp_partitions(&self) -> Result<Vec<PathBuf>, super::Error> {
        let mut results = vec![];

        for disk in self.whole_disks()? {
            let node = self.devfs.join(&disk);
            if !node.exists() {
                log::trace!("no device node for sysfs disk {disk}, skipping");
                continue;
            }
            match self.esp_partitions_on_disk(&node, &disk) {
                Ok(partitions) => results.extend(partitions),
                Err(e) => log::debug!("skipping disk {}: {e}", node.display()),
            }
        }

        Ok(results)
    }

    /// Names of whole-disk block devices (entries in `/sys/class/block`
    /// without a `partition` attribute), sorted for stable enumeration order
    pub(crate) fn whole_disks(&self) -> Result<Vec<String>, super::Error> {
        let block_root = self.sysfs.join("class").join("block");
        let mut disks = vec![];

        for entry in fs::read_dir(block_root).context(IoSnafu)? {
            let entry = entry.context(IoSnafu)?;
            if entry.path().join("partition").exists() {
                continue;
            }
            disks.push(entry.file_name().to_string_lossy().to_string());
        }

        disks.sort();
        Ok(disks)
    }

    /// Scan one disk's GPT for ESP-typed partitions, returning their device nodes
    fn esp_partitions_on_disk(&self, node: &Path, disk: &str) -> Result<Vec<PathBuf>, super::Error> {
        let fi = fs::File::open(node).context(IoSnafu)?;
        let table = gpt::GptConfig::new()
            .writable(false)
            .open_from_device(Box::new(fi))
            .context(GptSnafu)?;

        let mut results = vec![];
        for (index, partition) in table.partitions() {
            if partition.part_type_guid != gpt::partition_types::EFI {
                continue;
            }
            let child = self.devfs.join(partition_node(disk, *index));
            if !is_block_device(&child) {
                log::trace!("ESP entry {index} on {disk} has no usable node at {}", child.display());
                continue;
            }
            log::debug!("found ESP-typed partition: {}", child.display());
            results.push(child);
        }

        Ok(results)
    }
}

/// Kernel naming rule for partition nodes: disks whose name ends in a digit
/// gain a `p` separator (`nvme0n1` -> `nvme0n1p1`, `sda` -> `sda1`)
pub(crate) fn partition_node(disk: &str, index: u32) -> String {
    if disk.ends_with(|c: char| c.is_ascii_digit()) {
        format!("{disk}p{index}")
    } else {
        format!("{disk}{index}")
    }
}

fn is_block_device(path: &Path) -> bool {
    stat::stat(path)
        .map(|st| st.st_mode & stat::SFlag::S_IFMT.bits() == stat::SFlag::S_IFBLK.bits())
        .unwrap_or(false)
}
