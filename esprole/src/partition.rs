// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    collections::BTreeSet,
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;

/// A candidate EFI System Partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    /// Block device node, eg `/dev/sda1`. Unique key per run.
    pub device: PathBuf,

    /// The physical drive backing this partition, when resolvable
    pub parent_disk: Option<PathBuf>,

    /// Set once mounted by the OS or by this run
    pub mountpoint: Option<PathBuf>,
}

impl Partition {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            parent_disk: None,
            mountpoint: None,
        }
    }

    /// The drive used for layout risk assessment. Falls back to the device
    /// itself when sysfs cannot name a parent.
    pub fn physical_drive(&self) -> &Path {
        self.parent_disk.as_deref().unwrap_or(&self.device)
    }
}

/// Which boot chain a partition hosts.
///
/// `Both` is deliberate: a partition carrying Windows and Linux markers at
/// once is surfaced as such rather than collapsed into an arbitrary winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Windows,
    Linux,
    Both,
    Unknown,
}

impl Role {
    /// Does this partition contribute to the drive layout?
    pub fn is_recognized(self) -> bool {
        !matches!(self, Role::Unknown)
    }

    pub fn hosts_windows(self) -> bool {
        matches!(self, Role::Windows | Role::Both)
    }

    pub fn hosts_linux(self) -> bool {
        matches!(self, Role::Linux | Role::Both)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Windows => f.write_str("Windows boot manager"),
            Role::Linux => f.write_str("Linux bootloader"),
            Role::Both => f.write_str("Windows + Linux (ambiguous)"),
            Role::Unknown => f.write_str("unrecognized"),
        }
    }
}

/// The distinct physical drives backing all recognized-role partitions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DriveLayout(BTreeSet<PathBuf>);

impl DriveLayout {
    pub(crate) fn insert(&mut self, drive: impl Into<PathBuf>) {
        self.0.insert(drive.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn drives(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }
}
