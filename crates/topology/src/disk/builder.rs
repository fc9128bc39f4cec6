// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::path::{Path, PathBuf};

use super::{mounts::Table, probe::Probe};

/// Builder for a [`Probe`], allowing the virtual filesystem roots to be
/// redirected (chiefly for inspecting alternate roots, and for tests)
#[derive(Debug)]
pub struct Builder {
    sysfs: PathBuf,
    devfs: PathBuf,
    procfs: PathBuf,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            sysfs: "/sys".into(),
            devfs: "/dev".into(),
            procfs: "/proc".into(),
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sysfs(self, sysfs: impl AsRef<Path>) -> Self {
        Self {
            sysfs: sysfs.as_ref().into(),
            ..self
        }
    }

    pub fn with_devfs(self, devfs: impl AsRef<Path>) -> Self {
        Self {
            devfs: devfs.as_ref().into(),
            ..self
        }
    }

    pub fn with_procfs(self, procfs: impl AsRef<Path>) -> Self {
        Self {
            procfs: procfs.as_ref().into(),
            ..self
        }
    }

    /// Construct the probe and perform the initial mount table scan
    pub fn build(self) -> Result<Probe, super::Error> {
        let mut probe = Probe {
            sysfs: self.sysfs,
            devfs: self.devfs,
            procfs: self.procfs,
            mounts: Table::default(),
        };
        probe.init_scan()?;
        Ok(probe)
    }
}
