// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Scoped scratch mounts for ESP inspection
//!
//! Every mount performed here is recorded and unwound when the run ends,
//! including early aborts. Mounts we merely found (the OS's own ESP mount)
//! are never touched.

use std::path::{Path, PathBuf};

use fs_err as fs;
use nix::mount::{mount, umount, MsFlags};
use snafu::ResultExt as _;

use crate::{Error, IoSnafu, MountSnafu};

/// Tracks mountpoints created by this run so they can be unwound
#[derive(Debug)]
pub struct Scratch {
    base: PathBuf,
    owned: Vec<PathBuf>,
}

impl Scratch {
    /// New scratch area rooted at `base` (created on first mount)
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            owned: vec![],
        }
    }

    /// Deterministic mountpoint for a device node: `/dev/sda1` maps to
    /// `<base>/dev-sda1`, so re-runs land on the same path
    pub(crate) fn target_for(&self, device: &Path) -> PathBuf {
        let name = device
            .to_string_lossy()
            .trim_start_matches('/')
            .replace('/', "-");
        self.base.join(name)
    }

    /// Mount `device` read-only at its scratch target and record it for unwind
    pub fn mount(&mut self, device: &Path) -> Result<PathBuf, Error> {
        let target = self.target_for(device);
        fs::create_dir_all(&target).context(IoSnafu)?;

        log::trace!("mounting {} at {}", device.display(), target.display());
        mount(
            Some(device),
            &target,
            Some("vfat"),
            MsFlags::MS_RDONLY,
            None::<&str>,
        )
        .context(MountSnafu { device })?;

        self.owned.push(target.clone());
        Ok(target)
    }

    /// Unmount and remove everything this run mounted, newest first.
    /// Failures are logged, not propagated: unwind must visit every entry.
    pub fn unwind(&mut self) {
        while let Some(target) = self.owned.pop() {
            log::trace!("unmounting {}", target.display());
            if let Err(e) = umount(&target) {
                log::error!("failed to unmount {}: {e}", target.display());
                continue;
            }
            if let Err(e) = fs::remove_dir(&target) {
                log::warn!("failed to remove scratch dir {}: {e}", target.display());
            }
        }
    }

    /// Mountpoints currently owned by this run
    pub fn owned(&self) -> &[PathBuf] {
        &self.owned
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        self.unwind();
    }
}
