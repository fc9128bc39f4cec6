// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! ESP role resolution for dual-boot setup tooling
//!
//! Discovers candidate EFI System Partitions, classifies each by the boot
//! chain it hosts (Windows, Linux, both, or neither) and judges whether the
//! resulting drive layout is safe to configure without operator sign-off.

use std::path::PathBuf;

use snafu::Snafu;

mod partition;
pub use partition::{DriveLayout, Partition, Role};

mod enumerate;
pub use enumerate::enumerate;

mod classify;
pub use classify::{classify, drive_layout, scan_markers};

mod scratch;
pub use scratch::Scratch;

mod advise;
pub use advise::{advise, affirmative, Architecture, Verdict};

mod resolver;
pub use resolver::{Resolution, Resolver};

/// Re-export the topology APIs
pub use topology::disk;

/// Core error type for esprole
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("no EFI system partition detected"))]
    NoEsp,

    #[snafu(display("no recognized boot role on any candidate partition"))]
    NoRecognizedRole,

    #[snafu(display("operator declined to continue"))]
    UserAborted,

    #[snafu(display("failed to mount {device:?}: {source}"))]
    Mount {
        device: PathBuf,
        source: nix::errno::Errno,
    },

    #[snafu(display("generic i/o error: {source}"))]
    Io { source: std::io::Error },

    #[snafu(context(false), display("topology scan: {source}"))]
    Topology { source: topology::disk::Error },
}
