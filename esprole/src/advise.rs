// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Drive layout safety advisory
//!
//! Separate drives are the recommended dual-boot layout and proceed without
//! question. A shared drive needs the operator to own the risk, with an
//! extra warning on ARM64 where a bad write is far harder to recover from.

use nix::sys::utsname::uname;

use crate::{DriveLayout, Error, NoRecognizedRoleSnafu};

/// Machine architecture, as far as the advisory cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    X86_64,
    Arm64,
    Other,
}

impl Architecture {
    /// Detect the running machine via `uname(2)`
    pub fn detect() -> Self {
        let Ok(utsname) = uname() else {
            return Architecture::Other;
        };
        match utsname.machine().to_str() {
            Some("x86_64") => Architecture::X86_64,
            Some("aarch64") | Some("arm64") => Architecture::Arm64,
            _ => Architecture::Other,
        }
    }
}

/// Outcome of the advisory step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Proceed,
    Abort,
}

/// Judge whether the layout is safe to configure.
///
/// `confirm` is invoked at most once, with a prompt string; it returns
/// whether the operator accepted. Callers wire it to a terminal read, or to
/// a canned answer in tests.
pub fn advise<F>(layout: &DriveLayout, architecture: Architecture, mut confirm: F) -> Result<Verdict, Error>
where
    F: FnMut(&str) -> bool,
{
    if layout.is_empty() {
        return NoRecognizedRoleSnafu.fail();
    }

    if layout.len() > 1 {
        log::debug!("recognized roles span {} drives, no confirmation needed", layout.len());
        return Ok(Verdict::Proceed);
    }

    log::warn!("Windows and Linux boot chains share a single physical drive");
    if architecture == Architecture::Arm64 {
        log::warn!("ARM64 same-drive dual boot carries elevated risk of an unbootable device");
    }

    if confirm("Continue with same-drive dual boot setup?") {
        Ok(Verdict::Proceed)
    } else {
        log::info!("operator declined same-drive setup");
        Ok(Verdict::Abort)
    }
}

/// Strict affirmative policy for the confirmation prompt: exactly `y` or
/// `Y`, anything else (including an empty line) declines
pub fn affirmative(input: &str) -> bool {
    matches!(input.trim_end_matches(['\r', '\n']), "y" | "Y")
}

#[cfg(test)]
mod tests {
    use super::{advise, affirmative, Architecture, Verdict};
    use crate::{classify::drive_layout, Error, Partition, Role};

    fn layout_over(devices: &[(&str, &str)]) -> crate::DriveLayout {
        let classified = devices
            .iter()
            .map(|(part, disk)| {
                let mut p = Partition::new(*part);
                p.parent_disk = Some((*disk).into());
                (p, Role::Linux)
            })
            .collect::<Vec<_>>();
        drive_layout(&classified)
    }

    #[test]
    fn separate_drives_proceed_without_prompting() {
        let layout = layout_over(&[("/dev/sda1", "/dev/sda"), ("/dev/sdb1", "/dev/sdb")]);

        let verdict = advise(&layout, Architecture::X86_64, |_| {
            panic!("prompt must not be shown for separate drives")
        })
        .expect("advice");
        assert_eq!(verdict, Verdict::Proceed);
    }

    #[test]
    fn shared_drive_requires_confirmation() {
        let layout = layout_over(&[("/dev/sda1", "/dev/sda"), ("/dev/sda2", "/dev/sda")]);

        let mut asked = false;
        let verdict = advise(&layout, Architecture::X86_64, |_| {
            asked = true;
            true
        })
        .expect("advice");
        assert!(asked);
        assert_eq!(verdict, Verdict::Proceed);
    }

    #[test]
    fn declining_shared_drive_aborts() {
        let layout = layout_over(&[("/dev/sda1", "/dev/sda"), ("/dev/sda2", "/dev/sda")]);

        let verdict = advise(&layout, Architecture::X86_64, |_| false).expect("advice");
        assert_eq!(verdict, Verdict::Abort);
    }

    #[test]
    fn arm64_shared_drive_still_prompts() {
        let layout = layout_over(&[("/dev/mmcblk0p1", "/dev/mmcblk0")]);

        let verdict = advise(&layout, Architecture::Arm64, |_| false).expect("advice");
        assert_eq!(verdict, Verdict::Abort);
    }

    #[test]
    fn empty_layout_is_an_error() {
        let layout = crate::DriveLayout::default();
        let err = advise(&layout, Architecture::X86_64, |_| true).unwrap_err();
        assert!(matches!(err, Error::NoRecognizedRole));
    }

    #[test]
    fn affirmative_is_exactly_y() {
        assert!(affirmative("y"));
        assert!(affirmative("Y"));
        assert!(affirmative("y\n"));
        assert!(affirmative("Y\r\n"));

        assert!(!affirmative(""));
        assert!(!affirmative("\n"));
        assert!(!affirmative("yes"));
        assert!(!affirmative(" y"));
        assert!(!affirmative("n"));
    }
}
