// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Parsing for the kernel mount table (`/proc/self/mounts`)

use std::path::{Path, PathBuf};

use fs_err as fs;

/// A single row in the mount table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    /// Source device, eg `/dev/sda1`
    pub device: String,

    /// Where it lives in the hierarchy
    pub mountpoint: PathBuf,

    /// Filesystem identifier, eg `vfat`
    pub filesystem: String,

    /// Comma separated mount options
    pub options: String,
}

/// The parsed mount table
#[derive(Debug, Default)]
pub struct Table {
    rows: Vec<Mount>,
}

impl Table {
    /// Load and parse the mount table found at `path`
    pub fn new_from_path(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let contents = fs::read_to_string(path.as_ref())?;
        Ok(Self::new_from_string(&contents))
    }

    /// Parse a mount table from its textual form
    pub fn new_from_string(contents: &str) -> Self {
        let rows = contents
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_ascii_whitespace();
                let device = fields.next()?;
                let mountpoint = fields.next()?;
                let filesystem = fields.next()?;
                let options = fields.next()?;
                Some(Mount {
                    device: unescape_octal(device),
                    mountpoint: unescape_octal(mountpoint).into(),
                    filesystem: filesystem.to_string(),
                    options: options.to_string(),
                })
            })
            .collect();
        Self { rows }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mount> {
        self.rows.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Mount;
    type IntoIter = std::slice::Iter<'a, Mount>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// The kernel escapes whitespace and friends as 3-digit octal (`\040` etc)
fn unescape_octal(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let digits = chars.as_str().get(..3);
        match digits.and_then(|d| u8::from_str_radix(d, 8).ok()) {
            Some(byte) => {
                out.push(byte as char);
                chars.nth(2);
            }
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::Table;

    const SAMPLE: &str = r"/dev/nvme0n1p3 / ext4 rw,relatime 0 0
/dev/nvme0n1p1 /boot/efi vfat rw,relatime,fmask=0022 0 0
tmpfs /run tmpfs rw,nosuid,nodev 0 0
/dev/sdb1 /mnt/usb\040stick vfat rw 0 0
";

    #[test]
    fn parses_all_rows() {
        let table = Table::new_from_string(SAMPLE);
        assert_eq!(table.iter().count(), 4);

        let esp = table
            .iter()
            .find(|m| m.mountpoint == Path::new("/boot/efi"))
            .expect("esp row");
        assert_eq!(esp.device, "/dev/nvme0n1p1");
        assert_eq!(esp.filesystem, "vfat");
        assert!(esp.options.contains("fmask=0022"));
    }

    #[test]
    fn unescapes_octal_mountpoints() {
        let table = Table::new_from_string(SAMPLE);
        assert!(table.iter().any(|m| m.mountpoint == Path::new("/mnt/usb stick")));
    }

    #[test]
    fn ignores_malformed_lines() {
        let table = Table::new_from_string("garbage\n/dev/sda1 /boot\n");
        assert!(table.is_empty());
    }
}
