// SPDX-FileCopyrightText: Copyright © 2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use color_eyre::eyre::bail;
use esprole::{advise, affirmative, enumerate, Architecture, Resolver, Scratch, Verdict};
use topology::disk::{probe::Probe, Builder};

/// Default location for scratch mountpoints created during a run
const SCRATCH_BASE: &str = "/run/espctl";

#[derive(Parser)]
#[command(version, about = "ESP role resolution for dual-boot setup", long_about = None)]
struct Cli {
    /// Prefix for the virtual filesystems (`sys`, `dev`, `proc` live below it)
    #[arg(long, global = true)]
    vfs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List candidate EFI system partitions
    List,

    /// Classify candidates and validate the dual-boot drive layout
    Resolve {
        /// Emit the resolution as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let probe = build_probe(cli.vfs)?;

    match cli.command {
        Command::List => list(&probe),
        Command::Resolve { json } => resolve(&probe, json),
    }
}

fn build_probe(vfs: Option<PathBuf>) -> color_eyre::Result<Probe> {
    let builder = match vfs {
        Some(prefix) => Builder::new()
            .with_sysfs(prefix.join("sys"))
            .with_devfs(prefix.join("dev"))
            .with_procfs(prefix.join("proc")),
        None => Builder::new(),
    };
    Ok(builder.build()?)
}

fn list(probe: &Probe) -> color_eyre::Result<()> {
    let partitions = enumerate(probe)?;

    println!("Candidate EFI system partitions:");
    for (index, partition) in partitions.iter().enumerate() {
        match &partition.mountpoint {
            Some(mountpoint) => println!(
                " {}) {} (mounted at {})",
                index + 1,
                partition.device.display(),
                mountpoint.display()
            ),
            None => println!(" {}) {}", index + 1, partition.device.display()),
        }
    }

    Ok(())
}

fn resolve(probe: &Probe, json: bool) -> color_eyre::Result<()> {
    let mut resolver = Resolver::new(probe, Scratch::new(SCRATCH_BASE));

    let outcome = resolver.resolve().and_then(|resolution| {
        let verdict = advise(&resolution.layout, Architecture::detect(), prompt)?;
        Ok((resolution, verdict))
    });

    let (resolution, verdict) = match outcome {
        Ok(pair) => pair,
        Err(e) => {
            resolver.finish();
            return Err(e.into());
        }
    };

    if verdict == Verdict::Abort {
        resolver.finish();
        bail!(esprole::Error::UserAborted);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        for (partition, role) in &resolution.roles {
            println!("{}: {role}", partition.device.display());
        }
        match (&resolution.windows, &resolution.linux) {
            (Some(windows), Some(linux)) => {
                println!("Windows ESP: {}", windows.device.display());
                println!("Linux ESP:   {}", linux.device.display());
            }
            (Some(windows), None) => {
                println!("Windows ESP: {} (no Linux bootloader found)", windows.device.display());
            }
            (None, Some(linux)) => {
                println!("Linux ESP: {} (no Windows boot manager found)", linux.device.display());
            }
            (None, None) => {}
        }
    }

    resolver.finish();
    Ok(())
}

/// One-shot yes/no prompt on the controlling terminal, declining by default
fn prompt(message: &str) -> bool {
    print!("{message} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    affirmative(&line)
}
