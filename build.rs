// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: legacy repository
fn legacy_repo_arg() -> Arg {
    Arg::new("legacy_repo")
        .required(true)
        .help("rdiff-backup repository (legacy history)")
}

/// Common argument: restic repository
fn restic_repo_arg() -> Arg {
    Arg::new("restic_repo")
        .required(true)
        .help("restic repository receiving the snapshots")
}

/// Common argument: restic password file
fn password_file_arg() -> Arg {
    Arg::new("password_file")
        .short('p')
        .long("password-file")
        .required(true)
        .help("restic password file")
}

/// Common argument: configuration file
fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help("Configuration file (TOML)")
}

fn source_encoding_arg() -> Arg {
    Arg::new("source_encoding")
        .long("source-encoding")
        .help("Encoding of legacy filenames (default: iso-8859-1)")
}

fn destination_encoding_arg() -> Arg {
    Arg::new("destination_encoding")
        .long("destination-encoding")
        .help("Encoding filenames are converted to (default: utf-8)")
}

fn build_cli() -> Command {
    Command::new("rdiff2restic")
        .version(env!("CARGO_PKG_VERSION"))
        .author("rdiff2restic Contributors")
        .about("Migrate rdiff-backup history into a restic repository")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue)
                .help("Enable debug logging (RUST_LOG takes precedence)"),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert every increment not yet present in the restic repository")
                .arg(legacy_repo_arg())
                .arg(restic_repo_arg())
                .arg(password_file_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("repair_encoding")
                        .long("repair-encoding")
                        .action(clap::ArgAction::SetTrue)
                        .help("Repair legacy filename encodings before each snapshot"),
                )
                .arg(source_encoding_arg())
                .arg(destination_encoding_arg())
                .arg(
                    Arg::new("on_failure")
                        .long("on-failure")
                        .value_parser(["abort", "continue"])
                        .help("Behaviour after a failed increment"),
                )
                .arg(
                    Arg::new("work_dir")
                        .long("work-dir")
                        .help("Parent directory for restored increments"),
                ),
        )
        .subcommand(
            Command::new("pending")
                .about("List increments that still need to be converted")
                .arg(legacy_repo_arg())
                .arg(restic_repo_arg())
                .arg(password_file_arg())
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("repair")
                .about("Repair filename encodings of a directory tree in place")
                .arg(Arg::new("directory").required(true).help("Root of the tree to repair"))
                .arg(source_encoding_arg())
                .arg(destination_encoding_arg())
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(clap::ArgAction::SetTrue)
                        .help("Report what would be renamed without changing anything"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("rdiff2restic.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
