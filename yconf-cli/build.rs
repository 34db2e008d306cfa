//! Build script for yconf-cli.
//!
//! This script generates a man page for the demo binary at build time using
//! clap_mangen. The generated man page is placed in OUT_DIR.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs and
/// src/commands/mod.rs.
fn build_cli() -> Command {
    Command::new("yconf-demo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage a schema-checked YAML configuration file")
        .long_about(
            "Show, change, validate and reset the configuration file of the yconf demo mail fetcher",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Override the configuration file location")
                .value_name("PATH")
                .global(true)
                .env("YCONF_CONFIG_FILE"),
        )
        .subcommands(vec![
            Command::new("show")
                .about("Print the current configuration")
                .long_about("Print the configuration as commented YAML, JSON or indented text"),
            Command::new("get")
                .about("Print the value at a dotted key")
                .long_about("Print one value, addressed by a dotted key such as transport.port"),
            Command::new("set")
                .about("Set the value at a dotted key")
                .long_about("Validate and save a new value; the value is parsed as YAML"),
            Command::new("path")
                .about("Print the configuration file location")
                .long_about("Display the resolved path of the configuration file"),
            Command::new("validate")
                .about("Validate a configuration file")
                .long_about("Check a configuration file and list every problem found"),
            Command::new("defaults")
                .about("Print the default configuration document")
                .long_about("Print the commented YAML document holding the defaults"),
            Command::new("reset")
                .about("Restore the default configuration")
                .long_about("Overwrite the configuration file with the defaults"),
            Command::new("edit")
                .about("Open the configuration file in an editor")
                .long_about("Open the file with $VISUAL or $EDITOR and validate it afterwards"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR").unwrap_or_default());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    fs::write(man_dir.join("yconf-demo.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
