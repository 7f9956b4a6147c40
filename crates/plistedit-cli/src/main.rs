//! `plistedit` CLI: format, convert, query and edit XML property lists.
//!
//! ## Usage
//!
//! ```sh
//! # Reformat a plist with two-space indentation (stdin → stdout)
//! plistedit fmt < Firefox.plist
//!
//! # Single-line output, file to file
//! plistedit fmt --compact -i Firefox.plist -o Firefox.min.plist
//!
//! # Convert to JSON and back
//! plistedit to-json -i Firefox.plist | plistedit from-json
//!
//! # Read, write and delete by dotted path
//! plistedit get installs.0.path -i Firefox.plist
//! plistedit set unattended_install true -i Firefox.plist -o Firefox.plist
//! plistedit rm blocking_applications -i Firefox.plist
//!
//! # Show the editor view, flagging catalogs that are not known
//! plistedit outline --profile manifest --allow catalogs=testing,production -i site_default
//!
//! # Template keys a manifest does not use yet
//! plistedit suggest-keys --profile manifest -i site_default
//! ```

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use plistedit_core::path::{self, Path, Segment};
use plistedit_core::{outline, Editor, EditorProfile, Hooks, PlistValue};
use std::io::{self, Read};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "plistedit",
    version,
    about = "Format, convert, query and edit XML property lists"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-serialize a plist (pretty by default)
    Fmt {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Emit everything on one line
        #[arg(long)]
        compact: bool,
    },
    /// Convert a plist to pretty-printed JSON
    ToJson {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Convert JSON to a plist
    FromJson {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        compact: bool,
    },
    /// Print the value at a dotted path as JSON
    Get {
        /// Dotted path, e.g. `installs.0.path` (empty for the root)
        path: String,
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Set the value at a dotted path from a JSON literal
    Set {
        path: String,
        /// JSON literal; text that is not valid JSON is stored as a string
        value: String,
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        compact: bool,
    },
    /// Remove the value at a dotted path
    Rm {
        path: String,
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        compact: bool,
    },
    /// Render the editor view as an indented outline
    Outline {
        #[arg(short, long)]
        input: Option<String>,
        /// Built-in preset name or path to a TOML profile
        #[arg(long)]
        profile: Option<String>,
        /// Known names for a validated key, e.g. `catalogs=testing,production`
        #[arg(long, value_name = "KEY=NAMES")]
        allow: Vec<String>,
    },
    /// List profile template keys the top-level dict does not use yet
    SuggestKeys {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long, default_value = "pkginfo")]
        profile: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Fmt {
            input,
            output,
            compact,
        } => {
            let tree = read_plist(input.as_deref())?;
            write_plist(output.as_deref(), &tree, compact)?;
        }
        Commands::ToJson { input, output } => {
            let tree = read_plist(input.as_deref())?;
            let json = serde_json::to_string_pretty(&tree.to_json())?;
            write_output(output.as_deref(), &format!("{json}\n"))?;
        }
        Commands::FromJson {
            input,
            output,
            compact,
        } => {
            let text = read_input(input.as_deref())?;
            let json: serde_json::Value =
                serde_json::from_str(&text).context("Failed to parse JSON input")?;
            write_plist(output.as_deref(), &PlistValue::from(json), compact)?;
        }
        Commands::Get { path, input } => {
            let tree = read_plist(input.as_deref())?;
            let target = Path::parse(&path);
            let Some(value) = path::read(&tree, &target) else {
                bail!("No value at path '{}'", target);
            };
            let json = serde_json::to_string_pretty(&value.to_json())?;
            println!("{json}");
        }
        Commands::Set {
            path,
            value,
            input,
            output,
            compact,
        } => {
            let mut tree = read_plist(input.as_deref())?;
            let target = Path::parse(&path);
            set_value(&mut tree, &target, literal(&value))
                .with_context(|| format!("Failed to set '{}'", target))?;
            write_plist(output.as_deref(), &tree, compact)?;
        }
        Commands::Rm {
            path,
            input,
            output,
            compact,
        } => {
            let mut tree = read_plist(input.as_deref())?;
            let target = Path::parse(&path);
            path::remove(&mut tree, &target)
                .with_context(|| format!("Failed to remove '{}'", target))?;
            write_plist(output.as_deref(), &tree, compact)?;
        }
        Commands::Outline {
            input,
            profile,
            allow,
        } => {
            let mut tree = read_plist(input.as_deref())?;
            let mut profile = match profile.as_deref() {
                Some(name) => load_profile(name)?,
                None => EditorProfile::default(),
            };
            for entry in &allow {
                let (key, names) = parse_allow(entry)?;
                profile.allow(key, names);
            }
            let editor = Editor::attach(&mut tree, profile.editor_config(), Hooks::new());
            print!("{}", outline(editor.view()));
        }
        Commands::SuggestKeys { input, profile } => {
            let tree = read_plist(input.as_deref())?;
            let profile = load_profile(&profile)?;
            for key in profile.suggest_keys(&tree) {
                println!("{key}");
            }
        }
    }

    Ok(())
}

/// A JSON literal, or the raw text as a string when it is not JSON.
fn literal(text: &str) -> PlistValue {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => PlistValue::from(json),
        Err(_) => PlistValue::from(text),
    }
}

/// Write `value` at `target`. The root path replaces the whole tree and an
/// index one past the end of an array appends.
fn set_value(tree: &mut PlistValue, target: &Path, value: PlistValue) -> Result<()> {
    let Some(parent) = target.parent() else {
        *tree = value;
        return Ok(());
    };
    let appends = match (target.last(), path::read(tree, &parent)) {
        (Some(Segment::Index(i)), Some(PlistValue::Array(items))) => *i == items.len(),
        _ => false,
    };
    if appends {
        path::append(tree, &parent, value)?;
    } else {
        path::write(tree, target, value)?;
    }
    Ok(())
}

/// A built-in preset by name, otherwise a TOML profile file.
fn load_profile(name: &str) -> Result<EditorProfile> {
    if let Some(profile) = EditorProfile::preset(name) {
        debug!(preset = name, "using built-in profile");
        return Ok(profile);
    }
    if !std::path::Path::new(name).is_file() {
        bail!(
            "Unknown profile: '{}'. Available presets: {}",
            name,
            EditorProfile::preset_names().join(", ")
        );
    }
    let text = std::fs::read_to_string(name)
        .with_context(|| format!("Failed to read profile: {}", name))?;
    EditorProfile::from_toml(&text).with_context(|| format!("Invalid profile: {}", name))
}

/// Split `key=a,b,c` into the key and its trimmed, non-empty names.
fn parse_allow(entry: &str) -> Result<(&str, Vec<String>)> {
    let Some((key, names)) = entry.split_once('=') else {
        bail!("Expected KEY=NAMES for --allow, got '{}'", entry);
    };
    let names = names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    Ok((key.trim(), names))
}

fn read_plist(path: Option<&str>) -> Result<PlistValue> {
    let xml = read_input(path)?;
    let tree = plistedit_core::parse(&xml).context("Failed to parse plist")?;
    info!(kind = %tree.kind(), bytes = xml.len(), "parsed plist");
    Ok(tree)
}

fn write_plist(path: Option<&str>, tree: &PlistValue, compact: bool) -> Result<()> {
    let mut xml = plistedit_core::serialize(tree, !compact);
    if compact {
        xml.push('\n');
    }
    write_output(path, &xml)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
