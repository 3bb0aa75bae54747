use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

#[derive(Parser)]
#[command(
    name = "bundle",
    version,
    about = "Pack, inspect, extract and mount single-file program bundles"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Pack every regular file below a directory into a bundle
    Pack(PackArgs),
    /// Show a bundle's metadata and file table
    Inspect(InspectArgs),
    /// Write a bundle's files below a directory
    Extract(ExtractArgs),
    /// Rewrite a bundle's paths against a deployment root
    Mount(MountArgs),
}

#[derive(Debug, Args, Clone)]
pub struct PackArgs {
    /// Directory to pack; files are keyed as /relative/path
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Output bundle path
    #[arg(long, short = 'o')]
    pub out: PathBuf,

    /// Entry point, e.g. /index.js
    #[arg(long)]
    pub main: Option<String>,

    /// Bundle identifier
    #[arg(long)]
    pub id: Option<String>,

    /// Tag a file as an asset (repeatable)
    #[arg(long = "asset", value_name = "PATH")]
    pub assets: Vec<String>,

    /// Tag a file as a native addon (repeatable)
    #[arg(long = "addon", value_name = "PATH")]
    pub addons: Vec<String>,

    /// JSON file holding the bundle's import map
    #[arg(long, value_name = "FILE")]
    pub imports: Option<PathBuf>,

    #[command(flatten)]
    pub encode: EncodeArgs,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    #[arg(value_name = "BUNDLE")]
    pub bundle: PathBuf,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub decode: DecodeArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ExtractArgs {
    #[arg(value_name = "BUNDLE")]
    pub bundle: PathBuf,

    /// Target directory (created if missing)
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    #[command(flatten)]
    pub decode: DecodeArgs,
}

#[derive(Debug, Args, Clone)]
pub struct MountArgs {
    #[arg(value_name = "BUNDLE")]
    pub bundle: PathBuf,

    /// Root URL paths are resolved against, e.g. file:///srv/app/
    #[arg(long)]
    pub root: Url,

    /// Root override for a named condition, e.g. asset=file:///srv/assets/
    #[arg(long = "condition", value_name = "NAME=URL", value_parser = parse_condition)]
    pub conditions: Vec<(String, Url)>,

    /// Output bundle path
    #[arg(long, short = 'o')]
    pub out: PathBuf,

    #[command(flatten)]
    pub decode: DecodeArgs,

    #[command(flatten)]
    pub encode: EncodeArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DecodeArgs {
    /// JSON file overriding decode limits (max_header_bytes, max_files, max_tree_depth)
    #[arg(long, value_name = "FILE")]
    pub limits: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct EncodeArgs {
    /// Indentation of the header JSON; 0 writes it compact
    #[arg(long, env = "BUNDLE_INDENT", default_value_t = 0)]
    pub indent: usize,
}

fn parse_condition(s: &str) -> Result<(String, Url), String> {
    let (name, root) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=URL, got '{s}'"))?;
    if name.is_empty() {
        return Err(format!("condition name is empty in '{s}'"));
    }
    let root = Url::parse(root).map_err(|e| format!("invalid URL '{root}': {e}"))?;
    Ok((name.to_string(), root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_condition() {
        let (name, root) = parse_condition("asset=file:///assets/").unwrap();
        assert_eq!(name, "asset");
        assert_eq!(root.as_str(), "file:///assets/");

        assert!(parse_condition("asset").is_err());
        assert!(parse_condition("=file:///x/").is_err());
        assert!(parse_condition("asset=not a url").is_err());
    }

    #[test]
    fn test_cli_parses_mount() {
        let cli = Cli::try_parse_from([
            "bundle",
            "mount",
            "app.bundle",
            "--root",
            "file:///dir/",
            "--condition",
            "asset=file:///assets/",
            "-o",
            "out.bundle",
        ])
        .unwrap();

        let Command::Mount(args) = cli.cmd else {
            panic!("expected mount");
        };
        assert_eq!(args.conditions.len(), 1);
        assert_eq!(args.encode.indent, 0);
    }
}
