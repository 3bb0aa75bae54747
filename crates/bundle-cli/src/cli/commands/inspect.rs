use super::super::args::InspectArgs;
use super::super::helpers::{digest, read_bundle};
use crate::exit_codes;
use bundle_core::{compare_keys, Bundle};
use serde_json::{json, Value};

pub fn run(args: InspectArgs) -> anyhow::Result<i32> {
    let (bundle, raw) = read_bundle(&args.bundle, &args.decode)?;
    let digest = digest(&raw);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary(&bundle, &digest))?);
        return Ok(exit_codes::EXIT_SUCCESS);
    }

    println!("Bundle Inspector");
    println!("================");
    println!("Digest:      {digest}");
    println!("Version:     {}", bundle.version());
    println!("ID:          {}", bundle.id().unwrap_or("-"));
    println!("Main:        {}", bundle.main().unwrap_or("-"));
    println!("Imports:     {}", bundle.imports().len());
    println!("Resolutions: {}", bundle.resolutions().len());
    println!("Files:       {}", bundle.len());
    println!();
    println!("{:<6} {:>10}  {:<5} PATH", "MODE", "SIZE", "TAGS");

    for path in sorted_keys(&bundle) {
        println!(
            "{:<6} {:>10}  {:<5} {}",
            format!("{:o}", bundle.mode(path)),
            bundle.size(path),
            tags(&bundle, path),
            path
        );
    }

    Ok(exit_codes::EXIT_SUCCESS)
}

fn sorted_keys(bundle: &Bundle) -> Vec<&str> {
    let mut keys: Vec<&str> = bundle.keys().collect();
    keys.sort_by(|a, b| compare_keys(a, b));
    keys
}

/// `m` main, `a` addon, `s` asset.
fn tags(bundle: &Bundle, path: &str) -> String {
    let mut tags = String::new();
    if bundle.main() == Some(path) {
        tags.push('m');
    }
    if bundle.addons().iter().any(|p| p == path) {
        tags.push('a');
    }
    if bundle.assets().iter().any(|p| p == path) {
        tags.push('s');
    }
    if tags.is_empty() {
        tags.push('-');
    }
    tags
}

fn summary(bundle: &Bundle, digest: &str) -> Value {
    let files: Vec<Value> = sorted_keys(bundle)
        .into_iter()
        .map(|path| {
            json!({
                "path": path,
                "size": bundle.size(path),
                "mode": bundle.mode(path),
            })
        })
        .collect();

    json!({
        "digest": digest,
        "version": bundle.version(),
        "id": bundle.id(),
        "main": bundle.main(),
        "imports": bundle.imports(),
        "resolutions": bundle.resolutions(),
        "addons": bundle.addons(),
        "assets": bundle.assets(),
        "files": files,
    })
}
