use super::super::args::MountArgs;
use super::super::helpers::{read_bundle, write_bundle};
use crate::exit_codes;
use anyhow::Context;
use bundle_core::MountOptions;

pub fn run(args: MountArgs) -> anyhow::Result<i32> {
    let (bundle, _) = read_bundle(&args.bundle, &args.decode)?;

    let options = args
        .conditions
        .iter()
        .cloned()
        .fold(MountOptions::new(), |options, (name, root)| {
            options.with_condition(name, root)
        });

    let mounted = bundle
        .mount(&args.root, &options)
        .with_context(|| format!("failed to mount against {}", args.root))?;

    let written = write_bundle(&mounted, &args.out, &args.encode)?;
    eprintln!(
        "Mounted {} files at {} ({} bytes) into {}",
        mounted.len(),
        args.root,
        written,
        args.out.display()
    );
    Ok(exit_codes::EXIT_SUCCESS)
}
