use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
pub mod exit_codes;

use cli::args::Cli;
use cli::commands::dispatch;

fn main() {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::new("info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}

/// Invalid input bundles get their own exit code; everything else is a
/// usage, config or I/O failure.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    let invalid = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<bundle_core::BundleError>())
        .any(|e| {
            matches!(
                e.code(),
                bundle_core::ErrorCode::InvalidBundleHeader | bundle_core::ErrorCode::LimitExceeded
            )
        });

    if invalid {
        exit_codes::EXIT_INVALID_BUNDLE
    } else {
        exit_codes::EXIT_CONFIG_ERROR
    }
}
