use super::args::*;

pub mod extract;
pub mod inspect;
pub mod mount;
pub mod pack;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Pack(args) => pack::run(args),
        Command::Inspect(args) => inspect::run(args),
        Command::Extract(args) => extract::run(args),
        Command::Mount(args) => mount::run(args),
    }
}
