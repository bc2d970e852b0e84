use anyhow::Result;
use atp_knee::{cli, logging};
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_quiet = args.quiet;
    logging::init_logging(args.verbose, args.quiet);

    match cli::run(args) {
        Ok(()) => Ok(()),
        Err(e) => {
            if is_quiet {
                eprintln!("{e:#}");
                std::process::exit(1);
            } else {
                Err(e)
            }
        }
    }
}
