//! Legacy command-line mail sender.
//!
//! `shellkit-mail -files <path>... -to <address> -subject <text> -body <text>`

use clap::error::ErrorKind;

use shellkit_cli::legacy::{self, EXIT_OK, EXIT_USAGE};
use shellkit_cli::logging;

fn main() {
    let args = match legacy::parse(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_OK,
                _ => EXIT_USAGE,
            };
            std::process::exit(code);
        }
    };

    logging::init(args.verbose);
    let strict = args.strict;
    let outcome = shellkit_core::mail::send_mail(&args.into_message());
    if let Err(e) = &outcome {
        eprintln!("shellkit-mail: {e}");
    }
    std::process::exit(legacy::exit_code(&outcome, strict));
}
