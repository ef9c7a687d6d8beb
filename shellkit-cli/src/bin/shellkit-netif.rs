//! Standalone CLI tool listing local interface addresses and masks.

use clap::Parser;

use shellkit_cli::logging;

#[derive(Parser)]
#[command(name = "shellkit-netif", about = "List local IPv4 addresses with their subnet masks")]
struct Args {
    /// Print a JSON array instead of one `address mask` pair per line
    #[arg(long)]
    json: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    let interfaces = shellkit_core::netif::list_interfaces();

    if args.json {
        match serde_json::to_string_pretty(&interfaces) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("shellkit-netif: JSON serialization failed: {e}");
                std::process::exit(1);
            }
        }
    } else {
        for entry in &interfaces {
            println!("{} {}", entry.address, entry.mask);
        }
    }
}
