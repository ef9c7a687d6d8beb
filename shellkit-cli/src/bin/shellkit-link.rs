//! Standalone CLI tool for creating and managing shortcuts.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use shellkit_cli::logging;
use shellkit_core::folders::{system_folder_path, SystemFolder};
use shellkit_core::links;
use shellkit_core::shortcut::{create_shortcut, ShortcutRequest};

#[derive(Parser)]
#[command(name = "shellkit-link", about = "Create shell shortcuts and resolve shell folders")]
struct Args {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a shortcut file
    Create {
        /// Path the shortcut launches
        target: String,
        /// Where to write the shortcut
        link: PathBuf,
        /// Command-line arguments for the target
        #[arg(long, allow_hyphen_values = true)]
        arguments: Option<String>,
        /// Description shown by the shell
        #[arg(long)]
        description: Option<String>,
        /// Working directory for the target
        #[arg(long)]
        working_dir: Option<String>,
    },
    /// Create a named shortcut on the desktop
    Desktop {
        name: String,
        target: PathBuf,
    },
    /// Remove a named desktop shortcut
    RemoveDesktop { name: String },
    /// Start an executable minimized at login
    Startup {
        name: String,
        executable: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a startup entry from the user and all-users folders
    RemoveStartup { name: String },
    /// Add a shortcut to the Explorer Links folder, named after the target
    Links { target: PathBuf },
    /// Print the location of a well-known folder (name or CSIDL)
    Folder {
        /// e.g. desktop, startup, app_data, 0x001A
        folder: String,
        /// Default location instead of the current one
        #[arg(long)]
        default: bool,
    },
}

fn parse_folder(s: &str) -> Option<SystemFolder> {
    let id = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => i32::from_str_radix(hex, 16).ok(),
        None => s.parse::<i32>().ok(),
    };
    match id {
        Some(id) => SystemFolder::from_csidl(id),
        None => SystemFolder::from_name(s),
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Create {
            target,
            link,
            arguments,
            description,
            working_dir,
        } => {
            let mut request = ShortcutRequest::new(target, &link);
            request.arguments = arguments;
            request.description = description;
            request.working_directory = working_dir;
            create_shortcut(&request).map_err(|e| e.to_string())?;
            println!("Created {}", link.display());
        }
        Command::Desktop { name, target } => {
            let link = links::create_desktop_shortcut(&name, &target).map_err(|e| e.to_string())?;
            println!("Created {}", link.display());
        }
        Command::RemoveDesktop { name } => {
            if links::remove_desktop_shortcut(&name).map_err(|e| e.to_string())? {
                println!("Removed {name}");
            } else {
                println!("No desktop shortcut named {name}");
            }
        }
        Command::Startup {
            name,
            executable,
            description,
        } => {
            let startup = links::StartupShortcuts::new().map_err(|e| e.to_string())?;
            let link = startup
                .enable(&name, &executable, description.as_deref())
                .map_err(|e| e.to_string())?;
            println!("Created {}", link.display());
        }
        Command::RemoveStartup { name } => {
            let startup = links::StartupShortcuts::new().map_err(|e| e.to_string())?;
            if startup.disable(&name).map_err(|e| e.to_string())? {
                println!("Removed {name}");
            } else {
                println!("No startup entry named {name}");
            }
        }
        Command::Links { target } => {
            match links::create_links_shortcut(&target).map_err(|e| e.to_string())? {
                Some(link) => println!("Created {}", link.display()),
                None => return Err("no Links folder on this host".into()),
            }
        }
        Command::Folder { folder, default } => {
            let id = parse_folder(&folder).ok_or_else(|| format!("unknown folder {folder}"))?;
            let path = system_folder_path(id, default).map_err(|e| e.to_string())?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(e) = run(args.command) {
        eprintln!("shellkit-link: {e}");
        std::process::exit(1);
    }
}
