//! Argument handling for the legacy mail sender.
//!
//! The historical tool takes single-dash long flags (`-files a b -to x`).
//! They are rewritten to clap's `--` form before parsing, so both spellings
//! work.  Exit codes follow the historical contract: `1` for missing
//! arguments, `0` otherwise unless `--strict` is given.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use shellkit_core::errors::MailError;
use shellkit_core::mail::MailMessage;

/// Flags accepted with a single leading dash.
const LEGACY_FLAGS: [&str; 4] = ["-files", "-body", "-to", "-subject"];

/// Flags taking exactly one value; the token after them is never a flag.
const SINGLE_VALUE_FLAGS: [&str; 6] = ["-body", "-to", "-subject", "--body", "--to", "--subject"];

pub const EXIT_OK: i32 = 0;
pub const EXIT_USAGE: i32 = 1;
pub const EXIT_SEND_FAILED: i32 = 2;

#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "shellkit-mail", about = "Open the default mail client with a prepared message")]
pub struct MailArgs {
    /// Files to attach
    #[arg(long, num_args = 1.., value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Message body
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub body: String,

    /// Recipient address
    #[arg(long, allow_hyphen_values = true)]
    pub to: String,

    /// Message subject
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub subject: String,

    /// Exit with a nonzero status when the mail client reports a failure
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl MailArgs {
    pub fn into_message(self) -> MailMessage {
        MailMessage {
            files: self.files,
            to: self.to,
            subject: self.subject,
            body: self.body,
        }
    }
}

/// Rewrite `-files`-style flags to `--files`.  The program name and the
/// value of a single-value flag (`-subject -to`) are kept verbatim.
pub fn normalize<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut value_next = false;
    for (i, arg) in args.into_iter().map(Into::into).enumerate() {
        let flag_position = i > 0 && !value_next;
        value_next = flag_position && SINGLE_VALUE_FLAGS.iter().any(|f| arg == **f);
        if flag_position && LEGACY_FLAGS.iter().any(|f| arg == **f) {
            let mut long = OsString::from("-");
            long.push(&arg);
            out.push(long);
        } else {
            out.push(arg);
        }
    }
    out
}

pub fn parse<I, T>(args: I) -> Result<MailArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    MailArgs::try_parse_from(normalize(args))
}

/// Process exit status for a dispatch outcome.
pub fn exit_code(outcome: &Result<(), MailError>, strict: bool) -> i32 {
    match outcome {
        Err(_) if strict => EXIT_SEND_FAILED,
        _ => EXIT_OK,
    }
}
