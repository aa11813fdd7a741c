//! Storefront CLI entry point
//!
//! Parses arguments and dispatches via `cli::run`; prints the error and
//! exits non-zero on failure. Configuration, runtime construction and
//! serving all live in the CLI module.

use storefront::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
