//! Blocklist resolution and the `retell blocklist` command.

use super::BlocklistArgs;
use retell::{Blocklist, RetellConfig, RetellResult};

/// The blocklist selected by configuration and command-line flags.
///
/// `--no-default-blocklist` drops the built-in vocabulary; `--blocklist`
/// replaces any file named in the configuration.
pub fn effective_blocklist(args: &BlocklistArgs, config: &RetellConfig) -> RetellResult<Blocklist> {
    let mut config = config.clone();
    if args.no_default_blocklist {
        config.blocklist.use_default = false;
    }
    if let Some(file) = &args.file {
        config.blocklist.file = Some(file.clone());
    }
    config.blocklist()
}

/// Print the effective blocklist, one term per line.
pub fn print_blocklist(args: &BlocklistArgs, config: &RetellConfig) -> RetellResult<()> {
    let blocklist = effective_blocklist(args, config)?;
    tracing::debug!(terms = blocklist.len(), "Printing blocklist");
    for term in blocklist.iter() {
        println!("{}", term);
    }
    Ok(())
}
