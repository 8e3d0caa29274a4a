//! Command dispatch: bridges CLI args -> core client -> output formatting.

pub mod config_cmd;
pub mod read;
pub mod set;
pub mod watch;

use scadapoll_core::Client;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an endpoint-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Watch(args) => watch::handle(client, &args, global).await,
        Command::Read => read::handle(client, global).await,
        Command::Set(args) => set::handle(client, args, global).await,
        // Config is handled before dispatch
        Command::Config(_) => unreachable!(),
    }
}
