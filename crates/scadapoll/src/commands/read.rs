//! `read`: one poll, printed.

use scadapoll_core::Client;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let items = client.read_once().await?;
    let out = output::render_items(&global.output, &items, output::should_color(&global.color))?;
    output::print_output(&out, global.quiet);
    Ok(())
}
