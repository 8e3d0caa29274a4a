//! `set`: write one or more `NAME=VALUE` assignments as a single batch.

use scadapoll_core::{Client, ItemValue, WriteBatch, WritePair};

use crate::cli::{GlobalOpts, SetArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &Client, args: SetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let batch = args
        .assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<WriteBatch, _>>()?;
    let submitted = batch.len();

    let result = client.set(batch).await?;
    let out = output::render_write_result(&global.output, &result)?;
    output::print_output(&out, global.quiet);

    if result.is_complete() {
        return Ok(());
    }
    let details = result
        .errors
        .iter()
        .map(|e| format!("{}: error code {}", e.item_name, e.code))
        .collect::<Vec<_>>()
        .join("\n");
    Err(CliError::WriteRejected {
        submitted,
        failed: result.errors.len(),
        details,
    })
}

fn parse_assignment(input: &str) -> Result<WritePair, CliError> {
    let Some((name, value)) = input.split_once('=') else {
        return Err(CliError::Validation {
            field: input.into(),
            reason: "expected NAME=VALUE".into(),
        });
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::Validation {
            field: input.into(),
            reason: "item name is empty".into(),
        });
    }
    let value = match value {
        "null" => ItemValue::Null,
        other => ItemValue::infer(other),
    };
    Ok(WritePair::new(name, value))
}
