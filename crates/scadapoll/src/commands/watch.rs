//! `watch`: keep polling and print the items after every tick.

use tokio::sync::mpsc;
use tracing::debug;

use scadapoll_core::{Client, Item};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

type Tick = Result<Vec<Item>, String>;

pub async fn handle(client: &Client, args: &WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Tick>();
    client.on(move |result| {
        let tick = result.map(<[Item]>::to_vec).map_err(ToString::to_string);
        let _ = tx.send(tick);
    })?;

    let color = output::should_color(&global.color);
    let mut previous: Option<Vec<Item>> = None;
    let mut printed = 0_usize;

    loop {
        let tick = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            tick = rx.recv() => tick,
        };
        // Channel closes once a one-shot chain has delivered.
        let Some(tick) = tick else { break };

        match tick {
            Ok(items) => {
                if args.changes && previous.as_ref() == Some(&items) {
                    continue;
                }
                let out = output::render_items(&global.output, &items, color)?;
                output::print_output(&out, global.quiet);
                previous = Some(items);
            }
            Err(message) => eprintln!("poll failed: {message}"),
        }

        printed += 1;
        if args.count.is_some_and(|n| printed >= n) {
            break;
        }
    }

    client.off();
    Ok(())
}
