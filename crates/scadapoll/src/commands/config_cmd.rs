//! Config subcommand handlers.

use std::str::FromStr;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            apply_setting(profile, &key, &value)?;

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: scadapoll config set url <URL>");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}

/// Set one profile key from its string form. `pattern` and `items` are
/// exclusive, so setting one clears the other.
fn apply_setting(profile: &mut Profile, key: &str, value: &str) -> Result<(), CliError> {
    match key {
        "url" => {
            scadapoll_core::parse_base_url(value)?;
            profile.url = Some(value.into());
        }
        "pattern" => {
            profile.pattern = Some(value.into());
            profile.items.clear();
        }
        "items" => {
            profile.items = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            profile.pattern = None;
        }
        "interval_ms" | "interval-ms" | "interval" => {
            profile.interval_ms = Some(parse_field("interval_ms", value)?);
        }
        "timeout" => profile.timeout = Some(parse_field("timeout", value)?),
        "debug" => profile.debug = Some(parse_field("debug", value)?),
        "insecure" => profile.insecure = Some(parse_field("insecure", value)?),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        _ => {
            return Err(CliError::Validation {
                field: key.into(),
                reason: "unknown config key. Valid keys: url, pattern, items, interval_ms, \
                         timeout, debug, insecure, ca_cert"
                    .into(),
            });
        }
    }
    Ok(())
}

fn parse_field<T>(field: &str, value: &str) -> Result<T, CliError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| CliError::Validation {
        field: field.into(),
        reason: e.to_string(),
    })
}
