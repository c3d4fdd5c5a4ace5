use std::env;
use std::path::PathBuf;

use crate::gateway::Action;
use crate::profile::{Preset, ProfileEdit, ProfileKind, coerce_number};

pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub base_url: Option<String>,
    /// Actions to trigger, deduplicated, in first-mentioned order.
    pub actions: Vec<Action>,
    /// Edits applied to the initial snapshot, in command-line order.
    pub edits: Vec<ProfileEdit>,
    pub dispatch_out: Option<PathBuf>,
    pub plan_out: Option<PathBuf>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut base_url = None;
    let mut actions: Vec<Action> = Vec::new();
    let mut edits = Vec::new();
    let mut dispatch_out = None;
    let mut plan_out = None;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--base-url" => {
                i += 1;
                let url = args.next_or_err(i, "missing value for --base-url (expected a URL)")?;
                if base_url.replace(url.to_string()).is_some() {
                    return Err("--base-url provided more than once".to_string());
                }
            }
            "--action" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --action (expected simulate, schedule, breakdown, or all)",
                )?;
                let selected: Vec<Action> = if name == "all" {
                    Action::ALL.to_vec()
                } else {
                    let action = Action::from_name(name).ok_or_else(|| {
                        format!(
                            "invalid value for --action: \"{name}\" (expected simulate, schedule, breakdown, or all)"
                        )
                    })?;
                    vec![action]
                };
                for action in selected {
                    if !actions.contains(&action) {
                        actions.push(action);
                    }
                }
            }
            "--capacity" | "--soc" | "--max-kw" => {
                i += 1;
                let raw = args.next_or_err(i, &format!("missing value for {flag} (expected a number)"))?;
                let value = coerce_number(raw)
                    .ok_or_else(|| format!("{flag} value \"{raw}\" is not a number"))?;
                edits.push(match flag {
                    "--capacity" => ProfileEdit::SetCapacity(value),
                    "--soc" => ProfileEdit::SetSocInitial(value),
                    _ => ProfileEdit::SetMaxKw(value),
                });
            }
            "--dispatch-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --dispatch-out (expected a file path)")?;
                if dispatch_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--dispatch-out provided more than once".to_string());
                }
            }
            "--plan-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --plan-out (expected a file path)")?;
                if plan_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--plan-out provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => match profile_flag(other) {
                Some((kind, is_preset)) => {
                    i += 1;
                    let value = args.next_or_err(i, &format!("missing value for {other}"))?;
                    edits.push(if is_preset {
                        ProfileEdit::ApplyPreset {
                            kind,
                            preset: Preset::from_id(value),
                        }
                    } else {
                        ProfileEdit::SetText {
                            kind,
                            text: value.to_string(),
                        }
                    });
                }
                None => return Err(format!("unknown argument: {other}")),
            },
        }
        i += 1;
    }

    if actions.is_empty() {
        actions = Action::ALL.to_vec();
    }

    Ok(CliOptions {
        config,
        base_url,
        actions,
        edits,
        dispatch_out,
        plan_out,
    })
}

/// Matches `--<kind>` and `--<kind>-preset`; the flag is `true` for presets.
fn profile_flag(flag: &str) -> Option<(ProfileKind, bool)> {
    let name = flag.strip_prefix("--")?;
    let (name, is_preset) = match name.strip_suffix("-preset") {
        Some(base) => (base, true),
        None => (name, false),
    };
    ProfileKind::ALL
        .into_iter()
        .find(|k| k.name() == name)
        .map(|k| (k, is_preset))
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("der-microgrid: DER microgrid dashboard client");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  der-microgrid [--config <path>] [--base-url <url>] [--action <name>]...");
    eprintln!("                [--load <csv> | --load-preset <id>] (also solar, wind, prices)");
    eprintln!("                [--capacity <kWh>] [--soc <0..1>] [--max-kw <kW>]");
    eprintln!("                [--dispatch-out <path>] [--plan-out <path>]");
    eprintln!();
    eprintln!("Actions: simulate, schedule, breakdown, all (default: all)");
    eprintln!("Presets: flat, peak, random; any other id zeroes the profile");
}
