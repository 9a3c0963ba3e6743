//! Text commands typed at the `play` prompt.

use uuid::Uuid;

use crate::garden::{GameState, PlotId, SeedKind};
use crate::simulation::Command;

/// One parsed line of player input.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Game(Command),
    Status,
    Help,
    Save,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown command '{0}' (type `help`)")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a plot number")]
    BadPlot(String),
    #[error("no {kind} matches '{prefix}'")]
    NoMatch { kind: &'static str, prefix: String },
    #[error("'{prefix}' matches more than one {kind}; type more of the id")]
    Ambiguous { kind: &'static str, prefix: String },
    #[error("no seed selected; pass a seed id or `select` one first")]
    NothingSelected,
    #[error("unknown seed kind '{0}' (mystery, dominant, recessive)")]
    BadKind(String),
}

pub const HELP: &str = "\
Commands:
  select <seed>            select or deselect a seed
  place <plot> [seed]      plant a seed (defaults to the selected one)
  cross <plot>             cross the two parents in a plot
  harvest <plot>           collect ripe offspring
  unlock <plot>            buy a locked plot
  buy <mystery|dominant|recessive>   buy a seed packet
  identify <seed>          reveal a seed's genotype
  serve <customer> [seed]  hand a seed to a customer
  next / skip              advance or close the tutorial
  pause / resume
  status   save   reset   help   quit
Ids can be shortened to any unique prefix.";

/// Parse one line. Blank lines give `Ok(None)`.
pub fn parse_line(line: &str, state: &GameState) -> Result<Option<Input>, InputError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let arg = |i: usize, usage: &'static str| args.get(i).copied().ok_or(InputError::Usage(usage));

    let input = match verb.to_ascii_lowercase().as_str() {
        "status" | "s" | "ls" => Input::Status,
        "help" | "h" | "?" => Input::Help,
        "save" => Input::Save,
        "quit" | "exit" | "q" => Input::Quit,
        "next" => Input::Game(Command::AdvanceTutorial),
        "skip" => Input::Game(Command::SkipTutorial),
        "pause" => Input::Game(Command::SetPaused { paused: true }),
        "resume" | "unpause" => Input::Game(Command::SetPaused { paused: false }),
        "reset" => Input::Game(Command::Reset),
        "select" => {
            let seed = resolve_seed(state, arg(0, "select <seed>")?)?;
            Input::Game(Command::SelectSeed { seed })
        }
        "place" | "plant" => {
            const USAGE: &str = "place <plot> [seed]";
            let plot = parse_plot(arg(0, USAGE)?)?;
            let seed = match args.get(1) {
                Some(prefix) => resolve_seed(state, prefix)?,
                None => state.selected_seed_id.ok_or(InputError::NothingSelected)?,
            };
            Input::Game(Command::PlaceSeed { plot, seed })
        }
        "cross" => Input::Game(Command::Cross {
            plot: parse_plot(arg(0, "cross <plot>")?)?,
        }),
        "harvest" => Input::Game(Command::Harvest {
            plot: parse_plot(arg(0, "harvest <plot>")?)?,
        }),
        "unlock" => Input::Game(Command::UnlockPlot {
            plot: parse_plot(arg(0, "unlock <plot>")?)?,
        }),
        "buy" => {
            let name = arg(0, "buy <mystery|dominant|recessive>")?;
            Input::Game(Command::BuySeed {
                kind: parse_kind(name)?,
            })
        }
        "identify" | "id" => {
            let seed = resolve_seed(state, arg(0, "identify <seed>")?)?;
            Input::Game(Command::IdentifySeed { seed })
        }
        "serve" => {
            const USAGE: &str = "serve <customer> [seed]";
            let customer = resolve(
                "customer",
                arg(0, USAGE)?,
                state.customers.iter().map(|c| c.id),
            )?;
            let seed = match args.get(1) {
                Some(prefix) => resolve_seed(state, prefix)?,
                None => state.selected_seed_id.ok_or(InputError::NothingSelected)?,
            };
            Input::Game(Command::ServeCustomer { customer, seed })
        }
        other => return Err(InputError::UnknownCommand(other.to_string())),
    };
    Ok(Some(input))
}

fn parse_plot(word: &str) -> Result<PlotId, InputError> {
    word.parse().map_err(|_| InputError::BadPlot(word.to_string()))
}

fn parse_kind(word: &str) -> Result<SeedKind, InputError> {
    match word.to_ascii_lowercase().as_str() {
        "dominant" => Ok(SeedKind::PureDominant),
        "recessive" | "tester" => Ok(SeedKind::PureRecessive),
        other => SeedKind::from_name(other).ok_or_else(|| InputError::BadKind(word.to_string())),
    }
}

fn resolve_seed(state: &GameState, prefix: &str) -> Result<Uuid, InputError> {
    resolve("seed", prefix, state.inventory.iter().map(|s| s.id))
}

/// Find the single id whose hex form starts with `prefix`.
fn resolve(
    kind: &'static str,
    prefix: &str,
    ids: impl Iterator<Item = Uuid>,
) -> Result<Uuid, InputError> {
    let needle = prefix.to_ascii_lowercase().replace('-', "");
    let mut matches = ids.filter(|id| id.simple().to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (None, _) => Err(InputError::NoMatch {
            kind,
            prefix: prefix.to_string(),
        }),
        (Some(_), Some(_)) => Err(InputError::Ambiguous {
            kind,
            prefix: prefix.to_string(),
        }),
    }
}
