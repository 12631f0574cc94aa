//! Configuration check.
//!
//! `masthead check` - Report the effective environment and where every team
//! secret comes from. Fails in production when a built-in default is live or
//! two roles share a secret pair.

use super::Outcome;
use masthead_core::config::{ResolvedTeam, SecretSource};
use masthead_core::MastheadConfig;
use std::io::Write;

pub fn run<W: Write>(
    config: &MastheadConfig,
    team: &ResolvedTeam,
    out: &mut W,
) -> anyhow::Result<Outcome> {
    writeln!(out, "Environment: {}", config.environment)?;
    writeln!(out)?;
    writeln!(out, "Team secrets:")?;
    for report in &team.sources {
        let mark = match report.source {
            SecretSource::Default => "⚠️ ",
            _ => "✔",
        };
        writeln!(out, "  {mark} {:<16} {}", report.key, report.source)?;
    }

    let duplicates = team.registry.duplicate_pairs();
    if !duplicates.is_empty() {
        writeln!(out)?;
        writeln!(out, "Shared secret pairs (interactive lookup cannot tell these roles apart):")?;
        for (first, second) in &duplicates {
            writeln!(out, "  ✖ {first} and {second}")?;
        }
    }

    let uses_defaults = team.uses_defaults();
    writeln!(out)?;
    if config.environment.is_development() {
        writeln!(out, "✔ Development environment; built-in defaults are allowed.")?;
        return Ok(Outcome::Success);
    }

    if uses_defaults || !duplicates.is_empty() {
        if uses_defaults {
            writeln!(out, "✖ Production is using built-in secrets. Set every variable marked above.")?;
        }
        if !duplicates.is_empty() {
            writeln!(out, "✖ Production requires a distinct secret pair per role.")?;
        }
        return Ok(Outcome::Failure);
    }

    writeln!(out, "✔ Configuration is ready for production.")?;
    Ok(Outcome::Success)
}
