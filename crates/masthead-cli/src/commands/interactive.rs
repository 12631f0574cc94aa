//! Interactive token lookup.
//!
//! `masthead interactive` - Prompt for a birth date and phone number, find the
//! matching role and print today's token.

use super::Outcome;
use masthead_core::Role;
use masthead_token::{DayStamp, TokenEngine};
use std::io::{BufRead, Write};

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    AwaitingBirthDate,
    AwaitingPhone { birth_date: String },
    RoleFound(Role),
    RoleNotFound,
    AwaitingExit(Outcome),
}

/// `^\d{8}$`
pub fn validate_birth_date(value: &str) -> bool {
    value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())
}

/// `^\d{10,11}$`
pub fn validate_phone(value: &str) -> bool {
    (10..=11).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

/// Run one interactive session.
pub fn run<R: BufRead, W: Write>(
    engine: &TokenEngine,
    mut input: R,
    mut out: W,
) -> anyhow::Result<Outcome> {
    let day = DayStamp::today();

    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "Masthead admin token lookup")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out)?;
    writeln!(out, "Today (UTC): {day}")?;
    writeln!(out)?;

    let mut step = Step::AwaitingBirthDate;
    loop {
        step = match step {
            Step::AwaitingBirthDate => {
                let birth_date = prompt(&mut input, &mut out, "Birth date (YYYYMMDD): ")?;
                if validate_birth_date(&birth_date) {
                    Step::AwaitingPhone { birth_date }
                } else {
                    writeln!(out)?;
                    writeln!(out, "✖ Birth date must be 8 digits, e.g. 20020317.")?;
                    Step::AwaitingExit(Outcome::Failure)
                }
            }
            Step::AwaitingPhone { birth_date } => {
                let phone = prompt(&mut input, &mut out, "Phone number: ")?;
                if !validate_phone(&phone) {
                    writeln!(out)?;
                    writeln!(out, "✖ Phone number must be 10 or 11 digits, e.g. 01092034239.")?;
                    Step::AwaitingExit(Outcome::Failure)
                } else {
                    match engine.registry().find_role(&birth_date, &phone) {
                        Some(role) => Step::RoleFound(role),
                        None => Step::RoleNotFound,
                    }
                }
            }
            Step::RoleFound(role) => {
                let token = engine.derive_token(&day, role)?;
                writeln!(out)?;
                writeln!(out, "✔ Role: {role}")?;
                writeln!(out)?;
                writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
                writeln!(out, "   {token}")?;
                writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
                writeln!(out)?;
                writeln!(out, "This token is valid until UTC midnight. Do not share it.")?;
                Step::AwaitingExit(Outcome::Success)
            }
            Step::RoleNotFound => {
                writeln!(out)?;
                writeln!(out, "✖ Not a registered team member.")?;
                writeln!(out, "  Ask an administrator to check your details.")?;
                Step::AwaitingExit(Outcome::Success)
            }
            Step::AwaitingExit(outcome) => {
                writeln!(out)?;
                prompt(&mut input, &mut out, "Press Enter to exit...")?;
                return Ok(outcome);
            }
        };
    }
}

/// Print `label` and read one trimmed line. End of input reads as empty.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> anyhow::Result<String> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
