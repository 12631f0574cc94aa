//! Token commands.
//!
//! `masthead token [ROLE]` - Print the daily admin token.
//! `masthead token --verify` - Cross-check against a running development server.

use super::Outcome;
use masthead_core::api::{DebugTokenResponse, ErrorBody};
use masthead_core::Role;
use masthead_token::{DayStamp, TokenEngine};
use std::io::Write;
use std::time::Duration;

/// Server used for cross-checks when `--server` is not given.
pub const DEFAULT_SERVER: &str = "http://localhost:3000";

const CROSS_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Arguments of `masthead token`.
#[derive(Debug, Clone)]
pub struct TokenArgs {
    pub role: Option<String>,
    pub verify: bool,
    pub server: String,
    pub date: Option<String>,
}

/// Print tokens and optionally cross-check them.
///
/// A failed cross-check is reported but does not fail the command.
pub async fn run<W: Write>(
    engine: &TokenEngine,
    args: &TokenArgs,
    out: &mut W,
) -> anyhow::Result<Outcome> {
    let role = match args.role.as_deref() {
        Some(name) => match name.parse::<Role>() {
            Ok(role) => Some(role),
            Err(_) => {
                writeln!(out, "✖ Unknown role: {name}")?;
                writeln!(out, "  Valid roles: {}", role_list())?;
                return Ok(Outcome::Failure);
            }
        },
        None => None,
    };

    let day = match args.date.as_deref() {
        Some(date) => DayStamp::parse(date)?,
        None => DayStamp::today(),
    };
    let is_today = args.date.is_none();

    writeln!(out, "Admin tokens for {day} (UTC)")?;
    writeln!(out)?;

    match role {
        Some(role) => {
            let token = engine.derive_token(&day, role)?;
            writeln!(out, "  {:<10} {token}", role.as_str())?;
            if is_today {
                writeln!(out)?;
                cross_check_one(&args.server, role, &token, out).await?;
            }
        }
        None => {
            let mut tokens = Vec::new();
            for (role, result) in engine.expected_tokens(&day) {
                match result {
                    Ok(token) => {
                        writeln!(out, "  {:<10} {token}", role.as_str())?;
                        tokens.push((role, token));
                    }
                    Err(err) if err.is_role_local() => {
                        writeln!(out, "  {:<10} (unavailable: {err})", role.as_str())?;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            if args.verify {
                writeln!(out)?;
                cross_check_all(&args.server, &tokens, out).await?;
            }
        }
    }

    Ok(Outcome::Success)
}

fn role_list() -> String {
    Role::ALL
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

async fn cross_check_one<W: Write>(
    server: &str,
    role: Role,
    token: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(out, "Cross-checking with {server} ...")?;
    match fetch_debug(server, token).await {
        Ok(response) => {
            render_debug(&response, out)?;
            writeln!(out)?;
            if response.debug.valid_role == Some(role) {
                writeln!(out, "✔ The server accepts this token as {role}.")?;
            } else {
                writeln!(out, "✖ The server does not accept this token as {role}.")?;
                writeln!(out, "  Compare the ingredients above with your local secrets.")?;
            }
        }
        Err(err) => report_unreachable(&err, out)?,
    }
    Ok(())
}

async fn cross_check_all<W: Write>(
    server: &str,
    tokens: &[(Role, String)],
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(out, "Cross-checking with {server} ...")?;
    for (role, token) in tokens {
        match fetch_debug(server, token).await {
            Ok(response) if response.debug.valid_role == Some(*role) => {
                writeln!(out, "  ✅ {:<10} accepted", role.as_str())?;
            }
            Ok(response) => {
                writeln!(out, "  ❌ {:<10} rejected", role.as_str())?;
                if let Some(expected) = response.debug.expected_tokens.get(role) {
                    writeln!(out, "     server expects {expected}")?;
                }
            }
            Err(err) => {
                // One unreachable server fails every remaining check the same way.
                return report_unreachable(&err, out);
            }
        }
    }
    Ok(())
}

fn report_unreachable<W: Write>(err: &anyhow::Error, out: &mut W) -> anyhow::Result<()> {
    tracing::debug!(error = %err, "cross-check failed");
    writeln!(out, "⚠️  Cross-check failed: {err:#}")?;
    writeln!(
        out,
        "   Make sure the server is running with MASTHEAD_ENV=development."
    )?;
    Ok(())
}

async fn fetch_debug(server: &str, token: &str) -> anyhow::Result<DebugTokenResponse> {
    let url = format!(
        "{}/api/debug/token?token={}",
        server.trim_end_matches('/'),
        urlencoding::encode(token)
    );

    let client = reqwest::Client::builder()
        .timeout(CROSS_CHECK_TIMEOUT)
        .build()?;
    let response = client.get(&url).send().await?;

    let status = response.status();
    if !status.is_success() {
        let reason = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| "no error body".to_string());
        anyhow::bail!("server answered {status}: {reason}");
    }
    Ok(response.json().await?)
}

/// Print the server side of a cross-check.
pub fn render_debug<W: Write>(response: &DebugTokenResponse, out: &mut W) -> anyhow::Result<()> {
    let debug = &response.debug;

    writeln!(out, "Server debug info:")?;
    writeln!(out, "  Received token: {}", debug.received_token)?;
    writeln!(out, "  Server date:    {}", debug.current_date)?;
    writeln!(
        out,
        "  Verdict:        {}",
        if response.result.valid { "valid" } else { "invalid" }
    )?;
    if let Some(role) = response.result.role {
        writeln!(out, "  Role:           {role}")?;
    }

    writeln!(out)?;
    writeln!(out, "Server token ingredients:")?;
    for (role, ingredients) in &debug.token_ingredients {
        writeln!(out, "  {:<10} {ingredients}", role.as_str())?;
    }

    writeln!(out)?;
    writeln!(out, "Server expected tokens:")?;
    for (role, expected) in &debug.expected_tokens {
        let mark = if *expected == debug.received_token {
            "✅"
        } else {
            "❌"
        };
        writeln!(out, "  {mark} {:<10} {expected}", role.as_str())?;
    }
    Ok(())
}
