//! Behavioural properties of daily tokens.

use masthead_core::{ProjectSecret, Role, RoleIdentity, TeamRegistry};
use masthead_token::{DayStamp, TokenEngine, TOKEN_LEN};

const VECTOR_DAY: &str = "20250101";
const VECTOR_TOKEN: &str = "f9f7c244-f193-fcee";

fn engine() -> TokenEngine {
    TokenEngine::sha256(TeamRegistry::development_defaults())
}

fn day(value: &str) -> DayStamp {
    DayStamp::parse(value).unwrap()
}

fn is_token_shaped(token: &str) -> bool {
    let groups: Vec<&str> = token.split('-').collect();
    token.len() == TOKEN_LEN
        && groups.len() == 3
        && groups[0].len() == 8
        && groups[1].len() == 4
        && groups[2].len() == 4
        && groups
            .iter()
            .all(|g| g.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')))
}

#[test]
fn concrete_vector_is_reproduced() {
    let token = engine().derive_token(&day(VECTOR_DAY), Role::Developer).unwrap();
    assert_eq!(token, VECTOR_TOKEN);
}

#[test]
fn derivation_is_deterministic() {
    let engine = engine();
    for role in Role::ALL {
        let first = engine.derive_token(&day(VECTOR_DAY), role).unwrap();
        let second = engine.derive_token(&day(VECTOR_DAY), role).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn roles_receive_distinct_tokens() {
    let engine = engine();
    let tokens: Vec<String> = Role::ALL
        .into_iter()
        .map(|role| engine.derive_token(&day(VECTOR_DAY), role).unwrap())
        .collect();
    for (i, a) in tokens.iter().enumerate() {
        for b in &tokens[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn days_receive_distinct_tokens() {
    let engine = engine();
    let jan_1 = engine.derive_token(&day("20250101"), Role::Developer).unwrap();
    let jan_2 = engine.derive_token(&day("20250102"), Role::Developer).unwrap();
    let next_year = engine.derive_token(&day("20260101"), Role::Developer).unwrap();
    assert_eq!(jan_2, "7eb218a9-2f5d-fa11");
    assert_ne!(jan_1, jan_2);
    assert_ne!(jan_1, next_year);
}

#[test]
fn every_token_has_the_presented_shape() {
    let engine = engine();
    for date in ["20000101", "20250101", "20991231"] {
        for role in Role::ALL {
            let token = engine.derive_token(&day(date), role).unwrap();
            assert!(is_token_shaped(&token), "{token} is not token shaped");
        }
    }
}

#[test]
fn todays_tokens_resolve_to_their_roles() {
    let engine = engine();
    for role in Role::ALL {
        let token = engine.today_token(role).unwrap();
        let resolved = engine.resolve_role(&token).unwrap();
        assert_eq!(resolved, Some(role));
    }
}

#[test]
fn tokens_from_another_day_are_rejected() {
    let engine = engine();
    let today = DayStamp::today();
    let stale = engine.derive_token(&day("19991231"), Role::Developer).unwrap();
    assert_eq!(engine.resolve_role_on(&today, &stale).unwrap(), None);
}

#[test]
fn garbage_never_resolves() {
    let engine = engine();
    let today = DayStamp::today();
    let near_miss = {
        let mut token = engine.derive_token(&today, Role::Pm).unwrap();
        token.pop();
        token.push('g');
        token
    };
    let upper = engine.derive_token(&today, Role::Pm).unwrap().to_uppercase();
    for garbage in [
        "",
        " ",
        "not-a-token",
        "00000000-0000-0000",
        "f9f7c244f193fcee",
        "\u{0}\u{1}",
        "😀😀😀",
        near_miss.as_str(),
        upper.as_str(),
    ] {
        assert_eq!(engine.resolve_role_on(&today, garbage).unwrap(), None, "{garbage:?}");
    }
}

#[test]
fn rotating_the_project_secret_changes_every_token() {
    let before = engine();
    let after = TokenEngine::sha256(
        TeamRegistry::development_defaults().with_project_secret(ProjectSecret::new("rotated")),
    );
    for role in Role::ALL {
        let old = before.derive_token(&day(VECTOR_DAY), role).unwrap();
        let new = after.derive_token(&day(VECTOR_DAY), role).unwrap();
        assert_ne!(old, new, "{role} token survived secret rotation");
        assert_eq!(after.resolve_role_on(&day(VECTOR_DAY), &old).unwrap(), None);
    }
}

#[test]
fn changing_one_identity_only_changes_that_role() {
    let before = engine();
    let after = TokenEngine::sha256(
        TeamRegistry::development_defaults()
            .with_member(Role::Marketing, RoleIdentity::new("19991111", "01099998888")),
    );
    let d = day(VECTOR_DAY);
    for role in Role::ALL {
        let changed = before.derive_token(&d, role).unwrap() != after.derive_token(&d, role).unwrap();
        assert_eq!(changed, role == Role::Marketing);
    }
}
