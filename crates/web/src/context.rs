//! Request context injected by the upstream gateway.
//!
//! Authentication and membership resolution happen before a request reaches
//! this service. The gateway forwards the verified identity as `X-Actor-Id`
//! and the caller's per-league roles as `X-League-Roles`
//! (`<league_uuid>=<ROLE>` pairs, comma-separated). This extractor only
//! parses that proof; the role checks themselves live in
//! `storage::services::access`.

use std::collections::HashMap;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use storage::services::access::{ActorContext, LeagueRole};
use uuid::Uuid;

use crate::error::WebError;

const ACTOR_HEADER: &str = "x-actor-id";
const ROLES_HEADER: &str = "x-league-roles";

pub struct RequestContext(pub ActorContext);

fn parse_roles(raw: &str) -> Option<HashMap<Uuid, LeagueRole>> {
    let mut roles = HashMap::new();
    for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (league, role) = pair.split_once('=')?;
        let league = Uuid::parse_str(league.trim()).ok()?;
        let role = LeagueRole::parse(role.trim())?;
        roles.insert(league, role);
    }
    Some(roles)
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or_else(|| WebError::Unauthorized {
                message: "Missing or invalid actor identity".to_string(),
            })?;

        let roles = match parts.headers.get(ROLES_HEADER) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(parse_roles)
                .ok_or_else(|| WebError::Unauthorized {
                    message: "Malformed league roles".to_string(),
                })?,
            None => HashMap::new(),
        };

        Ok(Self(ActorContext::new(actor_id, roles)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_role_pairs() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!("{a}=STEWARD, {b}=OWNER");
        let roles = parse_roles(&raw).expect("valid header");
        assert_eq!(roles[&a], LeagueRole::Steward);
        assert_eq!(roles[&b], LeagueRole::Owner);
    }

    #[test]
    fn empty_header_means_no_memberships() {
        assert_eq!(parse_roles("").expect("empty is valid"), HashMap::new());
    }

    #[test]
    fn unknown_roles_are_rejected() {
        let raw = format!("{}=SUPERUSER", Uuid::new_v4());
        assert!(parse_roles(&raw).is_none());
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        assert!(parse_roles("not-a-uuid=OWNER").is_none());
        assert!(parse_roles("no-separator").is_none());
    }
}
