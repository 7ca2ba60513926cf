//! Access preconditions consumed from the upstream gateway.
//!
//! Authentication and membership storage live outside this subsystem; the
//! gateway hands us a resolved [`ActorContext`] and these guards make the
//! role precondition explicit at the top of each operation instead of hiding
//! it behind handler decoration.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LeagueRole {
    Driver,
    Steward,
    Admin,
    Owner,
}

impl LeagueRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DRIVER" => Some(Self::Driver),
            "STEWARD" => Some(Self::Steward),
            "ADMIN" => Some(Self::Admin),
            "OWNER" => Some(Self::Owner),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Not a member of this league")]
    NotMember,
    #[error("Insufficient role for this operation")]
    Forbidden,
}

/// The caller's identity plus per-league roles, as proven by the gateway.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor_id: Uuid,
    roles: HashMap<Uuid, LeagueRole>,
}

impl ActorContext {
    pub fn new(actor_id: Uuid, roles: HashMap<Uuid, LeagueRole>) -> Self {
        Self { actor_id, roles }
    }

    pub fn role_in(&self, league_id: Uuid) -> Option<LeagueRole> {
        self.roles.get(&league_id).copied()
    }
}

pub fn require_membership(ctx: &ActorContext, league_id: Uuid) -> Result<LeagueRole, AccessError> {
    ctx.role_in(league_id).ok_or(AccessError::NotMember)
}

pub fn require_role_at_least(
    ctx: &ActorContext,
    league_id: Uuid,
    minimum: LeagueRole,
) -> Result<(), AccessError> {
    let role = require_membership(ctx, league_id)?;
    if role < minimum {
        return Err(AccessError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(league_id: Uuid, role: LeagueRole) -> ActorContext {
        ActorContext::new(Uuid::new_v4(), HashMap::from([(league_id, role)]))
    }

    #[test]
    fn roles_are_ordered() {
        assert!(LeagueRole::Owner > LeagueRole::Admin);
        assert!(LeagueRole::Admin > LeagueRole::Steward);
        assert!(LeagueRole::Steward > LeagueRole::Driver);
    }

    #[test]
    fn steward_gate_admits_steward_and_above() {
        let league_id = Uuid::new_v4();
        for role in [LeagueRole::Steward, LeagueRole::Admin, LeagueRole::Owner] {
            let ctx = ctx_with(league_id, role);
            assert_eq!(
                require_role_at_least(&ctx, league_id, LeagueRole::Steward),
                Ok(())
            );
        }
    }

    #[test]
    fn steward_gate_rejects_plain_drivers() {
        let league_id = Uuid::new_v4();
        let ctx = ctx_with(league_id, LeagueRole::Driver);
        assert_eq!(
            require_role_at_least(&ctx, league_id, LeagueRole::Steward),
            Err(AccessError::Forbidden)
        );
    }

    #[test]
    fn non_members_are_rejected_before_role_checks() {
        let ctx = ctx_with(Uuid::new_v4(), LeagueRole::Owner);
        let other_league = Uuid::new_v4();
        assert_eq!(
            require_membership(&ctx, other_league),
            Err(AccessError::NotMember)
        );
    }
}
