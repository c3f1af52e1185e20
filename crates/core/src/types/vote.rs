//! Deal voting state machine.
//!
//! Each (deal, user) pair is in one of three states: no vote, up (+1) or
//! down (-1). [`VoteTransition::plan`] maps the current state and a requested
//! [`VoteAction`] to the new state and the delta to apply to the deal's
//! aggregates. The storefront runs the plan inside a database transaction;
//! this module stays pure so the transition table is testable on its own.
//!
//! | Current | Action | New  | Delta |
//! |---------|--------|------|-------|
//! | none    | up     | up   | +1    |
//! | none    | down   | down | -1    |
//! | up      | up     | up   | 0     |
//! | down    | down   | down | 0     |
//! | up      | down   | down | -2    |
//! | down    | up     | up   | +2    |
//! | up      | remove | none | -1    |
//! | down    | remove | none | +1    |
//! | none    | remove | none | 0     |

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Action requested by a voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Up,
    Down,
    Remove,
}

impl std::str::FromStr for VoteAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "remove" => Ok(Self::Remove),
            _ => Err(format!("invalid vote action: {s}")),
        }
    }
}

/// A cast vote. Serialized as `1` or `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Signed contribution of this vote to a deal's temperature.
    #[must_use]
    pub const fn value(self) -> i16 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// Parse a stored vote value. Anything other than `1`/`-1` is rejected.
    #[must_use]
    pub const fn from_value(value: i16) -> Option<Self> {
        match value {
            1 => Some(Self::Up),
            -1 => Some(Self::Down),
            _ => None,
        }
    }

    const fn contribution(vote: Option<Self>) -> i32 {
        match vote {
            Some(Self::Up) => 1,
            Some(Self::Down) => -1,
            None => 0,
        }
    }
}

impl Serialize for VoteDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.value())
    }
}

impl<'de> Deserialize<'de> for VoteDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i16::deserialize(deserializer)?;
        Self::from_value(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid vote value: {value}")))
    }
}

/// Outcome of applying a [`VoteAction`] to a voter's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    /// Vote held before the action.
    pub previous: Option<VoteDirection>,
    /// Vote held after the action.
    pub next: Option<VoteDirection>,
    /// Change to apply to both temperature and vote count.
    pub delta: i32,
}

impl VoteTransition {
    /// Plan the transition for `action` given the voter's `current` vote.
    #[must_use]
    pub const fn plan(current: Option<VoteDirection>, action: VoteAction) -> Self {
        let next = match action {
            VoteAction::Up => Some(VoteDirection::Up),
            VoteAction::Down => Some(VoteDirection::Down),
            VoteAction::Remove => None,
        };
        let delta = VoteDirection::contribution(next) - VoteDirection::contribution(current);

        Self {
            previous: current,
            next,
            delta,
        }
    }

    /// Whether the action leaves everything unchanged (idempotent replay).
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.delta == 0
    }
}

/// Aggregates a deal keeps for its votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealTally {
    /// Popularity score.
    pub temperature: i32,
    /// Running vote count; moves by the same delta as temperature.
    pub vote_count: i32,
}

impl DealTally {
    /// Create a tally.
    #[must_use]
    pub const fn new(temperature: i32, vote_count: i32) -> Self {
        Self {
            temperature,
            vote_count,
        }
    }

    /// Tally after applying `transition`.
    #[must_use]
    pub const fn apply(self, transition: &VoteTransition) -> Self {
        Self {
            temperature: self.temperature + transition.delta,
            vote_count: self.vote_count + transition.delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal in-memory stand-in for one deal and one voter.
    struct Ledger {
        tally: DealTally,
        vote: Option<VoteDirection>,
    }

    impl Ledger {
        const fn new(temperature: i32, vote_count: i32) -> Self {
            Self {
                tally: DealTally::new(temperature, vote_count),
                vote: None,
            }
        }

        fn cast(&mut self, action: VoteAction) -> VoteTransition {
            let transition = VoteTransition::plan(self.vote, action);
            self.tally = self.tally.apply(&transition);
            self.vote = transition.next;
            transition
        }
    }

    #[test]
    fn test_plan_from_no_vote() {
        assert_eq!(VoteTransition::plan(None, VoteAction::Up).delta, 1);
        assert_eq!(VoteTransition::plan(None, VoteAction::Down).delta, -1);
        assert!(VoteTransition::plan(None, VoteAction::Remove).is_noop());
    }

    #[test]
    fn test_plan_switch_applies_double_delta() {
        let up_to_down = VoteTransition::plan(Some(VoteDirection::Up), VoteAction::Down);
        assert_eq!(up_to_down.delta, -2);
        assert_eq!(up_to_down.next, Some(VoteDirection::Down));

        let down_to_up = VoteTransition::plan(Some(VoteDirection::Down), VoteAction::Up);
        assert_eq!(down_to_up.delta, 2);
    }

    #[test]
    fn test_plan_remove_reverses_contribution() {
        let from_up = VoteTransition::plan(Some(VoteDirection::Up), VoteAction::Remove);
        assert_eq!(from_up.delta, -1);
        assert_eq!(from_up.next, None);

        let from_down = VoteTransition::plan(Some(VoteDirection::Down), VoteAction::Remove);
        assert_eq!(from_down.delta, 1);
    }

    #[test]
    fn test_repeated_vote_is_noop() {
        assert!(VoteTransition::plan(Some(VoteDirection::Up), VoteAction::Up).is_noop());
        assert!(VoteTransition::plan(Some(VoteDirection::Down), VoteAction::Down).is_noop());
    }

    #[test]
    fn test_up_is_idempotent() {
        let mut ledger = Ledger::new(3, 3);
        ledger.cast(VoteAction::Up);
        let after_first = ledger.tally;
        for _ in 0..5 {
            ledger.cast(VoteAction::Up);
        }
        assert_eq!(ledger.tally, after_first);
    }

    #[test]
    fn test_up_then_remove_restores_tally() {
        let mut ledger = Ledger::new(-4, 7);
        ledger.cast(VoteAction::Up);
        ledger.cast(VoteAction::Remove);
        assert_eq!(ledger.tally, DealTally::new(-4, 7));
        assert_eq!(ledger.vote, None);
    }

    #[test]
    fn test_documented_scenario() {
        let mut ledger = Ledger::new(10, 10);

        ledger.cast(VoteAction::Up);
        assert_eq!(ledger.tally, DealTally::new(11, 11));
        assert_eq!(ledger.vote, Some(VoteDirection::Up));

        ledger.cast(VoteAction::Up);
        assert_eq!(ledger.tally, DealTally::new(11, 11));

        ledger.cast(VoteAction::Down);
        assert_eq!(ledger.tally, DealTally::new(9, 9));
        assert_eq!(ledger.vote, Some(VoteDirection::Down));

        ledger.cast(VoteAction::Remove);
        assert_eq!(ledger.tally, DealTally::new(10, 10));
        assert_eq!(ledger.vote, None);
    }

    #[test]
    fn test_vote_direction_serializes_as_number() {
        assert_eq!(serde_json::to_string(&VoteDirection::Up).expect("ser"), "1");
        assert_eq!(
            serde_json::to_string(&Some(VoteDirection::Down)).expect("ser"),
            "-1"
        );
        assert_eq!(
            serde_json::to_string(&None::<VoteDirection>).expect("ser"),
            "null"
        );
    }

    #[test]
    fn test_vote_direction_rejects_other_values() {
        assert!(serde_json::from_str::<VoteDirection>("2").is_err());
        assert_eq!(VoteDirection::from_value(0), None);
    }

    #[test]
    fn test_vote_action_deserializes_lowercase() {
        let action: VoteAction = serde_json::from_str("\"remove\"").expect("de");
        assert_eq!(action, VoteAction::Remove);
        assert!(serde_json::from_str::<VoteAction>("\"UP\"").is_err());
    }
}
