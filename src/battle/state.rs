use crate::battle::combatant::BattleCombatant;
use crate::config::AffinityRule;
use crate::persistence::RosterStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{Position, StatType};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "Player"),
            Side::Ai => write!(f, "Opponent"),
        }
    }
}

/// Stable address of a combatant within a session. Team order never changes after
/// creation; only the active index moves.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CombatantRef {
    pub side: Side,
    pub index: usize,
}

impl CombatantRef {
    pub fn new(side: Side, index: usize) -> Self {
        Self { side, index }
    }
}

/// Where the session is waiting, derived from its fields.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    AwaitingPlayer,
    AwaitingAi,
    /// Player's turn, but their active combatant has fainted.
    PlayerMustSwap,
    Ended,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ActionFailureReason {
    InsufficientMp { required: u32, available: u32 },
    NoValidTarget,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum BattleEvent {
    TurnStarted {
        turn: u32,
    },
    AbilityUsed {
        actor: CombatantRef,
        ability: String,
    },
    /// `source` is the ability or status effect that caused the damage.
    Damage {
        target: CombatantRef,
        source: String,
        amount: u32,
        remaining_hp: u32,
    },
    Healed {
        target: CombatantRef,
        source: String,
        amount: u32,
        new_hp: u32,
    },
    Evaded {
        target: CombatantRef,
        ability: String,
    },
    StatusApplied {
        target: CombatantRef,
        status: String,
        duration: u32,
    },
    StatusExpired {
        target: CombatantRef,
        status: String,
    },
    ModifierExpired {
        target: CombatantRef,
        stat: StatType,
    },
    PassiveActivated {
        owner: CombatantRef,
        ability: String,
    },
    Fainted {
        target: CombatantRef,
    },
    Swapped {
        side: Side,
        withdrawn: CombatantRef,
        entered: CombatantRef,
    },
    TurnSkipped {
        actor: CombatantRef,
        reason: String,
    },
    ActionFailed {
        actor: CombatantRef,
        reason: ActionFailureReason,
    },
    BattleEnded {
        winner: Side,
    },
}

impl BattleEvent {
    /// Formats the event into a battle log line using session context.
    /// Returns None for events that carry no narration of their own.
    pub fn format(&self, session: &BattleSession) -> Option<String> {
        let name = |target: &CombatantRef| session.display_name(*target);

        match self {
            BattleEvent::TurnStarted { turn } => Some(format!("=== Turn {} ===", turn)),
            BattleEvent::AbilityUsed { actor, ability } => {
                Some(format!("{} used {}!", name(actor), ability))
            }
            BattleEvent::Damage { target, source, amount, .. } => {
                Some(format!("{} took {} damage from {}.", name(target), amount, source))
            }
            BattleEvent::Healed { target, source, amount, .. } => {
                Some(format!("{} recovered {} HP from {}.", name(target), amount, source))
            }
            BattleEvent::Evaded { target, ability } => {
                Some(format!("{} evaded {}!", name(target), ability))
            }
            BattleEvent::StatusApplied { target, status, duration } => Some(format!(
                "{} is affected by {} for {} turns.",
                name(target),
                status,
                duration
            )),
            BattleEvent::StatusExpired { target, status } => {
                Some(format!("{}'s {} wore off.", name(target), status))
            }
            BattleEvent::ModifierExpired { target, stat } => {
                Some(format!("{}'s {} modifier wore off.", name(target), stat))
            }
            BattleEvent::PassiveActivated { owner, ability } => {
                Some(format!("{}'s {} activated!", name(owner), ability))
            }
            BattleEvent::Fainted { target } => Some(format!("{} fainted!", name(target))),
            BattleEvent::Swapped { withdrawn, entered, .. } => Some(format!(
                "{} withdrew {}. {} entered the battle!",
                withdrawn.side,
                name(withdrawn),
                name(entered)
            )),
            BattleEvent::TurnSkipped { actor, reason } => {
                Some(format!("{} {} and cannot act!", name(actor), reason))
            }
            BattleEvent::ActionFailed { actor, reason } => match reason {
                ActionFailureReason::InsufficientMp { required, available } => Some(format!(
                    "{} does not have enough MP ({}/{}).",
                    name(actor),
                    available,
                    required
                )),
                ActionFailureReason::NoValidTarget => {
                    Some(format!("{}'s ability had no valid target.", name(actor)))
                }
            },
            BattleEvent::BattleEnded { winner } => Some(format!("{} won the battle!", winner)),
        }
    }
}

/// Append-only sequence of structured events for presentation.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// Random source for a session. Scripted outcomes are consumed first, so tests can
/// pin every roll; after that a seeded or OS-backed `StdRng` takes over.
#[derive(Debug, Clone)]
pub struct BattleRng {
    scripted: VecDeque<u8>,
    rng: StdRng,
}

impl Default for BattleRng {
    fn default() -> Self {
        Self::new_random()
    }
}

impl BattleRng {
    pub fn new_random() -> Self {
        Self {
            scripted: VecDeque::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            scripted: VecDeque::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self {
            scripted: outcomes.into(),
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// A d100 roll in `1..=100`.
    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        let outcome = match self.scripted.pop_front() {
            Some(value) => value.clamp(1, 100),
            None => self.rng.random_range(1..=100),
        };
        tracing::trace!(outcome, reason, "rng consumed");
        outcome
    }

    pub fn roll_chance(&mut self, percent: u8, reason: &str) -> bool {
        self.next_outcome(reason) <= percent
    }

    /// Uniform pick in `min..=max`, driven by one d100 roll.
    pub fn roll_range(&mut self, min: u8, max: u8, reason: &str) -> u8 {
        if max <= min {
            return min;
        }
        let span = u16::from(max - min) + 1;
        let offset = (u16::from(self.next_outcome(reason)) - 1) % span;
        min + offset as u8
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleTeam {
    pub members: Vec<BattleCombatant>,
    pub active_index: usize,
}

impl BattleTeam {
    pub fn new(members: Vec<BattleCombatant>) -> Self {
        Self {
            members,
            active_index: 0,
        }
    }

    pub fn active(&self) -> Option<&BattleCombatant> {
        self.members.get(self.active_index)
    }

    pub fn is_defeated(&self) -> bool {
        self.members.iter().all(|member| member.fainted)
    }

    pub fn first_available(&self) -> Option<usize> {
        self.members.iter().position(|member| !member.fainted)
    }
}

/// Collaborators and rules an operation needs while it mutates a session.
pub struct EngineContext<'a> {
    pub affinity_rule: AffinityRule,
    pub roster_store: &'a dyn RosterStore,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleSession {
    pub id: Uuid,
    pub player: BattleTeam,
    pub ai: BattleTeam,
    pub turn: Side,
    pub turn_count: u32,
    pub cycle_complete: bool,
    pub log: Vec<String>,
    pub events: EventBus,
    pub ended: bool,
    pub winner: Option<Side>,
    #[serde(skip)]
    pub rng: BattleRng,
}

impl BattleSession {
    pub fn new(id: Uuid, player: Vec<BattleCombatant>, ai: Vec<BattleCombatant>, rng: BattleRng) -> Self {
        Self {
            id,
            player: BattleTeam::new(player),
            ai: BattleTeam::new(ai),
            turn: Side::Player,
            turn_count: 1,
            cycle_complete: false,
            log: Vec::new(),
            events: EventBus::new(),
            ended: false,
            winner: None,
            rng,
        }
    }

    pub fn team(&self, side: Side) -> &BattleTeam {
        match side {
            Side::Player => &self.player,
            Side::Ai => &self.ai,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut BattleTeam {
        match side {
            Side::Player => &mut self.player,
            Side::Ai => &mut self.ai,
        }
    }

    pub fn combatant(&self, target: CombatantRef) -> Option<&BattleCombatant> {
        self.team(target.side).members.get(target.index)
    }

    pub fn combatant_mut(&mut self, target: CombatantRef) -> Option<&mut BattleCombatant> {
        self.team_mut(target.side).members.get_mut(target.index)
    }

    pub fn active_ref(&self, side: Side) -> Option<CombatantRef> {
        let team = self.team(side);
        team.active()
            .map(|_| CombatantRef::new(side, team.active_index))
    }

    pub fn active(&self, side: Side) -> Option<&BattleCombatant> {
        self.team(side).active()
    }

    pub fn position(&self, target: CombatantRef) -> Position {
        if self.team(target.side).active_index == target.index {
            Position::Active
        } else {
            Position::Benched
        }
    }

    /// Every combatant reference on one side, in team order.
    pub fn refs(&self, side: Side) -> Vec<CombatantRef> {
        (0..self.team(side).members.len())
            .map(|index| CombatantRef::new(side, index))
            .collect()
    }

    pub fn display_name(&self, target: CombatantRef) -> &str {
        self.combatant(target)
            .map(|combatant| combatant.name.as_str())
            .unwrap_or("???")
    }

    pub fn phase(&self) -> BattlePhase {
        if self.ended {
            return BattlePhase::Ended;
        }
        match self.turn {
            Side::Ai => BattlePhase::AwaitingAi,
            Side::Player => match self.active(Side::Player) {
                Some(active) if active.fainted => BattlePhase::PlayerMustSwap,
                _ => BattlePhase::AwaitingPlayer,
            },
        }
    }

    /// Record an event and its narration, if it has one.
    pub fn emit(&mut self, event: BattleEvent) {
        let line = event.format(self);
        self.events.push(event);
        if let Some(line) = line {
            self.narrate(line);
        }
    }

    /// Append a line to the battle log without a structured event.
    pub fn narrate(&mut self, line: String) {
        tracing::debug!(session = %self.id, "{}", line);
        self.log.push(line);
    }
}
