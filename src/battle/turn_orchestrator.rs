//! Turn state machine: start-of-turn, action and end-of-turn phases.
//!
//! Every entry point here mutates a working copy of the session; the session store
//! only commits it back when the whole call succeeds.

use crate::battle::ai::{Behavior, ScoringAI};
use crate::battle::calculators::{calculate_damage, calculate_heal, confusion_damage};
use crate::battle::effects::{self, TickResult};
use crate::battle::outcome::{self, FaintOutcome};
use crate::battle::passives;
use crate::battle::state::{
    ActionFailureReason, BattleEvent, BattleSession, CombatantRef, EngineContext, Side,
};
use crate::battle::targeting::resolve_targets;
use crate::errors::{ActionError, BattleResult};
use schema::{AbilityData, StatType, StatusKind};

/// How start-of-turn resolution left the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOfTurn {
    Ready,
    Skipped,
    ActorFainted,
    BattleEnded,
}

/// Run battle-start passives and pick who moves first. Faster active combatant
/// goes first; ties and empty teams favour the player.
pub fn initialize_battle(session: &mut BattleSession) {
    passives::run_battle_start(session);

    let player_speed = session.active(Side::Player).map(|c| c.modified_stat(StatType::Speed));
    let ai_speed = session.active(Side::Ai).map(|c| c.modified_stat(StatType::Speed));
    session.turn = match (player_speed, ai_speed) {
        (Some(player), Some(ai)) if ai > player => Side::Ai,
        _ => Side::Player,
    };
    session.emit(BattleEvent::TurnStarted { turn: session.turn_count });
}

/// The player's active combatant uses an ability.
pub fn resolve_player_action(
    session: &mut BattleSession,
    ctx: &EngineContext,
    ability_id: &str,
    target_id: Option<&str>,
) -> BattleResult<()> {
    if session.ended {
        return Err(ActionError::BattleEnded.into());
    }
    if session.turn != Side::Player {
        return Err(ActionError::NotPlayersTurn.into());
    }
    take_turn(session, ctx, Side::Player, ability_id, target_id)
}

/// Let the AI side take its turn. A no-op if the battle ended or it is not the AI's turn.
pub fn resolve_ai_turn(session: &mut BattleSession, ctx: &EngineContext) -> BattleResult<()> {
    if session.ended || session.turn != Side::Ai {
        return Ok(());
    }
    if session.active(Side::Ai).is_some_and(|c| c.fainted) {
        outcome::replace_ai_active(session);
    }

    let brain = ScoringAI::new(ctx.affinity_rule);
    match brain.choose_ability(session, Side::Ai) {
        Some(ability_id) => take_turn(session, ctx, Side::Ai, &ability_id, None),
        None => {
            tracing::warn!(session = %session.id, "AI has no usable ability, passing");
            end_of_turn(session, Side::Ai);
            advance_turn(session);
            Ok(())
        }
    }
}

/// Player swaps their active combatant. Completes the player's turn, then the AI
/// responds before this returns.
pub fn resolve_swap(session: &mut BattleSession, ctx: &EngineContext, new_index: usize) -> BattleResult<()> {
    if session.ended {
        return Err(ActionError::BattleEnded.into());
    }
    if session.turn != Side::Player {
        return Err(ActionError::NotPlayersTurn.into());
    }
    let valid = new_index != session.player.active_index
        && session
            .player
            .members
            .get(new_index)
            .is_some_and(|member| !member.fainted);
    if !valid {
        return Err(ActionError::InvalidSwapTarget(new_index).into());
    }

    let withdrawn = CombatantRef::new(Side::Player, session.player.active_index);
    session.player.active_index = new_index;
    session.emit(BattleEvent::Swapped {
        side: Side::Player,
        withdrawn,
        entered: CombatantRef::new(Side::Player, new_index),
    });

    end_of_turn(session, Side::Player);
    advance_turn(session);
    resolve_ai_turn(session, ctx)
}

fn take_turn(
    session: &mut BattleSession,
    ctx: &EngineContext,
    side: Side,
    ability_id: &str,
    target_id: Option<&str>,
) -> BattleResult<()> {
    let Some((actor, combatant)) = session
        .active_ref(side)
        .and_then(|actor| session.combatant(actor).map(|c| (actor, c)))
    else {
        // Nobody to act for this side.
        pass_turn(session, side);
        return Ok(());
    };
    let ability = {
        if combatant.fainted {
            return Err(ActionError::FaintedActor(combatant.name.clone()).into());
        }
        let ability = combatant
            .find_ability(ability_id)
            .ok_or_else(|| ActionError::AbilityNotOwned {
                combatant: combatant.name.clone(),
                ability_id: ability_id.to_string(),
            })?;
        if ability.is_passive() {
            return Err(ActionError::PassiveAbility(ability_id.to_string()).into());
        }
        ability.clone()
    };

    match start_of_turn(session, ctx, actor)? {
        StartOfTurn::BattleEnded => return Ok(()),
        StartOfTurn::ActorFainted => {
            pass_turn(session, side);
            return Ok(());
        }
        StartOfTurn::Skipped => {}
        StartOfTurn::Ready => {
            execute_ability(session, ctx, actor, &ability, target_id)?;
            if session.ended {
                return Ok(());
            }
        }
    }

    end_of_turn(session, side);
    advance_turn(session);
    Ok(())
}

/// Confusion pre-empts everything else; otherwise damage-over-time, then
/// healing-over-time, then start-of-turn passives, then the turn-skip check.
pub fn start_of_turn(
    session: &mut BattleSession,
    ctx: &EngineContext,
    actor: CombatantRef,
) -> BattleResult<StartOfTurn> {
    let Some(combatant) = session.combatant(actor) else {
        return Ok(StartOfTurn::ActorFainted);
    };

    if let Some(confusion) = combatant.status_of_kind(StatusKind::Confusion) {
        let damage = confusion_damage(combatant, confusion.secondary_value.unwrap_or(0.0));
        let source = confusion.name.clone();
        let Some(combatant) = session.combatant_mut(actor) else {
            return Ok(StartOfTurn::ActorFainted);
        };
        let dealt = combatant.take_damage(damage);
        let remaining_hp = combatant.hp;
        session.emit(BattleEvent::Damage {
            target: actor,
            source,
            amount: dealt,
            remaining_hp,
        });
        return match outcome::check_faint(session, ctx, actor)? {
            FaintOutcome::BattleEnded => Ok(StartOfTurn::BattleEnded),
            FaintOutcome::Fainted => Ok(StartOfTurn::ActorFainted),
            FaintOutcome::Standing => {
                passives::evaluate_hp_thresholds(session, actor);
                session.emit(BattleEvent::TurnSkipped {
                    actor,
                    reason: "is confused".to_string(),
                });
                Ok(StartOfTurn::Skipped)
            }
        };
    }

    let damage_ticks: Vec<String> = combatant
        .status_effects
        .iter()
        .filter(|effect| effect.kind == StatusKind::DamageOverTime)
        .map(|effect| effect.name.clone())
        .collect();
    for status_name in damage_ticks {
        if effects::tick_damage(session, actor, &status_name) == TickResult::Dropped {
            return match outcome::check_faint(session, ctx, actor)? {
                FaintOutcome::BattleEnded => Ok(StartOfTurn::BattleEnded),
                _ => Ok(StartOfTurn::ActorFainted),
            };
        }
    }

    effects::tick_healing(session, actor);
    passives::evaluate_hp_thresholds(session, actor);
    passives::run_start_of_turn(session, actor);

    if let Some(skip) = session
        .combatant(actor)
        .and_then(|c| c.status_of_kind(StatusKind::TurnSkip))
    {
        let reason = format!("is held by {}", skip.name);
        session.emit(BattleEvent::TurnSkipped { actor, reason });
        return Ok(StartOfTurn::Skipped);
    }

    Ok(StartOfTurn::Ready)
}

/// MP gate, targeting, then per-target resolution.
pub fn execute_ability(
    session: &mut BattleSession,
    ctx: &EngineContext,
    actor: CombatantRef,
    ability: &AbilityData,
    target_id: Option<&str>,
) -> BattleResult<()> {
    let Some(combatant) = session.combatant_mut(actor) else {
        return Ok(());
    };
    if combatant.mp < ability.mp_cost {
        let reason = ActionFailureReason::InsufficientMp {
            required: ability.mp_cost,
            available: combatant.mp,
        };
        tracing::warn!(session = %session.id, ability = %ability.id, "insufficient MP");
        session.emit(BattleEvent::ActionFailed { actor, reason });
        return Ok(());
    }
    combatant.mp -= ability.mp_cost;

    session.emit(BattleEvent::AbilityUsed {
        actor,
        ability: ability.name.clone(),
    });

    let targets = resolve_targets(session, actor, ability, target_id);
    if targets.is_empty() {
        session.emit(BattleEvent::ActionFailed {
            actor,
            reason: ActionFailureReason::NoValidTarget,
        });
        return Ok(());
    }

    for target in targets {
        if ability.target.targets_enemies() {
            resolve_against_enemy(session, ctx, actor, target, ability)?;
            if session.ended {
                return Ok(());
            }
        } else {
            resolve_support(session, actor, target, ability);
        }
    }
    Ok(())
}

fn resolve_against_enemy(
    session: &mut BattleSession,
    ctx: &EngineContext,
    attacker: CombatantRef,
    target: CombatantRef,
    ability: &AbilityData,
) -> BattleResult<()> {
    if passives::check_evasion(session, target, ability) {
        session.emit(BattleEvent::Evaded {
            target,
            ability: ability.name.clone(),
        });
        return Ok(());
    }

    let queued = passives::queue_on_ability_use(session, attacker, ability);

    if ability.is_damaging() {
        let (Some(attacker_c), Some(target_c)) = (session.combatant(attacker), session.combatant(target)) else {
            return Ok(());
        };
        let per_hit = calculate_damage(attacker_c, ability, target_c, ctx.affinity_rule);
        let hits = if ability.hits.is_multi_hit() {
            session
                .rng
                .roll_range(ability.hits.min, ability.hits.max, &format!("{} hit count", ability.id))
        } else {
            1
        };

        let mut total = 0;
        let mut landed = 0;
        for _ in 0..hits {
            let Some(target_c) = session.combatant_mut(target) else {
                break;
            };
            if target_c.hp == 0 {
                break;
            }
            let dealt = target_c.take_damage(per_hit);
            let remaining_hp = target_c.hp;
            total += dealt;
            landed += 1;
            session.emit(BattleEvent::Damage {
                target,
                source: ability.name.clone(),
                amount: dealt,
                remaining_hp,
            });
        }
        if ability.hits.is_multi_hit() {
            let line = format!(
                "{} hit {} times for {} total damage.",
                ability.name, landed, total
            );
            session.narrate(line);
        }

        if outcome::check_faint(session, ctx, target)? != FaintOutcome::Standing {
            return Ok(());
        }
        passives::run_on_damage_taken(session, target);
    }

    if let Some(status) = &ability.status_effect {
        effects::apply_status(session, target, status);
    }
    if !ability.stat_modifiers.is_empty() {
        effects::apply_modifiers(session, target, &ability.stat_modifiers, &ability.id);
    }
    for status in &queued {
        effects::apply_status(session, target, status);
    }

    passives::evaluate_hp_thresholds(session, target);
    Ok(())
}

/// Ally and self targets: heal by `floor(scaling stat × healing power)`, then apply
/// the ability's own effects.
fn resolve_support(session: &mut BattleSession, caster: CombatantRef, target: CombatantRef, ability: &AbilityData) {
    if ability.is_healing() {
        let amount = session
            .combatant(caster)
            .map(|c| calculate_heal(c, ability))
            .unwrap_or(0);
        if let Some(target_c) = session.combatant_mut(target) {
            let healed = target_c.heal(amount);
            let new_hp = target_c.hp;
            session.emit(BattleEvent::Healed {
                target,
                source: ability.name.clone(),
                amount: healed,
                new_hp,
            });
        }
    }

    if let Some(status) = &ability.status_effect {
        effects::apply_status(session, target, status);
    }
    if !ability.stat_modifiers.is_empty() {
        effects::apply_modifiers(session, target, &ability.stat_modifiers, &ability.id);
    }
    passives::evaluate_hp_thresholds(session, target);
}

/// Durations tick only when the AI closes a cycle; end-of-turn passives of the
/// acting side fire every time.
pub fn end_of_turn(session: &mut BattleSession, side: Side) {
    if side == Side::Ai {
        effects::tick_durations(session);
    }
    passives::run_end_of_turn(session, side);
}

/// A turn that ended without an action still closes the cycle's durations,
/// but end-of-turn passives do not fire.
fn pass_turn(session: &mut BattleSession, side: Side) {
    if side == Side::Ai {
        effects::tick_durations(session);
    }
    advance_turn(session);
}

/// Hand the turn to the other side. Closing a cycle bumps the turn counter.
pub fn advance_turn(session: &mut BattleSession) {
    let finished = session.turn;
    session.turn = finished.opponent();
    session.cycle_complete = finished == Side::Ai;
    if session.cycle_complete {
        session.turn_count += 1;
        session.emit(BattleEvent::TurnStarted { turn: session.turn_count });
    }
}
