//! Faint checks and the win condition.

use crate::battle::state::{BattleEvent, BattleSession, CombatantRef, EngineContext, Side};
use crate::errors::BattleResult;
use crate::persistence::FinalMonsterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaintOutcome {
    Standing,
    Fainted,
    BattleEnded,
}

/// Settle a combatant whose HP may have reached zero: mark it fainted, evaluate
/// the win condition, and bring in the next AI combatant if the AI lead went down.
pub fn check_faint(
    session: &mut BattleSession,
    ctx: &EngineContext,
    target: CombatantRef,
) -> BattleResult<FaintOutcome> {
    let Some(combatant) = session.combatant_mut(target) else {
        return Ok(FaintOutcome::Standing);
    };
    if !combatant.check_faint() {
        return Ok(if combatant.fainted {
            FaintOutcome::Fainted
        } else {
            FaintOutcome::Standing
        });
    }

    session.emit(BattleEvent::Fainted { target });

    if let Some(winner) = evaluate_winner(session) {
        conclude(session, ctx, winner)?;
        return Ok(FaintOutcome::BattleEnded);
    }

    if target.side == Side::Ai && session.position(target) == schema::Position::Active {
        replace_ai_active(session);
    }

    Ok(FaintOutcome::Fainted)
}

/// The side whose opponent has no standing members, if any.
pub fn evaluate_winner(session: &BattleSession) -> Option<Side> {
    if session.ai.is_defeated() {
        Some(Side::Player)
    } else if session.player.is_defeated() {
        Some(Side::Ai)
    } else {
        None
    }
}

/// End the battle and hand the final player roster to the roster store.
pub fn conclude(session: &mut BattleSession, ctx: &EngineContext, winner: Side) -> BattleResult<()> {
    if session.ended {
        return Ok(());
    }
    session.ended = true;
    session.winner = Some(winner);
    session.emit(BattleEvent::BattleEnded { winner });

    let roster: Vec<FinalMonsterState> = session
        .player
        .members
        .iter()
        .map(|member| FinalMonsterState {
            monster_id: member.id.clone(),
            hp: member.hp,
            mp: member.mp,
            fainted: member.fainted,
        })
        .collect();

    ctx.roster_store.save_final_battle_state(&roster)?;
    tracing::info!(session = %session.id, ?winner, turns = session.turn_count, "battle concluded");
    Ok(())
}

/// Send in the first standing AI combatant.
pub fn replace_ai_active(session: &mut BattleSession) {
    let Some(next) = session.ai.first_available() else {
        return;
    };
    let withdrawn = CombatantRef::new(Side::Ai, session.ai.active_index);
    session.ai.active_index = next;
    session.emit(BattleEvent::Swapped {
        side: Side::Ai,
        withdrawn,
        entered: CombatantRef::new(Side::Ai, next),
    });
}
