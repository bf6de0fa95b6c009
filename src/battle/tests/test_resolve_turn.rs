#[cfg(test)]
mod tests {
    use crate::battle::state::{ActionFailureReason, BattleEvent, BattlePhase, CombatantRef, Side};
    use crate::battle::tests::common::{
        ability, create_test_session, passive, test_context, TestCombatantBuilder,
    };
    use crate::battle::turn_orchestrator::{initialize_battle, resolve_ai_turn, resolve_player_action};
    use crate::errors::{ActionError, BattleError};
    use crate::persistence::InMemoryRosterStore;
    use pretty_assertions::assert_eq;
    use schema::{
        ActivationScope, Affinity, PassiveTarget, PassiveTrigger, StatusEffectTemplate, StatusKind,
        TargetScope, ValueKind,
    };

    #[test]
    fn test_faster_side_opens_the_battle() {
        let mut session = create_test_session(
            vec![TestCombatantBuilder::new("slow").with_speed(10).build()],
            vec![TestCombatantBuilder::new("quick").with_speed(90).build()],
        );

        initialize_battle(&mut session);

        assert_eq!(session.turn, Side::Ai);
        assert_eq!(session.phase(), BattlePhase::AwaitingAi);
        assert_eq!(session.log.first().map(String::as_str), Some("=== Turn 1 ==="));
    }

    #[test]
    fn test_full_cycle_advances_turn_counter() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let mut session = create_test_session(
            vec![TestCombatantBuilder::new("p").with_max_hp(300).build()],
            vec![TestCombatantBuilder::new("a").with_max_hp(300).build()],
        );

        resolve_player_action(&mut session, &ctx, "strike", None).unwrap();
        assert_eq!(session.turn, Side::Ai);
        assert_eq!(session.turn_count, 1);
        assert!(!session.cycle_complete);

        resolve_ai_turn(&mut session, &ctx).unwrap();
        assert_eq!(session.turn, Side::Player);
        assert_eq!(session.turn_count, 2);
        assert!(session.cycle_complete);

        // Out of turn for the AI: nothing is recorded.
        let recorded = session.events.len();
        resolve_ai_turn(&mut session, &ctx).unwrap();
        assert_eq!(session.events.len(), recorded);
        assert_eq!(session.turn, Side::Player);

        assert_eq!(session.player.members[0].hp, 250);
        assert_eq!(session.ai.members[0].hp, 250);
        println!("{}", session.events);
    }

    #[test]
    fn test_durations_tick_once_per_cycle() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let mut venom = ability("venom", 0.0, Affinity::Nature, TargetScope::SingleEnemy);
        venom.status_effect = Some(StatusEffectTemplate {
            name: "Poison".to_string(),
            duration: 2,
            kind: StatusKind::DamageOverTime,
            value: 5.0,
            value_kind: ValueKind::Flat,
            secondary_value: None,
        });
        let mut session = create_test_session(
            vec![TestCombatantBuilder::new("p").with_max_hp(300).with_abilities(vec![venom]).build()],
            vec![TestCombatantBuilder::new("a").build()],
        );

        resolve_player_action(&mut session, &ctx, "venom", None).unwrap();
        assert_eq!(session.ai.members[0].status_effects[0].remaining, 2);

        resolve_ai_turn(&mut session, &ctx).unwrap();
        let target = &session.ai.members[0];
        assert_eq!(target.hp, 95);
        assert_eq!(target.status_effects[0].remaining, 1);
    }

    #[test]
    fn test_insufficient_mp_fails_without_spending() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let mut blast = ability("blast", 2.0, Affinity::Fire, TargetScope::SingleEnemy);
        blast.mp_cost = 10;
        let mut session = create_test_session(
            vec![TestCombatantBuilder::new("p").with_mp(5).with_abilities(vec![blast]).build()],
            vec![TestCombatantBuilder::new("a").build()],
        );

        resolve_player_action(&mut session, &ctx, "blast", None).unwrap();

        let actor = CombatantRef::new(Side::Player, 0);
        assert!(session.events.events().contains(&BattleEvent::ActionFailed {
            actor,
            reason: ActionFailureReason::InsufficientMp { required: 10, available: 5 },
        }));
        assert!(!session
            .events
            .events()
            .iter()
            .any(|e| matches!(e, BattleEvent::AbilityUsed { .. })));
        assert_eq!(session.player.members[0].mp, 5);
        assert_eq!(session.ai.members[0].hp, 100);
        // The attempt still uses up the turn.
        assert_eq!(session.turn, Side::Ai);
    }

    #[test]
    fn test_rejected_actions() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let ward = passive("ward", PassiveTrigger::EndOfTurn, ActivationScope::Any, PassiveTarget::Owner);
        let strike = ability("strike", 1.0, Affinity::Physical, TargetScope::SingleEnemy);
        let mut session = create_test_session(
            vec![TestCombatantBuilder::new("p").with_abilities(vec![strike, ward]).build()],
            vec![TestCombatantBuilder::new("a").build()],
        );

        assert!(matches!(
            resolve_player_action(&mut session, &ctx, "fireball", None),
            Err(BattleError::Action(ActionError::AbilityNotOwned { .. }))
        ));
        assert!(matches!(
            resolve_player_action(&mut session, &ctx, "ward", None),
            Err(BattleError::Action(ActionError::PassiveAbility(_)))
        ));

        session.turn = Side::Ai;
        assert!(matches!(
            resolve_player_action(&mut session, &ctx, "strike", None),
            Err(BattleError::Action(ActionError::NotPlayersTurn))
        ));
    }

    #[test]
    fn test_fainted_player_lead_must_swap() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let mut session = create_test_session(
            vec![
                TestCombatantBuilder::new("down").fainted().build(),
                TestCombatantBuilder::new("up").build(),
            ],
            vec![TestCombatantBuilder::new("a").build()],
        );

        assert_eq!(session.phase(), BattlePhase::PlayerMustSwap);
        assert!(matches!(
            resolve_player_action(&mut session, &ctx, "strike", None),
            Err(BattleError::Action(ActionError::FaintedActor(name))) if name == "down"
        ));
    }

    #[test]
    fn test_ai_turn_is_noop_on_players_turn() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let mut session = create_test_session(
            vec![TestCombatantBuilder::new("p").build()],
            vec![TestCombatantBuilder::new("a").build()],
        );

        resolve_ai_turn(&mut session, &ctx).unwrap();

        assert!(session.events.is_empty());
        assert_eq!(session.turn, Side::Player);
    }

    #[test]
    fn test_ai_sends_in_next_combatant_after_faint() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let mut session = create_test_session(
            vec![TestCombatantBuilder::new("p").build()],
            vec![
                TestCombatantBuilder::new("a0").with_hp(10).build(),
                TestCombatantBuilder::new("a1").build(),
            ],
        );

        resolve_player_action(&mut session, &ctx, "strike", None).unwrap();

        assert!(session.ai.members[0].fainted);
        assert_eq!(session.ai.active_index, 1);
        assert!(!session.ended);
        assert!(session.events.events().contains(&BattleEvent::Swapped {
            side: Side::Ai,
            withdrawn: CombatantRef::new(Side::Ai, 0),
            entered: CombatantRef::new(Side::Ai, 1),
        }));

        resolve_ai_turn(&mut session, &ctx).unwrap();
        assert!(session.events.events().contains(&BattleEvent::AbilityUsed {
            actor: CombatantRef::new(Side::Ai, 1),
            ability: "strike".to_string(),
        }));
        assert_eq!(session.player.members[0].hp, 50);
    }
}
