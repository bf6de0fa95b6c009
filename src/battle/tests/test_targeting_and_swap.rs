#[cfg(test)]
mod tests {
    use crate::battle::state::{BattleEvent, CombatantRef, Side};
    use crate::battle::tests::common::{ability, create_test_session, test_context, TestCombatantBuilder};
    use crate::battle::turn_orchestrator::{resolve_player_action, resolve_swap};
    use crate::errors::{ActionError, BattleError};
    use crate::persistence::InMemoryRosterStore;
    use pretty_assertions::assert_eq;
    use schema::{Affinity, TargetScope};

    #[test]
    fn test_area_ability_reaches_the_bench() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let quake = ability("quake", 1.0, Affinity::Earth, TargetScope::AllEnemies);
        let mut session = create_test_session(
            vec![TestCombatantBuilder::new("p").with_abilities(vec![quake]).build()],
            vec![
                TestCombatantBuilder::new("a0").build(),
                TestCombatantBuilder::new("a1").fainted().build(),
                TestCombatantBuilder::new("a2").build(),
            ],
        );

        resolve_player_action(&mut session, &ctx, "quake", None).unwrap();

        let hit: Vec<CombatantRef> = session
            .events
            .events()
            .iter()
            .filter_map(|e| match e {
                BattleEvent::Damage { target, .. } => Some(*target),
                _ => None,
            })
            .collect();
        assert_eq!(hit, vec![CombatantRef::new(Side::Ai, 0), CombatantRef::new(Side::Ai, 2)]);
        assert_eq!(session.ai.members[0].hp, 50);
        assert_eq!(session.ai.members[1].hp, 0);
        assert_eq!(session.ai.members[2].hp, 50);
    }

    #[test]
    fn test_heal_on_ally_is_clamped() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let mut mend = ability("mend", 0.0, Affinity::Nature, TargetScope::Ally);
        mend.healing_power = 1.0;
        let mut session = create_test_session(
            vec![
                TestCombatantBuilder::new("healer").with_abilities(vec![mend]).build(),
                TestCombatantBuilder::new("hurt").with_hp(80).build(),
            ],
            vec![TestCombatantBuilder::new("a").build()],
        );

        resolve_player_action(&mut session, &ctx, "mend", Some("hurt")).unwrap();

        assert_eq!(session.player.members[1].hp, 100);
        assert!(session.events.events().contains(&BattleEvent::Healed {
            target: CombatantRef::new(Side::Player, 1),
            source: "mend".to_string(),
            amount: 20,
            new_hp: 100,
        }));
    }

    #[test]
    fn test_swap_completes_the_turn_and_the_ai_replies() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let mut session = create_test_session(
            vec![
                TestCombatantBuilder::new("lead").build(),
                TestCombatantBuilder::new("reserve").build(),
            ],
            vec![TestCombatantBuilder::new("a").build()],
        );

        resolve_swap(&mut session, &ctx, 1).unwrap();

        assert_eq!(session.player.active_index, 1);
        assert_eq!(session.turn, Side::Player);
        assert_eq!(session.turn_count, 2);
        assert_eq!(session.player.members[0].hp, 100);
        assert_eq!(session.player.members[1].hp, 50, "the AI hits the new active combatant");
        assert!(session.log.contains(&"Player withdrew lead. reserve entered the battle!".to_string()));
    }

    #[test]
    fn test_swap_out_of_a_fainted_lead() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let mut session = create_test_session(
            vec![
                TestCombatantBuilder::new("down").fainted().build(),
                TestCombatantBuilder::new("up").build(),
            ],
            vec![TestCombatantBuilder::new("a").build()],
        );

        resolve_swap(&mut session, &ctx, 1).unwrap();

        assert_eq!(session.player.active_index, 1);
        assert!(!session.ended);
    }

    #[test]
    fn test_invalid_swap_targets() {
        let store = InMemoryRosterStore::new();
        let ctx = test_context(&store);
        let mut session = create_test_session(
            vec![
                TestCombatantBuilder::new("lead").build(),
                TestCombatantBuilder::new("down").fainted().build(),
            ],
            vec![TestCombatantBuilder::new("a").build()],
        );

        for index in [0, 1, 7] {
            assert!(matches!(
                resolve_swap(&mut session, &ctx, index),
                Err(BattleError::Action(ActionError::InvalidSwapTarget(i))) if i == index
            ));
        }
        assert_eq!(session.player.active_index, 0);
        assert!(session.events.is_empty());
    }
}
