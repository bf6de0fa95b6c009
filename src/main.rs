use monster_battle::battle::ai::{Behavior, ScoringAI};
use monster_battle::{
    BattlePhase, BattleResult, EngineConfig, InMemoryRosterStore, OwnedMonster, SessionId, SessionStore,
    Side, StaticCatalog,
};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// Upper bound on operations per demo battle.
const MAX_STEPS: usize = 400;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match EngineConfig::load_or_default(Path::new("data/engine.ron")) {
        Ok(config) => config,
        Err(e) => {
            println!("Error loading engine config: {}", e);
            return;
        }
    };
    let catalog = match StaticCatalog::load_from_dir(&config.data_dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            println!("Error loading catalog from {}: {}", config.data_dir.display(), e);
            return;
        }
    };

    let battles: usize = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(2);

    let ids: Vec<String> = catalog.monster_ids().into_iter().map(String::from).collect();
    if ids.len() < 2 {
        println!("The catalog needs at least two monsters for a demo battle.");
        return;
    }

    let roster_store = Arc::new(InMemoryRosterStore::new());
    let store = Arc::new(SessionStore::new(Arc::new(catalog), roster_store.clone(), config));

    let mut handles = Vec::new();
    for battle in 0..battles {
        let (player, ai) = demo_rosters(&ids, battle);
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move { run_battle(&store, &player, &ai) }));
    }

    for (battle, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(Ok(log)) => {
                println!("--- Battle {} ---", battle + 1);
                for line in log {
                    println!("{}", line);
                }
                println!();
            }
            Ok(Err(e)) => println!("Battle {} failed: {}", battle + 1, e),
            Err(e) => println!("Battle {} task panicked: {}", battle + 1, e),
        }
    }

    println!("Rosters saved: {}", roster_store.save_count());
    if let Some(last) = roster_store.last_saved() {
        match serde_json::to_string_pretty(&last) {
            Ok(json) => println!("Last saved roster:\n{}", json),
            Err(e) => println!("Error serializing roster: {}", e),
        }
    }
    println!("Finished sessions evicted: {}", store.evict_finished());
}

/// Three-monster teams cycling through the catalog.
fn demo_rosters(ids: &[String], battle: usize) -> (Vec<OwnedMonster>, Vec<OwnedMonster>) {
    let pick = |offset: usize, owner: &str| -> Vec<OwnedMonster> {
        (0..3)
            .map(|slot| {
                let template = &ids[(battle + offset + slot * 2) % ids.len()];
                OwnedMonster::new(format!("{}-{}-{}", owner, battle, slot), template.clone())
            })
            .collect()
    };
    (pick(0, "player"), pick(1, "rival"))
}

/// Drive one session to completion, choosing the player's abilities with the
/// same scoring the AI uses.
fn run_battle(store: &SessionStore, player: &[OwnedMonster], ai: &[OwnedMonster]) -> BattleResult<Vec<String>> {
    let (id, mut session) = store.create_session(player, ai, 0)?;
    let brain = ScoringAI::new(store.config().affinity_rule);

    for _ in 0..MAX_STEPS {
        session = match session.phase() {
            BattlePhase::Ended => break,
            BattlePhase::AwaitingAi => store.process_ai_turn(id)?,
            BattlePhase::PlayerMustSwap => match session.player.first_available() {
                Some(index) => store.perform_swap(id, index)?,
                None => break,
            },
            BattlePhase::AwaitingPlayer => match brain.choose_ability(&session, Side::Player) {
                Some(ability_id) => store.perform_action(id, &ability_id, None)?,
                None => break,
            },
        };
    }

    report(store, id, &session.log);
    Ok(session.log)
}

fn report(store: &SessionStore, id: SessionId, log: &[String]) {
    match store.session(id) {
        Ok(session) if session.ended => {
            tracing::info!(session = %id, winner = ?session.winner, lines = log.len(), "demo battle finished")
        }
        Ok(session) => tracing::warn!(session = %id, turn = session.turn_count, "demo battle stopped early"),
        Err(e) => tracing::warn!(session = %id, error = %e, "could not read back session"),
    }
}
