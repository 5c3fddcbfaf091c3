//! Run a few episodes of a three-agent, four-room layout with mock
//! physics and a trainer that always drives forward.
//!
//! ```sh
//! RUST_LOG=info cargo run -p wayfind-engine --example quickstart
//! ```

use wayfind_core::{Action, AgentId, ContactEvent, RoomId, ZoneRef};
use wayfind_engine::{EnvConfig, LockstepEnv, TurnPolicy};
use wayfind_rooms::UniformSpawnSampler;
use wayfind_test_utils::{four_room_layout, homes, MockPhysics, ScriptedTrainer};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = EnvConfig::default()
        .seed(7)
        .dt(0.1)
        .max_episode_duration(5.0)
        .max_explorer_room_count(1)
        .turn_policy(TurnPolicy::SequentialHandoff);
    config.validate()?;

    let physics = MockPhysics::new();
    physics.set_action_step(0.2);
    let trainer = ScriptedTrainer::new(Action::new(1.0, 0.0));
    let mut env = LockstepEnv::new(
        config,
        four_room_layout(),
        homes(3),
        Box::new(physics.clone()),
        Box::new(UniformSpawnSampler::new(7)),
        Box::new(trainer.clone()),
    )?;

    // Script a little exploration: agent 0 wanders through room 0.
    physics.queue(ContactEvent::TriggerEnter {
        agent: AgentId(0),
        zone: ZoneRef::Room(RoomId(0)),
    });
    physics.queue(ContactEvent::TriggerExit {
        agent: AgentId(0),
        zone: ZoneRef::Room(RoomId(0)),
    });

    for summary in env.run_episodes(3, 1_000) {
        println!(
            "episode {} ended by {} after {} ticks: group return {:.3}, rooms visited {}",
            summary.episode,
            summary.reason,
            summary.ticks,
            summary.group_return,
            summary.rooms_visited
        );
    }
    let m = env.orchestrator().metrics();
    println!(
        "{} ticks, {} hand-offs, {} duplicate terminals dropped",
        m.ticks, m.handoffs, m.duplicate_terminals_dropped
    );
    Ok(())
}
