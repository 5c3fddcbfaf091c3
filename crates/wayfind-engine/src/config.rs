//! Environment configuration, validation and YAML persistence.
//!
//! [`EnvConfig`] is the builder-input for constructing an
//! [`EpisodeOrchestrator`](crate::orchestrator::EpisodeOrchestrator).
//! [`validate()`](EnvConfig::validate) checks every numeric and
//! structural invariant once at startup; a config that fails never
//! produces a running environment.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use wayfind_core::{Bounds, ConfigError, TerminalReason};
use wayfind_rooms::{GoalSelection, TargetPlacement};

// ── TurnPolicy ─────────────────────────────────────────────────────

/// Which agents receive actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPolicy {
    /// Every agent is active every tick.
    Independent,
    /// One agent at a time; control rotates in roster order with a
    /// travel phase to the predecessor's stop pose.
    #[default]
    SequentialHandoff,
}

// ── DiscoveryGroupReward ───────────────────────────────────────────

/// Which magnitude a first visit to a non-goal room adds to the group
/// return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryGroupReward {
    /// [`RewardConfig::room_discovered`].
    #[default]
    Discovery,
    /// [`RewardConfig::found_goal_room`], as one multi-agent layout did.
    FoundGoalRoom,
    /// Nothing; discovery is rewarded individually only.
    None,
}

// ── RewardConfig ───────────────────────────────────────────────────

/// Reward and penalty magnitudes. Penalties are negative numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Touching the target. Default: 1.0.
    pub goal_reached: f32,
    /// Hitting a wall or another agent. Default: -1.0.
    pub obstacle_hit: f32,
    /// Stuck timeout. Default: -1.0.
    pub stuck: f32,
    /// Episode-duration timeout, group only. Default: -1.0.
    pub timeout: f32,
    /// First visit to a non-goal room. Default: 0.1.
    pub room_discovered: f32,
    /// Entering an already visited room. Default: -0.2.
    pub room_revisited: f32,
    /// First entry into the goal room. Default: 0.5.
    pub found_goal_room: f32,
    /// Total step penalty spread over `max_steps`. Default: -1.0.
    pub step_penalty: f32,
    /// First pass through the goal room's door. Default: 2.5.
    pub door: f32,
    /// Peak per-second shaping reward near the target. Default: 0.1.
    pub approach_reward: f32,
    /// Distance at which approach shaping starts. Default: 5.0.
    pub approach_radius: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            goal_reached: 1.0,
            obstacle_hit: -1.0,
            stuck: -1.0,
            timeout: -1.0,
            room_discovered: 0.1,
            room_revisited: -0.2,
            found_goal_room: 0.5,
            step_penalty: -1.0,
            door: 2.5,
            approach_reward: 0.1,
            approach_radius: 5.0,
        }
    }
}

impl RewardConfig {
    /// The reward applied when an episode ends for `reason`.
    pub fn terminal(&self, reason: TerminalReason) -> f32 {
        match reason {
            TerminalReason::GoalReached => self.goal_reached,
            TerminalReason::ObstacleHit => self.obstacle_hit,
            TerminalReason::Stuck => self.stuck,
            TerminalReason::Timeout => self.timeout,
        }
    }

    fn fields(&self) -> [(&'static str, f32); 11] {
        [
            ("rewards.goal_reached", self.goal_reached),
            ("rewards.obstacle_hit", self.obstacle_hit),
            ("rewards.stuck", self.stuck),
            ("rewards.timeout", self.timeout),
            ("rewards.room_discovered", self.room_discovered),
            ("rewards.room_revisited", self.room_revisited),
            ("rewards.found_goal_room", self.found_goal_room),
            ("rewards.step_penalty", self.step_penalty),
            ("rewards.door", self.door),
            ("rewards.approach_reward", self.approach_reward),
            ("rewards.approach_radius", self.approach_radius),
        ]
    }
}

// ── SpawnConfig ────────────────────────────────────────────────────

/// Where agents start each episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnMode {
    /// Each agent's registered home pose.
    #[default]
    Home,
    /// A free point sampled uniformly in [`SpawnConfig::area`].
    Random,
}

/// Spawn placement settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Placement strategy. Default: [`SpawnMode::Home`].
    pub mode: SpawnMode,
    /// Sampling area. Required for [`SpawnMode::Random`].
    pub area: Option<Bounds>,
    /// Radius a spawn point must keep free of obstacles. Default: 1.0.
    pub clearance_radius: f32,
    /// Samples drawn before falling back to the area center. Default: 100.
    pub max_attempts: u32,
    /// Height above the area center for sampled points. Default: 1.0.
    pub height: f32,
    /// Re-roll each agent's heading uniformly every episode. Default: false.
    pub randomize_yaw: bool,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            mode: SpawnMode::Home,
            area: None,
            clearance_radius: 1.0,
            max_attempts: 100,
            height: 1.0,
            randomize_yaw: false,
        }
    }
}

// ── StuckConfig ────────────────────────────────────────────────────

/// Built-in stuck detection for active agents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StuckConfig {
    /// Seconds without progress before the agent counts as stuck.
    /// `None` disables the detector. Default: `None`.
    pub timeout_secs: Option<f64>,
    /// Displacement that counts as progress. Default: 0.05.
    pub min_progress: f32,
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            min_progress: 0.05,
        }
    }
}

// ── EnvConfig ──────────────────────────────────────────────────────

/// Complete configuration of an exploration environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Seed of the environment random stream. Default: 0.
    pub seed: u64,
    /// Fixed simulation timestep in seconds. Default: 0.02.
    pub dt: f64,
    /// Simulated seconds before an episode times out. Default: 30.0.
    pub max_episode_duration: f64,
    /// Steps the step penalty is spread over. 0 applies the raw
    /// penalty every step. Default: 5000.
    pub max_steps: u32,
    /// Turn policy. Default: [`TurnPolicy::SequentialHandoff`].
    pub turn_policy: TurnPolicy,
    /// Goal-room selection policy. Default: [`GoalSelection::Global`].
    pub goal_selection: GoalSelection,
    /// New rooms an agent may discover before handing off. 0 disables
    /// the budget. Default: 5.
    pub max_explorer_room_count: u32,
    /// Distance at which a travelling agent snaps to its stop pose.
    /// Default: 0.5.
    pub stop_distance: f32,
    /// Reward magnitudes.
    pub rewards: RewardConfig,
    /// Group reward mapping for room discovery.
    pub discovery_group_reward: DiscoveryGroupReward,
    /// Whether wall and agent collisions end the episode. Default: true.
    pub obstacle_hit_terminates: bool,
    /// Run the post-terminal reset at the start of the next tick.
    /// Default: false.
    pub defer_reset: bool,
    /// Spawn placement.
    pub spawn: SpawnConfig,
    /// Stuck detection.
    pub stuck: StuckConfig,
    /// Target placement inside the goal room.
    pub target: TargetPlacement,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            dt: 0.02,
            max_episode_duration: 30.0,
            max_steps: 5000,
            turn_policy: TurnPolicy::default(),
            goal_selection: GoalSelection::default(),
            max_explorer_room_count: 5,
            stop_distance: 0.5,
            rewards: RewardConfig::default(),
            discovery_group_reward: DiscoveryGroupReward::default(),
            obstacle_hit_terminates: true,
            defer_reset: false,
            spawn: SpawnConfig::default(),
            stuck: StuckConfig::default(),
            target: TargetPlacement::default(),
        }
    }
}

impl EnvConfig {
    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the timestep in seconds.
    pub fn dt(mut self, v: f64) -> Self {
        self.dt = v;
        self
    }

    /// Sets the episode timeout in simulated seconds.
    pub fn max_episode_duration(mut self, v: f64) -> Self {
        self.max_episode_duration = v;
        self
    }

    /// Sets the step count the step penalty is spread over.
    pub fn max_steps(mut self, v: u32) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the turn policy.
    pub fn turn_policy(mut self, v: TurnPolicy) -> Self {
        self.turn_policy = v;
        self
    }

    /// Sets the goal-room selection policy.
    pub fn goal_selection(mut self, v: GoalSelection) -> Self {
        self.goal_selection = v;
        self
    }

    /// Sets the per-agent room-exploration budget.
    pub fn max_explorer_room_count(mut self, v: u32) -> Self {
        self.max_explorer_room_count = v;
        self
    }

    /// Sets the hand-off arrival threshold.
    pub fn stop_distance(mut self, v: f32) -> Self {
        self.stop_distance = v;
        self
    }

    /// Sets the reward magnitudes.
    pub fn rewards(mut self, v: RewardConfig) -> Self {
        self.rewards = v;
        self
    }

    /// Sets the group reward mapping for room discovery.
    pub fn discovery_group_reward(mut self, v: DiscoveryGroupReward) -> Self {
        self.discovery_group_reward = v;
        self
    }

    /// Sets whether obstacle hits end the episode.
    pub fn obstacle_hit_terminates(mut self, v: bool) -> Self {
        self.obstacle_hit_terminates = v;
        self
    }

    /// Sets whether the post-terminal reset waits for the next tick.
    pub fn defer_reset(mut self, v: bool) -> Self {
        self.defer_reset = v;
        self
    }

    /// Sets spawn placement.
    pub fn spawn(mut self, v: SpawnConfig) -> Self {
        self.spawn = v;
        self
    }

    /// Sets stuck detection.
    pub fn stuck(mut self, v: StuckConfig) -> Self {
        self.stuck = v;
        self
    }

    /// Sets target placement.
    pub fn target(mut self, v: TargetPlacement) -> Self {
        self.target = v;
        self
    }

    /// Per-step penalty for one applied action.
    pub fn step_penalty_per_step(&self) -> f32 {
        if self.max_steps == 0 {
            self.rewards.step_penalty
        } else {
            self.rewards.step_penalty / self.max_steps as f32
        }
    }

    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Timestep finite and positive.
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(invalid("dt", format!("must be finite and positive, got {}", self.dt)));
        }
        // 2. Episode duration finite and positive.
        if !self.max_episode_duration.is_finite() || self.max_episode_duration <= 0.0 {
            return Err(invalid(
                "max_episode_duration",
                format!("must be finite and positive, got {}", self.max_episode_duration),
            ));
        }
        // 3. Stop distance finite and positive, or travel never ends.
        if !self.stop_distance.is_finite() || self.stop_distance <= 0.0 {
            return Err(invalid(
                "stop_distance",
                format!("must be finite and positive, got {}", self.stop_distance),
            ));
        }
        // 4. Goal selection and target placement.
        self.goal_selection.validate()?;
        self.target.validate()?;
        // 5. Rewards finite; approach radius non-negative.
        for (name, v) in self.rewards.fields() {
            if !v.is_finite() {
                return Err(invalid(name, format!("must be finite, got {v}")));
            }
        }
        if self.rewards.approach_radius < 0.0 {
            return Err(invalid(
                "rewards.approach_radius",
                format!("must be >= 0, got {}", self.rewards.approach_radius),
            ));
        }
        // 6. Spawn area required for random spawning, and well formed.
        let s = &self.spawn;
        if s.mode == SpawnMode::Random && s.area.is_none() {
            return Err(ConfigError::MissingAreaBounds);
        }
        if let Some(area) = &s.area {
            area.validate()
                .map_err(|reason| ConfigError::InvalidBounds { reason })?;
        }
        if !s.clearance_radius.is_finite() || s.clearance_radius < 0.0 {
            return Err(invalid(
                "spawn.clearance_radius",
                format!("must be finite and >= 0, got {}", s.clearance_radius),
            ));
        }
        if s.max_attempts == 0 {
            return Err(invalid("spawn.max_attempts", "must be at least 1".to_string()));
        }
        if !s.height.is_finite() {
            return Err(invalid("spawn.height", "must be finite".to_string()));
        }
        // 7. Stuck detector.
        if let Some(t) = self.stuck.timeout_secs {
            if !t.is_finite() || t <= 0.0 {
                return Err(invalid(
                    "stuck.timeout_secs",
                    format!("must be finite and positive, got {t}"),
                ));
            }
        }
        if !self.stuck.min_progress.is_finite() || self.stuck.min_progress < 0.0 {
            return Err(invalid(
                "stuck.min_progress",
                format!("must be finite and >= 0, got {}", self.stuck.min_progress),
            ));
        }
        Ok(())
    }

    /// Constructs [`EnvConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(rdr)?;
        info!("loaded environment config from {}", path.display());
        Ok(config)
    }

    /// Saves [`EnvConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidParameter { name, reason }
}
