//! Episode state machine driving Q-learning one step at a time.

use std::{collections::VecDeque, path::PathBuf};

use log::{debug, info, warn};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    adapters::CsvTableRepository,
    movement::MovementResolver,
    pipeline::TrainingParams,
    ports::{Pathfinder, TableRepository, World},
    q_learning::{EpsilonGreedy, QTable, StateEncoder},
    reward::RewardFunction,
    types::{Action, Cell, Metric},
};

/// Smoothing factor of the running average return.
const RETURN_DECAY: f32 = 0.9;

/// Where the loop is in the episode lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    EpisodeStart,
    StepInProgress,
    EpisodeEnd,
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Agent and enemy share a cell
    Capture,
    /// The per-episode step cap was reached
    StepLimit,
    /// The enemy fell behind the configured escape distance
    Escaped,
}

impl Termination {
    pub fn is_capture(self) -> bool {
        self == Termination::Capture
    }
}

/// Summary of a finished episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Episode index (0-based)
    pub episode: usize,
    /// Steps taken
    pub steps: usize,
    /// Sum of rewards over the episode
    pub episode_return: f32,
    /// Running average return including this episode
    pub average_return: f32,
    /// Exploration rate used during the episode
    pub epsilon: f32,
    pub termination: Termination,
    /// Manhattan distance between agent and enemy at the end
    pub final_distance: u32,
}

/// Episode-boundary notification.
#[derive(Debug, Clone, PartialEq)]
pub enum EpisodeEvent {
    Started {
        episode: usize,
        agent: Cell,
        enemy: Cell,
    },
    Finished(EpisodeSummary),
    Checkpoint {
        episode: usize,
        path: PathBuf,
    },
}

/// What happened during one call to [`TrainingLoop::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// State the action was chosen in
    pub state: usize,
    pub action: Action,
    pub reward: f32,
    /// The move hit a wall or the border
    pub blocked: bool,
    /// Agent cell after the move
    pub agent: Cell,
    /// Enemy cell after it advanced
    pub enemy: Cell,
    /// Set when this step ended the episode
    pub termination: Option<Termination>,
}

/// Q-learning session over a world and a pursuer.
///
/// The loop owns its table, parameters and random source for the whole
/// session. Episode boundaries are reported through an event queue read with
/// [`TrainingLoop::drain_events`].
pub struct TrainingLoop<W: World, P: Pathfinder> {
    params: TrainingParams,
    world: W,
    pathfinder: P,
    table: QTable,
    encoder: StateEncoder,
    resolver: MovementResolver,
    reward_fn: RewardFunction,
    repository: Box<dyn TableRepository>,
    rng: StdRng,
    phase: Phase,
    agent: Cell,
    enemy: Cell,
    current_episode: usize,
    current_step: usize,
    total_steps: usize,
    episode_return: f32,
    last_return: f32,
    average_return: f32,
    events: VecDeque<EpisodeEvent>,
}

impl<W: World, P: Pathfinder> TrainingLoop<W, P> {
    /// Start a session, resuming from the CSV snapshot at
    /// `params.snapshot_path` when one exists.
    pub fn initialize(params: TrainingParams, world: W, pathfinder: P) -> Result<Self> {
        Self::initialize_with_repository(params, world, pathfinder, Box::new(CsvTableRepository))
    }

    /// Start a session that reads and writes snapshots through `repository`.
    pub fn initialize_with_repository(
        params: TrainingParams,
        world: W,
        pathfinder: P,
        repository: Box<dyn TableRepository>,
    ) -> Result<Self> {
        let table = load_or_fresh(&params, repository.as_ref());
        Self::start(params, world, pathfinder, table, repository)
    }

    /// Start a session with an explicit table.
    pub fn initialize_with_table(
        params: TrainingParams,
        world: W,
        pathfinder: P,
        table: QTable,
    ) -> Result<Self> {
        Self::start(params, world, pathfinder, table, Box::new(CsvTableRepository))
    }

    fn start(
        params: TrainingParams,
        world: W,
        pathfinder: P,
        table: QTable,
        repository: Box<dyn TableRepository>,
    ) -> Result<Self> {
        params.validate()?;
        let expected = (Action::COUNT, StateEncoder::NUM_STATES);
        if table.dimensions() != expected {
            return Err(Error::DimensionMismatch {
                expected_actions: expected.0,
                expected_states: expected.1,
                got_actions: table.num_actions(),
                got_states: table.num_states(),
            });
        }

        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let agent = world.random_cell(&mut rng);
        let enemy = world.random_cell(&mut rng);
        let reward_fn = RewardFunction::new(params.reward.clone());

        let mut session = Self {
            params,
            world,
            pathfinder,
            table,
            encoder: StateEncoder::new(),
            resolver: MovementResolver::new(),
            reward_fn,
            repository,
            rng,
            phase: Phase::EpisodeStart,
            agent,
            enemy,
            current_episode: 0,
            current_step: 0,
            total_steps: 0,
            episode_return: 0.0,
            last_return: 0.0,
            average_return: 0.0,
            events: VecDeque::new(),
        };
        session.begin_episode();
        Ok(session)
    }

    /// Advance the episode by one tick.
    ///
    /// With `train` set the action is chosen ε-greedily and the table is
    /// updated; otherwise the greedy action is taken and the table is left
    /// untouched. When the step ends the episode, the next episode is set up
    /// before returning, and the report still shows the terminal positions.
    pub fn step(&mut self, train: bool) -> Result<StepReport> {
        let state = self.encoder.encode(&self.agent, &self.enemy, &self.world);
        let action_index = EpsilonGreedy::new(self.params.epsilon).select_action(
            &self.table,
            state,
            train,
            &mut self.rng,
        )?;
        let action = Action::try_from(action_index)?;

        let attempt = self.resolver.attempt(action, self.agent, &self.world);
        let reward = self
            .reward_fn
            .reward(&self.agent, &attempt.target, &self.enemy);

        if train {
            let next_state = self
                .encoder
                .encode(&attempt.resolved, &self.enemy, &self.world);
            self.table.update(
                state,
                action_index,
                reward,
                next_state,
                self.params.alpha,
                self.params.gamma,
            )?;
        }

        self.agent = attempt.resolved;
        self.episode_return += reward;
        self.enemy = self
            .pathfinder
            .next_step_toward(&self.world, self.enemy, self.agent);
        self.current_step += 1;
        self.total_steps += 1;

        let termination = self.termination();
        let report = StepReport {
            state,
            action,
            reward,
            blocked: attempt.is_blocked(),
            agent: self.agent,
            enemy: self.enemy,
            termination,
        };

        if let Some(termination) = termination {
            self.finish_episode(termination)?;
        }
        Ok(report)
    }

    fn termination(&self) -> Option<Termination> {
        if self.agent == self.enemy {
            return Some(Termination::Capture);
        }
        if let Some(limit) = self.params.escape_distance {
            let distance = self
                .world
                .distance(&self.agent, &self.enemy, Metric::Manhattan);
            if distance >= limit as f32 {
                return Some(Termination::Escaped);
            }
        }
        (self.current_step >= self.params.max_steps).then_some(Termination::StepLimit)
    }

    fn finish_episode(&mut self, termination: Termination) -> Result<()> {
        self.phase = Phase::EpisodeEnd;
        self.last_return = self.episode_return;
        self.average_return =
            self.average_return * RETURN_DECAY + self.last_return * (1.0 - RETURN_DECAY);

        let summary = EpisodeSummary {
            episode: self.current_episode,
            steps: self.current_step,
            episode_return: self.last_return,
            average_return: self.average_return,
            epsilon: self.params.epsilon,
            termination,
            final_distance: self.agent.manhattan(&self.enemy),
        };
        debug!(
            "episode {} ended by {:?} after {} steps, return {:.2} (avg {:.2}, eps {:.3})",
            summary.episode,
            summary.termination,
            summary.steps,
            summary.episode_return,
            summary.average_return,
            summary.epsilon
        );
        self.events.push_back(EpisodeEvent::Finished(summary));

        self.reset_episode()
    }

    fn reset_episode(&mut self) -> Result<()> {
        self.current_episode += 1;
        let scheduled = self.params.epsilon_schedule.value(self.current_episode);
        self.params.epsilon = self.params.epsilon.min(scheduled);
        self.episode_return = 0.0;
        self.current_step = 0;

        if self.current_episode % self.params.episodes_between_saves == 0 {
            if let Some(path) = self.save_table()? {
                self.events.push_back(EpisodeEvent::Checkpoint {
                    episode: self.current_episode,
                    path,
                });
            }
        }

        self.phase = Phase::EpisodeStart;
        self.agent = self.world.random_cell(&mut self.rng);
        self.enemy = self.world.random_cell(&mut self.rng);
        self.begin_episode();
        Ok(())
    }

    fn begin_episode(&mut self) {
        self.events.push_back(EpisodeEvent::Started {
            episode: self.current_episode,
            agent: self.agent,
            enemy: self.enemy,
        });
        self.phase = Phase::StepInProgress;
    }

    /// Write the table to `params.snapshot_path`, if one is configured.
    pub fn save_table(&self) -> Result<Option<PathBuf>> {
        let Some(path) = self.params.snapshot_path.clone() else {
            return Ok(None);
        };
        self.repository.save(&self.table, &path)?;
        info!(
            "saved Q-table after episode {} to {} ({} updates)",
            self.current_episode,
            path.display(),
            self.table.update_count()
        );
        Ok(Some(path))
    }

    /// Move agent and enemy to specific cells for the running episode.
    pub fn place(&mut self, agent: (i32, i32), enemy: (i32, i32)) -> Result<()> {
        let lookup = |(x, y): (i32, i32)| {
            self.world
                .cell_at(x, y)
                .filter(|cell| cell.walkable)
                .ok_or_else(|| Error::config(format!("({x}, {y}) is not a walkable cell")))
        };
        let (agent, enemy) = (lookup(agent)?, lookup(enemy)?);
        self.agent = agent;
        self.enemy = enemy;
        Ok(())
    }

    /// Take all queued episode events, oldest first.
    pub fn drain_events(&mut self) -> Vec<EpisodeEvent> {
        self.events.drain(..).collect()
    }

    pub fn agent(&self) -> Cell {
        self.agent
    }

    pub fn enemy(&self) -> Cell {
        self.enemy
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Episodes completed in this session.
    pub fn current_episode(&self) -> usize {
        self.current_episode
    }

    /// Steps taken in the running episode.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Steps taken in this session.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Return accumulated so far in the running episode.
    pub fn episode_return(&self) -> f32 {
        self.episode_return
    }

    /// Return of the last finished episode.
    pub fn last_return(&self) -> f32 {
        self.last_return
    }

    /// Exponentially weighted average of episode returns.
    pub fn average_return(&self) -> f32 {
        self.average_return
    }

    pub fn epsilon(&self) -> f32 {
        self.params.epsilon
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// End the session and hand back the learned table.
    pub fn into_table(self) -> QTable {
        self.table
    }
}

fn load_or_fresh(params: &TrainingParams, repository: &dyn TableRepository) -> QTable {
    let fresh = || QTable::new(Action::COUNT, StateEncoder::NUM_STATES);
    let Some(path) = params.snapshot_path.as_deref() else {
        return fresh();
    };
    if !repository.exists(path) {
        info!("no Q-table at {}, starting fresh", path.display());
        return fresh();
    }
    match repository.load(path, Action::COUNT, StateEncoder::NUM_STATES) {
        Ok((table, report)) => {
            info!(
                "loaded Q-table from {} ({} records, {} skipped)",
                path.display(),
                report.applied,
                report.skipped
            );
            table
        }
        Err(err) => {
            warn!("could not load Q-table from {}: {err}; starting fresh", path.display());
            fresh()
        }
    }
}
