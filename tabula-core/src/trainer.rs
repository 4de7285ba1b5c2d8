//! Train [`Agent`].
mod config;
mod sampler;
use crate::{
    record::{AggregateRecorder, Record, RecordValue::Scalar, Recorder},
    Act, Agent, Env, Evaluator,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;
use rand::{rngs::SmallRng, SeedableRng};
pub use sampler::Sampler;

/// Summary of a training run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainStats {
    /// Episodes completed.
    pub episodes: usize,

    /// Environment steps taken over all episodes.
    pub env_steps: usize,

    /// Undiscounted return of each episode.
    pub episode_returns: Vec<f64>,

    /// Number of steps of each episode.
    pub episode_lengths: Vec<usize>,

    /// Number of episodes cut by the step cap.
    pub truncated_episodes: usize,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages training loop and related objects.
///
/// # Training loop
///
/// 0. Given an agent implementing [`Agent`], a recorder implementing
///    [`Recorder`] and [`AggregateRecorder`], and an [`Evaluator`].
/// 1. Build the [`Env`] and wrap it in a [`Sampler`]. Set the agent to
///    training mode.
/// 2. For each episode up to `max_episodes`:
///     1. Do environment steps with [`Sampler::sample_and_update`] until the
///        episode terminates or reaches `max_steps_per_episode`. Each step
///        performs exactly one update of the agent. If `record_steps` is set,
///        a record with `step`, `episode`, `action`, `reward` and the
///        agent's update record is written to the recorder.
///     2. Store a record with `episode`, `episode_return` and
///        `episode_length`.
///     3. If `(episode + 1) % eval_interval == 0`, evaluate the agent in
///        evaluation mode and add the evaluation result, `eval_return`, to
///        the record.
///     4. If `(episode + 1) % flush_record_interval == 0`, flush the recorder.
/// 3. Flush the recorder and return [`TrainStats`].
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|"Step&lt;E: Env&gt;"|C[Sampler]
///     C -->|"Transition&lt;E: Env&gt;"|A
///     R[SmallRng] -.->|&mut| A
///     R -.->|&mut| B
/// ```
///
/// All randomness is drawn from one [`SmallRng`] seeded with
/// [`TrainerConfig::seed`], so a run is reproducible.
pub struct Trainer<E: Env> {
    env_config: E::Config,
    config: TrainerConfig,
    rng: SmallRng,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig, env_config: E::Config) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed);
        Self {
            env_config,
            config,
            rng,
        }
    }

    /// The random source of the trainer.
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    fn is_interval(interval: usize, count: usize) -> bool {
        interval > 0 && count % interval == 0
    }

    /// Runs one episode.
    fn run_episode<A, R>(
        &mut self,
        agent: &mut A,
        sampler: &mut Sampler<E>,
        recorder: &mut R,
        episode: usize,
        stats: &mut TrainStats,
    ) -> Result<()>
    where
        A: Agent<E>,
        R: Recorder + AggregateRecorder,
    {
        let mut episode_return = 0f64;
        let mut episode_length = 0usize;

        loop {
            let (step, record_agent) = sampler.sample_and_update(agent, &mut self.rng)?;
            episode_return += step.reward;
            episode_length += 1;

            if self.config.record_steps {
                let record = Record::from_slice(&[
                    ("step", Scalar(stats.env_steps as f32)),
                    ("episode", Scalar(episode as f32)),
                    ("action", Scalar(step.act.index() as f32)),
                    ("reward", Scalar(step.reward as f32)),
                ]);
                recorder.write(record.merge(record_agent));
            }
            stats.env_steps += 1;

            if step.is_done() {
                if step.is_truncated {
                    stats.truncated_episodes += 1;
                }
                break;
            }
        }

        stats.episodes += 1;
        stats.episode_returns.push(episode_return);
        stats.episode_lengths.push(episode_length);
        Ok(())
    }

    /// Train the agent.
    pub fn train<A, R, D>(
        &mut self,
        agent: &mut A,
        recorder: &mut R,
        evaluator: &mut D,
    ) -> Result<TrainStats>
    where
        A: Agent<E>,
        R: Recorder + AggregateRecorder,
        D: Evaluator<E>,
    {
        let env = E::build(&self.env_config)?;
        let mut sampler = Sampler::new(env, self.config.max_steps_per_episode.max(1));
        let mut stats = TrainStats::default();
        agent.train();

        for episode in 0..self.config.max_episodes {
            self.run_episode(agent, &mut sampler, recorder, episode, &mut stats)?;

            let episode_return = stats.episode_returns.last().copied().unwrap_or_default();
            let episode_length = stats.episode_lengths.last().copied().unwrap_or_default();
            let mut record = Record::from_slice(&[
                ("episode", Scalar(episode as f32)),
                ("episode_return", Scalar(episode_return as f32)),
                ("episode_length", Scalar(episode_length as f32)),
            ]);

            // Evaluation
            if Self::is_interval(self.config.eval_interval, episode + 1) {
                info!("Starts evaluation of the trained agent");
                agent.eval();
                let record_eval = evaluator.evaluate(agent, &mut self.rng)?;
                agent.train();
                if let Ok(r) = record_eval.get_scalar("eval_return") {
                    info!("Episode {}: eval_return = {}", episode + 1, r);
                }
                record = record.merge(record_eval);
            }

            recorder.store(record);

            // Flush records
            if Self::is_interval(self.config.flush_record_interval, episode + 1) {
                recorder.flush((episode + 1) as _);
            }
        }

        recorder.flush(stats.episodes as _);
        info!(
            "Finished training: {} episodes, {} steps",
            stats.episodes, stats.env_steps
        );
        Ok(stats)
    }
}
