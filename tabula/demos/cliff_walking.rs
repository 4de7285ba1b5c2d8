use anyhow::Result;
use tabula::{
    agent::{QLearning, Sarsa, TdConfig},
    core::{
        record::LogRecorder, Agent, Configurable, DefaultEvaluator, Env, Trainer, TrainerConfig,
    },
    dp::{DpConfig, MdpSolver, ValueIteration},
    env::{GridWorld, GridWorldConfig},
};

const ALPHA: f64 = 0.5;
const GAMMA: f64 = 1.0;
const MAX_EPISODES: usize = 500;
const EVAL_INTERVAL: usize = 100;
const FLUSH_INTERVAL: usize = 100;
const SEED: u64 = 42;

fn trainer_config() -> TrainerConfig {
    TrainerConfig::default()
        .seed(SEED)
        .max_episodes(MAX_EPISODES)
        .eval_interval(EVAL_INTERVAL)
        .flush_record_interval(FLUSH_INTERVAL)
}

fn train<A: Agent<GridWorld>>(name: &str, agent: &mut A) -> Result<()> {
    let env_config = GridWorldConfig::cliff_walking();
    let mut evaluator = DefaultEvaluator::<GridWorld>::new(&env_config, 1)?;
    let mut recorder = LogRecorder::new();
    let mut trainer = Trainer::<GridWorld>::build(trainer_config(), env_config);
    let stats = trainer.train(agent, &mut recorder, &mut evaluator)?;

    let n = stats.episode_returns.len().min(100);
    let tail = &stats.episode_returns[stats.episode_returns.len() - n..];
    println!(
        "{}: mean return of the last {} episodes = {:.1}",
        name,
        n,
        tail.iter().sum::<f64>() / n as f64
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let td_config = TdConfig::grid(4, 12).alpha(ALPHA).gamma(GAMMA);
    train("Q-learning", &mut QLearning::build(td_config.clone())?)?;
    train("SARSA", &mut Sarsa::build(td_config)?)?;

    let env = GridWorld::build(&GridWorldConfig::cliff_walking())?;
    let mut solver = ValueIteration::new(env.model()?, DpConfig::default());
    let sweeps = solver.exec()?;
    println!(
        "Value iteration: {} sweeps, optimal value of the start = {:.2}",
        sweeps,
        solver.v_star(36)?
    );
    Ok(())
}
