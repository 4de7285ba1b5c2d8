use anyhow::Result;
use tabula::{
    agent::{
        explorer::EpsilonGreedy, GradientBandit, GradientBanditConfig, SampleAverage,
        SampleAverageConfig, ThompsonAgent, ThompsonConfig, Ucb1Agent, Ucb1Config,
    },
    core::{
        record::BufferedRecorder, Agent, Configurable, DefaultEvaluator, Env, Trainer,
        TrainerConfig,
    },
    env::{BanditConfig, BanditEnv},
};

const N_PULLS: usize = 2000;
const SEED: u64 = 7;

fn regret<A: Agent<BanditEnv>>(name: &str, config: &BanditConfig, agent: &mut A) -> Result<()> {
    let mut recorder = BufferedRecorder::new();
    let mut evaluator = DefaultEvaluator::<BanditEnv>::new(config, 0)?;
    let trainer_config = TrainerConfig::bandit(N_PULLS).seed(SEED).record_steps(true);
    let mut trainer = Trainer::<BanditEnv>::build(trainer_config, config.clone());
    trainer.train(agent, &mut recorder, &mut evaluator)?;

    let actions: Vec<usize> = recorder
        .scalars("action")
        .into_iter()
        .map(|a| a as usize)
        .collect();
    let env = BanditEnv::build(config)?;
    println!("{:>16}: total regret = {:.1}", name, env.regret(&actions)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let gaussian = BanditConfig::gaussian(vec![0.2, -0.8, 1.5, 0.4, 1.1]);
    let n_arms = gaussian.means().len();
    regret(
        "epsilon-greedy",
        &gaussian,
        &mut SampleAverage::build(
            SampleAverageConfig::default()
                .n_arms(n_arms)
                .explorer(EpsilonGreedy::constant(0.1)),
        )?,
    )?;
    regret(
        "UCB1",
        &gaussian,
        &mut Ucb1Agent::build(Ucb1Config::default().n_arms(n_arms))?,
    )?;
    regret(
        "gradient",
        &gaussian,
        &mut GradientBandit::build(GradientBanditConfig::default().n_arms(n_arms).alpha(0.1))?,
    )?;

    let bernoulli = BanditConfig::bernoulli(vec![0.3, 0.5, 0.7]);
    regret(
        "Thompson",
        &bernoulli,
        &mut ThompsonAgent::build(ThompsonConfig::default().n_arms(3))?,
    )?;
    Ok(())
}
