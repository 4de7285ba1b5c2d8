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

const SEED: u64 = 42;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Runs `n_pulls` pulls and returns the pulled arms in order.
fn pull<A: Agent<BanditEnv>>(
    agent: &mut A,
    config: &BanditConfig,
    n_pulls: usize,
) -> Result<Vec<usize>> {
    let mut recorder = BufferedRecorder::new();
    let mut evaluator = DefaultEvaluator::<BanditEnv>::new(config, 0)?;
    let trainer_config = TrainerConfig::bandit(n_pulls).seed(SEED).record_steps(true);
    let mut trainer = Trainer::<BanditEnv>::build(trainer_config, config.clone());
    let stats = trainer.train(agent, &mut recorder, &mut evaluator)?;

    assert_eq!(stats.episodes, 1);
    assert_eq!(stats.env_steps, n_pulls);
    assert_eq!(stats.truncated_episodes, 1);
    Ok(recorder
        .scalars("action")
        .into_iter()
        .map(|a| a as usize)
        .collect())
}

fn share(actions: &[usize], arm: usize) -> f64 {
    actions.iter().filter(|&&a| a == arm).count() as f64 / actions.len() as f64
}

#[test]
fn test_thompson_prefers_better_arm() -> Result<()> {
    init();
    let config = BanditConfig::bernoulli(vec![0.9, 0.1]);
    let mut agent = ThompsonAgent::build(ThompsonConfig::default())?;
    let actions = pull(&mut agent, &config, 1000)?;

    assert!(share(&actions[actions.len() - 100..], 0) > 0.8);
    assert!(agent.posterior_means()[0] > agent.posterior_means()[1]);
    Ok(())
}

#[test]
fn test_ucb_concentrates_on_best_arm() -> Result<()> {
    init();
    let config = BanditConfig::gaussian(vec![0.0, 1.0, 2.0]);
    let mut agent = Ucb1Agent::build(Ucb1Config::default().n_arms(3))?;
    let actions = pull(&mut agent, &config, 2000)?;

    // every arm is tried once before any repeats
    let mut first = actions[..3].to_vec();
    first.sort();
    assert_eq!(first, vec![0, 1, 2]);
    assert!(agent.counts()[2] > 1000);
    Ok(())
}

#[test]
fn test_sample_average_estimates_means() -> Result<()> {
    init();
    let config = BanditConfig::gaussian(vec![0.0, 1.0]).std(0.5);
    let explorer = EpsilonGreedy::constant(0.1);
    let mut agent = SampleAverage::build(SampleAverageConfig::default().n_arms(2).explorer(explorer))?;
    let actions = pull(&mut agent, &config, 1000)?;

    assert!(share(&actions, 1) > 0.7);
    assert!((agent.means()[1] - 1.0).abs() < 0.2);
    Ok(())
}

#[test]
fn test_gradient_bandit_learns_preferences() -> Result<()> {
    init();
    let config = BanditConfig::gaussian(vec![-1.0, 1.0, 0.0]);
    let mut agent =
        GradientBandit::build(GradientBanditConfig::default().n_arms(3).alpha(0.1))?;
    pull(&mut agent, &config, 2000)?;

    let probs = agent.probs();
    assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    assert!(probs[1] > 0.8);
    Ok(())
}

#[test]
fn test_gradient_bandit_records_probs() -> Result<()> {
    init();
    let config = BanditConfig::bernoulli(vec![0.2, 0.8]);
    let mut agent = GradientBandit::build(GradientBanditConfig::default().n_arms(2))?;
    let mut recorder = BufferedRecorder::new();
    let mut evaluator = DefaultEvaluator::<BanditEnv>::new(&config, 0)?;
    let trainer_config = TrainerConfig::bandit(50).seed(SEED).record_steps(true);
    let mut trainer = Trainer::<BanditEnv>::build(trainer_config, config);
    trainer.train(&mut agent, &mut recorder, &mut evaluator)?;

    let steps: Vec<_> = recorder.iter().filter(|r| r.get("action").is_some()).collect();
    assert_eq!(steps.len(), 50);
    for record in &steps {
        let probs = record.get_array1("probs")?;
        assert_eq!(probs.len(), 2);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }
    let last = steps[steps.len() - 1].get_array1("probs")?;
    let expected: Vec<f32> = agent.probs().iter().map(|&p| p as f32).collect();
    assert_eq!(last, expected);
    Ok(())
}

#[test]
fn test_ucb_regret_below_uniform() -> Result<()> {
    init();
    let config = BanditConfig::gaussian(vec![0.2, -0.8, 1.5, 0.4, 1.1]);
    let env = BanditEnv::build(&config)?;
    let mut agent = Ucb1Agent::build(Ucb1Config::default().n_arms(5))?;
    let actions = pull(&mut agent, &config, 2000)?;

    let uniform: Vec<usize> = (0..actions.len()).map(|t| t % 5).collect();
    assert!(env.regret(&actions)? < 0.5 * env.regret(&uniform)?);
    Ok(())
}

#[test]
fn test_agent_with_extra_arm_fails() -> Result<()> {
    init();
    let config = BanditConfig::bernoulli(vec![0.5, 0.5]);
    let mut agent = ThompsonAgent::build(ThompsonConfig::default().n_arms(3))?;
    let mut evaluator = DefaultEvaluator::<BanditEnv>::new(&config, 0)?;
    let mut trainer = Trainer::<BanditEnv>::build(TrainerConfig::bandit(200).seed(SEED), config);
    let mut recorder = BufferedRecorder::new();
    assert!(trainer.train(&mut agent, &mut recorder, &mut evaluator).is_err());
    Ok(())
}
