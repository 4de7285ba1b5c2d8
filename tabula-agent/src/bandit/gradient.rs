use super::{check_arm, check_n_arms, load_yaml, save_yaml};
use crate::explorer::sample_categorical;
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tabula_core::{
    error::RlError,
    record::{Record, RecordValue},
    util::{argmax_first, softmax},
    Act, Agent, Configurable, Env, Policy, Transition,
};

/// Configuration of [`GradientBandit`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct GradientBanditConfig {
    /// Number of arms.
    pub n_arms: usize,

    /// Step size of the preference update.
    pub alpha: f64,

    /// If `false`, the baseline stays at zero.
    pub baseline: bool,
}

impl Default for GradientBanditConfig {
    fn default() -> Self {
        Self {
            n_arms: 4,
            alpha: 0.01,
            baseline: true,
        }
    }
}

impl GradientBanditConfig {
    /// Sets the number of arms.
    pub fn n_arms(mut self, v: usize) -> Self {
        self.n_arms = v;
        self
    }

    /// Sets the step size.
    pub fn alpha(mut self, v: f64) -> Self {
        self.alpha = v;
        self
    }

    /// Enables or disables the baseline.
    pub fn baseline(mut self, v: bool) -> Self {
        self.baseline = v;
        self
    }

    /// Constructs [`GradientBanditConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_yaml(path, "gradient bandit")
    }

    /// Saves [`GradientBanditConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_yaml(self, path, "gradient bandit")
    }
}

/// Stochastic gradient ascent on arm preferences `H`.
///
/// Arms are sampled from `softmax(H)`. An update first moves the baseline
/// toward the reward as a running average, then with `error = r - baseline`
/// and `p = softmax(H)`:
/// `H[a] += alpha * error * (1 - p[a])` for the pulled arm and
/// `H[b] -= alpha * error * p[b]` for every other arm.
pub struct GradientBandit {
    prefs: Vec<f64>,
    baseline: f64,
    use_baseline: bool,
    n: u64,
    counts: Vec<u64>,
    alpha: f64,
    train: bool,
}

impl GradientBandit {
    /// Preferences of each arm.
    pub fn preferences(&self) -> &[f64] {
        &self.prefs
    }

    /// Current action probabilities.
    pub fn probs(&self) -> Vec<f64> {
        softmax(&self.prefs)
    }

    /// Running average of all rewards, or zero without a baseline.
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Number of pulls of each arm.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Selects an arm.
    pub fn select_action(&mut self, rng: &mut impl Rng) -> Result<usize> {
        if self.train {
            sample_categorical(&self.probs(), rng)
        } else {
            Ok(argmax_first(&self.prefs))
        }
    }

    /// Updates the preferences after pulling arm `a`. Returns the error
    /// `r - baseline`.
    pub fn update(&mut self, a: usize, reward: f64) -> Result<f64> {
        check_arm(a, self.prefs.len())?;
        self.counts[a] += 1;
        self.n += 1;
        if self.use_baseline {
            self.baseline += (reward - self.baseline) / self.n as f64;
        }
        let error = reward - self.baseline;
        let probs = self.probs();
        for (b, (h, p)) in self.prefs.iter_mut().zip(probs).enumerate() {
            if b == a {
                *h += self.alpha * error * (1.0 - p);
            } else {
                *h -= self.alpha * error * p;
            }
        }
        Ok(error)
    }
}

impl Configurable for GradientBandit {
    type Config = GradientBanditConfig;

    fn build(config: Self::Config) -> Result<Self> {
        check_n_arms(config.n_arms)?;
        if config.alpha.is_nan() || config.alpha <= 0.0 {
            return Err(RlError::InvalidConfig(format!("alpha = {}", config.alpha)).into());
        }
        Ok(Self {
            prefs: vec![0.0; config.n_arms],
            baseline: 0.0,
            use_baseline: config.baseline,
            n: 0,
            counts: vec![0; config.n_arms],
            alpha: config.alpha,
            train: true,
        })
    }
}

impl<E> Policy<E> for GradientBandit
where
    E: Env,
    E::Act: From<usize>,
{
    fn sample(&mut self, _obs: &E::Obs, rng: &mut impl Rng) -> Result<E::Act> {
        Ok(self.select_action(rng)?.into())
    }
}

impl<E> Agent<E> for GradientBandit
where
    E: Env,
    E::Act: From<usize>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt_with_record(&mut self, t: &Transition<E>, _rng: &mut impl Rng) -> Result<Record> {
        let error = self.update(t.act.index(), t.reward)?;
        Ok(Record::from_slice(&[
            ("td_error", RecordValue::Scalar(error as f32)),
            ("baseline", RecordValue::Scalar(self.baseline as f32)),
            (
                "probs",
                RecordValue::Array1(self.probs().iter().map(|&p| p as f32).collect()),
            ),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_update_rule() -> Result<()> {
        let mut agent = GradientBandit::build(
            GradientBanditConfig::default()
                .n_arms(2)
                .alpha(0.5)
                .baseline(false),
        )?;
        let error = agent.update(0, 2.0)?;
        assert_eq!(error, 2.0);
        // p = (0.5, 0.5) before the update
        assert_abs_diff_eq!(agent.preferences()[0], 0.5);
        assert_abs_diff_eq!(agent.preferences()[1], -0.5);
        Ok(())
    }

    #[test]
    fn test_baseline_is_running_average() -> Result<()> {
        let mut agent = GradientBandit::build(GradientBanditConfig::default())?;
        for (a, r) in [(0, 1.0), (1, 2.0), (2, 6.0)] {
            agent.update(a, r)?;
        }
        assert_abs_diff_eq!(agent.baseline(), 3.0);
        // preferences always sum to zero
        assert_abs_diff_eq!(agent.preferences().iter().sum::<f64>(), 0.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_probs_stay_valid_for_large_preferences() -> Result<()> {
        let mut agent = GradientBandit::build(GradientBanditConfig::default().n_arms(3).alpha(1.0))?;
        for _ in 0..200 {
            agent.update(1, 1e6)?;
            agent.update(0, -1e6)?;
        }
        let probs = agent.probs();
        assert!(probs.iter().all(|p| p.is_finite()));
        assert_abs_diff_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        Ok(())
    }
}
