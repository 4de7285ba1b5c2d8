//! Interaction of an agent with an environment, one step at a time.
use crate::{record::Record, Agent, Env, Step, Transition};
use anyhow::Result;
use log::trace;
use rand::Rng;

/// Drives single environment steps and hands the resulting transitions to
/// the agent's update rule.
///
/// The sampler keeps the current observation across calls, resets the
/// environment at the start of each episode and truncates episodes at the
/// step cap. For agents with [`Agent::ON_POLICY`] it selects the action for
/// the next observation before the update and executes that same action on
/// the following call.
pub struct Sampler<E: Env> {
    env: E,

    /// Current observation; `None` at the start of an episode.
    prev_obs: Option<E::Obs>,

    /// Action already selected for `prev_obs` by an on-policy agent.
    next_act: Option<E::Act>,

    /// Steps taken in the current episode.
    episode_steps: usize,

    max_steps: usize,
}

impl<E: Env> Sampler<E> {
    /// Creates a sampler. Episodes are truncated after `max_steps` steps.
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            prev_obs: None,
            next_act: None,
            episode_steps: 0,
            max_steps,
        }
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Steps taken in the current episode.
    pub fn episode_steps(&self) -> usize {
        self.episode_steps
    }

    /// Performs one environment step and one update of the agent.
    ///
    /// Returns the step, with `is_truncated` set if the step cap was reached,
    /// and the record produced by the update.
    pub fn sample_and_update<A, R>(&mut self, agent: &mut A, rng: &mut R) -> Result<(Step<E>, Record)>
    where
        A: Agent<E>,
        R: Rng,
    {
        let obs = match self.prev_obs.take() {
            Some(obs) => obs,
            None => {
                self.episode_steps = 0;
                self.next_act = None;
                self.env.reset()?
            }
        };

        let act = match self.next_act.take() {
            Some(act) => act,
            None => agent.sample(&obs, rng)?,
        };
        let mut step = self.env.step(&act, rng)?;
        self.episode_steps += 1;
        if !step.is_terminated && self.episode_steps >= self.max_steps {
            step.is_truncated = true;
        }

        let next_act = if A::ON_POLICY && !step.is_terminated {
            Some(agent.sample(&step.obs, rng)?)
        } else {
            None
        };

        let transition = Transition {
            obs,
            act,
            reward: step.reward,
            next_obs: step.obs.clone(),
            next_act: next_act.clone(),
            is_terminated: step.is_terminated,
        };
        let record = agent.opt_with_record(&transition, rng)?;
        trace!(
            "{:?} --{:?}--> {:?}, reward = {}",
            transition.obs,
            transition.act,
            transition.next_obs,
            transition.reward
        );

        if !step.is_done() {
            self.prev_obs = Some(step.obs.clone());
            self.next_act = next_act;
        }

        Ok((step, record))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{record::Record, DiscreteAct, Policy};
    use rand::{rngs::SmallRng, SeedableRng};

    /// Corridor of `len` cells; action 1 moves right, the last cell is terminal.
    struct Corridor {
        pos: usize,
        len: usize,
    }

    impl Env for Corridor {
        type Config = usize;
        type Obs = usize;
        type Act = DiscreteAct;
        type Info = ();

        fn build(config: &usize) -> Result<Self> {
            Ok(Self { pos: 0, len: *config })
        }

        fn n_actions(&self) -> usize {
            2
        }

        fn reset(&mut self) -> Result<usize> {
            self.pos = 0;
            Ok(0)
        }

        fn step(&mut self, a: &DiscreteAct, _rng: &mut impl Rng) -> Result<Step<Self>> {
            if a.0 == 1 {
                self.pos = (self.pos + 1).min(self.len - 1);
            }
            let done = self.pos == self.len - 1;
            Ok(Step::new(self.pos, *a, -1.0, done, ()))
        }
    }

    impl crate::Obs for usize {}

    /// Alternates its choice on every call and remembers what it was given.
    struct Alternating {
        calls: usize,
        seen_next_acts: Vec<Option<DiscreteAct>>,
    }

    impl Policy<Corridor> for Alternating {
        fn sample(&mut self, _obs: &usize, _rng: &mut impl Rng) -> Result<DiscreteAct> {
            self.calls += 1;
            Ok(DiscreteAct(self.calls % 2))
        }
    }

    impl Agent<Corridor> for Alternating {
        const ON_POLICY: bool = true;

        fn train(&mut self) {}

        fn eval(&mut self) {}

        fn is_train(&self) -> bool {
            true
        }

        fn opt_with_record(
            &mut self,
            transition: &Transition<Corridor>,
            _rng: &mut impl Rng,
        ) -> Result<Record> {
            self.seen_next_acts.push(transition.next_act);
            Ok(Record::empty())
        }
    }

    #[test]
    fn test_on_policy_action_is_reused() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut sampler = Sampler::new(Corridor::build(&10)?, 100);
        let mut agent = Alternating {
            calls: 0,
            seen_next_acts: vec![],
        };

        let (s1, _) = sampler.sample_and_update(&mut agent, &mut rng)?;
        let (s2, _) = sampler.sample_and_update(&mut agent, &mut rng)?;

        // first action comes from a fresh call, the second is the pre-selected one
        assert_eq!(s1.act, DiscreteAct(1));
        assert_eq!(agent.seen_next_acts[0], Some(DiscreteAct(0)));
        assert_eq!(s2.act, DiscreteAct(0));
        Ok(())
    }

    #[test]
    fn test_truncation_at_step_cap() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut sampler = Sampler::new(Corridor::build(&100)?, 3);
        let mut agent = Alternating {
            calls: 0,
            seen_next_acts: vec![],
        };

        let mut flags = vec![];
        for _ in 0..4 {
            let (step, _) = sampler.sample_and_update(&mut agent, &mut rng)?;
            flags.push((step.is_terminated, step.is_truncated));
        }
        assert_eq!(
            flags,
            vec![(false, false), (false, false), (false, true), (false, false)]
        );
        assert_eq!(sampler.episode_steps(), 1);
        Ok(())
    }
}
