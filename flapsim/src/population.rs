use crate::{Agent, AgentConfig, AgentState, DeathCause, Policy};

/// The agents of a round, in identity order.
///
/// Every agent carries its own policy reference and
/// fitness, so there are no parallel collections to
/// keep aligned. Removal happens in one batched,
/// order-preserving [`cull`] per tick; a culled agent's
/// last fitness and cause of death are kept in a ledger
/// indexed by identity.
///
/// [`cull`]: Population::cull
#[derive(Debug)]
pub struct Population<'p, P> {
    agents: Vec<Agent<'p, P>>,
    ledger: Vec<f32>,
    causes: Vec<Option<DeathCause>>,
}

impl<'p, P: Policy> Population<'p, P> {
    /// Creates one live agent per policy. Agent `i`
    /// is controlled by `policies[i]`.
    pub fn new(policies: &'p mut [P], config: &AgentConfig) -> Population<'p, P> {
        let agents: Vec<_> = policies
            .iter_mut()
            .enumerate()
            .map(|(id, policy)| Agent::new(id, policy, config))
            .collect();
        Population {
            ledger: vec![0.0; agents.len()],
            causes: vec![None; agents.len()],
            agents,
        }
    }

    /// Adds `amount` to every live agent's fitness.
    pub fn award(&mut self, amount: f32) {
        for agent in self.alive_mut() {
            agent.award(amount);
        }
    }
}

impl<'p, P> Population<'p, P> {
    /// Removes every dead agent, recording its fitness and
    /// cause of death, and returns the removed ids in order.
    ///
    /// # Panics
    /// Panics if the surviving agents are no longer in
    /// identity order.
    pub fn cull(&mut self) -> Vec<usize> {
        let mut removed = vec![];
        let ledger = &mut self.ledger;
        let causes = &mut self.causes;
        self.agents.retain(|agent| match agent.state() {
            AgentState::Alive => true,
            AgentState::Dead(cause) => {
                ledger[agent.id()] = agent.fitness();
                causes[agent.id()] = Some(cause);
                removed.push(agent.id());
                false
            }
        });
        assert!(
            self.agents.windows(2).all(|w| w[0].id() < w[1].id()),
            "population lost identity order"
        );
        removed
    }

    /// Returns the first live agent, whose position
    /// selects the obstacle everyone observes.
    pub fn lead(&self) -> Option<&Agent<'p, P>> {
        self.agents.iter().find(|a| a.is_alive())
    }

    pub fn agents(&self) -> &[Agent<'p, P>] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent<'p, P>] {
        &mut self.agents
    }

    pub fn alive(&self) -> impl Iterator<Item = &Agent<'p, P>> {
        self.agents.iter().filter(|a| a.is_alive())
    }

    pub fn alive_mut(&mut self) -> impl Iterator<Item = &mut Agent<'p, P>> {
        self.agents.iter_mut().filter(|a| a.is_alive())
    }

    /// Number of agents not yet culled.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of agents the population started with.
    pub fn initial_size(&self) -> usize {
        self.ledger.len()
    }

    /// Returns the current fitness of agent `id`, culled or not.
    pub fn fitness_of(&self, id: usize) -> Option<f32> {
        match self.agents.binary_search_by_key(&id, |a| a.id()) {
            Ok(i) => Some(self.agents[i].fitness()),
            Err(_) => self.ledger.get(id).copied(),
        }
    }

    /// Returns how agent `id` died, or `None` while it lives.
    pub fn cause_of(&self, id: usize) -> Option<DeathCause> {
        match self.agents.binary_search_by_key(&id, |a| a.id()) {
            Ok(i) => match self.agents[i].state() {
                AgentState::Alive => None,
                AgentState::Dead(cause) => Some(cause),
            },
            Err(_) => self.causes.get(id).copied().flatten(),
        }
    }

    /// Returns every agent's fitness in identity order.
    pub fn into_fitness(self) -> Vec<f32> {
        let mut ledger = self.ledger;
        for agent in &self.agents {
            ledger[agent.id()] = agent.fitness();
        }
        ledger
    }
}
