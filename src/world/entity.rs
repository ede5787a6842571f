use rand::Rng;
use serde::Serialize;

use crate::world::grid::CellId;

/// Stable handle of an entity: its index in the world population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(usize);

impl EntityId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discriminant used by neighbourhood queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Agent,
    Cop,
}

/// Per-agent state. Hardship and risk aversion are fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// Openly rebelling.
    pub active: bool,
    /// Remaining ticks in jail; 0 means free.
    pub jail_term: u32,
    /// Reluctance to take risks, in [0, 1).
    pub risk_aversion: f64,
    /// Perceived hardship, in [0, 1).
    pub perceived_hardship: f64,
}

impl Agent {
    /// A quiet, free agent with uniformly drawn traits.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            active: false,
            jail_term: 0,
            risk_aversion: rng.r#gen::<f64>(),
            perceived_hardship: rng.r#gen::<f64>(),
        }
    }

    pub fn is_jailed(&self) -> bool {
        self.jail_term > 0
    }

    /// Neither rebelling nor jailed.
    pub fn is_quiet(&self) -> bool {
        !self.active && !self.is_jailed()
    }

    /// What cops see: an active agent that is not in jail.
    pub fn is_visible_rebel(&self) -> bool {
        self.active && !self.is_jailed()
    }

    pub fn arrest(&mut self, jail_term: u32) {
        self.active = false;
        self.jail_term = jail_term;
    }

    /// Count down one tick of the jail term, if any.
    pub fn serve_jail_time(&mut self) {
        self.jail_term = self.jail_term.saturating_sub(1);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Agent(Agent),
    Cop,
}

/// A mobile occupant of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    /// `None` only until the first placement.
    pub cell: Option<CellId>,
    pub kind: EntityKind,
}

impl Entity {
    pub fn agent(id: EntityId, agent: Agent) -> Self {
        Self {
            id,
            cell: None,
            kind: EntityKind::Agent(agent),
        }
    }

    pub fn cop(id: EntityId) -> Self {
        Self {
            id,
            cell: None,
            kind: EntityKind::Cop,
        }
    }

    pub fn role(&self) -> Role {
        match self.kind {
            EntityKind::Agent(_) => Role::Agent,
            EntityKind::Cop => Role::Cop,
        }
    }

    pub fn as_agent(&self) -> Option<&Agent> {
        match &self.kind {
            EntityKind::Agent(agent) => Some(agent),
            EntityKind::Cop => None,
        }
    }

    pub fn as_agent_mut(&mut self) -> Option<&mut Agent> {
        match &mut self.kind {
            EntityKind::Agent(agent) => Some(agent),
            EntityKind::Cop => None,
        }
    }

    /// Cops always move; agents only while free.
    pub fn can_move(&self) -> bool {
        match &self.kind {
            EntityKind::Agent(agent) => !agent.is_jailed(),
            EntityKind::Cop => true,
        }
    }

    /// Whether this entity blocks its cell for placement.
    pub fn occupies(&self) -> bool {
        self.can_move()
    }

    /// Console symbol: `C`, `A+` (active), `A*` (jailed) or `A-` (quiet).
    pub fn symbol(&self) -> &'static str {
        match &self.kind {
            EntityKind::Cop => "C",
            EntityKind::Agent(agent) if agent.active => "A+",
            EntityKind::Agent(agent) if agent.is_jailed() => "A*",
            EntityKind::Agent(_) => "A-",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn agent_with(active: bool, jail_term: u32) -> Agent {
        Agent {
            active,
            jail_term,
            risk_aversion: 0.3,
            perceived_hardship: 0.6,
        }
    }

    #[test]
    fn random_agent_starts_quiet_and_free() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..100 {
            let agent = Agent::random(&mut rng);
            assert!(agent.is_quiet());
            assert!((0.0..1.0).contains(&agent.risk_aversion));
            assert!((0.0..1.0).contains(&agent.perceived_hardship));
        }
    }

    #[test]
    fn arrest_clears_activity_and_sets_term() {
        let mut agent = agent_with(true, 0);
        agent.arrest(12);
        assert!(!agent.active);
        assert_eq!(agent.jail_term, 12);
        assert!(agent.is_jailed());
    }

    #[test]
    fn zero_term_arrest_leaves_agent_free() {
        let mut agent = agent_with(true, 0);
        agent.arrest(0);
        assert!(!agent.is_jailed());
        assert!(agent.is_quiet());
    }

    #[test]
    fn jail_time_counts_down_to_zero() {
        let mut agent = agent_with(false, 2);
        agent.serve_jail_time();
        assert_eq!(agent.jail_term, 1);
        agent.serve_jail_time();
        assert_eq!(agent.jail_term, 0);
        agent.serve_jail_time();
        assert_eq!(agent.jail_term, 0);
    }

    #[test]
    fn jailed_agent_is_never_a_visible_rebel() {
        assert!(agent_with(true, 0).is_visible_rebel());
        assert!(!agent_with(true, 3).is_visible_rebel());
        assert!(!agent_with(false, 0).is_visible_rebel());
    }

    #[test]
    fn mobility_and_occupancy_by_variant() {
        let cop = Entity::cop(EntityId::new(0));
        assert!(cop.can_move());
        assert!(cop.occupies());
        assert_eq!(cop.role(), Role::Cop);
        assert!(cop.as_agent().is_none());

        let jailed = Entity::agent(EntityId::new(1), agent_with(false, 4));
        assert!(!jailed.can_move());
        assert!(!jailed.occupies());
        assert_eq!(jailed.role(), Role::Agent);

        let free = Entity::agent(EntityId::new(2), agent_with(false, 0));
        assert!(free.can_move());
        assert!(free.occupies());
    }

    #[test]
    fn symbols_reflect_status() {
        assert_eq!(Entity::cop(EntityId::new(0)).symbol(), "C");
        assert_eq!(Entity::agent(EntityId::new(1), agent_with(true, 0)).symbol(), "A+");
        assert_eq!(Entity::agent(EntityId::new(2), agent_with(false, 5)).symbol(), "A*");
        assert_eq!(Entity::agent(EntityId::new(3), agent_with(false, 0)).symbol(), "A-");
    }
}
