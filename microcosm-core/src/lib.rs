use microcosm_types::{
    AgentId, AgentState, Census, Diet, Occupant, PlantState, SimMetrics, StructureState,
    TickSummary, WorldConfig, WorldSnapshot,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::grid::Grid;

mod brain;
mod combat;
mod genetics;
mod grid;
mod spawn;
mod turn;

#[cfg(test)]
mod tests;

pub use crate::genetics::{genome_hash, genome_similarity};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid world config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone)]
pub struct Simulation {
    config: WorldConfig,
    turn: u64,
    seed: u64,
    rng: ChaCha8Rng,
    next_agent_id: u64,
    agents: Vec<AgentState>,
    plants: Vec<PlantState>,
    structures: Vec<StructureState>,
    grid: Grid,
    metrics: SimMetrics,
}

impl Simulation {
    pub fn new(config: WorldConfig, seed: u64) -> Result<Self, SimError> {
        validate_config(&config)?;

        let grid = Grid::new(config.world_width, config.world_height);
        let mut sim = Self {
            config,
            turn: 0,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_agent_id: 0,
            agents: Vec::new(),
            plants: Vec::new(),
            structures: Vec::new(),
            grid,
            metrics: SimMetrics::default(),
        };

        sim.seed_world();
        if cfg!(debug_assertions) {
            sim.debug_assert_consistent_state();
        }
        Ok(sim)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn agents(&self) -> &[AgentState] {
        &self.agents
    }

    pub fn plants(&self) -> &[PlantState] {
        &self.plants
    }

    pub fn structures(&self) -> &[StructureState] {
        &self.structures
    }

    pub fn metrics(&self) -> &SimMetrics {
        &self.metrics
    }

    pub fn world_width(&self) -> u32 {
        self.config.world_width
    }

    pub fn world_height(&self) -> u32 {
        self.config.world_height
    }

    pub fn occupant_at(&self, x: i32, y: i32) -> Option<Occupant> {
        self.grid.get(x, y)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            turn: self.turn,
            rng_seed: self.seed,
            config: self.config.clone(),
            agents: self.agents.clone(),
            plants: self.plants.clone(),
            structures: self.structures.clone(),
            metrics: self.metrics.clone(),
        }
    }

    pub fn step_n(&mut self, n: u32) -> Vec<TickSummary> {
        (0..n).map(|_| self.tick()).collect()
    }

    pub fn reset(&mut self, seed: Option<u64>) {
        self.seed = seed.unwrap_or(self.seed);
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.turn = 0;
        self.next_agent_id = 0;
        self.agents.clear();
        self.plants.clear();
        self.structures.clear();
        self.grid.clear();
        self.metrics = SimMetrics::default();
        self.seed_world();
    }

    pub fn census(&self) -> Census {
        let mut census = Census {
            structures: self.structures.len() as u32,
            ..Census::default()
        };
        let mut energy_sum = 0.0;
        let mut alive = 0u32;
        for agent in &self.agents {
            if !agent.alive {
                continue;
            }
            match agent.diet {
                Diet::Herbivore => census.herbivores += 1,
                Diet::Omnivore => census.omnivores += 1,
                Diet::Carnivore => census.carnivores += 1,
            }
            energy_sum += agent.energy;
            alive += 1;
        }
        census.plants = self.plants.iter().filter(|plant| plant.alive).count() as u32;
        if alive > 0 {
            census.average_energy = energy_sum / alive as f32;
        }
        census
    }

    pub fn export_trace_jsonl(&mut self, ticks: u32) -> Vec<String> {
        let mut lines = Vec::with_capacity(ticks as usize);
        for _ in 0..ticks {
            let summary = self.tick();
            lines.push(
                serde_json::to_string(&summary).expect("serialize tick summary for trace export"),
            );
        }
        lines
    }

    pub(crate) fn debug_assert_consistent_state(&self) {
        if cfg!(debug_assertions) {
            for (idx, agent) in self.agents.iter().enumerate() {
                if !agent.alive {
                    continue;
                }
                debug_assert!(
                    self.grid.in_bounds(agent.x, agent.y),
                    "agent {:?} out of bounds at ({}, {})",
                    agent.id,
                    agent.x,
                    agent.y,
                );
                debug_assert_eq!(
                    self.grid.get(agent.x, agent.y),
                    Some(Occupant::Agent(idx)),
                    "grid cell ({}, {}) must point back at agent {:?}",
                    agent.x,
                    agent.y,
                    agent.id,
                );
            }
            for (idx, plant) in self.plants.iter().enumerate() {
                if !plant.alive {
                    continue;
                }
                debug_assert_eq!(
                    self.grid.get(plant.x, plant.y),
                    Some(Occupant::Plant(idx)),
                    "grid cell ({}, {}) must point back at plant slot {}",
                    plant.x,
                    plant.y,
                    idx,
                );
            }
            for (idx, structure) in self.structures.iter().enumerate() {
                debug_assert_eq!(
                    self.grid.get(structure.x, structure.y),
                    Some(Occupant::Structure(idx)),
                    "grid cell ({}, {}) must point back at structure slot {}",
                    structure.x,
                    structure.y,
                    idx,
                );
            }
            for y in 0..self.grid.height() {
                for x in 0..self.grid.width() {
                    match self.grid.get(x, y) {
                        Some(Occupant::Agent(idx)) => {
                            let agent = &self.agents[idx];
                            debug_assert!(
                                agent.alive && agent.x == x && agent.y == y,
                                "cell ({}, {}) references agent slot {} which is elsewhere",
                                x,
                                y,
                                idx,
                            );
                        }
                        Some(Occupant::Plant(idx)) => {
                            let plant = &self.plants[idx];
                            debug_assert!(
                                plant.alive && plant.x == x && plant.y == y,
                                "cell ({}, {}) references plant slot {} which is elsewhere",
                                x,
                                y,
                                idx,
                            );
                        }
                        Some(Occupant::Structure(idx)) => {
                            let structure = &self.structures[idx];
                            debug_assert!(
                                structure.x == x && structure.y == y,
                                "cell ({}, {}) references structure slot {} which is elsewhere",
                                x,
                                y,
                                idx,
                            );
                        }
                        None => {}
                    }
                }
            }
        }
    }

    pub(crate) fn alloc_agent_id(&mut self) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        id
    }
}

fn world_capacity(config: &WorldConfig) -> u64 {
    u64::from(config.world_width) * u64::from(config.world_height)
}

fn validate_config(config: &WorldConfig) -> Result<(), SimError> {
    if config.world_width == 0 || config.world_height == 0 {
        return Err(SimError::InvalidConfig(
            "world dimensions must be greater than zero".to_owned(),
        ));
    }
    let seeded = u64::from(config.initial_agents)
        + u64::from(config.initial_plants)
        + u64::from(config.initial_structures);
    if seeded > world_capacity(config) {
        return Err(SimError::InvalidConfig(format!(
            "initial entities ({seeded}) exceed world capacity ({})",
            world_capacity(config),
        )));
    }
    genetics::validate_genome_config(config)?;
    if config.max_energy <= 0.0 {
        return Err(SimError::InvalidConfig(
            "max_energy must be positive".to_owned(),
        ));
    }
    if config.starting_energy <= 0.0 || config.starting_energy > config.max_energy {
        return Err(SimError::InvalidConfig(
            "starting_energy must be within (0, max_energy]".to_owned(),
        ));
    }
    if config.max_hunger <= 0.0 {
        return Err(SimError::InvalidConfig(
            "max_hunger must be positive".to_owned(),
        ));
    }
    if config.plant_max_energy <= 0.0 {
        return Err(SimError::InvalidConfig(
            "plant_max_energy must be positive".to_owned(),
        ));
    }
    if config.plant_start_energy <= 0.0 || config.plant_start_energy > config.plant_max_energy {
        return Err(SimError::InvalidConfig(
            "plant_start_energy must be within (0, plant_max_energy]".to_owned(),
        ));
    }
    if config.vision_range == 0 {
        return Err(SimError::InvalidConfig(
            "vision_range must be at least 1".to_owned(),
        ));
    }
    for (name, value) in [
        ("plant_decay_chance", config.plant_decay_chance),
        ("hunger_gate_fraction", config.hunger_gate_fraction),
        ("reproduction_overhead_fraction", config.reproduction_overhead_fraction),
        ("retaliation_fraction", config.retaliation_fraction),
        ("attack_threshold", config.attack_threshold),
        ("move_threshold", config.move_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(SimError::InvalidConfig(format!(
                "{name} must be within [0, 1]",
            )));
        }
    }
    for (name, value) in [
        ("hunger_rate", config.hunger_rate),
        ("metabolism_base", config.metabolism_base),
        ("idle_regen", config.idle_regen),
        ("reproduction_buffer", config.reproduction_buffer),
        ("move_cost", config.move_cost),
        ("structure_collision_cost", config.structure_collision_cost),
        ("attack_damage", config.attack_damage),
        ("plant_bite_damage", config.plant_bite_damage),
        ("attack_cost", config.attack_cost),
        ("retaliation_threshold", config.retaliation_threshold),
        ("photosynthesis_rate", config.photosynthesis_rate),
        ("plant_decay_amount", config.plant_decay_amount),
    ] {
        if value < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "{name} must not be negative",
            )));
        }
    }
    Ok(())
}
