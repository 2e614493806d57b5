use microcosm_types::{AgentState, Occupant, TraitId, WorldConfig};
use rand::Rng;

use crate::grid::{Grid, DIRECTIONS};

pub(crate) const NEURON_COUNT: usize = 64;
pub(crate) const SENSOR_COUNT: usize = 41;
pub(crate) const ACTION_COUNT: usize = 7;
pub(crate) const ACTION_START: usize = SENSOR_COUNT;
pub(crate) const HIDDEN_START: usize = ACTION_START + ACTION_COUNT;

const HIDDEN_DECAY: f32 = 0.5;
const OSCILLATOR_RATE: f32 = 0.08;

pub(crate) const SENSOR_POS_X: usize = 0;
pub(crate) const SENSOR_POS_Y: usize = 1;
pub(crate) const SENSOR_RANDOM: usize = 2;
pub(crate) const SENSOR_ENERGY: usize = 3;
pub(crate) const SENSOR_HUNGER: usize = 4;
pub(crate) const SENSOR_AGE: usize = 5;
pub(crate) const SENSOR_OSCILLATOR: usize = 6;
pub(crate) const SENSOR_DENSITY_START: usize = 7;
pub(crate) const SENSOR_RAY_START: usize = 10;
pub(crate) const SENSOR_TRAIT_START: usize = 34;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Attack,
    Reproduce,
    Suicide,
}

impl Action {
    pub(crate) fn neuron_index(self) -> usize {
        ACTION_START + self as usize
    }
}

/// One brain evaluation: zero the action region, decay the hidden region,
/// refresh the sensors, then apply every gene in genome order and squash the
/// non-sensor regions. Genome order is load-bearing; edges must not be
/// reordered.
pub(crate) fn think<R: Rng + ?Sized>(
    agent: &mut AgentState,
    grid: &Grid,
    config: &WorldConfig,
    rng: &mut R,
) {
    for neuron in &mut agent.neurons[ACTION_START..HIDDEN_START] {
        *neuron = 0.0;
    }
    for neuron in &mut agent.neurons[HIDDEN_START..] {
        *neuron *= HIDDEN_DECAY;
    }

    write_sensors(agent, grid, config, rng);

    for gene in &agent.genome.genes {
        let decoded = gene.decode();
        let source = decoded.source as usize % NEURON_COUNT;
        let sink = decoded.sink as usize % NEURON_COUNT;
        agent.neurons[sink] += agent.neurons[source] * decoded.weight;
    }

    for neuron in &mut agent.neurons[ACTION_START..] {
        *neuron = neuron.tanh();
    }
}

fn write_sensors<R: Rng + ?Sized>(
    agent: &mut AgentState,
    grid: &Grid,
    config: &WorldConfig,
    rng: &mut R,
) {
    agent.neurons[SENSOR_POS_X] = axis_position(agent.x, grid.width());
    agent.neurons[SENSOR_POS_Y] = axis_position(agent.y, grid.height());
    agent.neurons[SENSOR_RANDOM] = rng.random::<f32>();
    agent.neurons[SENSOR_ENERGY] = agent.energy / config.max_energy;
    agent.neurons[SENSOR_HUNGER] = agent.hunger / config.max_hunger;
    agent.neurons[SENSOR_AGE] =
        (agent.age as f32 / (4.0 * config.maturity_age as f32)).min(1.0);
    agent.neurons[SENSOR_OSCILLATOR] = (agent.age as f32 * OSCILLATOR_RATE).sin();

    let mut neighbor_agents = 0u32;
    let mut neighbor_plants = 0u32;
    let mut neighbor_structures = 0u32;
    for (dx, dy) in DIRECTIONS {
        match grid.get(agent.x + dx, agent.y + dy) {
            Some(Occupant::Agent(_)) => neighbor_agents += 1,
            Some(Occupant::Plant(_)) => neighbor_plants += 1,
            Some(Occupant::Structure(_)) => neighbor_structures += 1,
            None => {}
        }
    }
    agent.neurons[SENSOR_DENSITY_START] = neighbor_agents as f32 / DIRECTIONS.len() as f32;
    agent.neurons[SENSOR_DENSITY_START + 1] = neighbor_plants as f32 / DIRECTIONS.len() as f32;
    agent.neurons[SENSOR_DENSITY_START + 2] = neighbor_structures as f32 / DIRECTIONS.len() as f32;

    let reach = effective_vision(config.vision_range, agent.traits.perception);
    for (ray, &(dx, dy)) in DIRECTIONS.iter().enumerate() {
        let mut ray_agents = 0u32;
        let mut ray_plants = 0u32;
        let mut ray_structures = 0u32;
        for step in 1..=reach as i32 {
            let x = agent.x + dx * step;
            let y = agent.y + dy * step;
            if !grid.in_bounds(x, y) {
                break;
            }
            match grid.get(x, y) {
                Some(Occupant::Agent(_)) => ray_agents += 1,
                Some(Occupant::Plant(_)) => ray_plants += 1,
                Some(Occupant::Structure(_)) => ray_structures += 1,
                None => {}
            }
        }
        let base = SENSOR_RAY_START + ray * 3;
        agent.neurons[base] = ray_agents as f32 / reach as f32;
        agent.neurons[base + 1] = ray_plants as f32 / reach as f32;
        agent.neurons[base + 2] = ray_structures as f32 / reach as f32;
    }

    for (offset, trait_id) in TraitId::ALL.into_iter().enumerate() {
        agent.neurons[SENSOR_TRAIT_START + offset] = agent.traits.get(trait_id);
    }
}

fn axis_position(coordinate: i32, extent: i32) -> f32 {
    if extent > 1 {
        coordinate as f32 / (extent - 1) as f32
    } else {
        0.0
    }
}

/// Perception stretches or shrinks the configured vision range by up to half,
/// never below one cell.
pub(crate) fn effective_vision(vision_range: u32, perception: f32) -> u32 {
    ((vision_range as f32 * (1.0 + 0.5 * perception)).round() as u32).max(1)
}
