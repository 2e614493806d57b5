use super::*;

/// Hidden neuron used as a wiring sink for genes that must never fire.
///
/// Neuron 63 starts at zero and nothing in these fixtures writes to it, so a
/// gene reading from it contributes nothing to the tick.
pub(super) const INERT: u8 = 63;

/// Baseline config for scenario tests: an empty world with every passive
/// rate zeroed, so energy only moves when an action moves it.
pub(super) fn test_config(world_width: u32, world_height: u32) -> WorldConfig {
    WorldConfig {
        world_width,
        world_height,
        initial_agents: 0,
        initial_plants: 0,
        initial_structures: 0,
        genome_length: 64,
        gene_weight_range: 4.0,
        mutation_rate: 0.0,
        max_energy: 400.0,
        starting_energy: 180.0,
        max_hunger: 100.0,
        hunger_rate: 0.0,
        hunger_gate_fraction: 0.75,
        metabolism_base: 0.0,
        idle_regen: 0.0,
        maturity_age: 10,
        reproduction_overhead_fraction: 0.15,
        reproduction_buffer: 20.0,
        reproduction_cooldown: 90,
        birth_placement_attempts: 8,
        move_cost: 0.6,
        move_threshold: 0.28,
        move_cooldown: 0,
        structure_collision_cost: 2.5,
        attack_damage: 55.0,
        plant_bite_damage: 30.0,
        attack_cost: 3.0,
        attack_threshold: 0.45,
        attack_cooldown: 0,
        retaliation_threshold: 0.15,
        retaliation_fraction: 0.5,
        plant_max_energy: 100.0,
        plant_start_energy: 40.0,
        photosynthesis_rate: 0.0,
        plant_mature_age: 600,
        plant_decay_chance: 0.0,
        plant_decay_amount: 2.2,
        plant_regrowth_per_tick: 0,
        vision_range: 4,
    }
}

/// Config with all the passive dynamics switched on, for soak tests that
/// want a lively world rather than a controlled one.
pub(super) fn active_config(world_width: u32, world_height: u32) -> WorldConfig {
    let mut config = test_config(world_width, world_height);
    config.initial_agents = 12;
    config.initial_plants = 20;
    config.initial_structures = 6;
    config.mutation_rate = 0.04;
    config.hunger_rate = 0.35;
    config.metabolism_base = 0.8;
    config.idle_regen = 0.4;
    config.move_cooldown = 3;
    config.attack_cooldown = 14;
    config.photosynthesis_rate = 1.4;
    config.plant_mature_age = 30;
    config.plant_decay_chance = 0.02;
    config.plant_regrowth_per_tick = 2;
    config
}

pub(super) fn empty_sim(world_width: u32, world_height: u32) -> Simulation {
    Simulation::new(test_config(world_width, world_height), 7).expect("simulation should initialize")
}

/// Genome whose genes all read from [`INERT`], leaving every neuron at zero.
pub(super) fn inert_genome(length: usize) -> Genome {
    Genome {
        genes: vec![Gene::encode(INERT, INERT, 0.0); length],
    }
}

/// Inert genome with the given `(source, sink, weight)` edges written into
/// the leading slots, in order.
pub(super) fn wired_genome(edges: &[(u8, u8, f32)]) -> Genome {
    let mut genome = inert_genome(64);
    for (slot, &(source, sink, weight)) in edges.iter().enumerate() {
        genome.genes[slot] = Gene::encode(source, sink, weight);
    }
    genome
}

/// Genome that drives one action neuron from the energy sensor. At the
/// fixture's 180/400 starting energy the activation is tanh(0.45 * 4) = 0.95,
/// which clears every action threshold in [`test_config`].
pub(super) fn action_genome(action: Action) -> Genome {
    wired_genome(&[(SENSOR_ENERGY as u8, action.neuron_index() as u8, 4.0)])
}

/// Writes `value` into the genome's tail pair for `id`. Values of +/-1.0 land
/// on the codec's saturation edge; prefer magnitudes that scale to an exact
/// i16 (0.5, -0.25, ...) when a test asserts exact arithmetic downstream.
pub(super) fn with_trait(mut genome: Genome, id: TraitId, value: f32) -> Genome {
    let base = genome.genes.len() - 2 * (id.index() + 1);
    let gene = Gene::encode(INERT, INERT, value * Gene::WEIGHT_LIMIT);
    genome.genes[base] = gene;
    genome.genes[base + 1] = gene;
    genome
}

/// Standalone agent for unit tests that never touch a grid.
pub(super) fn make_agent(x: i32, y: i32, genome: Genome) -> AgentState {
    let traits = extract_traits(&genome);
    AgentState {
        id: AgentId(0),
        parent: None,
        generation: 0,
        diet: Diet::from_trophic_bias(traits.trophic_bias),
        alive: true,
        x,
        y,
        energy: 180.0,
        hunger: 0.0,
        age: 0,
        genome,
        neurons: vec![0.0; NEURON_COUNT],
        traits,
        move_cooldown: 0,
        attack_cooldown: 0,
        reproduction_cooldown: 0,
        hurt_flash: 0,
        attack_flash: 0,
        offspring_count: 0,
        kills_count: 0,
        meals_count: 0,
    }
}

pub(super) fn place_agent(sim: &mut Simulation, x: i32, y: i32, genome: Genome) -> usize {
    sim.spawn_agent_at(x, y, genome, None, 0)
}

pub(super) fn place_plant(sim: &mut Simulation, x: i32, y: i32) -> usize {
    sim.spawn_plant_at(x, y)
}

pub(super) fn place_structure(sim: &mut Simulation, x: i32, y: i32) {
    sim.spawn_structure_at(x, y);
}

/// Kills an agent in place and vacates its cell, as combat would.
pub(super) fn kill_agent(sim: &mut Simulation, idx: usize) {
    let max_energy = sim.config.max_energy;
    let (x, y) = (sim.agents[idx].x, sim.agents[idx].y);
    if set_agent_energy(&mut sim.agents[idx], 0.0, max_energy) {
        sim.grid.release(x, y, Occupant::Agent(idx));
    }
}

/// Runs one agent's sensory and wiring pass without ticking the world.
pub(super) fn think_in_place(sim: &mut Simulation, idx: usize) {
    let Simulation {
        agents,
        grid,
        config,
        rng,
        ..
    } = sim;
    think(&mut agents[idx], grid, config, rng);
}

/// Full cross-check of the grid against the entity arrays, plus an overlap
/// sweep over every live entity.
pub(super) fn assert_consistent(sim: &Simulation) {
    sim.debug_assert_consistent_state();
    let mut seen = std::collections::HashSet::new();
    for agent in sim.agents.iter().filter(|agent| agent.alive) {
        assert!(
            seen.insert((agent.x, agent.y)),
            "two live entities share cell ({}, {})",
            agent.x,
            agent.y
        );
    }
    for plant in sim.plants.iter().filter(|plant| plant.alive) {
        assert!(
            seen.insert((plant.x, plant.y)),
            "two live entities share cell ({}, {})",
            plant.x,
            plant.y
        );
    }
    for structure in &sim.structures {
        assert!(
            seen.insert((structure.x, structure.y)),
            "two live entities share cell ({}, {})",
            structure.x,
            structure.y
        );
    }
}
