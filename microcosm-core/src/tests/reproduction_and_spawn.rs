use super::support::*;
use super::*;

#[test]
fn eligible_parent_reproduces_at_exact_cost() {
    let mut sim = empty_sim(8, 8);
    let parent = place_agent(&mut sim, 3, 3, action_genome(Action::Reproduce));
    sim.agents[parent].energy = 400.0;
    sim.agents[parent].age = 10;

    let summary = sim.tick();

    assert_eq!(summary.births, 1);
    assert_eq!(sim.agents.len(), 2);
    // Omnivore overhead is 400 * 0.15 * 1.1 = 66, plus the child's 180:
    // 400 - 246 = 154.
    assert!((sim.agents[parent].energy - 154.0).abs() < 1e-2);
    assert_eq!(sim.agents[parent].reproduction_cooldown, 89); // armed at 90, aged once
    assert_eq!(sim.agents[parent].offspring_count, 1);

    let child = &sim.agents[1];
    assert!(child.alive);
    assert_eq!(child.generation, 1);
    assert_eq!(child.parent, Some(sim.agents[0].id));
    assert!((child.energy - 180.0).abs() < 1e-3);
    assert!((child.x - 3).abs() <= 1 && (child.y - 3).abs() <= 1);
    assert_ne!((child.x, child.y), (3, 3));
    assert_eq!(sim.occupant_at(child.x, child.y), Some(Occupant::Agent(1)));
    // Born into a later slot, the child was processed by the same tick.
    assert_eq!(child.age, 1);

    // The armed cooldown holds the parent back on the next tick.
    let summary = sim.tick();
    assert_eq!(summary.births, 0);
    assert_eq!(sim.agents.len(), 2);
}

#[test]
fn reproduction_overhead_scales_with_diet() {
    let mut sim = empty_sim(8, 8);
    let parent = place_agent(
        &mut sim,
        3,
        3,
        with_trait(action_genome(Action::Reproduce), TraitId::TrophicBias, -0.5),
    );
    sim.agents[parent].energy = 400.0;
    sim.agents[parent].age = 10;
    sim.tick();
    // Herbivore: 400 - (60 + 180) = 160.
    assert!((sim.agents[parent].energy - 160.0).abs() < 1e-2);

    let mut sim = empty_sim(8, 8);
    let parent = place_agent(
        &mut sim,
        3,
        3,
        with_trait(action_genome(Action::Reproduce), TraitId::TrophicBias, 0.5),
    );
    sim.agents[parent].energy = 400.0;
    sim.agents[parent].age = 10;
    sim.tick();
    // Carnivore: 400 - (75 + 180) = 145.
    assert!((sim.agents[parent].energy - 145.0).abs() < 1e-2);
}

#[test]
fn reproduction_gates_hold() {
    let mut sim = empty_sim(8, 8);
    let immature = place_agent(&mut sim, 1, 1, action_genome(Action::Reproduce));
    let broke = place_agent(&mut sim, 4, 4, action_genome(Action::Reproduce));
    let resting = place_agent(&mut sim, 6, 1, action_genome(Action::Reproduce));
    sim.agents[immature].energy = 400.0;
    sim.agents[immature].age = 9;
    sim.agents[broke].energy = 250.0; // under the 246 + 20 bar
    sim.agents[broke].age = 10;
    sim.agents[resting].energy = 400.0;
    sim.agents[resting].age = 10;
    sim.agents[resting].reproduction_cooldown = 5;

    let summary = sim.tick();

    assert_eq!(summary.births, 0);
    assert_eq!(sim.agents.len(), 3);
    assert!((sim.agents[immature].energy - 400.0).abs() < 1e-3);
    assert!((sim.agents[broke].energy - 250.0).abs() < 1e-3);
    assert!((sim.agents[resting].energy - 400.0).abs() < 1e-3);
    assert_eq!(sim.agents[resting].reproduction_cooldown, 4);
}

#[test]
fn enclosed_parent_keeps_its_energy() {
    let mut sim = empty_sim(6, 6);
    let parent = place_agent(&mut sim, 1, 1, action_genome(Action::Reproduce));
    sim.agents[parent].energy = 400.0;
    sim.agents[parent].age = 10;
    for (dx, dy) in DIRECTIONS {
        place_structure(&mut sim, 1 + dx, 1 + dy);
    }

    let summary = sim.tick();

    // Placement failed before anything was charged or armed.
    assert_eq!(summary.births, 0);
    assert!((sim.agents[parent].energy - 400.0).abs() < 1e-3);
    assert_eq!(sim.agents[parent].reproduction_cooldown, 0);
    assert_eq!(sim.agents[parent].offspring_count, 0);
}

#[test]
fn child_takes_the_first_dead_slot() {
    let mut sim = empty_sim(8, 8);
    place_agent(&mut sim, 1, 1, inert_genome(64));
    let casualty = place_agent(&mut sim, 3, 3, inert_genome(64));
    let parent = place_agent(&mut sim, 6, 6, action_genome(Action::Reproduce));
    sim.agents[parent].energy = 400.0;
    sim.agents[parent].age = 10;
    kill_agent(&mut sim, casualty);

    let summary = sim.tick();

    assert_eq!(summary.births, 1);
    assert_eq!(sim.agents.len(), 3); // reused, not pushed
    let child = &sim.agents[casualty];
    assert!(child.alive);
    assert_eq!(child.id, AgentId(3));
    assert_eq!(child.parent, Some(AgentId(2)));
    assert_eq!(
        sim.occupant_at(child.x, child.y),
        Some(Occupant::Agent(casualty))
    );
    // Born into an earlier slot than its parent, so its first tick is next tick.
    assert_eq!(child.age, 0);
}

#[test]
fn child_genomes_mutate_at_the_configured_rate() {
    let mut config = test_config(8, 8);
    config.mutation_rate = 1.0;
    let mut sim = Simulation::new(config, 7).expect("simulation should initialize");
    let parent = place_agent(&mut sim, 3, 3, action_genome(Action::Reproduce));
    sim.agents[parent].energy = 400.0;
    sim.agents[parent].age = 10;

    sim.tick();

    assert_eq!(sim.agents.len(), 2);
    let parent_genome = &sim.agents[0].genome;
    let child_genome = &sim.agents[1].genome;
    for (child_gene, parent_gene) in child_genome.genes.iter().zip(&parent_genome.genes) {
        assert_eq!((child_gene.0 ^ parent_gene.0).count_ones(), 1);
    }
}

#[test]
fn regrowth_seeds_empty_cells() {
    let mut config = test_config(6, 6);
    config.plant_regrowth_per_tick = 5;
    let mut sim = Simulation::new(config, 11).expect("simulation should initialize");

    let summary = sim.tick();

    let alive = sim.plants.iter().filter(|plant| plant.alive).count() as u32;
    assert_eq!(summary.plants_grown, alive);
    assert!((1..=5).contains(&summary.plants_grown));
    for plant in sim.plants.iter().filter(|plant| plant.alive) {
        assert_eq!(plant.energy, 40.0);
        assert_eq!(plant.age, 0);
    }
    assert_consistent(&sim);
}

#[test]
fn mature_plants_decay_and_vacate_their_cell() {
    let mut config = test_config(6, 6);
    config.plant_decay_chance = 1.0;
    config.plant_decay_amount = 50.0;
    config.plant_mature_age = 0;
    let mut sim = Simulation::new(config, 3).expect("simulation should initialize");
    let plant = place_plant(&mut sim, 2, 2);

    let summary = sim.tick();

    assert!(!sim.plants[plant].alive);
    assert_eq!(sim.occupant_at(2, 2), None);
    // Rot is neither grazing nor an agent death.
    assert_eq!(summary.plants_eaten, 0);
    assert_eq!(summary.deaths, 0);
}

#[test]
fn photosynthesis_recovers_energy_up_to_the_cap() {
    let mut config = test_config(6, 6);
    config.photosynthesis_rate = 1.5;
    let mut sim = Simulation::new(config, 3).expect("simulation should initialize");
    let plant = place_plant(&mut sim, 2, 2);
    sim.plants[plant].energy = 10.0;

    sim.tick();
    assert!((sim.plants[plant].energy - 11.5).abs() < 1e-3);

    sim.plants[plant].energy = 100.0;
    sim.tick();
    assert_eq!(sim.plants[plant].energy, 100.0);
}
