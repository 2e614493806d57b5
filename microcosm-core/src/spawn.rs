use microcosm_types::{AgentId, AgentState, Diet, Genome, Occupant, PlantState, StructureState};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::brain::{Action, NEURON_COUNT};
use crate::genetics::{extract_traits, generate_genome, replicate_genome};
use crate::turn::set_agent_energy;
use crate::Simulation;

impl Simulation {
    /// Populates a fresh world: structures, then plants, then agents, each
    /// taking a cell from one shuffled deck of every position. Config
    /// validation guarantees the deck is large enough.
    pub(crate) fn seed_world(&mut self) {
        let mut open_cells: Vec<(i32, i32)> =
            Vec::with_capacity((self.grid.width() * self.grid.height()) as usize);
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                open_cells.push((x, y));
            }
        }
        open_cells.shuffle(&mut self.rng);

        for _ in 0..self.config.initial_structures {
            let (x, y) = open_cells
                .pop()
                .expect("world seeding requires one unique cell per entity");
            self.spawn_structure_at(x, y);
        }
        for _ in 0..self.config.initial_plants {
            let (x, y) = open_cells
                .pop()
                .expect("world seeding requires one unique cell per entity");
            self.spawn_plant_at(x, y);
        }
        for _ in 0..self.config.initial_agents {
            let (x, y) = open_cells
                .pop()
                .expect("world seeding requires one unique cell per entity");
            let genome = generate_genome(&self.config, &mut self.rng);
            self.spawn_agent_at(x, y, genome, None, 0);
        }
    }

    /// Constructs an agent from its genome (traits and diet derived here,
    /// once) and installs it in the first dead slot, or a new one.
    pub(crate) fn spawn_agent_at(
        &mut self,
        x: i32,
        y: i32,
        genome: Genome,
        parent: Option<AgentId>,
        generation: u32,
    ) -> usize {
        let traits = extract_traits(&genome);
        let diet = Diet::from_trophic_bias(traits.trophic_bias);
        let agent = AgentState {
            id: self.alloc_agent_id(),
            parent,
            generation,
            diet,
            alive: true,
            x,
            y,
            energy: self.config.starting_energy,
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
        };
        let slot = match self.agents.iter().position(|slot| !slot.alive) {
            Some(slot) => {
                self.agents[slot] = agent;
                slot
            }
            None => {
                self.agents.push(agent);
                self.agents.len() - 1
            }
        };
        self.grid.claim(x, y, Occupant::Agent(slot));
        slot
    }

    pub(crate) fn spawn_plant_at(&mut self, x: i32, y: i32) -> usize {
        let plant = PlantState {
            x,
            y,
            age: 0,
            energy: self.config.plant_start_energy,
            alive: true,
        };
        let slot = match self.plants.iter().position(|slot| !slot.alive) {
            Some(slot) => {
                self.plants[slot] = plant;
                slot
            }
            None => {
                self.plants.push(plant);
                self.plants.len() - 1
            }
        };
        self.grid.claim(x, y, Occupant::Plant(slot));
        slot
    }

    pub(crate) fn spawn_structure_at(&mut self, x: i32, y: i32) {
        let slot = self.structures.len();
        self.structures.push(StructureState { x, y });
        self.grid.claim(x, y, Occupant::Structure(slot));
    }

    /// Reproduction gate and birth. Every failed gate is a silent no-op that
    /// costs nothing, including running out of placement attempts.
    pub(crate) fn try_reproduce(&mut self, idx: usize) -> bool {
        let agent = &self.agents[idx];
        if agent.neurons[Action::Reproduce.neuron_index()] <= 0.0 {
            return false;
        }
        if agent.age < u64::from(self.config.maturity_age) || agent.reproduction_cooldown > 0 {
            return false;
        }
        let overhead = self.config.max_energy
            * self.config.reproduction_overhead_fraction
            * reproduction_overhead_factor(agent.diet);
        let cost = overhead + self.config.starting_energy;
        if agent.energy <= cost + self.config.reproduction_buffer {
            return false;
        }
        let (px, py) = (agent.x, agent.y);

        let mut placement = None;
        for _ in 0..self.config.birth_placement_attempts {
            let dx = self.rng.random_range(-1..=1);
            let dy = self.rng.random_range(-1..=1);
            if dx == 0 && dy == 0 {
                continue;
            }
            let (x, y) = (px + dx, py + dy);
            if self.grid.in_bounds(x, y) && self.grid.get(x, y).is_none() {
                placement = Some((x, y));
                break;
            }
        }
        let Some((child_x, child_y)) = placement else {
            return false;
        };

        let mutation_rate = self.config.mutation_rate;
        let child_genome = {
            let Self { agents, rng, .. } = self;
            replicate_genome(&agents[idx].genome, mutation_rate, rng)
        };
        let parent_id = self.agents[idx].id;
        let child_generation = self.agents[idx].generation + 1;
        self.spawn_agent_at(child_x, child_y, child_genome, Some(parent_id), child_generation);

        let max_energy = self.config.max_energy;
        let reproduction_cooldown = self.config.reproduction_cooldown;
        let parent = &mut self.agents[idx];
        set_agent_energy(parent, parent.energy - cost, max_energy);
        parent.reproduction_cooldown = reproduction_cooldown;
        parent.offspring_count += 1;
        self.metrics.births_last_tick += 1;
        true
    }

    /// Samples a fixed number of cells per tick and sprouts a plant on each
    /// empty one. Both coordinate draws happen for every sample so the stream
    /// advances the same amount regardless of occupancy.
    pub(crate) fn regrow_plants(&mut self) {
        for _ in 0..self.config.plant_regrowth_per_tick {
            let x = self.rng.random_range(0..self.grid.width());
            let y = self.rng.random_range(0..self.grid.height());
            if self.grid.get(x, y).is_none() {
                self.spawn_plant_at(x, y);
                self.metrics.plants_grown_last_tick += 1;
            }
        }
    }
}

fn reproduction_overhead_factor(diet: Diet) -> f32 {
    match diet {
        Diet::Herbivore => 1.0,
        Diet::Omnivore => 1.1,
        Diet::Carnivore => 1.25,
    }
}
