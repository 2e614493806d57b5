use microcosm_types::{AgentState, Diet, Occupant, PlantState, TickSummary};
use rand::Rng;

use crate::brain::{self, Action};
use crate::combat::StrikeOutcome;
use crate::Simulation;

const SUICIDE_THRESHOLD: f32 = 0.9;
const SUICIDE_MATURITY_FACTOR: u64 = 2;
const DIAGONAL_COST_FACTOR: f32 = std::f32::consts::SQRT_2;
pub(crate) const FLASH_TICKS: u32 = 8;

impl Simulation {
    /// Advances the world one tick: every living agent thinks and acts in
    /// slot order (later slots observe earlier mutations), then ages and
    /// metabolizes; plants update after all agents; regrowth last.
    ///
    /// The agent bound is re-read every iteration on purpose: a newborn
    /// appended behind the cursor runs in the same pass, while one installed
    /// in an already-visited dead slot waits for the next tick.
    pub fn tick(&mut self) -> TickSummary {
        self.metrics.births_last_tick = 0;
        self.metrics.deaths_last_tick = 0;
        self.metrics.attacks_last_tick = 0;
        self.metrics.plants_eaten_last_tick = 0;
        self.metrics.plants_grown_last_tick = 0;

        let mut idx = 0;
        while idx < self.agents.len() {
            if self.agents[idx].alive {
                self.think_agent(idx);
                self.act_agent(idx);
                if self.agents[idx].alive {
                    self.update_agent(idx);
                }
            }
            idx += 1;
        }

        for idx in 0..self.plants.len() {
            if !self.plants[idx].alive {
                continue;
            }
            self.update_plant(idx);
        }
        self.regrow_plants();

        self.turn += 1;
        self.metrics.ticks = self.turn;
        self.metrics.total_births += u64::from(self.metrics.births_last_tick);
        self.metrics.total_deaths += u64::from(self.metrics.deaths_last_tick);
        self.metrics.total_attacks += u64::from(self.metrics.attacks_last_tick);
        self.metrics.total_plants_eaten += u64::from(self.metrics.plants_eaten_last_tick);
        self.metrics.total_plants_grown += u64::from(self.metrics.plants_grown_last_tick);

        if cfg!(debug_assertions) {
            self.debug_assert_consistent_state();
        }

        self.tick_summary()
    }

    fn think_agent(&mut self, idx: usize) {
        let Self {
            agents,
            grid,
            config,
            rng,
            ..
        } = self;
        brain::think(&mut agents[idx], grid, config, rng);
    }

    /// Action priority: reproduce, suicide, attack, movement, idle regen.
    /// The first satisfied action consumes the tick.
    fn act_agent(&mut self, idx: usize) {
        if self.try_reproduce(idx) {
            return;
        }
        if self.try_suicide(idx) {
            return;
        }
        if self.try_attack(idx) {
            return;
        }
        if self.try_move(idx) {
            return;
        }
        self.idle_regen(idx);
    }

    fn try_suicide(&mut self, idx: usize) -> bool {
        let agent = &self.agents[idx];
        if agent.neurons[Action::Suicide.neuron_index()] <= SUICIDE_THRESHOLD {
            return false;
        }
        if agent.age <= u64::from(self.config.maturity_age) * SUICIDE_MATURITY_FACTOR {
            return false;
        }
        let energy = agent.energy;
        self.damage_agent(idx, energy);
        true
    }

    fn try_attack(&mut self, idx: usize) -> bool {
        let agent = &self.agents[idx];
        if agent.attack_cooldown > 0 {
            return false;
        }
        let threshold = (self.config.attack_threshold - 0.2 * agent.traits.bravery).max(0.1);
        if agent.neurons[Action::Attack.neuron_index()] <= threshold {
            return false;
        }
        if !self.area_attack(idx) {
            return false;
        }
        let attack_cost = self.config.attack_cost;
        let attack_cooldown = self.config.attack_cooldown;
        if self.agents[idx].alive && !self.spend_energy(idx, attack_cost) {
            self.agents[idx].attack_cooldown = attack_cooldown;
        }
        true
    }

    fn try_move(&mut self, idx: usize) -> bool {
        let agent = &self.agents[idx];
        if agent.move_cooldown > 0 {
            return false;
        }
        let threshold = (self.config.move_threshold - 0.15 * agent.traits.speed).max(0.05);
        let up = agent.neurons[Action::MoveUp.neuron_index()] > threshold;
        let down = agent.neurons[Action::MoveDown.neuron_index()] > threshold;
        let left = agent.neurons[Action::MoveLeft.neuron_index()] > threshold;
        let right = agent.neurons[Action::MoveRight.neuron_index()] > threshold;
        let dx = i32::from(right) - i32::from(left);
        let dy = i32::from(down) - i32::from(up);
        if dx == 0 && dy == 0 {
            return false;
        }
        let to_x = agent.x + dx;
        let to_y = agent.y + dy;
        if !self.grid.in_bounds(to_x, to_y) {
            return false;
        }

        match self.grid.get(to_x, to_y) {
            None => {
                self.finish_move(idx, to_x, to_y, dx, dy);
                true
            }
            Some(Occupant::Plant(plant_idx)) => {
                if self.graze_plant(idx, plant_idx) {
                    self.finish_move(idx, to_x, to_y, dx, dy);
                }
                true
            }
            Some(Occupant::Agent(victim_idx)) => {
                if self.agents[idx].attack_cooldown > 0 {
                    return false;
                }
                match self.strike_agent(idx, victim_idx) {
                    StrikeOutcome::Blocked => false,
                    StrikeOutcome::Struck { victim_killed } => {
                        let attack_cost = self.config.attack_cost;
                        let attack_cooldown = self.config.attack_cooldown;
                        if self.agents[idx].alive && !self.spend_energy(idx, attack_cost) {
                            self.agents[idx].attack_cooldown = attack_cooldown;
                            if victim_killed {
                                self.finish_move(idx, to_x, to_y, dx, dy);
                            }
                        }
                        true
                    }
                }
            }
            Some(Occupant::Structure(_)) => {
                let cost = self.config.structure_collision_cost;
                self.spend_energy(idx, cost);
                true
            }
        }
    }

    /// Commits a resolved move: vacate, claim, update coordinates, arm the
    /// movement cooldown, pay the (diagonal-scaled) cost. The destination must
    /// be empty by the time this runs; anything else is a bookkeeping bug.
    fn finish_move(&mut self, idx: usize, to_x: i32, to_y: i32, dx: i32, dy: i32) {
        let move_cost = if dx != 0 && dy != 0 {
            self.config.move_cost * DIAGONAL_COST_FACTOR
        } else {
            self.config.move_cost
        };
        let speed = self.agents[idx].traits.speed;
        let cooldown = (self.config.move_cooldown as f32 * (1.0 - 0.35 * speed)).round() as u32;

        let (from_x, from_y) = (self.agents[idx].x, self.agents[idx].y);
        self.grid.release(from_x, from_y, Occupant::Agent(idx));
        let conflicting = self.grid.get(to_x, to_y);
        assert!(
            conflicting.is_none(),
            "agent {:?} moving from ({from_x}, {from_y}) into occupied cell ({to_x}, {to_y}) holding {conflicting:?}",
            self.agents[idx].id,
        );
        self.grid.claim(to_x, to_y, Occupant::Agent(idx));
        {
            let agent = &mut self.agents[idx];
            agent.x = to_x;
            agent.y = to_y;
            agent.move_cooldown = cooldown;
        }
        // A death here releases the destination cell, since the coordinates
        // already point at it.
        self.spend_energy(idx, move_cost);
    }

    fn idle_regen(&mut self, idx: usize) {
        let gate = self.config.hunger_gate_fraction * self.config.max_hunger;
        if self.agents[idx].hunger >= gate {
            return;
        }
        let idle_regen = self.config.idle_regen;
        let max_energy = self.config.max_energy;
        let agent = &mut self.agents[idx];
        agent.energy = (agent.energy + idle_regen).min(max_energy);
    }

    /// Energy expenditure that is not combat damage: no hurt flash, but the
    /// same death handling as any other drain.
    pub(crate) fn spend_energy(&mut self, idx: usize, amount: f32) -> bool {
        let max_energy = self.config.max_energy;
        let died = {
            let agent = &mut self.agents[idx];
            set_agent_energy(agent, agent.energy - amount, max_energy)
        };
        if died {
            let (x, y) = (self.agents[idx].x, self.agents[idx].y);
            self.grid.release(x, y, Occupant::Agent(idx));
            self.metrics.deaths_last_tick += 1;
        }
        died
    }

    fn update_agent(&mut self, idx: usize) {
        let hunger_rate = self.config.hunger_rate;
        let max_hunger = self.config.max_hunger;
        let metabolism_base = self.config.metabolism_base;
        {
            let agent = &mut self.agents[idx];
            agent.age += 1;
            agent.move_cooldown = agent.move_cooldown.saturating_sub(1);
            agent.attack_cooldown = agent.attack_cooldown.saturating_sub(1);
            agent.reproduction_cooldown = agent.reproduction_cooldown.saturating_sub(1);
            agent.hurt_flash = agent.hurt_flash.saturating_sub(1);
            agent.attack_flash = agent.attack_flash.saturating_sub(1);
            agent.hunger = (agent.hunger + hunger_rate).min(max_hunger);
        }
        let agent = &self.agents[idx];
        let upkeep = metabolism_base
            * metabolism_factor(agent.diet)
            * (1.0 - 0.3 * agent.traits.metabolic_efficiency);
        self.spend_energy(idx, upkeep);
    }

    fn update_plant(&mut self, idx: usize) {
        let photosynthesis_rate = self.config.photosynthesis_rate;
        let plant_max = self.config.plant_max_energy;
        let mature_age = u64::from(self.config.plant_mature_age);
        let decay_chance = self.config.plant_decay_chance;
        let decay_amount = self.config.plant_decay_amount;

        let Self {
            plants, grid, rng, ..
        } = self;
        let plant = &mut plants[idx];
        plant.age += 1;
        if plant.energy < plant_max {
            plant.energy = (plant.energy + photosynthesis_rate).min(plant_max);
        }
        // The decay draw happens only for mature plants, keeping the stream
        // independent of the sapling population.
        if plant.age > mature_age && rng.random::<f32>() < decay_chance {
            let died = set_plant_energy(plant, plant.energy - decay_amount, plant_max);
            if died {
                grid.release(plant.x, plant.y, Occupant::Plant(idx));
            }
        }
    }

    pub(crate) fn tick_summary(&self) -> TickSummary {
        let census = self.census();
        TickSummary {
            tick: self.turn,
            herbivores: census.herbivores,
            omnivores: census.omnivores,
            carnivores: census.carnivores,
            plants: census.plants,
            structures: census.structures,
            births: self.metrics.births_last_tick,
            deaths: self.metrics.deaths_last_tick,
            attacks: self.metrics.attacks_last_tick,
            plants_eaten: self.metrics.plants_eaten_last_tick,
            plants_grown: self.metrics.plants_grown_last_tick,
            average_energy: census.average_energy,
        }
    }
}

/// Clamps into [0, max], flipping `alive` exactly once on the crossing to
/// zero. Returns whether this write was the death transition; the caller owns
/// vacating the grid cell.
pub(crate) fn set_agent_energy(agent: &mut AgentState, value: f32, max_energy: f32) -> bool {
    agent.energy = value.clamp(0.0, max_energy);
    if agent.energy <= 0.0 && agent.alive {
        agent.alive = false;
        return true;
    }
    false
}

pub(crate) fn set_plant_energy(plant: &mut PlantState, value: f32, max_energy: f32) -> bool {
    plant.energy = value.clamp(0.0, max_energy);
    if plant.energy <= 0.0 && plant.alive {
        plant.alive = false;
        return true;
    }
    false
}

pub(crate) fn metabolism_factor(diet: Diet) -> f32 {
    match diet {
        Diet::Herbivore => 1.0,
        Diet::Omnivore => 1.1,
        Diet::Carnivore => 1.2,
    }
}
