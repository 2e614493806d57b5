use microcosm_types::{AgentState, Diet, Occupant};

use crate::grid::DIRECTIONS;
use crate::turn::{set_agent_energy, set_plant_energy, FLASH_TICKS};
use crate::Simulation;

/// Off-diet strikes (a herbivore biting an agent, a carnivore biting a plant)
/// land for a token fraction of the computed damage.
pub(crate) const TOKEN_DAMAGE_FACTOR: f32 = 0.1;
pub(crate) const HUNGER_RELIEF_PER_ENERGY: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StrikeOutcome {
    Blocked,
    Struck { victim_killed: bool },
}

pub(crate) fn meat_efficiency(diet: Diet) -> f32 {
    match diet {
        Diet::Carnivore => 0.9,
        Diet::Omnivore => 0.45,
        Diet::Herbivore => 0.0,
    }
}

pub(crate) fn plant_efficiency(diet: Diet) -> f32 {
    match diet {
        Diet::Herbivore => 0.85,
        Diet::Omnivore => 0.45,
        Diet::Carnivore => 0.0,
    }
}

fn is_kin(a: &AgentState, b: &AgentState) -> bool {
    a.parent == Some(b.id) || b.parent == Some(a.id)
}

impl Simulation {
    /// Kinship blocks unconditionally. Predation pairings (meat-eater vs
    /// herbivore, herbivore vs herbivore) ignore bravery; everything else
    /// requires the attacker to match or exceed the victim's bravery.
    pub(crate) fn strike_permitted(&self, attacker_idx: usize, victim_idx: usize) -> bool {
        let attacker = &self.agents[attacker_idx];
        let victim = &self.agents[victim_idx];
        if is_kin(attacker, victim) {
            return false;
        }
        let fearless = matches!(
            (attacker.diet, victim.diet),
            (Diet::Carnivore | Diet::Omnivore, Diet::Herbivore)
                | (Diet::Herbivore, Diet::Herbivore)
        );
        fearless || attacker.traits.bravery >= victim.traits.bravery
    }

    /// One resolved strike: damage the victim, feed the attacker per its diet,
    /// then let a surviving victim with enough nerve counter once.
    pub(crate) fn strike_agent(&mut self, attacker_idx: usize, victim_idx: usize) -> StrikeOutcome {
        if !self.strike_permitted(attacker_idx, victim_idx) {
            return StrikeOutcome::Blocked;
        }

        let attack_damage = self.config.attack_damage;
        let retaliation_threshold = self.config.retaliation_threshold;
        let retaliation_fraction = self.config.retaliation_fraction;

        let attacker_diet = self.agents[attacker_idx].diet;
        let attacker_strength = self.agents[attacker_idx].traits.strength;
        let attacker_constitution = self.agents[attacker_idx].traits.constitution;
        let victim_diet = self.agents[victim_idx].diet;
        let victim_strength = self.agents[victim_idx].traits.strength;
        let victim_constitution = self.agents[victim_idx].traits.constitution;
        let victim_nerve = (self.agents[victim_idx].traits.bravery
            + self.agents[victim_idx].traits.perception)
            / 2.0;

        let mut damage =
            attack_damage * (1.0 + 0.5 * attacker_strength) / (1.0 + 0.5 * victim_constitution);
        if attacker_diet == Diet::Herbivore {
            damage *= TOKEN_DAMAGE_FACTOR;
        }
        let inflicted = damage.min(self.agents[victim_idx].energy);

        self.agents[attacker_idx].attack_flash = FLASH_TICKS;
        self.metrics.attacks_last_tick += 1;
        let victim_killed = self.damage_agent(victim_idx, inflicted);

        let transfer = inflicted * meat_efficiency(attacker_diet);
        if transfer > 0.0 {
            self.gain_energy(attacker_idx, transfer);
            self.agents[attacker_idx].meals_count += 1;
        }

        if victim_killed {
            self.agents[attacker_idx].kills_count += 1;
        } else if victim_nerve > retaliation_threshold {
            let counter = retaliation_fraction * attack_damage * (1.0 + 0.5 * victim_strength)
                / (1.0 + 0.5 * attacker_constitution);
            let counter = counter.min(self.agents[attacker_idx].energy);
            let attacker_killed = self.damage_agent(attacker_idx, counter);
            if attacker_killed {
                self.agents[victim_idx].kills_count += 1;
                let spoils = counter * meat_efficiency(victim_diet);
                if spoils > 0.0 {
                    self.gain_energy(victim_idx, spoils);
                    self.agents[victim_idx].meals_count += 1;
                }
            }
        }

        StrikeOutcome::Struck { victim_killed }
    }

    /// Strikes every adjacent agent the attacker is permitted to hit, in
    /// compass order. Returns whether any strike landed; stops early if a
    /// retaliation kills the attacker mid-sweep.
    pub(crate) fn area_attack(&mut self, attacker_idx: usize) -> bool {
        let (x, y) = (self.agents[attacker_idx].x, self.agents[attacker_idx].y);
        let mut any_struck = false;
        for (dx, dy) in DIRECTIONS {
            if !self.agents[attacker_idx].alive {
                break;
            }
            let Some(Occupant::Agent(victim_idx)) = self.grid.get(x + dx, y + dy) else {
                continue;
            };
            if self.strike_agent(attacker_idx, victim_idx) != StrikeOutcome::Blocked {
                any_struck = true;
            }
        }
        any_struck
    }

    /// Deducts energy through the clamping setter. On the death transition the
    /// victim's cell is vacated and the death counted, exactly once.
    pub(crate) fn damage_agent(&mut self, idx: usize, amount: f32) -> bool {
        let max_energy = self.config.max_energy;
        let died = {
            let agent = &mut self.agents[idx];
            agent.hurt_flash = FLASH_TICKS;
            set_agent_energy(agent, agent.energy - amount, max_energy)
        };
        if died {
            let (x, y) = (self.agents[idx].x, self.agents[idx].y);
            self.grid.release(x, y, Occupant::Agent(idx));
            self.metrics.deaths_last_tick += 1;
        }
        died
    }

    pub(crate) fn gain_energy(&mut self, idx: usize, amount: f32) {
        let max_energy = self.config.max_energy;
        let agent = &mut self.agents[idx];
        agent.energy = (agent.energy + amount).min(max_energy);
        agent.hunger = (agent.hunger - amount * HUNGER_RELIEF_PER_ENERGY).max(0.0);
    }

    /// One bite. A dead plant's cell is vacated here so a grazing mover can
    /// claim it in the same action.
    pub(crate) fn graze_plant(&mut self, agent_idx: usize, plant_idx: usize) -> bool {
        let plant_max = self.config.plant_max_energy;
        let diet = self.agents[agent_idx].diet;
        let strength = self.agents[agent_idx].traits.strength;

        let mut damage = self.config.plant_bite_damage * (1.0 + 0.5 * strength);
        if diet == Diet::Carnivore {
            damage *= TOKEN_DAMAGE_FACTOR;
        }
        let inflicted = damage.min(self.plants[plant_idx].energy);

        let died = {
            let plant = &mut self.plants[plant_idx];
            set_plant_energy(plant, plant.energy - inflicted, plant_max)
        };
        if died {
            let (x, y) = (self.plants[plant_idx].x, self.plants[plant_idx].y);
            self.grid.release(x, y, Occupant::Plant(plant_idx));
            self.metrics.plants_eaten_last_tick += 1;
        }

        let gain = inflicted * plant_efficiency(diet);
        if gain > 0.0 {
            self.gain_energy(agent_idx, gain);
            self.agents[agent_idx].meals_count += 1;
        }
        died
    }
}
