use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

/// One packed neural connection: `[weight:16][sink:8][source:8]`.
///
/// The weight field is signed fixed-point (scale 8192), clamped to
/// `±WEIGHT_LIMIT` before encoding. Mutation never edits a gene in place; it
/// produces a replacement value with one bit flipped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Gene(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedGene {
    pub source: u8,
    pub sink: u8,
    pub weight: f32,
}

impl Gene {
    pub const WEIGHT_SCALE: f32 = 8192.0;
    pub const WEIGHT_LIMIT: f32 = 4.0;

    pub fn encode(source: u8, sink: u8, weight: f32) -> Self {
        let clamped = weight.clamp(-Self::WEIGHT_LIMIT, Self::WEIGHT_LIMIT);
        let scaled = (clamped * Self::WEIGHT_SCALE).round() as i32;
        let quantized = scaled.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        Gene(u32::from(source) | (u32::from(sink) << 8) | (u32::from(quantized as u16) << 16))
    }

    pub fn decode(self) -> DecodedGene {
        DecodedGene {
            source: (self.0 & 0xFF) as u8,
            sink: ((self.0 >> 8) & 0xFF) as u8,
            weight: ((self.0 >> 16) as u16 as i16) as f32 / Self::WEIGHT_SCALE,
        }
    }

    pub fn with_flipped_bit(self, bit: u32) -> Self {
        Gene(self.0 ^ (1 << bit))
    }
}

/// Fixed-length ordered gene sequence. Length is a run-wide constant
/// (`WorldConfig::genome_length`); the final `TRAIT_GENE_COUNT` genes double
/// as paired trait storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genome {
    pub genes: Vec<Gene>,
}

impl Genome {
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TraitId {
    Strength,
    Bravery,
    MetabolicEfficiency,
    Perception,
    Speed,
    TrophicBias,
    Constitution,
}

impl TraitId {
    pub const ALL: [TraitId; 7] = [
        TraitId::Strength,
        TraitId::Bravery,
        TraitId::MetabolicEfficiency,
        TraitId::Perception,
        TraitId::Speed,
        TraitId::TrophicBias,
        TraitId::Constitution,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Genes reserved at the genome tail for trait pairs. Trait 0 reads the last
/// pair, trait 1 the pair before it, and so on.
pub const TRAIT_GENE_COUNT: usize = TraitId::ALL.len() * 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct TraitSet {
    pub strength: f32,
    pub bravery: f32,
    pub metabolic_efficiency: f32,
    pub perception: f32,
    pub speed: f32,
    pub trophic_bias: f32,
    pub constitution: f32,
}

impl TraitSet {
    pub fn get(&self, id: TraitId) -> f32 {
        match id {
            TraitId::Strength => self.strength,
            TraitId::Bravery => self.bravery,
            TraitId::MetabolicEfficiency => self.metabolic_efficiency,
            TraitId::Perception => self.perception,
            TraitId::Speed => self.speed,
            TraitId::TrophicBias => self.trophic_bias,
            TraitId::Constitution => self.constitution,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Diet {
    Herbivore,
    Omnivore,
    Carnivore,
}

impl Diet {
    pub const ALL: [Diet; 3] = [Diet::Herbivore, Diet::Omnivore, Diet::Carnivore];

    /// Trophic bias below the split is herbivory, above is carnivory, the
    /// middle band is omnivory.
    pub const TROPHIC_SPLIT: f32 = 1.0 / 3.0;

    pub fn from_trophic_bias(bias: f32) -> Self {
        if bias < -Self::TROPHIC_SPLIT {
            Diet::Herbivore
        } else if bias > Self::TROPHIC_SPLIT {
            Diet::Carnivore
        } else {
            Diet::Omnivore
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentState {
    pub id: AgentId,
    pub parent: Option<AgentId>,
    pub generation: u32,
    pub diet: Diet,
    pub alive: bool,
    pub x: i32,
    pub y: i32,
    pub energy: f32,
    pub hunger: f32,
    pub age: u64,
    pub genome: Genome,
    pub neurons: Vec<f32>,
    pub traits: TraitSet,
    pub move_cooldown: u32,
    pub attack_cooldown: u32,
    pub reproduction_cooldown: u32,
    pub hurt_flash: u32,
    pub attack_flash: u32,
    pub offspring_count: u64,
    pub kills_count: u64,
    pub meals_count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlantState {
    pub x: i32,
    pub y: i32,
    pub age: u64,
    pub energy: f32,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructureState {
    pub x: i32,
    pub y: i32,
}

/// Grid cell payload: which population array the occupant lives in, and at
/// which slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "index")]
pub enum Occupant {
    Agent(usize),
    Plant(usize),
    Structure(usize),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Census {
    pub herbivores: u32,
    pub omnivores: u32,
    pub carnivores: u32,
    pub plants: u32,
    pub structures: u32,
    pub average_energy: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct TickSummary {
    pub tick: u64,
    pub herbivores: u32,
    pub omnivores: u32,
    pub carnivores: u32,
    pub plants: u32,
    pub structures: u32,
    pub births: u32,
    pub deaths: u32,
    pub attacks: u32,
    pub plants_eaten: u32,
    pub plants_grown: u32,
    pub average_energy: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SimMetrics {
    pub ticks: u64,
    pub births_last_tick: u32,
    pub deaths_last_tick: u32,
    pub attacks_last_tick: u32,
    pub plants_eaten_last_tick: u32,
    pub plants_grown_last_tick: u32,
    pub total_births: u64,
    pub total_deaths: u64,
    pub total_attacks: u64,
    pub total_plants_eaten: u64,
    pub total_plants_grown: u64,
}

/// Full serializable world state. Population arrays keep their dead slots so
/// two snapshots compare equal only when slot assignment matched as well.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldSnapshot {
    pub turn: u64,
    pub rng_seed: u64,
    pub config: WorldConfig,
    pub agents: Vec<AgentState>,
    pub plants: Vec<PlantState>,
    pub structures: Vec<StructureState>,
    pub metrics: SimMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldConfig {
    pub world_width: u32,
    pub world_height: u32,
    pub initial_agents: u32,
    pub initial_plants: u32,
    pub initial_structures: u32,
    pub genome_length: u32,
    pub gene_weight_range: f32,
    pub mutation_rate: f32,
    pub max_energy: f32,
    pub starting_energy: f32,
    #[serde(default = "default_max_hunger")]
    pub max_hunger: f32,
    #[serde(default = "default_hunger_rate")]
    pub hunger_rate: f32,
    #[serde(default = "default_hunger_gate_fraction")]
    pub hunger_gate_fraction: f32,
    pub metabolism_base: f32,
    pub idle_regen: f32,
    pub maturity_age: u32,
    pub reproduction_overhead_fraction: f32,
    pub reproduction_buffer: f32,
    pub reproduction_cooldown: u32,
    #[serde(default = "default_birth_placement_attempts")]
    pub birth_placement_attempts: u32,
    pub move_cost: f32,
    pub move_threshold: f32,
    #[serde(default)]
    pub move_cooldown: u32,
    pub structure_collision_cost: f32,
    pub attack_damage: f32,
    pub plant_bite_damage: f32,
    pub attack_cost: f32,
    pub attack_threshold: f32,
    #[serde(default)]
    pub attack_cooldown: u32,
    #[serde(default = "default_retaliation_threshold")]
    pub retaliation_threshold: f32,
    #[serde(default = "default_retaliation_fraction")]
    pub retaliation_fraction: f32,
    pub plant_max_energy: f32,
    pub plant_start_energy: f32,
    pub photosynthesis_rate: f32,
    pub plant_mature_age: u32,
    pub plant_decay_chance: f32,
    pub plant_decay_amount: f32,
    #[serde(default = "default_plant_regrowth_per_tick")]
    pub plant_regrowth_per_tick: u32,
    #[serde(default = "default_vision_range")]
    pub vision_range: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        toml::from_str(include_str!("../../config/default.toml"))
            .expect("default world config TOML must parse")
    }
}

fn default_max_hunger() -> f32 {
    100.0
}

fn default_hunger_rate() -> f32 {
    0.35
}

fn default_hunger_gate_fraction() -> f32 {
    0.75
}

fn default_birth_placement_attempts() -> u32 {
    8
}

fn default_retaliation_threshold() -> f32 {
    0.15
}

fn default_retaliation_fraction() -> f32 {
    0.5
}

fn default_plant_regrowth_per_tick() -> u32 {
    3
}

fn default_vision_range() -> u32 {
    4
}
