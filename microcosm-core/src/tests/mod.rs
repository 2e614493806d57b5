pub(super) use super::*;
pub(super) use crate::brain::{
    effective_vision, think, Action, ACTION_START, HIDDEN_START, NEURON_COUNT, SENSOR_AGE,
    SENSOR_COUNT, SENSOR_DENSITY_START, SENSOR_ENERGY, SENSOR_HUNGER, SENSOR_OSCILLATOR,
    SENSOR_POS_X, SENSOR_POS_Y, SENSOR_RANDOM, SENSOR_RAY_START, SENSOR_TRAIT_START,
};
pub(super) use crate::genetics::{
    extract_trait, extract_traits, generate_genome, genome_hash, genome_similarity, mutate_genome,
    replicate_genome,
};
pub(super) use crate::grid::DIRECTIONS;
pub(super) use crate::turn::{set_agent_energy, set_plant_energy, FLASH_TICKS};
pub(super) use microcosm_types::{Gene, Genome, TraitId};
pub(super) use rand::SeedableRng;
pub(super) use rand_chacha::ChaCha8Rng;

mod reproduction_and_spawn;
mod support;
