use microcosm_types::{Gene, Genome, TraitId, TraitSet, WorldConfig, TRAIT_GENE_COUNT};
use rand::Rng;

use crate::brain::NEURON_COUNT;
use crate::SimError;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub(crate) fn generate_genome<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Genome {
    let range = config.gene_weight_range;
    let genes = (0..config.genome_length)
        .map(|_| {
            let source = rng.random_range(0..NEURON_COUNT as u8);
            let sink = rng.random_range(0..NEURON_COUNT as u8);
            let weight = rng.random_range(-range..range);
            Gene::encode(source, sink, weight)
        })
        .collect();
    Genome { genes }
}

/// Per-gene Bernoulli point mutation. The uniform draw happens for every gene
/// whether or not it mutates, so equal-length genomes consume equal amounts
/// of the stream.
pub(crate) fn mutate_genome<R: Rng + ?Sized>(genome: &mut Genome, mutation_rate: f32, rng: &mut R) {
    for gene in &mut genome.genes {
        if rng.random::<f32>() < mutation_rate {
            let bit = rng.random_range(0..32);
            *gene = gene.with_flipped_bit(bit);
        }
    }
}

pub(crate) fn replicate_genome<R: Rng + ?Sized>(
    parent: &Genome,
    mutation_rate: f32,
    rng: &mut R,
) -> Genome {
    let mut child = parent.clone();
    mutate_genome(&mut child, mutation_rate, rng);
    child
}

/// Reads the trait pair from the genome tail. Trait 0 owns the last two
/// genes, trait 1 the two before, and so on through `TRAIT_GENE_COUNT`.
pub(crate) fn extract_trait(genome: &Genome, id: TraitId) -> f32 {
    let base = genome.genes.len() - 2 * (id.index() + 1);
    let first = genome.genes[base].decode().weight;
    let second = genome.genes[base + 1].decode().weight;
    (((first + second) / 2.0) / Gene::WEIGHT_LIMIT).clamp(-1.0, 1.0)
}

pub(crate) fn extract_traits(genome: &Genome) -> TraitSet {
    TraitSet {
        strength: extract_trait(genome, TraitId::Strength),
        bravery: extract_trait(genome, TraitId::Bravery),
        metabolic_efficiency: extract_trait(genome, TraitId::MetabolicEfficiency),
        perception: extract_trait(genome, TraitId::Perception),
        speed: extract_trait(genome, TraitId::Speed),
        trophic_bias: extract_trait(genome, TraitId::TrophicBias),
        constitution: extract_trait(genome, TraitId::Constitution),
    }
}

/// Fraction of positions holding bit-identical genes. Length mismatch means
/// the genomes come from different runs and compare as fully dissimilar.
pub fn genome_similarity(a: &Genome, b: &Genome) -> f32 {
    if a.genes.len() != b.genes.len() {
        return 0.0;
    }
    if a.genes.is_empty() {
        return 1.0;
    }
    let matching = a
        .genes
        .iter()
        .zip(&b.genes)
        .filter(|(left, right)| left == right)
        .count();
    matching as f32 / a.genes.len() as f32
}

/// FNV-1a over each gene's four bytes, least significant first, in genome
/// order. Stable across runs so hashes can identify lineages externally.
pub fn genome_hash(genome: &Genome) -> u64 {
    let mut hash = FNV_OFFSET;
    for gene in &genome.genes {
        for shift in [0u32, 8, 16, 24] {
            hash ^= u64::from((gene.0 >> shift) & 0xFF);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

pub(crate) fn validate_genome_config(config: &WorldConfig) -> Result<(), SimError> {
    if config.genome_length as usize <= TRAIT_GENE_COUNT {
        return Err(SimError::InvalidConfig(format!(
            "genome_length must exceed the {TRAIT_GENE_COUNT} reserved trait genes",
        )));
    }
    if !(0.0..=1.0).contains(&config.mutation_rate) {
        return Err(SimError::InvalidConfig(
            "mutation_rate must be within [0, 1]".to_owned(),
        ));
    }
    if config.gene_weight_range <= 0.0 {
        return Err(SimError::InvalidConfig(
            "gene_weight_range must be positive".to_owned(),
        ));
    }
    Ok(())
}
