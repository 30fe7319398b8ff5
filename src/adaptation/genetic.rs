//! Genetic Strategy Optimizer
//!
//! Maintains a fixed-size population of gene vectors (genes in `[0, 1]`).
//! Gene 0 is a speed proxy and gene 1 an accuracy proxy; fitness is their mean.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::f64::consts::PI;
use tracing::debug;

use super::{AdaptationAlgorithm, AdaptationResult};
use crate::models::{AlgorithmKind, LearningContext, PerformanceMetrics};

/// Generations evolved per `adapt` call
pub const GENERATIONS_PER_ADAPT: usize = 5;

/// Gene value substituted when an individual has fewer than two genes
const MISSING_GENE: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct GeneticConfig {
    pub population_size: usize,
    /// Per-gene mutation probability
    pub mutation_rate: f64,
    pub gene_count: usize,
    /// Standard deviation of the zero-mean mutation offset
    pub mutation_sigma: f64,
    /// Fixed RNG seed (random when `None`)
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            mutation_rate: 0.1,
            gene_count: 5,
            mutation_sigma: 0.1,
            seed: None,
        }
    }
}

/// One candidate strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Individual {
    pub genes: Vec<f64>,
    pub fitness: f64,
}

impl Individual {
    fn new(genes: Vec<f64>) -> Self {
        Self { genes, fitness: 0.0 }
    }

    /// Mean of the speed and accuracy genes
    pub fn evaluate(genes: &[f64]) -> f64 {
        let speed = genes.first().copied().unwrap_or(MISSING_GENE);
        let accuracy = genes.get(1).copied().unwrap_or(MISSING_GENE);
        (speed + accuracy) / 2.0
    }

    fn mutate(&mut self, rate: f64, sigma: f64, rng: &mut SmallRng) {
        for gene in self.genes.iter_mut() {
            if rng.gen::<f64>() < rate {
                *gene = (*gene + gaussian(rng, sigma)).clamp(0.0, 1.0);
            }
        }
    }
}

/// Zero-mean normal sample (Box-Muller)
fn gaussian(rng: &mut SmallRng, sigma: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

pub struct GeneticOptimizer {
    config: GeneticConfig,
    population: Vec<Individual>,
    generation: u64,
    rng: SmallRng,
}

impl GeneticOptimizer {
    pub fn new(config: GeneticConfig) -> Self {
        let mut config = config;
        config.population_size = config.population_size.max(1);
        config.mutation_rate = config.mutation_rate.clamp(0.0, 1.0);

        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let population = (0..config.population_size)
            .map(|_| Individual::new((0..config.gene_count).map(|_| rng.gen::<f64>()).collect()))
            .collect();

        Self {
            config,
            population,
            generation: 0,
            rng,
        }
    }

    /// Deterministic optimizer for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self::new(GeneticConfig {
            seed: Some(seed),
            ..GeneticConfig::default()
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Fittest individual of the current population
    pub fn best(&self) -> Option<&Individual> {
        self.population
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    fn evaluate_population(&mut self) {
        for individual in self.population.iter_mut() {
            individual.fitness = Individual::evaluate(&individual.genes);
        }
    }

    /// Score, keep the top half, refill with mutated clones of random survivors
    pub fn evolve_generation(&mut self) {
        self.evaluate_population();
        self.population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let size = self.config.population_size;
        let survivor_count = (size / 2).max(1);
        self.population.truncate(survivor_count);

        while self.population.len() < size {
            let parent = self.rng.gen_range(0..survivor_count);
            let mut child = Individual::new(self.population[parent].genes.clone());
            child.mutate(self.config.mutation_rate, self.config.mutation_sigma, &mut self.rng);
            self.population.push(child);
        }

        self.generation += 1;
    }
}

impl AdaptationAlgorithm for GeneticOptimizer {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::GeneticAlgorithm
    }

    fn adapt(&mut self, _context: &LearningContext, performance: &PerformanceMetrics) -> AdaptationResult {
        debug!(
            "Evolving {} generations (success_rate={:.2}, execution_time={:.2}s)",
            GENERATIONS_PER_ADAPT, performance.success_rate, performance.execution_time
        );

        for _ in 0..GENERATIONS_PER_ADAPT {
            self.evolve_generation();
        }
        self.evaluate_population();

        let (best_strategy, fitness) = self
            .best()
            .map(|b| (b.genes.clone(), b.fitness))
            .unwrap_or_default();

        AdaptationResult::GeneticAlgorithm {
            best_strategy,
            fitness,
            generation: self.generation,
        }
    }

    fn evaluate_recent_performance(&self, scores: &[f64]) -> f64 {
        scores.iter().copied().reduce(f64::max).unwrap_or(0.0)
    }
}
