//! Mutation operators.
//!
//! Every operator redraws targeted genes uniformly within their bounds,
//! excluding the current value, then recomputes the active structures
//! once. Genes whose bounds pin a single value are left alone.

// Gene index arithmetic uses intentional narrowing casts
#![allow(clippy::cast_possible_truncation)]

use crate::expression::program::Expression;
use rand::Rng;

impl Expression {
    /// Mutate the genes at the given chromosome indices.
    ///
    /// Indices past the end of the chromosome are ignored.
    pub fn mutate(&mut self, indices: &[usize]) {
        for &index in indices {
            if index >= self.chromosome.len() {
                continue;
            }
            let lb = self.lower[index];
            let ub = self.upper[index];
            if lb == ub {
                continue;
            }
            // Draw from the span minus one and shift past the current
            // value, so the result is uniform over the other candidates.
            let current = self.chromosome[index];
            let mut gene = self.rng.gen_range(lb..ub);
            if gene >= current {
                gene += 1;
            }
            self.chromosome[index] = gene;
        }
        self.update_active();
    }

    /// Mutate `count` genes drawn anywhere in the chromosome.
    pub fn mutate_random(&mut self, count: u32) {
        let len = self.chromosome.len();
        let indices = self.draw_indices(count, len);
        self.mutate(&indices);
    }

    /// Mutate `count` genes drawn from the active genes.
    pub fn mutate_active(&mut self, count: u32) {
        let pool = self.active_genes.clone();
        let indices = self.draw_from_pool(count, &pool);
        self.mutate(&indices);
    }

    /// Mutate `count` active connection genes.
    pub fn mutate_active_connections(&mut self, count: u32) {
        let pool: Vec<usize> = self
            .active_genes
            .iter()
            .copied()
            .filter(|&i| self.gene_kind(i) == GeneKind::Connection)
            .collect();
        let indices = self.draw_from_pool(count, &pool);
        self.mutate(&indices);
    }

    /// Mutate `count` active function genes.
    pub fn mutate_active_functions(&mut self, count: u32) {
        let pool: Vec<usize> = self
            .active_genes
            .iter()
            .copied()
            .filter(|&i| self.gene_kind(i) == GeneKind::Function)
            .collect();
        let indices = self.draw_from_pool(count, &pool);
        self.mutate(&indices);
    }

    /// Mutate `count` output genes.
    pub fn mutate_outputs(&mut self, count: u32) {
        let out_start = self.chromosome.len() - self.outputs as usize;
        let indices: Vec<usize> = self
            .draw_indices(count, self.outputs as usize)
            .iter()
            .map(|i| i + out_start)
            .collect();
        self.mutate(&indices);
    }

    /// Classify the gene at a chromosome index.
    fn gene_kind(&self, index: usize) -> GeneKind {
        let block = self.arity as usize + 1;
        let node_gene_count = (self.rows * self.columns) as usize * block;
        if index >= node_gene_count {
            GeneKind::Output
        } else if index % block == 0 {
            GeneKind::Function
        } else {
            GeneKind::Connection
        }
    }

    /// Draw `count` indices below `bound`.
    fn draw_indices(&mut self, count: u32, bound: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(count as usize);
        if bound == 0 {
            return out;
        }
        for _ in 0..count {
            out.push(self.rng.gen_range(0..bound));
        }
        out
    }

    /// Draw `count` indices out of an explicit pool.
    fn draw_from_pool(&mut self, count: u32, pool: &[usize]) -> Vec<usize> {
        let mut out = Vec::with_capacity(count as usize);
        if pool.is_empty() {
            return out;
        }
        for _ in 0..count {
            let pick = self.rng.gen_range(0..pool.len());
            out.push(pool[pick]);
        }
        out
    }
}

/// Role of a gene within the chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GeneKind {
    Function,
    Connection,
    Output,
}
