//! Simulated path container

use crate::error::{EngineError, Result};

/// Simulated values indexed by `(step, path)`
///
/// Each path is stored contiguously, so per-path work (generation, fee
/// haircuts) runs on plain slices and parallelises across paths.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatrix {
    steps: usize,
    n_paths: usize,
    data: Vec<f64>,
}

impl PathMatrix {
    /// Matrix of `steps` rows and `n_paths` columns, all zero
    pub fn zeros(steps: usize, n_paths: usize) -> Result<Self> {
        if steps == 0 || n_paths == 0 {
            return Err(EngineError::invalid_parameters(format!(
                "path matrix needs at least one step and one path, got {steps} x {n_paths}"
            )));
        }
        Ok(Self {
            steps,
            n_paths,
            data: vec![0.0; steps * n_paths],
        })
    }

    /// Every path held constant at its own value for `steps` rows
    pub fn tiled(values: &[f64], steps: usize) -> Result<Self> {
        let mut matrix = Self::zeros(steps, values.len())?;
        for (path, &value) in matrix.paths_mut().zip(values) {
            path.fill(value);
        }
        Ok(matrix)
    }

    /// Number of time steps (rows)
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    pub fn get(&self, step: usize, path: usize) -> f64 {
        self.data[path * self.steps + step]
    }

    pub fn path(&self, path: usize) -> &[f64] {
        &self.data[path * self.steps..(path + 1) * self.steps]
    }

    pub fn paths(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.steps)
    }

    pub fn paths_mut(&mut self) -> std::slice::ChunksExactMut<'_, f64> {
        self.data.chunks_exact_mut(self.steps)
    }

    /// Raw path-major storage, for parallel fills
    pub(crate) fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Values of every path at one step
    pub fn row(&self, step: usize) -> Vec<f64> {
        self.paths().map(|p| p[step]).collect()
    }

    /// Values of every path at the last step
    pub fn terminal_values(&self) -> Vec<f64> {
        self.row(self.steps - 1)
    }

    /// Cross-path mean at each step
    pub fn step_means(&self) -> Vec<f64> {
        let mut means = vec![0.0; self.steps];
        for path in self.paths() {
            for (m, v) in means.iter_mut().zip(path) {
                *m += v;
            }
        }
        let n = self.n_paths as f64;
        means.iter_mut().for_each(|m| *m /= n);
        means
    }

    /// Multiply every value by `factor`
    pub fn scale(&mut self, factor: f64) {
        self.data.iter_mut().for_each(|v| *v *= factor);
    }

    /// Add `weight * other` element-wise
    pub fn add_scaled(&mut self, other: &PathMatrix, weight: f64) -> Result<()> {
        if self.steps != other.steps || self.n_paths != other.n_paths {
            return Err(EngineError::invalid_parameters(format!(
                "cannot combine {}x{} paths with {}x{}",
                self.steps, self.n_paths, other.steps, other.n_paths
            )));
        }
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += weight * b;
        }
        Ok(())
    }

    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}
