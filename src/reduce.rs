//! Dimensionality reduction for visualization.
//!
//! Two methods, matching what the exploration UI uses:
//!
//! - [`Pca`]: linear projection onto principal axes, with an inverse
//!   transform so reduced points can be mapped back to latent space.
//! - [`Tsne`]: nonlinear 2D embedding for neighborhood-preserving maps.
//!   Exact (O(n²)) formulation; the map endpoint only ever feeds it small
//!   subsets, so this is deliberate.
//!
//! Internals run in f64 and hand back f32, like the rest of the crate.

use crate::embedding::Embedding;
use crate::error::{FontscapeError, FontscapeResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which reduction method to use, as named in config and the JSON API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    /// Principal component analysis.
    Pca,
    /// t-distributed stochastic neighbor embedding.
    Tsne,
}

impl std::fmt::Display for Reduction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reduction::Pca => f.write_str("pca"),
            Reduction::Tsne => f.write_str("tsne"),
        }
    }
}

impl FromStr for Reduction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pca" => Ok(Reduction::Pca),
            "tsne" | "t-sne" => Ok(Reduction::Tsne),
            other => Err(format!("unknown reduction method '{}'", other)),
        }
    }
}

/// Reduce a sample of embeddings to 2D with the chosen method.
pub fn reduce_to_2d(samples: &[Embedding], method: Reduction) -> FontscapeResult<Vec<[f32; 2]>> {
    match method {
        Reduction::Pca => {
            let pca = Pca::fit(samples, 2)?;
            Ok(samples
                .iter()
                .map(|s| {
                    let p = pca.transform(s);
                    [p[0], p[1]]
                })
                .collect())
        }
        Reduction::Tsne => Tsne::default().fit_transform(samples),
    }
}

/// A fitted PCA model.
///
/// Principal axes are found by power iteration with deflation on the sample
/// covariance matrix. Latent dimensionalities here are small (single
/// digits to low tens), so the dense d×d covariance is cheap.
#[derive(Debug, Clone)]
pub struct Pca {
    mean: Vec<f64>,
    /// Orthonormal principal axes, each of length `input_dims`
    components: Vec<Vec<f64>>,
    /// Eigenvalue per component (sample variance along that axis)
    explained_variance: Vec<f64>,
    input_dims: usize,
}

impl Pca {
    /// Fit a PCA model on a sample of embeddings.
    ///
    /// # Errors
    ///
    /// Returns `ReductionError` when there are fewer than two samples, when
    /// `n_components` is zero or exceeds the input dimensionality or sample
    /// count, or when samples disagree on dimensionality.
    pub fn fit(samples: &[Embedding], n_components: usize) -> FontscapeResult<Self> {
        let n = samples.len();
        if n < 2 {
            return Err(FontscapeError::ReductionError(format!(
                "PCA needs at least 2 samples, got {}",
                n
            )));
        }
        let d = samples[0].dimensions();
        if n_components == 0 || n_components > d {
            return Err(FontscapeError::ReductionError(format!(
                "cannot extract {} components from {}-dimensional data",
                n_components, d
            )));
        }
        if n_components > n {
            return Err(FontscapeError::ReductionError(format!(
                "cannot extract {} components from {} samples",
                n_components, n
            )));
        }
        if samples.iter().any(|s| s.dimensions() != d) {
            return Err(FontscapeError::ReductionError(
                "samples have inconsistent dimensions".to_string(),
            ));
        }

        // Mean-center.
        let mut mean = vec![0.0f64; d];
        for s in samples {
            for (m, &x) in mean.iter_mut().zip(s.as_slice()) {
                *m += f64::from(x);
            }
        }
        for m in &mut mean {
            *m /= n as f64;
        }

        let centered: Vec<Vec<f64>> = samples
            .iter()
            .map(|s| {
                s.as_slice()
                    .iter()
                    .zip(&mean)
                    .map(|(&x, m)| f64::from(x) - m)
                    .collect()
            })
            .collect();

        // Sample covariance, d×d.
        let mut cov = vec![vec![0.0f64; d]; d];
        for row in &centered {
            for i in 0..d {
                for j in i..d {
                    cov[i][j] += row[i] * row[j];
                }
            }
        }
        let denom = (n - 1) as f64;
        for i in 0..d {
            for j in i..d {
                cov[i][j] /= denom;
                cov[j][i] = cov[i][j];
            }
        }

        // Leading eigenvectors by power iteration, deflating after each.
        let mut rng = StdRng::seed_from_u64(42);
        let mut components = Vec::with_capacity(n_components);
        let mut explained_variance = Vec::with_capacity(n_components);

        for _ in 0..n_components {
            let (eigenvector, eigenvalue) = power_iteration(&cov, &mut rng);
            deflate(&mut cov, &eigenvector, eigenvalue);
            components.push(eigenvector);
            explained_variance.push(eigenvalue.max(0.0));
        }

        Ok(Self {
            mean,
            components,
            explained_variance,
            input_dims: d,
        })
    }

    /// Fit on the samples and project them all in one call.
    pub fn fit_transform(
        samples: &[Embedding],
        n_components: usize,
    ) -> FontscapeResult<(Vec<Vec<f32>>, Self)> {
        let pca = Self::fit(samples, n_components)?;
        let reduced = samples.iter().map(|s| pca.transform(s)).collect();
        Ok((reduced, pca))
    }

    /// Number of fitted components.
    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    /// Sample variance captured by each component, largest first.
    pub fn explained_variance(&self) -> Vec<f32> {
        self.explained_variance.iter().map(|&v| v as f32).collect()
    }

    /// Project one embedding into the reduced space.
    ///
    /// Components beyond the embedding's length contribute nothing; the
    /// caller is expected to pass embeddings of the fitted dimensionality.
    pub fn transform(&self, sample: &Embedding) -> Vec<f32> {
        let centered: Vec<f64> = sample
            .as_slice()
            .iter()
            .zip(&self.mean)
            .map(|(&x, m)| f64::from(x) - m)
            .collect();

        self.components
            .iter()
            .map(|axis| {
                axis.iter()
                    .zip(&centered)
                    .map(|(a, c)| a * c)
                    .sum::<f64>() as f32
            })
            .collect()
    }

    /// Map a reduced point back into latent space.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `reduced` has a different length than
    /// the fitted component count.
    pub fn inverse_transform(&self, reduced: &[f32]) -> FontscapeResult<Embedding> {
        if reduced.len() != self.components.len() {
            return Err(FontscapeError::DimensionMismatch {
                expected: self.components.len(),
                actual: reduced.len(),
            });
        }

        let mut reconstructed = self.mean.clone();
        for (axis, &coord) in self.components.iter().zip(reduced) {
            for (r, a) in reconstructed.iter_mut().zip(axis) {
                *r += f64::from(coord) * a;
            }
        }

        Embedding::new(reconstructed.into_iter().map(|x| x as f32).collect())
    }

    /// Input dimensionality the model was fitted on.
    pub fn input_dims(&self) -> usize {
        self.input_dims
    }
}

/// Leading eigenpair of a symmetric matrix via power iteration.
fn power_iteration(matrix: &[Vec<f64>], rng: &mut StdRng) -> (Vec<f64>, f64) {
    let d = matrix.len();
    let mut v: Vec<f64> = (0..d).map(|_| rng.gen_range(-0.5..0.5)).collect();
    normalize_in_place(&mut v);

    let mut eigenvalue = 0.0;
    for _ in 0..200 {
        let mut next = vec![0.0f64; d];
        for i in 0..d {
            for j in 0..d {
                next[i] += matrix[i][j] * v[j];
            }
        }
        let norm = normalize_in_place(&mut next);
        let converged = next
            .iter()
            .zip(&v)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f64, f64::max)
            < 1e-10;
        v = next;
        eigenvalue = norm;
        if converged {
            break;
        }
    }

    (v, eigenvalue)
}

/// Remove an eigenpair's contribution: C ← C − λ·v·vᵀ.
fn deflate(matrix: &mut [Vec<f64>], eigenvector: &[f64], eigenvalue: f64) {
    let d = matrix.len();
    for i in 0..d {
        for j in 0..d {
            matrix[i][j] -= eigenvalue * eigenvector[i] * eigenvector[j];
        }
    }
}

fn normalize_in_place(v: &mut [f64]) -> f64 {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 1e-12 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    norm
}

/// t-SNE configuration.
///
/// Defaults follow the exploration UI's settings: perplexity 30, seed 42.
#[derive(Debug, Clone, Copy)]
pub struct Tsne {
    /// Target perplexity; clamped to (n − 1) / 3 when the sample is small
    pub perplexity: f64,
    /// RNG seed for the initial layout
    pub seed: u64,
    /// Gradient descent iterations
    pub iterations: usize,
    /// Gradient descent learning rate
    pub learning_rate: f64,
    /// Affinity multiplier during the early-exaggeration phase
    pub early_exaggeration: f64,
}

impl Default for Tsne {
    fn default() -> Self {
        Self {
            perplexity: 30.0,
            seed: 42,
            iterations: 500,
            learning_rate: 200.0,
            early_exaggeration: 12.0,
        }
    }
}

impl Tsne {
    /// Set the target perplexity.
    pub fn perplexity(mut self, perplexity: f64) -> Self {
        self.perplexity = perplexity;
        self
    }

    /// Set the RNG seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of gradient descent iterations.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Embed the samples in 2D.
    ///
    /// Deterministic for a fixed seed. t-SNE has no out-of-sample
    /// transform, so the whole subset is embedded in one shot.
    ///
    /// # Errors
    ///
    /// Returns `ReductionError` for fewer than 3 samples or inconsistent
    /// dimensions.
    pub fn fit_transform(&self, samples: &[Embedding]) -> FontscapeResult<Vec<[f32; 2]>> {
        let n = samples.len();
        if n < 3 {
            return Err(FontscapeError::ReductionError(format!(
                "t-SNE needs at least 3 samples, got {}",
                n
            )));
        }
        let d = samples[0].dimensions();
        if samples.iter().any(|s| s.dimensions() != d) {
            return Err(FontscapeError::ReductionError(
                "samples have inconsistent dimensions".to_string(),
            ));
        }

        let perplexity = self.perplexity.min(((n - 1) as f64 / 3.0).max(1.0));

        // Pairwise squared distances in the input space.
        let mut sq_dists = vec![vec![0.0f64; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let dist: f64 = samples[i]
                    .as_slice()
                    .iter()
                    .zip(samples[j].as_slice())
                    .map(|(&a, &b)| {
                        let diff = f64::from(a) - f64::from(b);
                        diff * diff
                    })
                    .sum();
                sq_dists[i][j] = dist;
                sq_dists[j][i] = dist;
            }
        }

        let p = joint_affinities(&sq_dists, perplexity);

        // Initial layout: small gaussian noise, seeded.
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut y: Vec<[f64; 2]> = (0..n)
            .map(|_| [gaussian(&mut rng) * 1e-4, gaussian(&mut rng) * 1e-4])
            .collect();
        let mut velocity = vec![[0.0f64; 2]; n];

        let exaggeration_cutoff = self.iterations / 4;

        for iter in 0..self.iterations {
            let exaggeration = if iter < exaggeration_cutoff {
                self.early_exaggeration
            } else {
                1.0
            };
            let momentum = if iter < exaggeration_cutoff { 0.5 } else { 0.8 };

            // Student-t affinities in the embedding space.
            let mut q_num = vec![vec![0.0f64; n]; n];
            let mut q_sum = 0.0f64;
            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = y[i][0] - y[j][0];
                    let dy = y[i][1] - y[j][1];
                    let num = 1.0 / (1.0 + dx * dx + dy * dy);
                    q_num[i][j] = num;
                    q_num[j][i] = num;
                    q_sum += 2.0 * num;
                }
            }
            let q_sum = q_sum.max(1e-12);

            // Gradient step with momentum.
            for i in 0..n {
                let mut grad = [0.0f64; 2];
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let q_ij = (q_num[i][j] / q_sum).max(1e-12);
                    let force = (exaggeration * p[i][j] - q_ij) * q_num[i][j];
                    grad[0] += force * (y[i][0] - y[j][0]);
                    grad[1] += force * (y[i][1] - y[j][1]);
                }
                velocity[i][0] = momentum * velocity[i][0] - self.learning_rate * 4.0 * grad[0];
                velocity[i][1] = momentum * velocity[i][1] - self.learning_rate * 4.0 * grad[1];
            }
            for i in 0..n {
                y[i][0] += velocity[i][0];
                y[i][1] += velocity[i][1];
            }

            // Re-center so the layout doesn't drift.
            let cx = y.iter().map(|p| p[0]).sum::<f64>() / n as f64;
            let cy = y.iter().map(|p| p[1]).sum::<f64>() / n as f64;
            for p in &mut y {
                p[0] -= cx;
                p[1] -= cy;
            }
        }

        Ok(y.into_iter().map(|p| [p[0] as f32, p[1] as f32]).collect())
    }
}

/// Symmetrized joint affinities P from squared distances, with per-point
/// bandwidths found by binary search to hit the target perplexity.
fn joint_affinities(sq_dists: &[Vec<f64>], perplexity: f64) -> Vec<Vec<f64>> {
    let n = sq_dists.len();
    let target_entropy = perplexity.ln();
    let mut conditional = vec![vec![0.0f64; n]; n];

    for i in 0..n {
        let mut beta = 1.0f64;
        let mut beta_min = f64::NEG_INFINITY;
        let mut beta_max = f64::INFINITY;

        for _ in 0..50 {
            let mut sum = 0.0f64;
            for j in 0..n {
                if i != j {
                    conditional[i][j] = (-beta * sq_dists[i][j]).exp();
                    sum += conditional[i][j];
                }
            }
            let sum = sum.max(1e-12);

            let mut entropy = 0.0f64;
            for j in 0..n {
                if i != j {
                    let p = conditional[i][j] / sum;
                    if p > 1e-12 {
                        entropy -= p * p.ln();
                    }
                    conditional[i][j] = p;
                }
            }

            let diff = entropy - target_entropy;
            if diff.abs() < 1e-5 {
                break;
            }
            if diff > 0.0 {
                beta_min = beta;
                beta = if beta_max.is_infinite() {
                    beta * 2.0
                } else {
                    (beta + beta_max) / 2.0
                };
            } else {
                beta_max = beta;
                beta = if beta_min.is_infinite() {
                    beta / 2.0
                } else {
                    (beta + beta_min) / 2.0
                };
            }
        }
    }

    // Symmetrize and normalize to a joint distribution.
    let mut joint = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i != j {
                joint[i][j] =
                    ((conditional[i][j] + conditional[j][i]) / (2.0 * n as f64)).max(1e-12);
            }
        }
    }
    joint
}

/// Standard normal sample via Box-Muller.
fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
