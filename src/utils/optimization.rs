//! Derivative-free minimisation used to estimate model parameters.

use std::cmp::Ordering;

/// Outcome of a Nelder-Mead run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best vertex found.
    pub optimal_point: Vec<f64>,
    /// Objective value at `optimal_point`.
    pub optimal_value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Tuning knobs for [`nelder_mead`].
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    /// Stop once both the spread of objective values and the simplex
    /// diameter fall below this.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Relative size of the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// A simplex of `n + 1` vertices kept sorted by objective value.
struct Simplex<'a, F> {
    objective: F,
    bounds: Option<&'a [(f64, f64)]>,
    vertices: Vec<(Vec<f64>, f64)>,
}

impl<'a, F> Simplex<'a, F>
where
    F: Fn(&[f64]) -> f64,
{
    fn new(objective: F, initial: &[f64], bounds: Option<&'a [(f64, f64)]>, step: f64) -> Self {
        let mut simplex = Self {
            objective,
            bounds,
            vertices: Vec::with_capacity(initial.len() + 1),
        };
        let start = simplex.clamp(initial.to_vec());
        simplex.push(start.clone());
        for i in 0..initial.len() {
            let mut vertex = start.clone();
            vertex[i] += if vertex[i].abs() > 1e-10 {
                step * vertex[i].abs()
            } else {
                step
            };
            let vertex = simplex.clamp(vertex);
            simplex.push(vertex);
        }
        simplex.sort();
        simplex
    }

    fn clamp(&self, mut point: Vec<f64>) -> Vec<f64> {
        if let Some(bounds) = self.bounds {
            for (x, &(lo, hi)) in point.iter_mut().zip(bounds.iter()) {
                *x = x.clamp(lo, hi);
            }
        }
        point
    }

    fn evaluate(&self, point: &[f64]) -> f64 {
        let value = (self.objective)(point);
        if value.is_nan() {
            f64::INFINITY
        } else {
            value
        }
    }

    fn push(&mut self, point: Vec<f64>) {
        let value = self.evaluate(&point);
        self.vertices.push((point, value));
    }

    fn sort(&mut self) {
        self.vertices
            .sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    }

    fn best(&self) -> f64 {
        self.vertices[0].1
    }

    fn worst(&self) -> f64 {
        self.vertices[self.vertices.len() - 1].1
    }

    fn second_worst(&self) -> f64 {
        self.vertices[self.vertices.len() - 2].1
    }

    /// Centroid of every vertex except the worst.
    fn centroid(&self) -> Vec<f64> {
        let n = self.vertices.len() - 1;
        let mut centroid = vec![0.0; self.vertices[0].0.len()];
        for (vertex, _) in &self.vertices[..n] {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v;
            }
        }
        centroid.iter_mut().for_each(|c| *c /= n as f64);
        centroid
    }

    /// Point `centroid + coef * (towards - centroid)`, clamped and evaluated.
    fn probe(&self, centroid: &[f64], towards: &[f64], coef: f64) -> (Vec<f64>, f64) {
        let point: Vec<f64> = centroid
            .iter()
            .zip(towards)
            .map(|(c, t)| c + coef * (t - c))
            .collect();
        let point = self.clamp(point);
        let value = self.evaluate(&point);
        (point, value)
    }

    fn replace_worst(&mut self, vertex: (Vec<f64>, f64)) {
        let last = self.vertices.len() - 1;
        self.vertices[last] = vertex;
    }

    fn shrink(&mut self, sigma: f64) {
        let best = self.vertices[0].0.clone();
        for i in 1..self.vertices.len() {
            let point: Vec<f64> = self.vertices[i]
                .0
                .iter()
                .zip(&best)
                .map(|(x, b)| b + sigma * (x - b))
                .collect();
            let point = self.clamp(point);
            let value = self.evaluate(&point);
            self.vertices[i] = (point, value);
        }
    }

    fn diameter(&self, centroid: &[f64]) -> f64 {
        self.vertices
            .iter()
            .map(|(v, _)| {
                v.iter()
                    .zip(centroid)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max)
    }
}

/// Minimise `objective` with the Nelder-Mead simplex method.
///
/// Points leaving `bounds` are clamped back onto the box. NaN objective
/// values are treated as `+inf` so invalid regions are never accepted.
///
/// # Example
/// ```
/// use usercast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// assert!((result.optimal_point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut simplex = Simplex::new(objective, initial, bounds, config.initial_step);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let centroid = simplex.centroid();
        // equal values at vertices straddling the minimum are not convergence
        if simplex.worst() - simplex.best() < config.tolerance
            && simplex.diameter(&centroid) < config.tolerance
        {
            converged = true;
            break;
        }

        let worst_point = simplex.vertices[simplex.vertices.len() - 1].0.clone();
        let reflected = simplex.probe(&centroid, &worst_point, -config.alpha);

        if reflected.1 < simplex.best() {
            let expanded = simplex.probe(&centroid, &reflected.0, config.gamma);
            if expanded.1 < reflected.1 {
                simplex.replace_worst(expanded);
            } else {
                simplex.replace_worst(reflected);
            }
        } else if reflected.1 < simplex.second_worst() {
            simplex.replace_worst(reflected);
        } else {
            let outside = reflected.1 < simplex.worst();
            let target = if outside { &reflected.0 } else { &worst_point };
            let contracted = simplex.probe(&centroid, target, config.rho);
            let accept = if outside {
                contracted.1 <= reflected.1
            } else {
                contracted.1 < simplex.worst()
            };
            if accept {
                simplex.replace_worst(contracted);
            } else {
                simplex.shrink(config.sigma);
            }
        }
        simplex.sort();
    }

    let (optimal_point, optimal_value) = simplex.vertices.swap_remove(0);
    NelderMeadResult {
        optimal_point,
        optimal_value,
        iterations,
        converged,
    }
}
