//! Bounded Nelder–Mead minimisation used for ARIMA parameter estimation.

use std::cmp::Ordering;

/// Outcome of a minimisation run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found.
    pub optimal_point: Vec<f64>,
    /// Objective value at `optimal_point`.
    pub optimal_value: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the simplex converged before `max_iter`.
    pub converged: bool,
}

/// Nelder–Mead coefficients.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on objective spread and simplex size.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Initial simplex step (relative for non-zero coordinates).
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

/// Box constraints, one `(min, max)` pair per coordinate.
type Bounds<'a> = Option<&'a [(f64, f64)]>;

/// Minimise `objective` starting from `initial`.
///
/// Coordinates are clamped into `bounds` after every move. Non-finite
/// objective values are treated as `+inf` so they always rank worst.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Bounds<'_>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let dim = initial.len();
    if dim == 0 {
        return NelderMeadResult {
            optimal_point: Vec::new(),
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let mut vertices: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    vertices.push(clamp(initial.to_vec(), bounds));
    for i in 0..dim {
        let mut v = initial.to_vec();
        v[i] += if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        vertices.push(clamp(v, bounds));
    }
    let mut scores: Vec<f64> = vertices.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=dim).collect();
        order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));
        let (best, worst, second_worst) = (order[0], order[dim], order[dim - 1]);

        let centroid = centroid_without(&vertices, worst);
        let spread = scores[worst] - scores[best];
        let radius = vertices
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        if spread < config.tolerance || radius < config.tolerance {
            converged = true;
            break;
        }

        let reflected = clamp(along(&centroid, &vertices[worst], -config.alpha), bounds);
        let reflected_score = eval(&reflected);

        if reflected_score < scores[best] {
            let expanded = clamp(along(&centroid, &reflected, config.gamma), bounds);
            let expanded_score = eval(&expanded);
            if expanded_score < reflected_score {
                vertices[worst] = expanded;
                scores[worst] = expanded_score;
            } else {
                vertices[worst] = reflected;
                scores[worst] = reflected_score;
            }
            continue;
        }

        if reflected_score < scores[second_worst] {
            vertices[worst] = reflected;
            scores[worst] = reflected_score;
            continue;
        }

        // Outside contraction towards the reflected point, inside otherwise.
        let (target, target_score) = if reflected_score < scores[worst] {
            (&reflected, reflected_score)
        } else {
            (&vertices[worst], scores[worst])
        };
        let contracted = clamp(along(&centroid, target, config.rho), bounds);
        let contracted_score = eval(&contracted);
        if contracted_score < target_score {
            vertices[worst] = contracted;
            scores[worst] = contracted_score;
            continue;
        }

        let anchor = vertices[best].clone();
        for i in (0..=dim).filter(|&i| i != best) {
            let shrunk = along(&anchor, &vertices[i], config.sigma);
            vertices[i] = clamp(shrunk, bounds);
            scores[i] = eval(&vertices[i]);
        }
    }

    let best = scores
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    NelderMeadResult {
        optimal_point: vertices[best].clone(),
        optimal_value: scores[best],
        iterations,
        converged,
    }
}

/// `origin + t * (point - origin)`; negative `t` reflects through `origin`.
fn along(origin: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(point)
        .map(|(o, p)| o + t * (p - o))
        .collect()
}

fn centroid_without(vertices: &[Vec<f64>], skip: usize) -> Vec<f64> {
    let dim = vertices[0].len();
    let count = (vertices.len() - 1) as f64;
    let mut c = vec![0.0; dim];
    for v in vertices.iter().enumerate().filter(|(i, _)| *i != skip).map(|(_, v)| v) {
        for (acc, x) in c.iter_mut().zip(v) {
            *acc += x;
        }
    }
    c.iter_mut().for_each(|x| *x /= count);
    c
}

fn clamp(mut point: Vec<f64>, bounds: Bounds<'_>) -> Vec<f64> {
    if let Some(b) = bounds {
        for (x, (lo, hi)) in point.iter_mut().zip(b) {
            *x = x.clamp(*lo, *hi);
        }
    }
    point
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
