//! Gauss-Legendre quadrature rules.
//!
//! Rules for orders [`MIN_ORDER`] through [`MAX_ORDER`] are generated once,
//! on first use, by Newton iteration on the Legendre polynomials and kept as
//! process-wide read-only tables.

use std::f64::consts::PI;
use std::sync::OnceLock;

use crate::error::{MapperError, Result};

/// Smallest supported quadrature order.
pub const MIN_ORDER: usize = 5;

/// Largest supported quadrature order.
pub const MAX_ORDER: usize = 29;

/// Order used when none is configured.
pub const DEFAULT_ORDER: usize = 24;

const NEWTON_MAX_ITERATIONS: usize = 100;

/// A node on `[-1, 1]` paired with its weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub abscissa: f64,
    pub weight: f64,
}

static RULES: OnceLock<Vec<Vec<Node>>> = OnceLock::new();

/// Returns the Gauss-Legendre rule of the given order, nodes sorted by
/// abscissa.
///
/// # Errors
///
/// Returns [`MapperError::QuadratureOrderOutOfRange`] if `order` is outside
/// `[MIN_ORDER, MAX_ORDER]`.
pub fn rule(order: usize) -> Result<&'static [Node]> {
    if !(MIN_ORDER..=MAX_ORDER).contains(&order) {
        return Err(MapperError::QuadratureOrderOutOfRange {
            order,
            min: MIN_ORDER,
            max: MAX_ORDER,
        }
        .into());
    }
    Ok(&rules()[order - MIN_ORDER])
}

/// Returns the rule of order [`DEFAULT_ORDER`].
#[must_use]
pub fn default_rule() -> &'static [Node] {
    &rules()[DEFAULT_ORDER - MIN_ORDER]
}

fn rules() -> &'static [Vec<Node>] {
    RULES.get_or_init(|| (MIN_ORDER..=MAX_ORDER).map(legendre_rule).collect())
}

/// Integrates `f` over `[t0, t1]` with the given rule.
#[allow(clippy::float_cmp)]
pub fn integrate<F>(nodes: &[Node], t0: f64, t1: f64, mut f: F) -> f64
where
    F: FnMut(f64) -> f64,
{
    if t0 == t1 {
        return 0.0;
    }
    let half = (t1 - t0) * 0.5;
    let sum: f64 = nodes
        .iter()
        .map(|n| n.weight * f(half * n.abscissa + half + t0))
        .sum();
    half * sum
}

/// Computes the `n`-point rule.
#[allow(clippy::cast_precision_loss)]
fn legendre_rule(n: usize) -> Vec<Node> {
    let nf = n as f64;
    let mut nodes = Vec::with_capacity(n);

    for i in 1..=n.div_ceil(2) {
        let mut z = (PI * (i as f64 - 0.25) / (nf + 0.5)).cos();
        for _ in 0..NEWTON_MAX_ITERATIONS {
            let (p, d) = legendre(n, z);
            let z_next = z - p / d;
            let done = (z_next - z).abs() <= 4.0 * f64::EPSILON;
            z = z_next;
            if done {
                break;
            }
        }
        let dp = legendre(n, z).1;
        let weight = 2.0 / ((1.0 - z * z) * dp * dp);

        if 2 * i == n + 1 {
            nodes.push(Node {
                abscissa: 0.0,
                weight,
            });
        } else {
            nodes.push(Node {
                abscissa: -z,
                weight,
            });
            nodes.push(Node {
                abscissa: z,
                weight,
            });
        }
    }

    nodes.sort_by(|a, b| a.abscissa.total_cmp(&b.abscissa));
    nodes
}

/// Evaluates `P_n(z)` and `P_n'(z)` by the three-term recurrence.
#[allow(clippy::cast_precision_loss)]
fn legendre(n: usize, z: f64) -> (f64, f64) {
    let mut p1 = 1.0;
    let mut p2 = 0.0;
    for j in 1..=n {
        let jf = j as f64;
        let p3 = p2;
        p2 = p1;
        p1 = ((2.0 * jf - 1.0) * z * p2 - (jf - 1.0) * p3) / jf;
    }
    let d = n as f64 * (z * p1 - p2) / (z * z - 1.0);
    (p1, d)
}
