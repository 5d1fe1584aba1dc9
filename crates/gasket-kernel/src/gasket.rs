//! Gasket builder: recursive triple-rotation expansion.
//!
//! Seeding uses the complex Descartes theorem once to obtain the two
//! children of the generators. From then on every circle `m` with ancestor
//! triple `(a1, a2, a3)` yields three daughters, one per rotation of the
//! triple:
//!
//! ```text
//! daughter(m, a1, a2, a3)  → recurse with (m, a2, a3)
//! daughter(m, a3, a1, a2)  → recurse with (m, a1, a2)
//! daughter(m, a2, a3, a1)  → recurse with (m, a3, a1)
//! ```
//!
//! A mother produces daughters only while `m.level + 1 < max_level`, so a
//! build at level `L ≥ 1` holds exactly `3^L + 2` circles.
//!
//! Branches share nothing but read-only inputs. The parallel strategy runs
//! on a rayon pool of `parallelism` threads: every mother above a small
//! cutoff depth expands its three daughters as separate tasks, and the
//! subtree buffers are concatenated in branch order, which keeps the output
//! identical to the sequential build.

use crate::circle::Circle;
use crate::config::GasketConfig;
use crate::descartes::{complex_descartes, daughter};
use crate::error::GasketError;
use crate::tangency::validate_generators;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Subtrees with at most this many levels left are expanded on the current
/// worker without further splitting.
const SEQUENTIAL_DEPTH: u32 = 4;

/// Number of circles a build at `max_level` produces, or `None` on overflow.
pub fn expected_circle_count(max_level: u32) -> Option<u64> {
    if max_level <= 1 {
        return Some(5);
    }
    3u64.checked_pow(max_level)?.checked_add(2)
}

/// Build a gasket with default options: generator validation on,
/// sequential expansion.
pub fn generate_gasket(
    g1: Circle,
    g2: Circle,
    g3: Circle,
    max_level: u32,
) -> Result<Gasket, GasketError> {
    GasketBuilder::new([g1, g2, g3])
        .with_max_level(max_level)
        .build()
}

/// SHA-256 over the exact bit patterns of every circle, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GasketDigest(pub String);

impl fmt::Display for GasketDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finished gasket: generators, the two children, then every daughter.
#[derive(Debug, Clone, PartialEq)]
pub struct Gasket {
    circles: Vec<Circle>,
    max_level: u32,
}

impl Gasket {
    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Circle> {
        self.circles.iter()
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    /// A gasket always holds at least its generators and children.
    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    pub fn generators(&self) -> &[Circle] {
        &self.circles[..3]
    }

    /// The two circles seeded by the complex Descartes theorem.
    pub fn children(&self) -> &[Circle] {
        &self.circles[3..5]
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Circle count per level.
    pub fn level_histogram(&self) -> BTreeMap<u32, usize> {
        let mut levels = BTreeMap::new();
        for circle in &self.circles {
            *levels.entry(circle.level()).or_default() += 1;
        }
        levels
    }

    pub fn digest(&self) -> GasketDigest {
        let mut hasher = Sha256::new();
        for circle in &self.circles {
            hasher.update(circle.x().to_bits().to_le_bytes());
            hasher.update(circle.y().to_bits().to_le_bytes());
            hasher.update(circle.curvature().to_bits().to_le_bytes());
            hasher.update(circle.level().to_le_bytes());
        }
        GasketDigest(format!("{:x}", hasher.finalize()))
    }

    pub fn into_circles(self) -> Vec<Circle> {
        self.circles
    }
}

impl<'a> IntoIterator for &'a Gasket {
    type Item = &'a Circle;
    type IntoIter = std::slice::Iter<'a, Circle>;

    fn into_iter(self) -> Self::IntoIter {
        self.circles.iter()
    }
}

/// Configures and runs a gasket build.
///
/// The builder itself is immutable input; `build` can be called any number
/// of times and always yields the same snapshot.
#[derive(Debug, Clone)]
pub struct GasketBuilder {
    generators: [Circle; 3],
    max_level: u32,
    max_level_ceiling: u32,
    tolerance: f64,
    validate: bool,
    parallelism: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl GasketBuilder {
    pub fn new(generators: [Circle; 3]) -> Self {
        Self::from_config(generators, &GasketConfig::default())
    }

    pub fn from_config(generators: [Circle; 3], config: &GasketConfig) -> Self {
        Self {
            generators,
            max_level: config.max_level,
            max_level_ceiling: config.max_level_ceiling,
            tolerance: config.tolerance,
            validate: config.validate,
            parallelism: config.parallelism,
            cancel: None,
        }
    }

    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_max_level_ceiling(mut self, ceiling: u32) -> Self {
        self.max_level_ceiling = ceiling;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Toggle the generator tangency pre-check.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Worker threads for expansion; `1` (or `0`) builds sequentially.
    pub fn with_parallelism(mut self, workers: usize) -> Self {
        self.parallelism = workers;
        self
    }

    /// A flag polled at every expansion step; raising it aborts the build
    /// with [`GasketError::Cancelled`].
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn generators(&self) -> &[Circle; 3] {
        &self.generators
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Generate the full gasket.
    pub fn build(&self) -> Result<Gasket, GasketError> {
        let (c4, c5) = self.seed()?;
        let expansion = self.expansion();
        let capacity = expected_circle_count(self.max_level)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(5)
            .min(1 << 20);

        let mut circles = Vec::with_capacity(capacity);
        circles.extend_from_slice(&self.generators);
        circles.push(c4);
        circles.push(c5);

        if self.parallelism > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.parallelism)
                .build()?;
            let subtrees = pool.install(|| {
                [c4, c5]
                    .par_iter()
                    .map(|child| expansion.collect_subtree(child, &self.generators))
                    .collect::<Result<Vec<_>, GasketError>>()
            })?;
            for subtree in subtrees {
                circles.extend(subtree);
            }
        } else {
            for child in [c4, c5] {
                expansion.expand(
                    &child,
                    &self.generators,
                    &mut |c: &Circle, _: &[Circle; 3]| circles.push(*c),
                )?;
            }
        }

        tracing::debug!(
            max_level = self.max_level,
            circles = circles.len(),
            parallelism = self.parallelism,
            "gasket generated"
        );
        Ok(Gasket {
            circles,
            max_level: self.max_level,
        })
    }

    /// Walk every non-generator circle in build order together with the
    /// ancestor triple it is tangent to. For daughters the first slot of the
    /// triple is the mother; for the two children it is the generators.
    pub fn for_each_descendant<F>(&self, mut visit: F) -> Result<(), GasketError>
    where
        F: FnMut(&Circle, &[Circle; 3]),
    {
        let (c4, c5) = self.seed()?;
        visit(&c4, &self.generators);
        visit(&c5, &self.generators);
        let expansion = self.expansion();
        for child in [c4, c5] {
            expansion.expand(&child, &self.generators, &mut visit)?;
        }
        Ok(())
    }

    /// Pre-checks followed by the complex Descartes seeding step.
    fn seed(&self) -> Result<(Circle, Circle), GasketError> {
        if self.max_level > self.max_level_ceiling {
            return Err(GasketError::LevelCeiling {
                requested: self.max_level,
                ceiling: self.max_level_ceiling,
            });
        }
        if self.validate {
            validate_generators(&self.generators, self.tolerance)?;
        }
        let [a1, a2, a3] = &self.generators;
        let (c4, c5) = complex_descartes(a1, a2, a3)?;
        tracing::trace!(child_a = %c4, child_b = %c5, "seeded children");
        Ok((c4, c5))
    }

    fn expansion(&self) -> Expansion<'_> {
        Expansion {
            max_level: self.max_level,
            cancel: self.cancel.as_deref(),
        }
    }
}

/// A daughter paired with the triple its own daughters are derived from.
type Branch = (Circle, [Circle; 3]);

/// Read-only recursion parameters shared by every branch.
struct Expansion<'a> {
    max_level: u32,
    cancel: Option<&'a AtomicBool>,
}

impl Expansion<'_> {
    /// The three daughters of `mother`, or `None` at the level bound.
    fn daughters(
        &self,
        mother: &Circle,
        [a1, a2, a3]: &[Circle; 3],
    ) -> Result<Option<[Branch; 3]>, GasketError> {
        if mother.level().saturating_add(1) >= self.max_level {
            return Ok(None);
        }
        if let Some(flag) = self.cancel
            && flag.load(Ordering::Relaxed)
        {
            return Err(GasketError::Cancelled {
                level: mother.level(),
            });
        }

        let m = *mother;
        Ok(Some([
            (daughter(&m, a1, a2, a3)?, [m, *a2, *a3]),
            (daughter(&m, a3, a1, a2)?, [m, *a1, *a2]),
            (daughter(&m, a2, a3, a1)?, [m, *a3, *a1]),
        ]))
    }

    /// Depth-first expansion below `mother`: its three daughters are
    /// visited first, then each daughter's subtree in rotation order.
    fn expand<F>(
        &self,
        mother: &Circle,
        triple: &[Circle; 3],
        visit: &mut F,
    ) -> Result<(), GasketError>
    where
        F: FnMut(&Circle, &[Circle; 3]),
    {
        let Some(daughters) = self.daughters(mother, triple)? else {
            return Ok(());
        };
        for (d, t) in &daughters {
            visit(d, t);
        }
        for (d, t) in &daughters {
            self.expand(d, t, visit)?;
        }
        Ok(())
    }

    /// Everything `expand` would visit below `mother`, in the same order,
    /// with the daughters' subtrees computed as parallel tasks.
    fn collect_subtree(
        &self,
        mother: &Circle,
        triple: &[Circle; 3],
    ) -> Result<Vec<Circle>, GasketError> {
        if self.max_level.saturating_sub(mother.level()) <= SEQUENTIAL_DEPTH {
            let mut out = Vec::new();
            self.expand(mother, triple, &mut |c: &Circle, _: &[Circle; 3]| {
                out.push(*c)
            })?;
            return Ok(out);
        }
        let Some(daughters) = self.daughters(mother, triple)? else {
            return Ok(Vec::new());
        };

        let subtrees = daughters
            .par_iter()
            .map(|(d, t)| self.collect_subtree(d, t))
            .collect::<Result<Vec<_>, GasketError>>()?;
        let mut out = Vec::with_capacity(3 + subtrees.iter().map(Vec::len).sum::<usize>());
        out.extend(daughters.iter().map(|(d, _)| *d));
        for subtree in subtrees {
            out.extend(subtree);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triple() -> [Circle; 3] {
        let h = 2.0 / 3f64.sqrt();
        [
            Circle::generator(0.0, h, 1.0),
            Circle::generator(-1.0, -h / 2.0, 1.0),
            Circle::generator(1.0, -h / 2.0, 1.0),
        ]
    }

    #[test]
    fn closed_form_counts() {
        assert_eq!(expected_circle_count(0), Some(5));
        assert_eq!(expected_circle_count(1), Some(5));
        assert_eq!(expected_circle_count(2), Some(11));
        assert_eq!(expected_circle_count(3), Some(29));
        assert_eq!(expected_circle_count(100), None);
    }

    #[test]
    fn count_matches_closed_form_per_level() {
        for level in 0..=7 {
            let gasket = GasketBuilder::new(unit_triple())
                .with_max_level(level)
                .build()
                .unwrap();
            assert_eq!(
                gasket.len() as u64,
                expected_circle_count(level).unwrap(),
                "level {level}"
            );
        }
    }

    #[test]
    fn level_zero_and_one_are_generators_plus_children() {
        for level in [0, 1] {
            let gasket = GasketBuilder::new(unit_triple())
                .with_max_level(level)
                .build()
                .unwrap();
            assert_eq!(gasket.len(), 5);
            assert_eq!(gasket.generators(), &unit_triple());
            assert_eq!(gasket.level_histogram(), BTreeMap::from([(0, 5)]));
        }
    }

    #[test]
    fn daughters_follow_their_mothers() {
        let gasket = GasketBuilder::new(unit_triple())
            .with_max_level(3)
            .build()
            .unwrap();
        // First child's three daughters come right after the children.
        let first_daughters = &gasket.circles()[5..8];
        assert!(first_daughters.iter().all(|c| c.level() == 1));
        assert_eq!(gasket.circles()[8].level(), 2);
        assert_eq!(gasket.max_level(), 3);
    }

    #[test]
    fn parallel_matches_sequential() {
        let sequential = GasketBuilder::new(unit_triple())
            .with_max_level(6)
            .build()
            .unwrap();
        for workers in [2, 3, 4, 16] {
            let parallel = GasketBuilder::new(unit_triple())
                .with_max_level(6)
                .with_parallelism(workers)
                .build()
                .unwrap();
            assert_eq!(parallel, sequential, "workers = {workers}");
        }
    }

    #[test]
    fn parallel_with_shallow_levels() {
        for level in 0..=2 {
            let gasket = GasketBuilder::new(unit_triple())
                .with_max_level(level)
                .with_parallelism(4)
                .build()
                .unwrap();
            assert_eq!(gasket.len() as u64, expected_circle_count(level).unwrap());
        }
    }

    #[test]
    fn ceiling_is_enforced_before_any_work() {
        let err = GasketBuilder::new(unit_triple())
            .with_max_level(9)
            .with_max_level_ceiling(8)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GasketError::LevelCeiling {
                requested: 9,
                ceiling: 8
            }
        ));
    }

    #[test]
    fn raised_cancel_flag_aborts() {
        let flag = Arc::new(AtomicBool::new(true));
        let err = GasketBuilder::new(unit_triple())
            .with_max_level(4)
            .with_cancel_flag(flag.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, GasketError::Cancelled { level: 0 }));

        flag.store(false, Ordering::Relaxed);
        let gasket = GasketBuilder::new(unit_triple())
            .with_max_level(4)
            .with_cancel_flag(flag)
            .build()
            .unwrap();
        assert_eq!(gasket.len(), 83);
    }

    #[test]
    fn cancel_flag_raised_mid_walk_stops_deeper_down() {
        let flag = Arc::new(AtomicBool::new(false));
        let builder = GasketBuilder::new(unit_triple())
            .with_max_level(6)
            .with_cancel_flag(flag.clone());

        // Visits: two children, then three daughters per level along the
        // leftmost branch. The flag goes up among the level-3 daughters, so
        // the next mother to expand is the first of them.
        let mut visits = 0;
        let err = builder
            .for_each_descendant(|_: &Circle, _: &[Circle; 3]| {
                visits += 1;
                if visits == 10 {
                    flag.store(true, Ordering::Relaxed);
                }
            })
            .unwrap_err();
        assert!(matches!(err, GasketError::Cancelled { level: 3 }), "{err}");
        assert_eq!(visits, 11);
    }

    #[test]
    fn parallel_build_observes_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(true));
        let err = GasketBuilder::new(unit_triple())
            .with_max_level(7)
            .with_parallelism(4)
            .with_cancel_flag(flag)
            .build()
            .unwrap_err();
        assert!(matches!(err, GasketError::Cancelled { level: 0 }), "{err}");
    }

    #[test]
    fn pool_worker_sees_flag_below_the_children() {
        let builder = GasketBuilder::new(unit_triple()).with_max_level(9);
        let mut level_two = None;
        builder
            .clone()
            .with_max_level(3)
            .for_each_descendant(|c: &Circle, triple: &[Circle; 3]| {
                if level_two.is_none() && c.level() == 2 {
                    level_two = Some((*c, *triple));
                }
            })
            .unwrap();
        let (mother, triple) = level_two.unwrap();

        let flag = AtomicBool::new(true);
        let expansion = Expansion {
            max_level: builder.max_level(),
            cancel: Some(&flag),
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(3)
            .build()
            .unwrap();
        let err = pool
            .install(|| expansion.collect_subtree(&mother, &triple))
            .unwrap_err();
        assert!(matches!(err, GasketError::Cancelled { level: 2 }), "{err}");
    }

    #[test]
    fn many_workers_split_deep_builds() {
        let builder = GasketBuilder::new(unit_triple()).with_max_level(9);
        let sequential = builder.build().unwrap();
        let parallel = builder.clone().with_parallelism(64).build().unwrap();
        assert_eq!(parallel.len() as u64, expected_circle_count(9).unwrap());
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn validation_can_be_disabled() {
        let mut generators = unit_triple();
        generators[2] = generators[2].translated(0.01, 0.0);
        let err = GasketBuilder::new(generators).build().unwrap_err();
        assert!(matches!(err, GasketError::InvalidConfiguration(_)));

        let gasket = GasketBuilder::new(generators)
            .with_validation(false)
            .with_max_level(2)
            .build()
            .unwrap();
        assert_eq!(gasket.len(), 11);
    }

    #[test]
    fn descendants_are_visited_with_their_triples() {
        let builder = GasketBuilder::new(unit_triple()).with_max_level(3);
        let mut visited = Vec::new();
        builder
            .for_each_descendant(|c: &Circle, triple: &[Circle; 3]| {
                visited.push((*c, triple[0]))
            })
            .unwrap();
        assert_eq!(visited.len(), 29 - 3);

        let gasket = builder.build().unwrap();
        let circles: Vec<Circle> = visited.iter().map(|(c, _)| *c).collect();
        assert_eq!(&gasket.circles()[3..], circles.as_slice());

        // Children are paired with a generator, daughters with their mother.
        assert_eq!(visited[0].1, unit_triple()[0]);
        assert_eq!(visited[2].1, visited[0].0);
    }
}
