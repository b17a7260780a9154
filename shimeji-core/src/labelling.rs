//! Labelling output for clustering runs.

use std::fmt;

/// Cluster id carried by points no cluster has claimed.
pub const UNCLUSTERED: i64 = -1;

/// Density role of a point.
///
/// Core points have at least `min_pts` neighbours within `eps`; Border points
/// are non-Core points reachable from a Core point; everything else is Noise.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Membership {
    /// Neither dense enough nor reachable from a dense point.
    Noise = 0,
    /// At least `min_pts` neighbours within the radius.
    Core = 1,
    /// Reachable from a Core point without being Core itself.
    Border = 2,
}

impl Membership {
    /// Return the lower-case textual representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Noise => "noise",
            Self::Core => "core",
            Self::Border => "border",
        }
    }

    pub(crate) const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Core,
            2 => Self::Border,
            _ => Self::Noise,
        }
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-point output of [`Shimeji::run`](crate::Shimeji::run).
///
/// Holds one membership and one cluster id per input point, in point-index
/// order. A cluster id is [`UNCLUSTERED`] exactly when the membership is
/// [`Membership::Noise`]; assigned ids are dense, starting at zero, and
/// deterministic for a given dataset and configuration.
///
/// # Examples
/// ```
/// use shimeji_core::{Dataset, Membership, ShimejiBuilder};
///
/// let dataset = Dataset::from_columns(vec![0.0, 0.3, 9.0], vec![0.0; 3])
///     .expect("columns have equal length");
/// let shimeji = ShimejiBuilder::new()
///     .with_eps(0.5)
///     .with_min_pts(1)
///     .build()
///     .expect("configuration is valid");
/// let labelling = shimeji.run(&dataset).expect("run succeeds");
/// assert_eq!(labelling.membership()[0], Membership::Core);
/// assert_eq!(labelling.cluster_ids()[0], labelling.cluster_ids()[1]);
/// assert_eq!(labelling.membership()[2], Membership::Noise);
/// assert_eq!(labelling.cluster_count(), 1);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Labelling {
    membership: Vec<Membership>,
    cluster_ids: Vec<i64>,
    cluster_count: usize,
}

impl Labelling {
    pub(crate) fn new(
        membership: Vec<Membership>,
        cluster_ids: Vec<i64>,
        cluster_count: usize,
    ) -> Self {
        debug_assert_eq!(membership.len(), cluster_ids.len());
        debug_assert!(membership
            .iter()
            .zip(&cluster_ids)
            .all(|(&m, &id)| (id == UNCLUSTERED) == (m == Membership::Noise)));
        Self {
            membership,
            cluster_ids,
            cluster_count,
        }
    }

    /// Returns the number of labelled points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.membership.len()
    }

    /// Returns whether the labelling covers no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.membership.is_empty()
    }

    /// Returns the membership of every point in index order.
    #[must_use]
    pub fn membership(&self) -> &[Membership] {
        &self.membership
    }

    /// Returns the cluster id of every point in index order.
    ///
    /// Ids are [`UNCLUSTERED`] for Noise points and dense values in
    /// `0..cluster_count` otherwise.
    #[must_use]
    pub fn cluster_ids(&self) -> &[i64] {
        &self.cluster_ids
    }

    /// Returns how many clusters were identified.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    /// Returns the cluster of `point`, or `None` for Noise points.
    #[must_use]
    pub fn cluster_of(&self, point: usize) -> Option<usize> {
        match self.cluster_ids.get(point) {
            Some(&id) if id >= 0 => Some(id as usize),
            _ => None,
        }
    }
}
