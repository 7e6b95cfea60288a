//! Identifiers shared by the contact graph and the isolation search.

use std::collections::BTreeSet;
use std::fmt;

/// A person of the population, identified by index in `[0, N)`.
pub type Person = usize;

/// A set of relations chosen to be severed before simulating propagation.
pub type Isolations = BTreeSet<Relation>;

/// An undirected contact between two distinct persons.
///
/// Always stored normalized (`low < high`), so `(i, j)` and `(j, i)` are the
/// same relation and a set of relations never holds both orientations.
/// Ordering is lexicographic on the normalized pair.
///
/// ```
/// use u_contagion::epidemic::Relation;
///
/// let r = Relation::new(5, 2).unwrap();
/// assert_eq!(r.endpoints(), (2, 5));
/// assert_eq!(r, Relation::new(2, 5).unwrap());
/// assert!(Relation::new(3, 3).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relation {
    low: Person,
    high: Person,
}

impl Relation {
    /// Normalizes `(i, j)` into a relation. Returns `None` for a self-relation.
    pub fn new(i: Person, j: Person) -> Option<Self> {
        match i.cmp(&j) {
            std::cmp::Ordering::Less => Some(Self { low: i, high: j }),
            std::cmp::Ordering::Greater => Some(Self { low: j, high: i }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The smaller endpoint.
    pub fn low(&self) -> Person {
        self.low
    }

    /// The larger endpoint.
    pub fn high(&self) -> Person {
        self.high
    }

    /// Both endpoints, smaller first.
    pub fn endpoints(&self) -> (Person, Person) {
        (self.low, self.high)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.low, self.high)
    }
}
