// Entity Models
//
// Each entity has:
// - Stable identity (designation) that never changes
// - Immutable values read from the source files
// - Link fields written once by the catalog and never again

pub mod approach;
pub mod neo;

pub use approach::{CloseApproach, UNKNOWN_DESIGNATION};
pub use neo::NearEarthObject;

/// Storage slot of an NEO inside a [`Catalog`](crate::catalog::Catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NeoId(pub(crate) usize);

/// Storage slot of a close approach inside a [`Catalog`](crate::catalog::Catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApproachId(pub(crate) usize);
