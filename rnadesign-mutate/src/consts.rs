//! Defaults shared by the enumeration engines.

/// Largest number of candidates an exhaustive enumeration may produce before
/// it refuses to start.
pub const DEFAULT_MAX_COMBINATIONS: u64 = 1_000_000;

/// Substitutes available at one nucleotide position.
pub const NUCLEOTIDE_ALTERNATIVES: usize = 3;
