//! # rnadesign-mutate
//!
//! Candidate generators that work on a fixed secondary structure.
//!
//! ## Main Components
//!
//! - **`MutationEnumerator`**: every sequence reachable by exactly `k` point
//!   substitutions at allowed positions
//! - **`BasepairMutator`**: swaps base pair identities, one at a time, as an
//!   exhaustive enumeration or as a random sample
//! - **`helix_length`**: grows or shrinks helices and scans length ranges
//! - **`indels`**: unpaired insertions and deletion sweeps
//!
//! Exhaustive generators size their output up front and refuse to run past
//! [`MutateConfig::max_combinations`].
//!
//! ## Example
//!
//! ```rust
//! use rnadesign_mutate::find_multiple_mutations;
//!
//! let mutants = find_multiple_mutations("AUC", 2, &[]).unwrap();
//! assert_eq!(mutants.len(), 27);
//! assert_eq!(mutants[0].name, "A1U_U2A");
//! ```
//!
pub mod basepair;
pub mod config;
pub mod consts;
pub mod enumerate;
pub mod helix_length;
pub mod indels;

// re-export things
pub use basepair::*;
pub use config::*;
pub use enumerate::*;
pub use helix_length::*;
pub use indels::*;
