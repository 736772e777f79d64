//! # rnadesign-core
//!
//! Value types and predicates shared by the rnadesign crates.
//!
//! ## Main Components
//!
//! - **`SequenceStructure`**: a validated sequence and dot-bracket pair
//! - **`SecStruct`**: the parsed structure with its pair table and motif tree
//!   (single strands, helices, hairpins and junctions)
//! - **`constraints`**: run-length and paired G·C stretch rules, including the
//!   "no worse than baseline" variants
//! - **`selection`**: YAML driven position selection (motifs, flanks, ranges)
//! - **`replace`**: splice one substructure for another
//!
//! Structures are immutable. Every edit returns a new value, so one parsed
//! structure can be shared freely between threads.
//!
//! ## Example
//!
//! ```rust
//! use rnadesign_core::models::{MotifType, SecStruct};
//!
//! let ss = SecStruct::new("AAGGGGAAAACCCC", "..((((....))))").unwrap();
//! let helix = ss.helices().next().unwrap();
//! assert_eq!(helix.sequence, "GGGG&CCCC");
//! assert_eq!(ss.motif(2).unwrap().motif_type, MotifType::Hairpin);
//! ```
//!
pub mod constraints;
pub mod errors;
pub mod models;
pub mod replace;
pub mod selection;
pub mod utils;

// re-export things
pub use constraints::*;
pub use errors::*;
pub use replace::*;
pub use selection::*;
