//! # rnadesign-helix
//!
//! Redesign the helices of an RNA secondary structure while keeping its fold.
//!
//! ## Main Components
//!
//! - **`HelixDesigner`**: the resample / filter / score loop
//! - **`FoldingOracle`**: what the designer needs from a structure predictor
//! - **`ViennaOracle`**: `RNAfold` and `RNAcofold` driven as external processes
//! - **`DesignerConfig`**: search budget and composition limits, loadable from TOML
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use rnadesign_core::models::SecStruct;
//! use rnadesign_helix::{DesignerConfig, HelixDesigner, ViennaOracle};
//!
//! let config = DesignerConfig::try_from(Path::new("designer.toml")).unwrap();
//! let oracle = ViennaOracle::from_env();
//! let designer = HelixDesigner::new(&oracle, config);
//!
//! let ss = SecStruct::new("AAGGGGAAAACCCC", "..((((....))))").unwrap();
//! let result = designer.design(&ss, &[]).unwrap();
//! println!("{} {:.3}", result.sequence, result.score);
//! ```
//!
pub mod config;
pub mod designer;
pub mod errors;
pub mod oracle;

// re-export things
pub use config::*;
pub use designer::*;
pub use errors::*;
pub use oracle::*;
