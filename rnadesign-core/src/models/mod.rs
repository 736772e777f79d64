pub mod basepair;
pub mod motif;
pub mod mutation;
pub mod secstruct;
pub mod sequence_structure;

// re-export for cleaner imports
pub use self::basepair::{
    ALL_PAIRS, BasePair, NUCLEOTIDES, WATSON_CRICK_PAIRS, WOBBLE_PAIRS,
    possible_nucleotide_mutations,
};
pub use self::motif::{Motif, MotifType};
pub use self::mutation::Mutation;
pub use self::secstruct::SecStruct;
pub use self::sequence_structure::{STRAND_SEPARATOR, SequenceStructure, normalize_rna};
