use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

///
/// A named mutant sequence. The name lists every substitution sorted by
/// position, e.g. `A1U_U2A`. Ordering compares the name first, then the
/// sequence.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mutation {
    pub name: String,
    pub sequence: String,
}

impl Mutation {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Mutation {
            name: name.into(),
            sequence: sequence.into(),
        }
    }

    /// Number of point changes encoded in the name.
    pub fn num_changes(&self) -> usize {
        if self.name.is_empty() {
            0
        } else {
            self.name.split('_').count()
        }
    }
}

impl Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.name, self.sequence)
    }
}

/// Render a single substitution as `<old><1-based position><new>`.
pub fn substitution_name(original: char, position: usize, new: char) -> String {
    format!("{}{}{}", original, position + 1, new)
}
