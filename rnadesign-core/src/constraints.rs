//!
//! Composition rules a candidate sequence must obey.
//!
//! Two kinds exist: [`SequenceConstraint`] looks at the sequence alone and
//! [`StructureConstraint`] needs the paired structure as well. Both come in a
//! hard-cap flavour and a "no worse" flavour. The no-worse rules measure a
//! baseline once at construction time; afterwards a candidate fails only when
//! its value is above the cap **and** above that baseline.
//!
use std::fmt::{self, Display};

use crate::errors::Result;
use crate::models::SecStruct;
use crate::utils::{RunLengths, max_gc_stretch_of, max_repeating_nucleotides};

fn within(value: usize, max: usize, baseline: usize) -> bool {
    value <= max || value <= baseline
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceConstraint {
    /// No nucleotide may repeat more than `max` times in a row.
    MaxRunLength { max: usize },
    /// Runs above `max` are tolerated up to the baseline run of that base.
    MaxRunLengthNoWorse { max: usize, baseline: RunLengths },
}

impl SequenceConstraint {
    pub fn max_run_length(max: usize) -> Self {
        SequenceConstraint::MaxRunLength { max }
    }

    pub fn max_run_length_no_worse(max: usize, baseline_sequence: &str) -> Self {
        SequenceConstraint::MaxRunLengthNoWorse {
            max,
            baseline: max_repeating_nucleotides(baseline_sequence),
        }
    }

    pub fn satisfies(&self, sequence: &str) -> bool {
        let runs = max_repeating_nucleotides(sequence);
        match self {
            SequenceConstraint::MaxRunLength { max } => runs.max() <= *max,
            SequenceConstraint::MaxRunLengthNoWorse { max, baseline } => runs
                .iter()
                .all(|(base, run)| within(run, *max, baseline.get(base))),
        }
    }
}

impl Display for SequenceConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceConstraint::MaxRunLength { max } => write!(f, "max run length {}", max),
            SequenceConstraint::MaxRunLengthNoWorse { max, .. } => {
                write!(f, "max run length {} (no worse than baseline)", max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureConstraint {
    /// No helix may hold more than `max` consecutive G·C pairs.
    MaxPairedGCRun { max: usize },
    /// Paired G·C runs above `max` are tolerated up to the baseline's run.
    MaxPairedGCRunNoWorse { max: usize, baseline: usize },
}

impl StructureConstraint {
    pub fn max_paired_gc_run(max: usize) -> Self {
        StructureConstraint::MaxPairedGCRun { max }
    }

    pub fn max_paired_gc_run_no_worse(
        max: usize,
        baseline_sequence: &str,
        baseline_structure: &str,
    ) -> Result<Self> {
        let baseline = SecStruct::new(baseline_sequence, baseline_structure)?;
        Ok(Self::max_paired_gc_run_no_worse_of(max, &baseline))
    }

    pub fn max_paired_gc_run_no_worse_of(max: usize, baseline: &SecStruct) -> Self {
        StructureConstraint::MaxPairedGCRunNoWorse {
            max,
            baseline: max_gc_stretch_of(baseline),
        }
    }

    pub fn satisfies(&self, sequence: &str, structure: &str) -> Result<bool> {
        let ss = SecStruct::new(sequence, structure)?;
        Ok(self.satisfies_secstruct(&ss))
    }

    pub fn satisfies_secstruct(&self, ss: &SecStruct) -> bool {
        self.accepts_stretch(max_gc_stretch_of(ss))
    }

    /// Check an already measured G·C stretch.
    pub fn accepts_stretch(&self, stretch: usize) -> bool {
        match self {
            StructureConstraint::MaxPairedGCRun { max } => stretch <= *max,
            StructureConstraint::MaxPairedGCRunNoWorse { max, baseline } => {
                within(stretch, *max, *baseline)
            }
        }
    }
}

impl Display for StructureConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureConstraint::MaxPairedGCRun { max } => write!(f, "max paired GC run {}", max),
            StructureConstraint::MaxPairedGCRunNoWorse { max, baseline } => write!(
                f,
                "max paired GC run {} (no worse than baseline {})",
                max, baseline
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Sequence(SequenceConstraint),
    Structure(StructureConstraint),
}

impl Constraint {
    pub fn satisfies(&self, ss: &SecStruct) -> bool {
        match self {
            Constraint::Sequence(c) => c.satisfies(ss.sequence()),
            Constraint::Structure(c) => c.satisfies_secstruct(ss),
        }
    }
}

impl From<SequenceConstraint> for Constraint {
    fn from(c: SequenceConstraint) -> Self {
        Constraint::Sequence(c)
    }
}

impl From<StructureConstraint> for Constraint {
    fn from(c: StructureConstraint) -> Self {
        Constraint::Structure(c)
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Sequence(c) => write!(f, "{}", c),
            Constraint::Structure(c) => write!(f, "{}", c),
        }
    }
}

///
/// Logical AND over constraints, checked in insertion order and stopping at
/// the first failure.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, constraint: impl Into<Constraint>) -> Self {
        self.push(constraint);
        self
    }

    pub fn push(&mut self, constraint: impl Into<Constraint>) {
        self.constraints.push(constraint.into());
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn satisfies(&self, ss: &SecStruct) -> bool {
        self.first_failure(ss).is_none()
    }

    pub fn first_failure(&self, ss: &SecStruct) -> Option<&Constraint> {
        self.constraints.iter().find(|c| !c.satisfies(ss))
    }
}
