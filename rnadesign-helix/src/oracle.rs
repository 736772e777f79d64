//!
//! Structure prediction used to score designs.
//!
//! The designer only talks to the [`FoldingOracle`] trait. [`ViennaOracle`]
//! implements it by running `RNAfold -p` or `RNAcofold -p` from ViennaRNA and
//! reading the base pair probabilities back from the dot plot.
//!
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

use rnadesign_core::models::STRAND_SEPARATOR;
use rnadesign_core::models::secstruct::pair_table;

use crate::errors::OracleError;

pub const DEFAULT_RNAFOLD_BIN: &str = "RNAfold";
pub const DEFAULT_RNACOFOLD_BIN: &str = "RNAcofold";
pub const RNAFOLD_ENV_BIN: &str = "RNADESIGN_RNAFOLD_BIN";
pub const RNACOFOLD_ENV_BIN: &str = "RNADESIGN_RNACOFOLD_BIN";

#[derive(Debug, Clone, PartialEq)]
pub struct FoldResult {
    /// Minimum free energy structure, with `&` between strands for cofolds.
    pub dot_bracket: String,
    pub mfe: f64,
    /// Normalized ensemble defect of `dot_bracket`; 0 is a perfect ensemble.
    pub ensemble_defect: f64,
}

pub trait FoldingOracle: Send + Sync {
    fn fold(&self, sequence: &str) -> Result<FoldResult, OracleError>;

    fn cofold(&self, sequence: &str) -> Result<FoldResult, OracleError>;

    /// Fold or cofold depending on whether the sequence has several strands.
    fn predict(&self, sequence: &str) -> Result<FoldResult, OracleError> {
        if sequence.contains(STRAND_SEPARATOR) {
            self.cofold(sequence)
        } else {
            self.fold(sequence)
        }
    }
}

fn executable_from_env(env_var: &str, default: &str) -> String {
    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

///
/// ViennaRNA command line tools. Each call runs in its own temporary
/// directory, so one oracle can be shared across threads.
///
#[derive(Debug, Clone)]
pub struct ViennaOracle {
    rnafold: String,
    rnacofold: String,
}

impl Default for ViennaOracle {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ViennaOracle {
    pub fn new(rnafold: impl Into<String>, rnacofold: impl Into<String>) -> Self {
        ViennaOracle {
            rnafold: rnafold.into(),
            rnacofold: rnacofold.into(),
        }
    }

    /// Executables from `RNADESIGN_RNAFOLD_BIN` / `RNADESIGN_RNACOFOLD_BIN`, or the defaults.
    pub fn from_env() -> Self {
        Self::new(
            executable_from_env(RNAFOLD_ENV_BIN, DEFAULT_RNAFOLD_BIN),
            executable_from_env(RNACOFOLD_ENV_BIN, DEFAULT_RNACOFOLD_BIN),
        )
    }

    fn run(
        &self,
        executable: &str,
        env_var: &'static str,
        sequence: &str,
    ) -> Result<FoldResult, OracleError> {
        if sequence.is_empty() {
            return Err(OracleError::EmptySequence);
        }
        let workdir = tempfile::tempdir()?;

        let mut child = Command::new(executable)
            .args(["-p", "--noPS"])
            .current_dir(workdir.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    OracleError::ToolNotFound {
                        executable: executable.to_string(),
                        env_var,
                    }
                } else {
                    OracleError::Io(e)
                }
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "{}", sequence)?;
        }
        let output = child.wait_with_output()?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            return Err(OracleError::ToolFailed {
                executable: executable.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let (dot_bracket, mfe) = parse_mfe_line(executable, &stdout)?;
        let dot_plot = read_dot_plot(executable, workdir.path())?;
        let probabilities = parse_dot_plot(&dot_plot);
        let ensemble_defect = ensemble_defect(&dot_bracket, &probabilities)?;
        debug!(
            "{}: {} {} mfe={} ed={:.3}",
            executable, sequence, dot_bracket, mfe, ensemble_defect
        );

        Ok(FoldResult {
            dot_bracket,
            mfe,
            ensemble_defect,
        })
    }
}

impl FoldingOracle for ViennaOracle {
    fn fold(&self, sequence: &str) -> Result<FoldResult, OracleError> {
        self.run(&self.rnafold, RNAFOLD_ENV_BIN, sequence)
    }

    fn cofold(&self, sequence: &str) -> Result<FoldResult, OracleError> {
        self.run(&self.rnacofold, RNACOFOLD_ENV_BIN, sequence)
    }
}

fn parse_error(tool: &str, message: impl Into<String>) -> OracleError {
    OracleError::Parse {
        tool: tool.to_string(),
        message: message.into(),
    }
}

///
/// The MFE line is the first line of the form `<structure> (<energy>)`, e.g.
/// `((((....)))) ( -3.40)`.
///
pub fn parse_mfe_line(tool: &str, stdout: &str) -> Result<(String, f64), OracleError> {
    let is_structure = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| matches!(c, '(' | ')' | '.' | STRAND_SEPARATOR))
    };

    for line in stdout.lines() {
        let Some((structure, rest)) = line.trim().split_once(' ') else {
            continue;
        };
        if !is_structure(structure) {
            continue;
        }
        let energy = rest
            .trim()
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(|| parse_error(tool, format!("no energy on line '{}'", line)))?;
        let mfe: f64 = energy
            .trim()
            .parse()
            .map_err(|_| parse_error(tool, format!("invalid energy '{}'", energy.trim())))?;
        return Ok((structure.to_string(), mfe));
    }
    Err(parse_error(tool, "no MFE structure in output"))
}

fn read_dot_plot(tool: &str, dir: &Path) -> Result<String, OracleError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_dot_plot = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("dp.ps") || n.ends_with("dot.ps"));
        if is_dot_plot {
            return Ok(fs::read_to_string(path)?);
        }
    }
    Err(parse_error(tool, "no base pair probability dot plot was written"))
}

///
/// `(i, j, p)` for every `i j sqrt(p) ubox` line of a ViennaRNA dot plot,
/// with 0-based positions.
///
pub fn parse_dot_plot(postscript: &str) -> Vec<(usize, usize, f64)> {
    postscript
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [i, j, sqrt_p, "ubox"] => {
                    let i: usize = i.parse().ok()?;
                    let j: usize = j.parse().ok()?;
                    let sqrt_p: f64 = sqrt_p.parse().ok()?;
                    Some((i.checked_sub(1)?, j.checked_sub(1)?, sqrt_p * sqrt_p))
                }
                _ => None,
            }
        })
        .collect()
}

///
/// Normalized ensemble defect: `1 - (1/n) * sum_i P(i is in its target state)`.
/// Strand separators in `structure` are dropped, as dot plot positions count
/// nucleotides only.
///
pub fn ensemble_defect(
    structure: &str,
    probabilities: &[(usize, usize, f64)],
) -> Result<f64, OracleError> {
    let target: String = structure
        .chars()
        .filter(|&c| c != STRAND_SEPARATOR)
        .collect();
    let n = target.len();
    if n == 0 {
        return Err(OracleError::EmptySequence);
    }
    let pairs = pair_table(&target)
        .map_err(|e| parse_error("ensemble defect", e.to_string()))?;

    let mut paired_prob = vec![0.0; n];
    let mut correct = 0.0;
    for &(i, j, p) in probabilities {
        if i >= n || j >= n {
            continue;
        }
        paired_prob[i] += p;
        paired_prob[j] += p;
        if pairs[i] == Some(j) {
            correct += 2.0 * p;
        }
    }
    for (i, partner) in pairs.iter().enumerate() {
        if partner.is_none() {
            correct += (1.0 - paired_prob[i]).max(0.0);
        }
    }
    Ok((1.0 - correct / n as f64).clamp(0.0, 1.0))
}
