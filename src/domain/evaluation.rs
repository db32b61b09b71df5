//! How candidate cells are evaluated within one growth step.
//!
//! Placement stays strictly sequential; only the scoring and legality
//! checks of the current candidates may fan out. Both modes yield the
//! same candidates in the same order.

use std::fmt;
use std::str::FromStr;

/// Available candidate evaluation strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    /// One candidate after another on the calling thread
    #[default]
    Serial,
    /// Candidates spread over the rayon thread pool
    Parallel,
}

impl EvaluationMode {
    /// Get all available modes
    pub fn all() -> Vec<EvaluationMode> {
        vec![EvaluationMode::Serial, EvaluationMode::Parallel]
    }

    /// Short name for the CLI and logs
    pub fn name(&self) -> &'static str {
        match self {
            EvaluationMode::Serial => "serial",
            EvaluationMode::Parallel => "parallel",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EvaluationMode::Serial => "candidates scored one by one",
            EvaluationMode::Parallel => "candidates scored across threads",
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EvaluationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EvaluationMode::all()
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown evaluation mode '{s}' (expected serial or parallel)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_serial() {
        assert_eq!(EvaluationMode::default(), EvaluationMode::Serial);
    }

    #[test]
    fn test_names_round_trip() {
        for mode in EvaluationMode::all() {
            assert_eq!(mode.name().parse::<EvaluationMode>(), Ok(mode));
        }
        assert_eq!("PARALLEL".parse::<EvaluationMode>(), Ok(EvaluationMode::Parallel));
        assert!("simd".parse::<EvaluationMode>().is_err());
    }
}
