use std::fmt;

use dualsimplex_solver::{Basis, StandardForm};

use crate::parser::ParseError;

/// Contents of a problem file, before validation
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemFile {
    /// Objective coefficients (c)
    pub costs: Vec<f64>,
    /// Constraint rows (A)
    pub matrix: Vec<Vec<f64>>,
    /// Right-hand side (b)
    pub rhs: Vec<f64>,
    /// Starting basis, 1-based
    pub basis: Vec<usize>,
}

impl ProblemFile {
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        crate::parser::Parser::parse(source)
    }

    pub fn num_variables(&self) -> usize {
        self.costs.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.matrix.len()
    }

    /// Validate dimensions and convert the basis to 0-based indices
    pub fn into_problem(self) -> Result<(StandardForm, Basis), ParseError> {
        let problem = StandardForm::from_rows(self.costs, self.matrix, self.rhs)?;
        let basis = Basis::from_one_based(&self.basis)?;
        basis.validate(&problem)?;
        Ok((problem, basis))
    }
}

impl fmt::Display for ProblemFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn line(f: &mut fmt::Formatter<'_>, values: impl Iterator<Item = String>) -> fmt::Result {
            writeln!(f, "{}", values.collect::<Vec<_>>().join(" "))
        }
        line(f, self.costs.iter().map(|v| v.to_string()))?;
        for row in &self.matrix {
            line(f, row.iter().map(|v| v.to_string()))?;
        }
        line(f, self.rhs.iter().map(|v| v.to_string()))?;
        line(f, self.basis.iter().map(|v| v.to_string()))
    }
}
