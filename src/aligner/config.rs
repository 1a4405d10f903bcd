use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::errors::MsaError;

/// Lower bound used to guide the search
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicKind {
    /// No heuristic, plain Dijkstra search
    Dijkstra,

    /// Sum of optimal pairwise alignment costs
    #[default]
    Pairwise,

    /// Sum of optimal three-way alignment costs over groups of three sequences
    Triple,

    /// Like [`HeuristicKind::Triple`] with integer tables
    TripleInt,

    /// Three-way tables for groups of three, pairwise tables for all other pairs
    DivConq,

    /// Like [`HeuristicKind::DivConq`] with integer three-way tables
    DivConqInt,
}

impl HeuristicKind {
    pub const ALL: [HeuristicKind; 6] = [
        Self::Dijkstra, Self::Pairwise, Self::Triple, Self::TripleInt, Self::DivConq, Self::DivConqInt
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Dijkstra => "dijkstra",
            Self::Pairwise => "pairwise",
            Self::Triple => "triple",
            Self::TripleInt => "triple-int",
            Self::DivConq => "div-conq",
            Self::DivConqInt => "div-conq-int",
        }
    }
}

impl Display for HeuristicKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HeuristicKind {
    type Err = MsaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| MsaError::InvalidConfig(format!("unknown heuristic '{s}'")))
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AlignmentConfig {
    pub heuristic: HeuristicKind,

    /// Factor applied to every heuristic estimate. Values above 1 trade optimality for speed.
    pub weight: f64,

    /// Whether gaps at the start or end of a sequence are charged the gap-open cost
    pub penalize_terminal_gaps: bool,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            heuristic: HeuristicKind::default(),
            weight: 1.0,
            penalize_terminal_gaps: true,
        }
    }
}

impl AlignmentConfig {
    pub fn new(heuristic: HeuristicKind) -> Self {
        Self { heuristic, ..Self::default() }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_terminal_gaps(mut self, penalize: bool) -> Self {
        self.penalize_terminal_gaps = penalize;
        self
    }

    pub fn validate(&self) -> Result<(), MsaError> {
        if !self.weight.is_finite() || self.weight < 1.0 {
            return Err(MsaError::InvalidConfig(format!("heuristic weight must be at least 1, got {}", self.weight)));
        }

        Ok(())
    }
}
