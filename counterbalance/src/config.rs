// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The method used to order the levels of a variable across participants,
/// to counteract ordering and carryover effects.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Balancing {
    /// Every participant sees the levels in their insertion order.
    NoBalancing,
    /// Row of a cyclic Latin square: each level appears once per slot
    /// position across a block of participants, but immediate successor
    /// pairs are not balanced.
    Latin,
    /// Balanced Latin square (Bradley 1958). Every level is immediately
    /// preceded by every other level exactly once across a block of
    /// participants (even level counts; odd counts use paired reversals).
    Balanced,
    /// Complete counterbalancing: the participant number selects one of the
    /// n! permutations of the levels.
    Complete,
}

/// Whether every participant experiences every level of the variable, or
/// exactly one of them.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Design {
    /// Levels multiply the number of condition slots in the procedure plan.
    Within,
    /// Each participant is assigned a single level; no slot multiplication.
    Between,
}

/// A variable the researcher manipulates.
///
/// `levels` may be empty: a newly created variable starts with no levels and
/// must contribute a slot multiplier of 1, not 0.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IndependentVariable {
    pub id: String,
    pub name: String,
    pub levels: Vec<String>,
    pub balancing: Balancing,
    pub design: Design,
    pub description: Option<String>,
}

/// A variable the researcher measures.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DependentVariable {
    pub id: String,
    pub name: String,
    pub measures: Vec<String>,
    pub means_of_measure: Option<String>,
    pub description: Option<String>,
}

/// One step of the procedure plan.
///
/// `is_condition` is 0 for an ordinary step; a positive value N marks this
/// step as condition slot N (1-indexed, unique among the non-zero values of
/// a reconciled plan).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ProcedurePlanItem {
    pub id: String,
    pub title: String,
    pub estimated_time: u32,
    pub description: Option<String>,
    pub checklist: Vec<String>,
    pub link: Option<String>,
    pub is_condition: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum StudyStatus {
    Preparation,
    Pilot,
    Conduct,
    Done,
}

/// The single source of truth for one study.
///
/// `participants_needed` is derived from the variables, not independently
/// editable; `participants_done` is a counter incremented once per completed
/// run by the caller.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Study {
    pub id: String,
    pub name: String,
    pub status: StudyStatus,
    pub participants_needed: usize,
    pub participants_done: usize,
    pub procedure_plan: Vec<ProcedurePlanItem>,
    pub independent_variables: Vec<IndependentVariable>,
    pub dependent_variables: Vec<DependentVariable>,
}

impl Study {
    /// Sum of the estimated times over the whole plan, in minutes.
    pub fn total_time(&self) -> u32 {
        self.procedure_plan
            .iter()
            .fold(0u32, |acc, item| acc + item.estimated_time)
    }
}

// ******** Output data structures *********

/// The material handed to the experimenter for one participant run: a short
/// session identifier and, for every variable, the level to present at each
/// slot of the plan.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunAssignment {
    pub session_id: String,
    /// In the order of the study's independent variables.
    pub conditions: Vec<(String, Vec<String>)>,
}

/// Errors that prevent an assignment from being computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CounterbalanceErrors {
    /// Complete counterbalancing over a level count whose factorial does not
    /// fit the permutation arithmetic.
    TooManyPermutations,
}

impl Error for CounterbalanceErrors {}

impl Display for CounterbalanceErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CounterbalanceError in condition assignment")
    }
}
