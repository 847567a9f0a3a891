pub use crate::config::*;

/// A builder for assembling a study record.
///
/// The builder keeps the derived fields consistent: [build](StudyBuilder::build)
/// reconciles the procedure plan against the variables and fills in the
/// participant count.
///
/// ```
/// pub use counterbalance::builder::StudyBuilder;
/// pub use counterbalance::{Balancing, Design};
///
/// let mut builder = StudyBuilder::new("Menu layout study");
/// builder.plan_step("Welcome", 5, &["Greet the participant".to_string()]);
/// builder.independent_variable(
///     "layout",
///     &["list".to_string(), "grid".to_string()],
///     Design::Within,
///     Balancing::Balanced,
/// );
///
/// let study = builder.build();
/// assert_eq!(study.participants_needed, 2);
/// // One welcome step plus one condition slot per layout level.
/// assert_eq!(study.procedure_plan.len(), 3);
/// ```
pub struct StudyBuilder {
    pub(crate) _name: String,
    pub(crate) _variables: Vec<IndependentVariable>,
    pub(crate) _measures: Vec<DependentVariable>,
    pub(crate) _plan: Vec<ProcedurePlanItem>,
}

impl StudyBuilder {
    pub fn new(name: &str) -> StudyBuilder {
        StudyBuilder {
            _name: name.to_string(),
            _variables: Vec::new(),
            _measures: Vec::new(),
            _plan: Vec::new(),
        }
    }

    /// Adds a manipulated variable. Levels may be empty at this point; an
    /// empty variable contributes a single condition slot.
    pub fn independent_variable(
        &mut self,
        name: &str,
        levels: &[String],
        design: Design,
        balancing: Balancing,
    ) {
        let id = crate::derive_id(&format!(
            "{}/iv/{}/{}",
            self._name,
            self._variables.len(),
            name
        ));
        self._variables.push(IndependentVariable {
            id,
            name: name.to_string(),
            levels: levels.to_vec(),
            balancing,
            design,
            description: None,
        });
    }

    /// Adds a measured variable.
    pub fn dependent_variable(&mut self, name: &str, measures: &[String]) {
        let id = crate::derive_id(&format!(
            "{}/dv/{}/{}",
            self._name,
            self._measures.len(),
            name
        ));
        self._measures.push(DependentVariable {
            id,
            name: name.to_string(),
            measures: measures.to_vec(),
            means_of_measure: None,
            description: None,
        });
    }

    /// Appends an ordinary procedure step to the end of the plan.
    pub fn plan_step(&mut self, title: &str, estimated_time: u32, checklist: &[String]) {
        let id = crate::derive_id(&format!(
            "{}/step/{}/{}",
            self._name,
            self._plan.len(),
            title
        ));
        self._plan.push(ProcedurePlanItem {
            id,
            title: title.to_string(),
            estimated_time,
            description: None,
            checklist: checklist.to_vec(),
            link: None,
            is_condition: 0,
        });
    }

    /// Finishes the study: the plan is reconciled against the variables and
    /// the participant count is derived.
    pub fn build(self) -> Study {
        let plan = crate::reconcile_plan(&self._plan, &self._variables);
        let needed = crate::participants_needed(&self._variables);
        Study {
            id: crate::derive_id(&format!("study/{}", self._name)),
            name: self._name,
            status: StudyStatus::Preparation,
            participants_needed: needed,
            participants_done: 0,
            procedure_plan: plan,
            independent_variables: self._variables,
            dependent_variables: self._measures,
        }
    }
}
