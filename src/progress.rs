//! Declarative completion rules for the planning blocks.
//!
//! Each block owns one ordered list of `{predicate, weight}` rules. The
//! server and the client evaluate the same list against a [`BlockSnapshot`],
//! so a page never assembles its own percentage arithmetic.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{BlockId, TaskStage};

/// `round(100 * completed / total)`, or 0 when there is nothing to complete.
pub fn completion_percentage(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((f64::from(completed) * 100.0) / f64::from(total)).round() as u8
}

/// Everything the rules may look at for one project.
#[derive(Debug, Clone, Default)]
pub struct BlockSnapshot {
    pub rated_factors: HashSet<String>,
    pub heuristic_count: usize,
    pub policy_count: usize,
    pub framework_count: usize,
    pub tasks_per_stage: HashMap<TaskStage, usize>,
    pub fields: Map<String, Value>,
}

impl BlockSnapshot {
    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields = fields;
        self
    }

    fn field_filled(&self, name: &str) -> bool {
        match self.fields.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::String(text)) => !text.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(entries)) => !entries.is_empty(),
            Some(Value::Bool(_)) | Some(Value::Number(_)) => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    FactorRated(String),
    MinHeuristics(usize),
    MinPolicies(usize),
    FrameworkSelected,
    FieldFilled(String),
    MinTasks { stage: TaskStage, count: usize },
}

impl Predicate {
    pub fn holds(&self, snapshot: &BlockSnapshot) -> bool {
        match self {
            Predicate::FactorRated(factor_id) => snapshot.rated_factors.contains(factor_id),
            Predicate::MinHeuristics(count) => snapshot.heuristic_count >= *count,
            Predicate::MinPolicies(count) => snapshot.policy_count >= *count,
            Predicate::FrameworkSelected => snapshot.framework_count > 0,
            Predicate::FieldFilled(name) => snapshot.field_filled(name),
            Predicate::MinTasks { stage, count } => {
                snapshot.tasks_per_stage.get(stage).copied().unwrap_or(0) >= *count
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRule {
    pub label: String,
    pub weight: u32,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed_weight: u32,
    pub total_weight: u32,
    pub percentage: u8,
    pub outstanding: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressRules {
    rules: Vec<ProgressRule>,
}

impl ProgressRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, label: impl Into<String>, weight: u32, predicate: Predicate) -> Self {
        self.rules.push(ProgressRule {
            label: label.into(),
            weight,
            predicate,
        });
        self
    }

    pub fn rules(&self) -> &[ProgressRule] {
        &self.rules
    }

    pub fn evaluate(&self, snapshot: &BlockSnapshot) -> Progress {
        let mut completed_weight = 0;
        let mut total_weight = 0;
        let mut outstanding = Vec::new();

        for rule in &self.rules {
            total_weight += rule.weight;
            if rule.predicate.holds(snapshot) {
                completed_weight += rule.weight;
            } else {
                outstanding.push(rule.label.clone());
            }
        }

        Progress {
            completed_weight,
            total_weight,
            percentage: completion_percentage(completed_weight, total_weight),
            outstanding,
        }
    }

    /// One rule per catalog factor, plus the heuristic and success criteria checks.
    pub fn discover<I, S>(factor_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::factor_ratings(factor_ids)
            .rule("Add a personal heuristic", 1, Predicate::MinHeuristics(1))
            .rule(
                "Describe the success criteria",
                1,
                Predicate::FieldFilled("successCriteria".to_string()),
            )
    }

    /// Only the rating rules of the Discover block.
    pub fn factor_ratings<I, S>(factor_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        factor_ids.into_iter().fold(Self::new(), |rules, id| {
            let id = id.into();
            rules.rule(
                format!("Rate success factor {}", id),
                1,
                Predicate::FactorRated(id),
            )
        })
    }

    pub fn design() -> Self {
        Self::new()
            .rule("Select a framework", 1, Predicate::FrameworkSelected)
            .rule(
                "Describe the delivery approach",
                1,
                Predicate::FieldFilled("deliveryApproach".to_string()),
            )
            .rule("Add a policy", 1, Predicate::MinPolicies(1))
    }

    pub fn deliver() -> Self {
        let rules = [
            TaskStage::Identification,
            TaskStage::Definition,
            TaskStage::Delivery,
            TaskStage::Closure,
        ]
        .into_iter()
        .fold(Self::new(), |rules, stage| {
            rules.rule(
                format!("Plan at least one {} task", stage),
                1,
                Predicate::MinTasks { stage, count: 1 },
            )
        });
        rules.rule(
            "Write delivery notes",
            1,
            Predicate::FieldFilled("deliveryNotes".to_string()),
        )
    }

    pub fn for_block<I, S>(block: BlockId, factor_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match block {
            BlockId::Discover => Self::discover(factor_ids),
            BlockId::Design => Self::design(),
            BlockId::Deliver => Self::deliver(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn factors(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn five_of_twelve_factors_rounds_to_42() {
        let rules = ProgressRules::factor_ratings(factors(12));
        let snapshot = BlockSnapshot {
            rated_factors: factors(5).into_iter().collect(),
            ..Default::default()
        };
        let progress = rules.evaluate(&snapshot);
        assert_eq!(progress.completed_weight, 5);
        assert_eq!(progress.total_weight, 12);
        assert_eq!(progress.percentage, 42);
        assert_eq!(completion_percentage(5, 12), 42);
    }

    #[test]
    fn empty_rule_set_is_zero_percent() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(ProgressRules::new().evaluate(&BlockSnapshot::default()).percentage, 0);
    }

    #[test]
    fn filling_more_never_lowers_the_percentage() {
        let rules = ProgressRules::discover(factors(4));
        let mut snapshot = BlockSnapshot::default();
        let mut last = rules.evaluate(&snapshot).percentage;

        for id in factors(4) {
            snapshot.rated_factors.insert(id);
            let now = rules.evaluate(&snapshot).percentage;
            assert!(now >= last);
            last = now;
        }

        snapshot.heuristic_count = 1;
        let now = rules.evaluate(&snapshot).percentage;
        assert!(now >= last);
        last = now;

        let mut fields = Map::new();
        fields.insert("successCriteria".to_string(), json!("Launch by Q3"));
        snapshot = snapshot.with_fields(fields);
        let now = rules.evaluate(&snapshot).percentage;
        assert!(now >= last);
        assert_eq!(now, 100);
    }

    #[test]
    fn blank_text_does_not_count_as_filled() {
        let mut fields = Map::new();
        fields.insert("deliveryNotes".to_string(), json!("   "));
        let snapshot = BlockSnapshot::default().with_fields(fields);
        assert!(!Predicate::FieldFilled("deliveryNotes".to_string()).holds(&snapshot));
    }

    #[test]
    fn outstanding_lists_unmet_rules_in_order() {
        let mut snapshot = BlockSnapshot::default();
        snapshot.framework_count = 1;
        let progress = ProgressRules::design().evaluate(&snapshot);
        assert_eq!(
            progress.outstanding,
            vec!["Describe the delivery approach", "Add a policy"]
        );
        assert_eq!(progress.percentage, 33);
    }

    #[test]
    fn deliver_rules_count_tasks_per_stage() {
        let mut snapshot = BlockSnapshot::default();
        snapshot.tasks_per_stage.insert(TaskStage::Identification, 2);
        snapshot.tasks_per_stage.insert(TaskStage::Closure, 1);
        let progress = ProgressRules::deliver().evaluate(&snapshot);
        assert_eq!(progress.completed_weight, 2);
        assert_eq!(progress.total_weight, 5);
        assert_eq!(progress.percentage, 40);
    }
}
