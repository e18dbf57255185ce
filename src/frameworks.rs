//! Methodology framework catalog and the size × clarity recommendation table.

use serde::Serialize;

use crate::domain::{PathClarity, ProjectSize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Framework {
    pub code: &'static str,
    pub name: &'static str,
    pub summary: &'static str,
}

pub const FRAMEWORKS: &[Framework] = &[
    Framework {
        code: "waterfall",
        name: "Waterfall",
        summary: "Sequential phases with sign-off between each stage.",
    },
    Framework {
        code: "prince2",
        name: "PRINCE2",
        summary: "Stage-gated governance with defined roles and tolerances.",
    },
    Framework {
        code: "scrum",
        name: "Scrum",
        summary: "Fixed-length sprints delivering a potentially shippable increment.",
    },
    Framework {
        code: "kanban",
        name: "Kanban",
        summary: "Continuous flow with explicit work-in-progress limits.",
    },
    Framework {
        code: "lean",
        name: "Lean",
        summary: "Eliminate waste and shorten the feedback loop.",
    },
    Framework {
        code: "design_thinking",
        name: "Design Thinking",
        summary: "Empathise, define, ideate, prototype and test.",
    },
    Framework {
        code: "msp",
        name: "Managing Successful Programmes",
        summary: "Programme-level coordination of related projects.",
    },
    Framework {
        code: "safe",
        name: "SAFe",
        summary: "Scaled agile delivery across many teams.",
    },
];

pub fn find(code: &str) -> Option<&'static Framework> {
    FRAMEWORKS.iter().find(|framework| framework.code == code)
}

pub fn is_known(code: &str) -> bool {
    find(code).is_some()
}

/// Recommended framework codes, most suitable first.
pub fn recommend(size: ProjectSize, clarity: PathClarity) -> &'static [&'static str] {
    use PathClarity::*;
    use ProjectSize::*;

    match (size, clarity) {
        (Small, Clear) => &["waterfall", "kanban"],
        (Small, Emerging) => &["kanban", "scrum"],
        (Small, Unclear) => &["design_thinking", "lean"],
        (Medium, Clear) => &["prince2", "waterfall"],
        (Medium, Emerging) => &["scrum", "prince2"],
        (Medium, Unclear) => &["design_thinking", "scrum"],
        (Large, Clear) => &["prince2", "msp"],
        (Large, Emerging) => &["safe", "prince2"],
        (Large, Unclear) => &["msp", "safe", "design_thinking"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_cell_recommends_known_frameworks() {
        for size in ProjectSize::iter() {
            for clarity in PathClarity::iter() {
                let codes = recommend(size, clarity);
                assert!(!codes.is_empty(), "{size} × {clarity} has no recommendation");
                for code in codes {
                    assert!(is_known(code), "unknown framework code {code}");
                }
            }
        }
    }

    #[test]
    fn find_returns_catalog_entry() {
        assert_eq!(find("scrum").map(|f| f.name), Some("Scrum"));
        assert!(find("spiral").is_none());
    }
}
