//! # Rule Catalog
//!
//! The fixed table of 12 compliance rules. Rule ids (`e1`…`g4`) are the
//! correlation key between check requests, LLM responses, and stored
//! results; they are stable and never reused.
//!
//! The catalog itself is static. The mutable per-rule configuration
//! (`enabled`, `threshold`) lives in the `compliance_rules` table and is
//! surfaced through the managed [`Rule`] type; the catalog supplies the
//! defaults seeded into that table.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The three ESG rule categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Environmental,
    Social,
    Governance,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Environmental => "environmental",
            Self::Social => "social",
            Self::Governance => "governance",
        }
    }

    /// Parse a category from a stored string, defaulting to `Governance`
    /// only on recognised input — unknown strings are an error because the
    /// category partitions report aggregation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "environmental" => Some(Self::Environmental),
            "social" => Some(Self::Social),
            "governance" => Some(Self::Governance),
            _ => None,
        }
    }
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A catalog rule definition: the immutable identity and default
/// configuration of one compliance check.
#[derive(Debug, Clone, Copy)]
pub struct RuleDef {
    pub id: &'static str,
    pub category: RuleCategory,
    pub name: &'static str,
    pub description: &'static str,
    /// Default tuning threshold seeded into the rules table. Stored and
    /// editable but not consulted by the evaluators (see DESIGN.md).
    pub default_threshold: f64,
}

/// A managed compliance rule as exposed through the rule-management API:
/// catalog identity plus the mutable `enabled` / `threshold` configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rule {
    pub id: String,
    pub category: RuleCategory,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub threshold: f64,
}

impl From<&RuleDef> for Rule {
    fn from(def: &RuleDef) -> Self {
        Self {
            id: def.id.to_string(),
            category: def.category,
            name: def.name.to_string(),
            description: def.description.to_string(),
            enabled: true,
            threshold: def.default_threshold,
        }
    }
}

use RuleCategory::{Environmental, Governance, Social};

/// The 12 fixed compliance rules. Order: environmental, social, governance.
pub const CATALOG: [RuleDef; 12] = [
    RuleDef {
        id: "e1",
        category: Environmental,
        name: "碳排放披露",
        description: "企业应披露碳排放数据及减排目标",
        default_threshold: 0.8,
    },
    RuleDef {
        id: "e2",
        category: Environmental,
        name: "能源使用效率",
        description: "企业应披露能源使用效率及改进措施",
        default_threshold: 0.8,
    },
    RuleDef {
        id: "e3",
        category: Environmental,
        name: "废弃物管理",
        description: "企业应披露废弃物处理方法及减量措施",
        default_threshold: 0.7,
    },
    RuleDef {
        id: "e4",
        category: Environmental,
        name: "水资源管理",
        description: "企业应披露水资源使用及节水措施",
        default_threshold: 0.7,
    },
    RuleDef {
        id: "s1",
        category: Social,
        name: "员工健康安全",
        description: "企业应确保工作环境安全并披露相关措施",
        default_threshold: 0.85,
    },
    RuleDef {
        id: "s2",
        category: Social,
        name: "多元化与包容性",
        description: "企业应促进员工多元化并防止歧视",
        default_threshold: 0.7,
    },
    RuleDef {
        id: "s3",
        category: Social,
        name: "供应链劳工标准",
        description: "企业应确保供应链符合劳工标准",
        default_threshold: 0.8,
    },
    RuleDef {
        id: "s4",
        category: Social,
        name: "社区参与",
        description: "企业应积极参与社区发展并披露相关活动",
        default_threshold: 0.6,
    },
    RuleDef {
        id: "g1",
        category: Governance,
        name: "董事会独立性",
        description: "董事会应包含足够比例的独立董事",
        default_threshold: 0.5,
    },
    RuleDef {
        id: "g2",
        category: Governance,
        name: "反腐败政策",
        description: "企业应制定并实施反腐败政策",
        default_threshold: 0.8,
    },
    RuleDef {
        id: "g3",
        category: Governance,
        name: "高管薪酬透明度",
        description: "企业应披露高管薪酬及其决定机制",
        default_threshold: 0.7,
    },
    RuleDef {
        id: "g4",
        category: Governance,
        name: "风险管理体系",
        description: "企业应建立全面的风险管理体系",
        default_threshold: 0.8,
    },
];

/// Look up a catalog rule by id.
pub fn find(id: &str) -> Option<&'static RuleDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// All catalog rule ids, in catalog order.
pub fn all_ids() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|def| def.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_four_rules_per_category() {
        for category in [Environmental, Social, Governance] {
            let count = CATALOG.iter().filter(|d| d.category == category).count();
            assert_eq!(count, 4, "{category} should have 4 rules");
        }
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<_> = CATALOG.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(find("g2").unwrap().name, "反腐败政策");
        assert!(find("zzz").is_none());
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Environmental).unwrap();
        assert_eq!(json, r#""environmental""#);
    }
}
