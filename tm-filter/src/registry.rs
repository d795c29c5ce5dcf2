use crate::errors::QueryError;
use crate::tree::FilterTree;
use crate::types::{Condition, Group, Node, QueryValue, Section, StrategyKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Date strategies take values in the form an HTML date input produces.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One searchable field/matcher the backend understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDef {
    pub id: String,
    pub label: String,
    pub kind: StrategyKind,
    #[serde(default)]
    pub section: Section,
}

impl StrategyDef {
    pub fn new(id: &str, label: &str, kind: StrategyKind, section: Section) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            section,
        }
    }
}

const GENERAL_TEXT: &[(&str, &str)] = &[
    ("wordmark", "Word Mark"),
    ("name", "Name"),
    ("owner_name", "Owner's Name"),
    ("attorney_name", "Attorney Name"),
    ("serial_number", "Serial Number"),
    ("registration_number", "Registration Number"),
    ("phonetic", "Phonetic"),
    ("disclaimer_statements", "Disclaimer Statements"),
    ("description_of_mark", "Description of Mark"),
    ("dba_name", "DBA/AKA Name"),
    ("owner_legal_entity", "Legal Entity Type"),
    ("owner_party_type", "Party Type"),
    ("drawing_code_type", "Drawing Code"),
    ("design_code", "Design Code"),
    ("int_reg_number", "International Registration Number"),
    ("int_status_code", "International Status Code"),
    ("country", "Country"),
];

const DATES: &[(&str, &str)] = &[
    ("filing_date", "Filing Date"),
    ("registration_date", "Registration Date"),
    ("cancellation_date", "Cancellation Date"),
    ("foreign_filing_date", "Foreign Filing Date"),
    ("foreign_registration_date", "Foreign Registration Date"),
    ("int_reg_date", "International Registration Date"),
    ("int_pub_date", "International Publication Date"),
    ("auto_protection_date", "Auto Protection Date"),
    ("published_opposition_date", "Published Opposition Date"),
    ("renewal_date", "Renewal Date"),
    ("international_renewal_date", "International Renewal Date"),
    ("foreign_renewal_date", "Foreign Renewal Date"),
];

const FLAGS: &[(&str, &str)] = &[
    ("section_12c", "Section 12c filed"),
    ("section_8", "Section 8 filed"),
    ("section_15", "Section 15 filed"),
    ("no_current_basis", "No Current Basis"),
    ("no_initial_basis", "No Initial Basis"),
    ("change_registration", "Change in Registration"),
    ("concurrent_use", "Concurrent Use"),
    ("concurrent_use_proceeding", "Concurrent Use Proceeding"),
    ("name_change", "Name Change"),
    ("color_drawing", "Color Drawing"),
    ("three_d_drawing", "3D Drawing"),
    ("prior_registration_present", "Prior Registration Present"),
    ("standard_character_claim", "Standard Character Claim"),
    ("acquired_distinctiveness_whole", "Acquired Distinctiveness (Whole)"),
    ("acquired_distinctiveness_part", "Acquired Distinctiveness (Part)"),
    ("certification_mark", "Certification Mark"),
    ("collective_membership_mark", "Collective Membership Mark"),
    ("collective_trademark", "Collective Trademark"),
    ("collective_service_mark", "Collective Service Mark"),
    ("trademark", "Trademark"),
    ("service_mark", "Service Mark"),
    ("intent_to_use", "Intent to Use"),
    ("actual_use", "Actual Use"),
    ("foreign_application", "Foreign Application"),
    ("foreign_registration", "Foreign Registration (44(e))"),
    ("extension_protection", "Extension of Protection (66(a))"),
    ("supplemental_register", "Supplemental Register"),
    ("principal_register", "Principal Register"),
    ("amended_44d_application", "Amended 44(d) Application"),
    ("amended_44e_application", "Amended 44(e) Application"),
    ("amended_66a_application", "Amended 66(a) Application"),
    ("current_44d", "Current 44(d)"),
    ("current_44e", "Current 44(e)"),
    ("current_66a", "Current 66(a)"),
    ("current_no_basis", "Current No Basis"),
    ("without_basis_currently", "Without Basis Currently"),
];

const CLASSIFICATIONS: &[(&str, &str)] = &[
    ("international_class", "International Class"),
    ("us_class", "US Class"),
    ("coordinated_class", "Coordinated Class"),
];

/// Registry of filter strategies, kept in presentation order
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    defs: Vec<StrategyDef>,
    index: HashMap<String, usize>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The trademark strategies understood by the search backend.
    pub fn builtin() -> Self {
        let general = GENERAL_TEXT
            .iter()
            .map(|(id, label)| StrategyDef::new(id, label, StrategyKind::Text, Section::General));
        let dates = DATES
            .iter()
            .map(|(id, label)| StrategyDef::new(id, label, StrategyKind::Date, Section::General));
        let flags = FLAGS.iter().map(|(id, label)| {
            StrategyDef::new(id, label, StrategyKind::Boolean, Section::FilingStatus)
        });
        let classes = CLASSIFICATIONS.iter().map(|(id, label)| {
            StrategyDef::new(id, label, StrategyKind::Text, Section::Classification)
        });

        let mut registry = Self::new();
        registry.extend(general.chain(dates).chain(flags).chain(classes));
        registry
    }

    /// Add definitions; a definition replaces an earlier one with the same id in place.
    pub fn extend<I: IntoIterator<Item = StrategyDef>>(&mut self, defs: I) {
        for def in defs {
            match self.index.get(&def.id) {
                Some(&pos) => self.defs[pos] = def,
                None => {
                    self.index.insert(def.id.clone(), self.defs.len());
                    self.defs.push(def);
                }
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&StrategyDef> {
        self.index.get(id).map(|&pos| &self.defs[pos])
    }

    pub fn kind_of(&self, id: &str) -> Option<StrategyKind> {
        self.get(id).map(|def| def.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StrategyDef> {
        self.defs.iter()
    }

    pub fn by_section(&self, section: Section) -> Vec<&StrategyDef> {
        self.defs.iter().filter(|def| def.section == section).collect()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Build a validated condition with its display label resolved.
    pub fn condition(&self, strategy: &str, value: &str) -> Result<Condition, QueryError> {
        let def = self
            .get(strategy)
            .ok_or_else(|| QueryError::UnknownStrategy(strategy.to_string()))?;

        let query = match def.kind {
            StrategyKind::Boolean => QueryValue::Flag,
            StrategyKind::Text => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(QueryError::EmptyValue(def.id.clone()));
                }
                QueryValue::Text(value.to_string())
            }
            StrategyKind::Date => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(QueryError::EmptyValue(def.id.clone()));
                }
                NaiveDate::parse_from_str(value, DATE_FORMAT)
                    .map_err(|_| QueryError::InvalidDate(def.id.clone(), value.to_string()))?;
                QueryValue::Text(value.to_string())
            }
        };

        Ok(Condition {
            strategy: def.id.clone(),
            query,
            label: Some(def.label.clone()),
        })
    }

    /// Fill in missing labels and turn `"true"` strings on boolean strategies into flags.
    /// Payloads written by older clients carry neither.
    pub fn normalize(&self, tree: &FilterTree) -> FilterTree {
        FilterTree::from_group(self.normalize_group(tree.root()))
    }

    fn normalize_group(&self, group: &Group) -> Group {
        Group {
            operator: group.operator,
            operands: group
                .operands
                .iter()
                .map(|operand| match operand.as_ref() {
                    Node::Condition(condition) => match self.normalize_condition(condition) {
                        Some(updated) => Arc::new(Node::Condition(updated)),
                        None => Arc::clone(operand),
                    },
                    Node::Group(inner) => Arc::new(Node::Group(self.normalize_group(inner))),
                })
                .collect(),
        }
    }

    fn normalize_condition(&self, condition: &Condition) -> Option<Condition> {
        let def = self.get(&condition.strategy)?;
        let flag_as_text = def.kind == StrategyKind::Boolean && !condition.query.is_flag();
        if condition.label.is_some() && !flag_as_text {
            return None;
        }

        let mut updated = condition.clone();
        if updated.label.is_none() {
            updated.label = Some(def.label.clone());
        }
        if flag_as_text {
            updated.query = QueryValue::Flag;
        }
        Some(updated)
    }
}
