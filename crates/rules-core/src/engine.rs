//! Rule aggregation and resolution
//!
//! The engine owns every extracted rule and two indexes over them: by rule
//! kind and by target document kind. It is built once and only read
//! afterwards, so a shared reference can serve parallel validation.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::detect::DocumentKind;
use crate::rule::{ExtractedRule, RuleKind};

#[derive(Debug, Default, Clone)]
pub struct RuleEngine {
    rules: Vec<ExtractedRule>,
    by_kind: BTreeMap<RuleKind, Vec<usize>>,
    by_document_kind: HashMap<String, Vec<usize>>,
    universal: Vec<usize>,
}

impl RuleEngine {
    /// Index `rules` in order. A rule whose id was already taken is dropped.
    pub fn new(rules: impl IntoIterator<Item = ExtractedRule>) -> Self {
        let mut engine = Self::default();
        let mut ids = HashSet::new();

        for rule in rules {
            if !ids.insert(rule.rule_id.clone()) {
                tracing::warn!(
                    rule_id = %rule.rule_id,
                    source = ?rule.source_file,
                    "duplicate rule id, keeping the first definition"
                );
                continue;
            }

            let idx = engine.rules.len();
            engine.by_kind.entry(rule.kind).or_default().push(idx);
            if rule.is_universal() {
                engine.universal.push(idx);
            } else {
                for target in &rule.applies_to {
                    let key = target.trim().to_lowercase();
                    if key.parse::<DocumentKind>().is_err() {
                        tracing::debug!(rule_id = %rule.rule_id, target = %key, "rule targets an unrecognized document kind");
                    }
                    let slot = engine.by_document_kind.entry(key).or_default();
                    if slot.last() != Some(&idx) {
                        slot.push(idx);
                    }
                }
            }
            engine.rules.push(rule);
        }
        engine
    }

    /// Rules targeting `kind` first, then universal rules, each id once.
    pub fn rules_for(&self, kind: DocumentKind) -> Vec<&ExtractedRule> {
        let specific = self
            .by_document_kind
            .get(kind.as_str())
            .into_iter()
            .flatten();
        let mut seen = HashSet::new();
        specific
            .chain(self.universal.iter())
            .filter(|idx| seen.insert(**idx))
            .map(|idx| &self.rules[*idx])
            .collect()
    }

    pub fn rules_of_kind(&self, kind: RuleKind) -> impl Iterator<Item = &ExtractedRule> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flatten()
            .map(|idx| &self.rules[*idx])
    }

    pub fn get(&self, rule_id: &str) -> Option<&ExtractedRule> {
        self.rules.iter().find(|r| r.rule_id == rule_id)
    }

    pub fn rules(&self) -> &[ExtractedRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule counts per kind, for reporting.
    pub fn kind_counts(&self) -> BTreeMap<RuleKind, usize> {
        self.by_kind.iter().map(|(k, v)| (*k, v.len())).collect()
    }
}
