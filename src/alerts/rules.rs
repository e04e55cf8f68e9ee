//! Rule store
//!
//! Holds the active rule table (built-in categories plus custom rules) and
//! persists every change immediately.

use super::types::{Category, Condition, CustomRule, CustomRuleDefinition, Rule, Severity};
use crate::error::DomainError;
use crate::storage::{load_record, save_record, Storage, StorageKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Rules of one category, in evaluation order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRules {
    pub category: Category,
    pub rules: Vec<Rule>,
}

/// Complete rule configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    /// Built-in categories, kept in [`Category`] order
    #[serde(default)]
    pub categories: Vec<CategoryRules>,
    /// User-defined rules, keyed by name, in insertion order
    #[serde(default)]
    pub custom: Vec<CustomRule>,
}

impl RuleTable {
    /// The built-in default table
    pub fn default_rules() -> Self {
        use Condition::{GreaterThan, LessThan, PercentageChange};

        Self {
            categories: vec![
                CategoryRules {
                    category: Category::Volatility,
                    rules: vec![
                        Rule::new("high", 15.0, GreaterThan, Severity::High),
                        Rule::new("critical", 25.0, GreaterThan, Severity::Critical),
                    ],
                },
                CategoryRules {
                    category: Category::Performance,
                    rules: vec![
                        Rule::new("bull", 5.0, GreaterThan, Severity::Medium),
                        Rule::new("bear", -5.0, LessThan, Severity::Medium),
                        Rule::new("extreme_bull", 15.0, GreaterThan, Severity::Critical),
                        Rule::new("extreme_bear", -15.0, LessThan, Severity::Critical),
                    ],
                },
                CategoryRules {
                    category: Category::Volume,
                    rules: vec![
                        Rule::new("high", 2.0, PercentageChange, Severity::Medium),
                        Rule::new("low", 0.5, PercentageChange, Severity::Medium),
                    ],
                },
            ],
            custom: Vec::new(),
        }
    }

    /// Rules of a category, in level order
    pub fn get(&self, category: Category) -> Option<&[Rule]> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.rules.as_slice())
    }

    /// Look up a single rule by (category, level)
    pub fn rule(&self, category: Category, level: &str) -> Option<&Rule> {
        self.get(category)?.iter().find(|r| r.level == level)
    }

    /// Insert or replace a rule keyed by (category, level).
    ///
    /// A replaced rule keeps its position in the level order.
    pub fn set_rule(&mut self, category: Category, rule: Rule) -> Result<(), DomainError> {
        if category == Category::Custom {
            return Err(DomainError::InvalidValue(
                "custom rules are keyed by name, use add_custom".to_string(),
            ));
        }

        let idx = match self.categories.iter().position(|c| c.category == category) {
            Some(idx) => idx,
            None => {
                let idx = self
                    .categories
                    .iter()
                    .position(|c| c.category > category)
                    .unwrap_or(self.categories.len());
                self.categories.insert(
                    idx,
                    CategoryRules {
                        category,
                        rules: Vec::new(),
                    },
                );
                idx
            }
        };

        let rules = &mut self.categories[idx].rules;
        match rules.iter_mut().find(|r| r.level == rule.level) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
        Ok(())
    }

    /// Remove a rule by (category, level), dropping the category once empty
    pub fn remove_rule(&mut self, category: Category, level: &str) -> bool {
        let Some(idx) = self.categories.iter().position(|c| c.category == category) else {
            return false;
        };

        let rules = &mut self.categories[idx].rules;
        let before = rules.len();
        rules.retain(|r| r.level != level);
        let removed = rules.len() != before;

        if rules.is_empty() {
            self.categories.remove(idx);
        }
        removed
    }

    /// Total number of rules, custom ones included
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.rules.len()).sum::<usize>() + self.custom.len()
    }

    /// Whether the table holds no rules at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::default_rules()
    }
}

/// Persistent rule store
pub struct RuleStore {
    table: RuleTable,
    storage: Arc<dyn Storage>,
}

impl RuleStore {
    /// Load the stored table, falling back to the defaults
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let table = load_record(storage.as_ref(), StorageKey::Rules).unwrap_or_default();
        Self { table, storage }
    }

    /// Current rule table
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Built-in categories that currently have rules, in evaluation order
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.table.categories.iter().map(|c| c.category)
    }

    /// Rules of a category
    pub fn get(&self, category: Category) -> Option<&[Rule]> {
        self.table.get(category)
    }

    /// Custom rules in insertion order
    pub fn custom(&self) -> &[CustomRule] {
        &self.table.custom
    }

    /// Reset to the built-in table, dropping custom rules
    pub fn set_default(&mut self) {
        self.table = RuleTable::default_rules();
        self.persist();
    }

    /// Insert or replace a built-in category rule
    pub fn set_rule(&mut self, category: Category, rule: Rule) -> Result<(), DomainError> {
        self.table.set_rule(category, rule)?;
        self.persist();
        Ok(())
    }

    /// Remove a built-in category rule
    pub fn remove_rule(&mut self, category: Category, level: &str) -> bool {
        let removed = self.table.remove_rule(category, level);
        if removed {
            self.persist();
        }
        removed
    }

    /// Insert or overwrite a custom rule under `name`.
    ///
    /// The rule is stamped with the current time and enabled.
    pub fn add_custom(
        &mut self,
        name: &str,
        definition: CustomRuleDefinition,
    ) -> Result<&CustomRule, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidRuleName(name.to_string()));
        }

        let rule = CustomRule::new(name, definition);
        let idx = match self.table.custom.iter().position(|r| r.name == name) {
            Some(idx) => {
                self.table.custom[idx] = rule;
                idx
            }
            None => {
                self.table.custom.push(rule);
                self.table.custom.len() - 1
            }
        };

        self.persist();
        Ok(&self.table.custom[idx])
    }

    /// Remove a custom rule; returns false if no rule had that name
    pub fn remove_custom(&mut self, name: &str) -> bool {
        let before = self.table.custom.len();
        self.table.custom.retain(|r| r.name != name);
        let removed = self.table.custom.len() != before;

        if removed {
            self.persist();
        }
        removed
    }

    /// Enable or disable a custom rule; returns false if no rule had that name
    pub fn set_custom_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let Some(rule) = self.table.custom.iter_mut().find(|r| r.name == name) else {
            return false;
        };
        rule.enabled = enabled;
        self.persist();
        true
    }

    fn persist(&self) {
        save_record(self.storage.as_ref(), StorageKey::Rules, &self.table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::{Metric, Threshold};
    use crate::storage::MemoryStorage;

    fn definition() -> CustomRuleDefinition {
        CustomRuleDefinition {
            metric: Metric::Price,
            threshold: Threshold::Value(100.0),
            condition: Condition::GreaterThan,
            severity: Severity::High,
        }
    }

    #[test]
    fn test_default_table_exact() {
        let table = RuleTable::default_rules();
        let expected = [
            (Category::Volatility, "high", 15.0, Condition::GreaterThan),
            (Category::Volatility, "critical", 25.0, Condition::GreaterThan),
            (Category::Performance, "bull", 5.0, Condition::GreaterThan),
            (Category::Performance, "bear", -5.0, Condition::LessThan),
            (Category::Performance, "extreme_bull", 15.0, Condition::GreaterThan),
            (Category::Performance, "extreme_bear", -15.0, Condition::LessThan),
            (Category::Volume, "high", 2.0, Condition::PercentageChange),
            (Category::Volume, "low", 0.5, Condition::PercentageChange),
        ];

        let actual: Vec<_> = table
            .categories
            .iter()
            .flat_map(|c| c.rules.iter().map(move |r| (c.category, r)))
            .collect();
        assert_eq!(actual.len(), expected.len());

        for ((category, rule), (exp_cat, exp_level, exp_threshold, exp_cond)) in
            actual.iter().zip(expected.iter())
        {
            assert_eq!(category, exp_cat);
            assert_eq!(rule.level, *exp_level);
            assert_eq!(rule.threshold, Threshold::Value(*exp_threshold));
            assert_eq!(rule.condition, *exp_cond);
        }
        assert!(table.custom.is_empty());
    }

    #[test]
    fn test_set_rule_replaces_in_place() {
        let mut table = RuleTable::default_rules();
        table
            .set_rule(
                Category::Volatility,
                Rule::new("high", 18.0, Condition::GreaterThan, Severity::High),
            )
            .unwrap();

        let rules = table.get(Category::Volatility).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].level, "high");
        assert_eq!(rules[0].threshold, Threshold::Value(18.0));
    }

    #[test]
    fn test_set_rule_new_category_keeps_order() {
        let mut table = RuleTable::default_rules();
        table
            .set_rule(
                Category::Price,
                Rule::new("floor", 1.0, Condition::LessThan, Severity::Low),
            )
            .unwrap();

        let order: Vec<_> = table.categories.iter().map(|c| c.category).collect();
        assert_eq!(
            order,
            vec![
                Category::Volatility,
                Category::Performance,
                Category::Volume,
                Category::Price
            ]
        );
    }

    #[test]
    fn test_set_rule_rejects_custom_category() {
        let mut table = RuleTable::default_rules();
        let result = table.set_rule(
            Category::Custom,
            Rule::new("x", 1.0, Condition::LessThan, Severity::Low),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_remove_rule_drops_empty_category() {
        let mut table = RuleTable::default_rules();
        assert!(table.remove_rule(Category::Volume, "high"));
        assert!(table.remove_rule(Category::Volume, "low"));
        assert!(table.get(Category::Volume).is_none());
        assert!(!table.remove_rule(Category::Volume, "low"));
    }

    #[test]
    fn test_store_falls_back_to_defaults() {
        let storage = Arc::new(MemoryStorage::new());
        let store = RuleStore::load(storage.clone());
        assert_eq!(store.table(), &RuleTable::default_rules());
        assert_eq!(
            store.categories().collect::<Vec<_>>(),
            vec![Category::Volatility, Category::Performance, Category::Volume]
        );
    }

    #[test]
    fn test_store_corrupt_state_falls_back() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save(StorageKey::Rules, "{\"categories\": 42}").unwrap();

        let store = RuleStore::load(storage);
        assert_eq!(store.table(), &RuleTable::default_rules());
    }

    #[test]
    fn test_add_custom_persists_and_reloads() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = RuleStore::load(storage.clone());

        let rule = store.add_custom("big-ticket", definition()).unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.name, "big-ticket");

        let reloaded = RuleStore::load(storage);
        assert_eq!(reloaded.custom().len(), 1);
        assert_eq!(reloaded.custom()[0].metric, Metric::Price);
    }

    #[test]
    fn test_add_custom_overwrites() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = RuleStore::load(storage);

        store.add_custom("a", definition()).unwrap();
        store.add_custom("b", definition()).unwrap();
        store.set_custom_enabled("a", false);

        let mut replacement = definition();
        replacement.severity = Severity::Low;
        store.add_custom("a", replacement).unwrap();

        assert_eq!(store.custom().len(), 2);
        assert_eq!(store.custom()[0].name, "a");
        assert_eq!(store.custom()[0].severity, Severity::Low);
        assert!(store.custom()[0].enabled);
    }

    #[test]
    fn test_add_custom_rejects_empty_name() {
        let mut store = RuleStore::load(Arc::new(MemoryStorage::new()));
        assert!(matches!(
            store.add_custom("  ", definition()),
            Err(DomainError::InvalidRuleName(_))
        ));
    }

    #[test]
    fn test_remove_custom_missing_is_noop() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = RuleStore::load(storage.clone());
        assert!(!store.remove_custom("nope"));
        // Nothing changed, nothing written
        assert!(storage.get(StorageKey::Rules).is_none());

        store.add_custom("yes", definition()).unwrap();
        assert!(store.remove_custom("yes"));
        assert!(store.custom().is_empty());
    }

    #[test]
    fn test_set_default_drops_custom() {
        let mut store = RuleStore::load(Arc::new(MemoryStorage::new()));
        store.add_custom("a", definition()).unwrap();
        store.set_default();
        assert!(store.custom().is_empty());
        assert_eq!(store.table().len(), 8);
    }
}
