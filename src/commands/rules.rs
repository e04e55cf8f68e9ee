//! Rules command implementation
//!
//! Lists and edits the built-in and custom rule tables.

use crate::alerts::{AlertEngine, CustomRuleDefinition, Rule};
use crate::cli::args::{OutputFormat, RulesCommands};
use crate::cli::output::print_output;
use crate::error::{AppError, Result};

/// Execute rule subcommands
pub fn run_rules(command: &RulesCommands, engine: &mut AlertEngine, format: OutputFormat) -> Result<()> {
    match command {
        RulesCommands::List => {
            print_output(engine.rules().table(), format)?;
        }
        RulesCommands::Reset => {
            engine.reset_rules();
            println!("Rules reset to defaults");
        }
        RulesCommands::Set {
            category,
            level,
            condition,
            threshold,
            severity,
        } => {
            let rule = Rule::new(level.as_str(), threshold.clone(), condition.clone(), *severity);
            engine.rules_mut().set_rule(*category, rule)?;
            println!("Rule {}.{} set", category, level);
        }
        RulesCommands::Add {
            name,
            metric,
            condition,
            threshold,
            severity,
        } => {
            let definition = CustomRuleDefinition {
                metric: *metric,
                threshold: threshold.clone(),
                condition: condition.clone(),
                severity: *severity,
            };
            let rule = engine.add_custom_alert(name, definition)?;
            println!(
                "Custom rule '{}' added: {} {} {}",
                rule.name, rule.metric, rule.condition, rule.threshold
            );
        }
        RulesCommands::Remove { name } => {
            if !engine.remove_custom_alert(name) {
                return Err(AppError::RuleNotFound(name.clone()));
            }
            println!("Custom rule '{}' removed", name);
        }
        RulesCommands::Enable { name } => set_enabled(engine, name, true)?,
        RulesCommands::Disable { name } => set_enabled(engine, name, false)?,
    }

    Ok(())
}

fn set_enabled(engine: &mut AlertEngine, name: &str, enabled: bool) -> Result<()> {
    if !engine.rules_mut().set_custom_enabled(name, enabled) {
        return Err(AppError::RuleNotFound(name.to_string()));
    }

    let state = if enabled { "enabled" } else { "disabled" };
    println!("Custom rule '{}' {}", name, state);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{Category, Condition, Metric, Severity, Threshold};
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn engine() -> AlertEngine {
        AlertEngine::new(Arc::new(MemoryStorage::new()))
    }

    fn add(name: &str) -> RulesCommands {
        RulesCommands::Add {
            name: name.to_string(),
            metric: Metric::Price,
            condition: Condition::GreaterThan,
            threshold: Threshold::Value(100.0),
            severity: Severity::High,
        }
    }

    #[test]
    fn test_rules_add_and_disable() {
        let mut engine = engine();
        run_rules(&add("breakout"), &mut engine, OutputFormat::Table).unwrap();
        assert_eq!(engine.rules().custom().len(), 1);

        let disable = RulesCommands::Disable {
            name: "breakout".to_string(),
        };
        run_rules(&disable, &mut engine, OutputFormat::Table).unwrap();
        assert!(!engine.rules().custom()[0].enabled);
    }

    #[test]
    fn test_rules_missing_custom_rule() {
        let mut engine = engine();
        let remove = RulesCommands::Remove {
            name: "ghost".to_string(),
        };

        let err = run_rules(&remove, &mut engine, OutputFormat::Table).unwrap_err();
        assert!(matches!(err, AppError::RuleNotFound(name) if name == "ghost"));
    }

    #[test]
    fn test_rules_set_then_reset() {
        let mut engine = engine();
        let set = RulesCommands::Set {
            category: Category::Price,
            level: "above_200".to_string(),
            condition: Condition::GreaterThan,
            threshold: Threshold::Value(200.0),
            severity: Severity::Low,
        };
        run_rules(&set, &mut engine, OutputFormat::Table).unwrap();
        run_rules(&add("breakout"), &mut engine, OutputFormat::Table).unwrap();
        assert!(engine.rules().table().rule(Category::Price, "above_200").is_some());

        run_rules(&RulesCommands::Reset, &mut engine, OutputFormat::Table).unwrap();
        assert!(engine.rules().get(Category::Price).is_none());
        assert!(engine.rules().custom().is_empty());
    }

    #[test]
    fn test_rules_set_custom_category_rejected() {
        let mut engine = engine();
        let set = RulesCommands::Set {
            category: Category::Custom,
            level: "x".to_string(),
            condition: Condition::GreaterThan,
            threshold: Threshold::Value(1.0),
            severity: Severity::Low,
        };
        assert!(run_rules(&set, &mut engine, OutputFormat::Table).is_err());
    }
}
