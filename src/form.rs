//! State and payload logic for the dynamic configuration form. The field
//! set is not known statically: it follows the schema the server reports
//! for the selected algorithm and pluggable functions.

use std::collections::BTreeMap;

use crate::api::catalog::FunctionKind;
use crate::api::types::ParamValue;

/// A selected pluggable function and the kwarg values entered for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionChoice {
    pub name: String,
    pub kwargs: BTreeMap<String, String>,
}

/// One configuration being edited. All values are kept as raw strings
/// until submission; `build_payload` does the normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDraft {
    pub name: String,
    pub algorithm: String,
    pub params: BTreeMap<String, String>,
    pub functions: BTreeMap<FunctionKind, FunctionChoice>,
}

impl ConfigDraft {
    /// Select an algorithm. Parameter sets are generally incompatible
    /// across algorithms, so every previously entered value is dropped.
    pub fn set_algorithm(&mut self, algorithm: &str) {
        self.algorithm = algorithm.to_string();
        self.params.clear();
        self.functions.clear();
    }

    pub fn set_param(&mut self, name: &str, value: &str) {
        self.params.insert(name.to_string(), value.to_string());
    }

    pub fn param(&self, name: &str) -> String {
        self.params.get(name).cloned().unwrap_or_default()
    }

    /// Select a function for one slot. Switching functions resets only
    /// that slot's kwargs; everything else is kept.
    pub fn set_function(&mut self, kind: FunctionKind, name: &str) {
        if name.is_empty() {
            self.functions.remove(&kind);
            return;
        }
        let slot = self.functions.entry(kind).or_default();
        if slot.name != name {
            slot.kwargs.clear();
        }
        slot.name = name.to_string();
    }

    pub fn function_name(&self, kind: FunctionKind) -> String {
        self.functions
            .get(&kind)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    pub fn set_kwarg(&mut self, kind: FunctionKind, key: &str, value: &str) {
        if let Some(slot) = self.functions.get_mut(&kind) {
            slot.kwargs.insert(key.to_string(), value.to_string());
        }
    }

    pub fn kwarg(&self, kind: FunctionKind, key: &str) -> String {
        self.functions
            .get(&kind)
            .and_then(|c| c.kwargs.get(key))
            .cloned()
            .unwrap_or_default()
    }
}

/// Split an algorithm's parameter list into scalar parameters and
/// pluggable-function selector slots, preserving the server's order.
pub fn split_params(param_names: &[String]) -> (Vec<String>, Vec<FunctionKind>) {
    let mut scalars = Vec::new();
    let mut selectors = Vec::new();
    for name in param_names {
        match FunctionKind::from_param(name) {
            Some(kind) => selectors.push(kind),
            None => scalars.push(name.clone()),
        }
    }
    (scalars, selectors)
}

/// Normalize one entered value. Numeric-looking input becomes a number,
/// with a comma accepted as the decimal separator; anything else is kept
/// as a string verbatim. Non-finite parses ("inf", "NaN") stay text:
/// they have no JSON number representation.
pub fn normalize_scalar(raw: &str) -> ParamValue {
    let candidate = raw.trim().replacen(',', ".", 1);
    if let Ok(n) = candidate.parse::<f64>() {
        if n.is_finite() {
            return ParamValue::Number(n);
        }
    }
    ParamValue::Text(raw.to_string())
}

/// Build the outgoing configuration mapping for one draft. Blank values
/// are omitted; deeper validation (ranges, required parameters) is the
/// server's job.
pub fn build_payload(draft: &ConfigDraft) -> BTreeMap<String, ParamValue> {
    let mut payload = BTreeMap::new();
    if !draft.algorithm.is_empty() {
        payload.insert(
            "algorithm".to_string(),
            ParamValue::Text(draft.algorithm.clone()),
        );
    }

    for (name, value) in &draft.params {
        if value.trim().is_empty() {
            continue;
        }
        payload.insert(name.clone(), normalize_scalar(value));
    }

    for (kind, choice) in &draft.functions {
        if choice.name.is_empty() {
            continue;
        }
        payload.insert(
            kind.selector_param().to_string(),
            ParamValue::Text(choice.name.clone()),
        );

        let kwargs: BTreeMap<String, ParamValue> = choice
            .kwargs
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.clone(), normalize_scalar(v)))
            .collect();
        if !kwargs.is_empty() {
            payload.insert(
                format!("{}_kwargs", kind.selector_param()),
                ParamValue::Kwargs(kwargs),
            );
        }
    }

    payload
}

/// Pre-submission check: the experiment name and every configuration name
/// must be non-empty after trimming. A violation blocks submission before
/// any network call.
pub fn validate_experiment(name: &str, drafts: &[ConfigDraft]) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Experiment name must not be empty.".to_string());
    }
    if drafts.iter().any(|d| d.name.trim().is_empty()) {
        return Err("Every configuration needs a non-empty name.".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_values() -> ConfigDraft {
        let mut draft = ConfigDraft::default();
        draft.name = "baseline".to_string();
        draft.set_algorithm("classic_ga");
        draft.set_param("population_size", "200");
        draft.set_param("mutation_rate", "0,05");
        draft.set_function(FunctionKind::Fitness, "rastrigin");
        draft.set_kwarg(FunctionKind::Fitness, "dimensions", "10");
        draft.set_function(FunctionKind::Selection, "tournament");
        draft.set_kwarg(FunctionKind::Selection, "size", "4");
        draft
    }

    #[test]
    fn algorithm_switch_clears_all_values() {
        let mut draft = draft_with_values();
        draft.set_algorithm("island_ga");

        assert_eq!(draft.algorithm, "island_ga");
        assert!(draft.params.is_empty());
        assert!(draft.functions.is_empty());
        // The configuration name is not a parameter and survives.
        assert_eq!(draft.name, "baseline");
    }

    #[test]
    fn function_switch_clears_only_that_slot() {
        let mut draft = draft_with_values();
        draft.set_function(FunctionKind::Fitness, "sphere");

        assert_eq!(draft.function_name(FunctionKind::Fitness), "sphere");
        assert_eq!(draft.kwarg(FunctionKind::Fitness, "dimensions"), "");
        // Other slots and scalar params are untouched.
        assert_eq!(draft.kwarg(FunctionKind::Selection, "size"), "4");
        assert_eq!(draft.param("population_size"), "200");
    }

    #[test]
    fn reselecting_same_function_keeps_kwargs() {
        let mut draft = draft_with_values();
        draft.set_function(FunctionKind::Fitness, "rastrigin");
        assert_eq!(draft.kwarg(FunctionKind::Fitness, "dimensions"), "10");
    }

    #[test]
    fn deselecting_function_removes_slot() {
        let mut draft = draft_with_values();
        draft.set_function(FunctionKind::Fitness, "");
        assert_eq!(draft.function_name(FunctionKind::Fitness), "");
        assert!(build_payload(&draft).get("fitness_function").is_none());
    }

    #[test]
    fn split_params_separates_selectors() {
        let names: Vec<String> = [
            "population_size",
            "mutation_rate",
            "fitness_function",
            "selection_function",
            "max_generations",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let (scalars, selectors) = split_params(&names);
        assert_eq!(scalars, vec!["population_size", "mutation_rate", "max_generations"]);
        assert_eq!(selectors, vec![FunctionKind::Fitness, FunctionKind::Selection]);
    }

    #[test]
    fn normalize_accepts_comma_decimal_separator() {
        assert_eq!(normalize_scalar("0,05"), ParamValue::Number(0.05));
        assert_eq!(normalize_scalar("0.05"), ParamValue::Number(0.05));
        assert_eq!(normalize_scalar(" 42 "), ParamValue::Number(42.0));
        assert_eq!(normalize_scalar("-1,5"), ParamValue::Number(-1.5));
    }

    #[test]
    fn normalize_keeps_non_numeric_input_verbatim() {
        assert_eq!(
            normalize_scalar("rastrigin"),
            ParamValue::Text("rastrigin".to_string())
        );
        assert_eq!(
            normalize_scalar("1,2,3"),
            ParamValue::Text("1,2,3".to_string())
        );
        assert_eq!(normalize_scalar(""), ParamValue::Text(String::new()));
    }

    #[test]
    fn normalize_keeps_non_finite_numbers_as_text() {
        assert_eq!(normalize_scalar("inf"), ParamValue::Text("inf".to_string()));
        assert_eq!(
            normalize_scalar("-infinity"),
            ParamValue::Text("-infinity".to_string())
        );
        assert_eq!(normalize_scalar("NaN"), ParamValue::Text("NaN".to_string()));
    }

    #[test]
    fn payload_contains_normalized_values_and_kwargs() {
        let payload = build_payload(&draft_with_values());

        assert_eq!(
            payload.get("algorithm"),
            Some(&ParamValue::Text("classic_ga".to_string()))
        );
        assert_eq!(
            payload.get("mutation_rate"),
            Some(&ParamValue::Number(0.05))
        );
        assert_eq!(
            payload.get("fitness_function"),
            Some(&ParamValue::Text("rastrigin".to_string()))
        );
        match payload.get("fitness_function_kwargs") {
            Some(ParamValue::Kwargs(kwargs)) => {
                assert_eq!(kwargs.get("dimensions"), Some(&ParamValue::Number(10.0)));
            }
            other => panic!("expected kwargs, got {:?}", other),
        }
    }

    #[test]
    fn payload_omits_blank_values() {
        let mut draft = draft_with_values();
        draft.set_param("chrom_length", "   ");
        draft.set_kwarg(FunctionKind::Selection, "size", "");

        let payload = build_payload(&draft);
        assert!(payload.get("chrom_length").is_none());
        // A selection is still present, but its kwargs mapping collapsed.
        assert!(payload.get("selection_function").is_some());
        assert!(payload.get("selection_function_kwargs").is_none());
    }

    #[test]
    fn validation_blocks_empty_names() {
        let good = draft_with_values();
        assert!(validate_experiment("run 1", &[good.clone()]).is_ok());
        assert!(validate_experiment("   ", &[good.clone()]).is_err());

        let mut unnamed = good;
        unnamed.name = "  ".to_string();
        assert!(validate_experiment("run 1", &[unnamed]).is_err());
    }
}
