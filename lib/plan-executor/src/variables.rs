use serde_json::{Map, Value};

/// Picks the variables a fetch declared it uses out of the request variables.
///
/// Usages with no value in the request are left out rather than sent as
/// `null`.
pub fn variables_for_usages(
    variable_usages: Option<&[String]>,
    variables: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    match (variable_usages, variables) {
        (Some(variable_usages), Some(variables)) => variable_usages
            .iter()
            .filter_map(|variable_name| {
                variables
                    .get(variable_name)
                    .map(|value| (variable_name.to_string(), value.clone()))
            })
            .collect(),
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::variables_for_usages;
    use serde_json::{json, Map, Value};

    fn request_variables() -> Map<String, Value> {
        json!({ "first": 5, "locale": "en", "secret": "do-not-send" })
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn only_used_variables_are_sent() {
        let usages = vec!["first".to_string(), "locale".to_string()];
        let variables = request_variables();
        let scoped = variables_for_usages(Some(&usages), Some(&variables));
        assert_eq!(Value::Object(scoped), json!({ "first": 5, "locale": "en" }));
    }

    #[test]
    fn absent_variables_are_omitted() {
        let usages = vec!["first".to_string(), "after".to_string()];
        let variables = request_variables();
        let scoped = variables_for_usages(Some(&usages), Some(&variables));
        assert_eq!(Value::Object(scoped), json!({ "first": 5 }));
    }

    #[test]
    fn no_usages_means_no_variables() {
        let variables = request_variables();
        assert!(variables_for_usages(None, Some(&variables)).is_empty());
        let usages = vec!["first".to_string()];
        assert!(variables_for_usages(Some(&usages), None).is_empty());
    }
}
