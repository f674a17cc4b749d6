use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter as FmtFormatter, Result as FmtResult};

/// A query plan in the JSON form produced by federation query planners.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "QueryPlan")]
pub struct QueryPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<Box<PlanNode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PlanNode {
    Sequence(SequenceNode),
    Parallel(ParallelNode),
    Flatten(FlattenNode),
    Fetch(FetchNode),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceNode {
    pub nodes: Vec<PlanNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelNode {
    pub nodes: Vec<PlanNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlattenNode {
    pub path: Vec<FlattenNodePathSegment>,
    pub node: Box<PlanNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchNode {
    pub service_name: String,
    /// The operation text sent to the subgraph, verbatim.
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Request variables this fetch needs. Anything else is never sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_usages: Option<Vec<String>>,
    /// Key selection used to build entity representations. Its presence makes
    /// this an entity fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<Vec<Selection>>,
    /// Entities whose `__typename` does not satisfy this type are left out of
    /// the representation batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_condition: Option<String>,
}

impl FetchNode {
    pub fn is_entity_fetch(&self) -> bool {
        self.requires.is_some()
    }
}

/// Flatten paths are serialized as plain strings, `@` standing for "every
/// element of the list at this position".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FlattenNodePathSegment {
    Field(String),
    List,
}

pub const LIST_WILDCARD: &str = "@";

impl From<String> for FlattenNodePathSegment {
    fn from(segment: String) -> Self {
        if segment == LIST_WILDCARD {
            FlattenNodePathSegment::List
        } else {
            FlattenNodePathSegment::Field(segment)
        }
    }
}

impl From<FlattenNodePathSegment> for String {
    fn from(segment: FlattenNodePathSegment) -> Self {
        match segment {
            FlattenNodePathSegment::Field(name) => name,
            FlattenNodePathSegment::List => LIST_WILDCARD.to_string(),
        }
    }
}

impl Display for FlattenNodePathSegment {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        match self {
            FlattenNodePathSegment::Field(name) => write!(f, "{}", name),
            FlattenNodePathSegment::List => write!(f, "{}", LIST_WILDCARD),
        }
    }
}

/// A selection inside `requires`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Selection {
    Field(FieldSelection),
    InlineFragment(InlineFragmentSelection),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selections: Option<Vec<Selection>>,
}

impl FieldSelection {
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineFragmentSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_condition: Option<String>,
    pub selections: Vec<Selection>,
}

fn get_indent(depth: usize) -> String {
    "  ".repeat(depth)
}

trait PrettyDisplay {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult;
}

impl Display for QueryPlan {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}

impl Display for PlanNode {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}

impl PrettyDisplay for QueryPlan {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        writeln!(f, "{indent}QueryPlan {{")?;
        if let Some(node) = &self.node {
            node.pretty_fmt(f, depth + 1)?;
        }
        writeln!(f, "{indent}}},")
    }
}

impl PrettyDisplay for PlanNode {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        match self {
            PlanNode::Fetch(node) => node.pretty_fmt(f, depth),
            PlanNode::Flatten(node) => node.pretty_fmt(f, depth),
            PlanNode::Sequence(SequenceNode { nodes }) | PlanNode::Parallel(ParallelNode { nodes }) => {
                let indent = get_indent(depth);
                let variant = if matches!(self, PlanNode::Parallel(_)) {
                    "Parallel"
                } else {
                    "Sequence"
                };
                writeln!(f, "{indent}{variant} {{")?;
                for node in nodes {
                    node.pretty_fmt(f, depth + 1)?;
                }
                writeln!(f, "{indent}}},")
            }
        }
    }
}

impl PrettyDisplay for FlattenNode {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        writeln!(
            f,
            "{indent}Flatten(path: \"{}\") {{",
            self.path
                .iter()
                .map(|segment| segment.to_string())
                .collect::<Vec<String>>()
                .join(".")
        )?;
        self.node.pretty_fmt(f, depth + 1)?;
        writeln!(f, "{indent}}},")
    }
}

impl PrettyDisplay for FetchNode {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        writeln!(f, "{indent}Fetch(service: \"{}\") {{", self.service_name)?;
        if let Some(requires) = &self.requires {
            writeln!(f, "{indent}  {{")?;
            for selection in requires {
                selection.pretty_fmt(f, depth + 2)?;
            }
            writeln!(f, "{indent}  }} =>")?;
        }
        writeln!(f, "{indent}  {{")?;
        for line in self.operation.lines() {
            writeln!(f, "{indent}    {line}")?;
        }
        writeln!(f, "{indent}  }}")?;
        writeln!(f, "{indent}}},")
    }
}

impl PrettyDisplay for Selection {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        let (head, selections) = match self {
            Selection::Field(field) => {
                let head = match &field.alias {
                    Some(alias) => format!("{alias}: {}", field.name),
                    None => field.name.clone(),
                };
                (head, field.selections.as_deref())
            }
            Selection::InlineFragment(fragment) => {
                let head = match &fragment.type_condition {
                    Some(type_condition) => format!("... on {type_condition}"),
                    None => "...".to_string(),
                };
                (head, Some(fragment.selections.as_slice()))
            }
        };
        match selections {
            Some(selections) if !selections.is_empty() => {
                writeln!(f, "{indent}{head} {{")?;
                for selection in selections {
                    selection.pretty_fmt(f, depth + 1)?;
                }
                writeln!(f, "{indent}}}")
            }
            _ => writeln!(f, "{indent}{head}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity_plan() -> serde_json::Value {
        json!({
            "kind": "QueryPlan",
            "node": {
                "kind": "Sequence",
                "nodes": [
                    {
                        "kind": "Fetch",
                        "serviceName": "reviews",
                        "operation": "{topReviews{author{__typename id}}}"
                    },
                    {
                        "kind": "Flatten",
                        "path": ["topReviews", "@", "author"],
                        "node": {
                            "kind": "Fetch",
                            "serviceName": "accounts",
                            "operation": "query($representations:[_Any!]!){_entities(representations:$representations){...on User{name}}}",
                            "variableUsages": ["locale"],
                            "requires": [
                                {
                                    "kind": "InlineFragment",
                                    "typeCondition": "User",
                                    "selections": [
                                        { "kind": "Field", "name": "__typename" },
                                        { "kind": "Field", "name": "id" }
                                    ]
                                }
                            ]
                        }
                    }
                ]
            }
        })
    }

    #[test]
    fn deserializes_apollo_style_plan() {
        let plan: QueryPlan = serde_json::from_value(entity_plan()).unwrap();
        let Some(node) = plan.node else {
            panic!("expected a root node");
        };
        let PlanNode::Sequence(sequence) = *node else {
            panic!("expected a sequence");
        };
        assert_eq!(sequence.nodes.len(), 2);
        let PlanNode::Flatten(flatten) = &sequence.nodes[1] else {
            panic!("expected a flatten node");
        };
        assert_eq!(
            flatten.path,
            vec![
                FlattenNodePathSegment::Field("topReviews".into()),
                FlattenNodePathSegment::List,
                FlattenNodePathSegment::Field("author".into()),
            ]
        );
        let PlanNode::Fetch(fetch) = flatten.node.as_ref() else {
            panic!("expected a fetch node");
        };
        assert!(fetch.is_entity_fetch());
        assert_eq!(fetch.variable_usages, Some(vec!["locale".to_string()]));
    }

    #[test]
    fn serializes_back_to_the_same_shape() {
        let plan: QueryPlan = serde_json::from_value(entity_plan()).unwrap();
        assert_eq!(serde_json::to_value(&plan).unwrap(), entity_plan());
    }

    #[test]
    fn empty_plan() {
        let plan: QueryPlan = serde_json::from_value(json!({ "kind": "QueryPlan" })).unwrap();
        assert!(plan.node.is_none());
        assert_eq!(plan.to_string(), "QueryPlan {\n},\n");
    }

    #[test]
    fn pretty_prints_plan() {
        let plan: QueryPlan = serde_json::from_value(entity_plan()).unwrap();
        insta::assert_snapshot!(plan.to_string(), @r#"
        QueryPlan {
          Sequence {
            Fetch(service: "reviews") {
              {
                {topReviews{author{__typename id}}}
              }
            },
            Flatten(path: "topReviews.@.author") {
              Fetch(service: "accounts") {
                {
                  ... on User {
                    __typename
                    id
                  }
                } =>
                {
                  query($representations:[_Any!]!){_entities(representations:$representations){...on User{name}}}
                }
              },
            },
          },
        },
        "#);
    }
}
