//! Query descriptors for the remote service
//!
//! Combines parsed filter clauses, the entity type restriction, sorting, and
//! pagination into one [`QueryDescriptor`], and renders it as the request
//! parameters understood by the Targetprocess REST API.

use std::collections::BTreeSet;

use crate::core::config::EffectiveOptions;
use crate::core::entity::EntityTypes;
use crate::core::filter::{FilterClause, FilterParser, Operator, ParsedFilter};
use crate::core::template::FieldTemplate;

/// Short field names accepted in filters, mapped to attribute paths
///
/// Columns: alias, path for text values, path for numeric values.
const FIELD_ALIASES: &[(&str, &str, Option<&str>)] = &[
    ("assigned", "assigneduser.login", None),
    ("created", "createdate", None),
    ("email", "owner.email", None),
    ("iteration", "iteration.name", Some("iteration.id")),
    ("lastcommented", "lastcommentdate", None),
    ("login", "owner.login", None),
    ("modified", "modifydate", None),
    ("owner", "owner.login", None),
    ("priority", "priority.name", Some("priority.id")),
    ("process", "project.process.name", Some("project.process.id")),
    ("project", "project.name", Some("project.id")),
    ("release", "release.name", Some("release.id")),
    ("state", "entitystate.name", Some("entitystate.id")),
    ("tag", "tagobjects.name", None),
];

/// Everything the remote service needs to answer one list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    /// Entity types to search; never empty unless nothing is configured
    pub entity_types: BTreeSet<String>,
    pub filters: Vec<FilterClause>,
    pub sort_field: String,
    pub sort_descending: bool,
    pub limit: u32,
    pub offset: u32,
    /// Attribute paths the display templates need, in first-seen order
    pub include: Vec<String>,
}

/// Builds query descriptors from effective options
pub struct QueryBuilder<'a> {
    options: &'a EffectiveOptions,
    types: EntityTypes,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(options: &'a EffectiveOptions) -> Self {
        Self {
            options,
            types: EntityTypes::new(options.known_types()),
        }
    }

    /// Build the descriptor for one `ls` invocation
    ///
    /// An empty `entity_types` falls back to the configured `entities` list,
    /// and an empty `filters` falls back to the template's `filter` option.
    pub fn build(&self, parsed: &ParsedFilter) -> QueryDescriptor {
        let mut entity_types = parsed.entity_types.clone();
        let mut filters = parsed.filters.clone();

        if filters.is_empty() && !self.options.filter.is_empty() {
            let template_filter = FilterParser::new(&self.types).parse(&self.options.filter);
            tracing::debug!(filter = ?self.options.filter, "using template filter");
            filters = template_filter.filters;
            if entity_types.is_empty() {
                entity_types = template_filter.entity_types;
            }
        }

        if entity_types.is_empty() {
            entity_types = self.options.entities.iter().cloned().collect();
        }

        QueryDescriptor {
            entity_types,
            filters,
            sort_field: self.options.sort.clone(),
            sort_descending: self.options.reverse,
            limit: self.options.number,
            offset: self.options.offset,
            include: include_paths(&FieldTemplate::compile_all(&self.options.fields)),
        }
    }
}

/// Distinct attribute paths referenced by `templates`, in first-seen order
pub fn include_paths(templates: &[FieldTemplate]) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for path in templates.iter().flat_map(FieldTemplate::paths) {
        if !path.split('.').any(str::is_empty) && !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

impl QueryDescriptor {
    /// The `where` expression, or `None` when nothing restricts the query
    pub fn where_clause(&self) -> Option<String> {
        let mut parts = Vec::new();

        if !self.entity_types.is_empty() {
            let names: Vec<String> = self
                .entity_types
                .iter()
                .map(|name| quote(name))
                .collect();
            parts.push(format!("(EntityType.Name in ({}))", names.join(",")));
        }

        parts.extend(self.filters.iter().map(clause_expression));

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" and "))
        }
    }

    /// The `include` expression, e.g. `[Id,Owner[FirstName,LastName]]`
    pub fn include_clause(&self) -> Option<String> {
        include_expression(&self.include)
    }

    /// Request parameters in a stable order
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(clause) = self.where_clause() {
            params.push(("where".to_string(), clause));
        }
        if let Some(include) = self.include_clause() {
            params.push(("include".to_string(), include));
        }
        if !self.sort_field.is_empty() {
            let key = if self.sort_descending {
                "orderByDesc"
            } else {
                "orderBy"
            };
            params.push((key.to_string(), self.sort_field.clone()));
        }
        params.push(("take".to_string(), self.limit.to_string()));
        params.push(("skip".to_string(), self.offset.to_string()));

        params
    }
}

/// Render dotted attribute paths as a nested include expression
pub fn include_expression<S: AsRef<str>>(paths: &[S]) -> Option<String> {
    if paths.is_empty() {
        return None;
    }
    let mut root = AttributeTree::default();
    for path in paths {
        root.insert(path.as_ref().split('.'));
    }
    Some(root.render())
}

/// Render one clause as `(attribute op value)`
fn clause_expression(clause: &FilterClause) -> String {
    let numeric = !clause.value.is_empty() && clause.value.bytes().all(|b| b.is_ascii_digit());
    let attribute = resolve_alias(&clause.field, numeric);

    if clause.value.eq_ignore_ascii_case("null") {
        match clause.operator {
            Operator::Equality => return format!("({} is null)", attribute),
            Operator::NotEqual => return format!("({} is not null)", attribute),
            _ => {}
        }
    }

    format!(
        "({} {} {})",
        attribute,
        clause.operator.keyword(),
        quote(&clause.value)
    )
}

/// Map a filter field alias to its attribute path
pub fn resolve_alias(field: &str, numeric: bool) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _, _)| *alias == field)
        .map(|(_, text, id)| match (numeric, id) {
            (true, Some(id)) => *id,
            _ => *text,
        })
        .unwrap_or(field)
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Nested attribute names, children kept in insertion order
#[derive(Debug, Default)]
struct AttributeTree {
    children: Vec<(String, AttributeTree)>,
}

impl AttributeTree {
    fn insert<'p>(&mut self, mut path: impl Iterator<Item = &'p str>) {
        let Some(name) = path.next() else {
            return;
        };
        let index = match self.children.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.children.push((name.to_string(), AttributeTree::default()));
                self.children.len() - 1
            }
        };
        self.children[index].1.insert(path);
    }

    fn render(&self) -> String {
        let items: Vec<String> = self
            .children
            .iter()
            .map(|(name, child)| {
                if child.children.is_empty() {
                    name.clone()
                } else {
                    format!("{}{}", name, child.render())
                }
            })
            .collect();
        format!("[{}]", items.join(","))
    }
}
