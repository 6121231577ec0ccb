use super::slug::IdentifierSet;
use super::store::MemberStep;
use intake_types::{RouteMode, RouteOptionRow, RouteRow, RowId};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};

/// Resolved outgoing routing of one member step, restricted to member targets.
#[derive(Debug, Clone, PartialEq)]
pub enum StepRoute {
    Linear {
        next: Option<RowId>,
    },
    ByOption {
        field_key: String,
        /// `(option value, target)` in declaration order.
        options: Vec<(String, RowId)>,
        default_next: Option<RowId>,
    },
}

impl StepRoute {
    /// Field key a `by_option` route branches on, when set.
    pub fn field_key(&self) -> Option<&str> {
        match self {
            StepRoute::ByOption { field_key, .. } if !field_key.is_empty() => Some(field_key.as_str()),
            _ => None,
        }
    }

    fn targets(&self) -> Vec<RowId> {
        match self {
            StepRoute::Linear { next } => next.iter().copied().collect(),
            StepRoute::ByOption {
                options,
                default_next,
                ..
            } => options
                .iter()
                .map(|(_, target)| *target)
                .chain(default_next.iter().copied())
                .collect(),
        }
    }
}

/// Route edge discarded because its target is not a member of the workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedEdge {
    pub source_step_id: RowId,
    pub target_step_id: RowId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_value: Option<String>,
}

/// JSONLogic branch emitted on a `by_option` step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchRule {
    pub condition: Value,
    #[serde(rename = "nextStepId")]
    pub next_step_id: String,
}

/// Routing fields of a published step. At most one of the two shapes is populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRouting {
    pub next_step_id: Option<String>,
    pub branching: Option<Vec<BranchRule>>,
    pub default_next_step_id: Option<String>,
}

/// Visitation order and per-step routing for one workflow.
#[derive(Debug, Clone, Default)]
pub struct RoutingPlan {
    order: Vec<RowId>,
    reachable: usize,
    routes: HashMap<RowId, StepRoute>,
    slugs: HashMap<RowId, String>,
    dropped_edges: Vec<DroppedEdge>,
}

impl RoutingPlan {
    /// Member steps in BFS order followed by unreached members in membership order.
    pub fn order(&self) -> &[RowId] {
        &self.order
    }

    pub fn reachable(&self) -> &[RowId] {
        &self.order[..self.reachable]
    }

    pub fn unreachable(&self) -> &[RowId] {
        &self.order[self.reachable..]
    }

    pub fn route(&self, step_id: RowId) -> Option<&StepRoute> {
        self.routes.get(&step_id)
    }

    pub fn slug(&self, step_id: RowId) -> Option<&str> {
        self.slugs.get(&step_id).map(String::as_str)
    }

    pub fn dropped_edges(&self) -> &[DroppedEdge] {
        &self.dropped_edges
    }

    /// Output routing fields for `step_id`.
    ///
    /// `branch_var` is the storage key of the component the route keys on;
    /// the raw field key is used when no component claimed it.
    pub fn resolve(&self, step_id: RowId, branch_var: Option<&str>) -> ResolvedRouting {
        let slug_of = |id: &RowId| self.slugs.get(id).cloned();
        match self.routes.get(&step_id) {
            None => ResolvedRouting::default(),
            Some(StepRoute::Linear { next }) => ResolvedRouting {
                next_step_id: next.as_ref().and_then(slug_of),
                ..Default::default()
            },
            Some(StepRoute::ByOption {
                field_key,
                options,
                default_next,
            }) => {
                let var = branch_var.unwrap_or(field_key.as_str());
                let rules: Vec<BranchRule> = options
                    .iter()
                    .filter_map(|(value, target)| {
                        slug_of(target).map(|next_step_id| BranchRule {
                            condition: json!({ "==": [{ "var": var }, value] }),
                            next_step_id,
                        })
                    })
                    .collect();
                ResolvedRouting {
                    next_step_id: None,
                    branching: if rules.is_empty() { None } else { Some(rules) },
                    default_next_step_id: default_next.as_ref().and_then(slug_of),
                }
            }
        }
    }
}

/// Build the routing plan for a workflow.
///
/// Edges to non-member steps are dropped and recorded. Traversal starts at
/// the first member flagged as start, else the first member.
pub fn resolve_routing(
    members: &[MemberStep],
    routes: &[RouteRow],
    options: &[RouteOptionRow],
) -> RoutingPlan {
    let member_ids: HashSet<RowId> = members.iter().map(|member| member.step_id).collect();
    let mut plan = RoutingPlan::default();

    let mut by_source: HashMap<RowId, &RouteRow> = HashMap::new();
    for route in routes {
        if !member_ids.contains(&route.source_step_id) {
            tracing::warn!(
                source_step_id = route.source_step_id,
                "route from non-member step ignored"
            );
            continue;
        }
        if by_source.insert(route.source_step_id, route).is_some() {
            tracing::warn!(
                source_step_id = route.source_step_id,
                "duplicate route row; keeping the last one"
            );
        }
    }

    let mut option_rows: HashMap<RowId, Vec<&RouteOptionRow>> = HashMap::new();
    for option in options {
        if !by_source.contains_key(&option.source_step_id) {
            tracing::warn!(
                source_step_id = option.source_step_id,
                option_value = %option.option_value,
                "route option without a route ignored"
            );
            continue;
        }
        option_rows
            .entry(option.source_step_id)
            .or_default()
            .push(option);
    }

    for member in members {
        let Some(route) = by_source.get(&member.step_id) else {
            continue;
        };
        let mut keep = |target: RowId, option_value: Option<&str>| {
            if member_ids.contains(&target) {
                true
            } else {
                tracing::warn!(
                    source_step_id = member.step_id,
                    target_step_id = target,
                    "route edge to non-member step dropped"
                );
                plan.dropped_edges.push(DroppedEdge {
                    source_step_id: member.step_id,
                    target_step_id: target,
                    option_value: option_value.map(str::to_string),
                });
                false
            }
        };
        let resolved = match route.mode {
            RouteMode::Linear => StepRoute::Linear {
                next: route.default_next_step_id.filter(|target| keep(*target, None)),
            },
            RouteMode::ByOption => {
                let mut kept = Vec::new();
                for option in option_rows.get(&member.step_id).into_iter().flatten() {
                    if keep(option.next_step_id, Some(option.option_value.as_str())) {
                        kept.push((option.option_value.clone(), option.next_step_id));
                    }
                }
                StepRoute::ByOption {
                    field_key: route
                        .field_key
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or_default()
                        .to_string(),
                    options: kept,
                    default_next: route.default_next_step_id.filter(|target| keep(*target, None)),
                }
            }
        };
        plan.routes.insert(member.step_id, resolved);
    }

    let start = members
        .iter()
        .find(|member| member.is_start)
        .or_else(|| members.first());
    let mut visited = HashSet::new();
    if let Some(start) = start {
        let mut queue = VecDeque::new();
        visited.insert(start.step_id);
        queue.push_back(start.step_id);
        while let Some(current) = queue.pop_front() {
            plan.order.push(current);
            if let Some(route) = plan.routes.get(&current) {
                for target in route.targets() {
                    if visited.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }
    }
    plan.reachable = plan.order.len();
    for member in members {
        if !visited.contains(&member.step_id) {
            plan.order.push(member.step_id);
        }
    }

    let mut step_ids = IdentifierSet::new();
    for member in members {
        let slug = step_ids.claim_slug(&member.name, "step");
        plan.slugs.insert(member.step_id, slug);
    }

    plan
}
