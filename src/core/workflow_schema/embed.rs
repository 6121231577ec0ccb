use super::normalize::{NormalizedComponent, StepComponents};
use std::collections::HashSet;

/// One resolved "option reveals component" link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Embedding {
    parent: usize,
    option: usize,
    child: usize,
}

/// Fold conditionally revealed components under the option that reveals them.
///
/// Only radio and checkbox parents are scanned. Embedding is single depth:
/// a component already nested under one parent does not act as a parent, and
/// a parent that already holds children is never nested itself. The first
/// marker to claim a child wins; later markers stay in place unresolved.
pub fn embed_conditional_children(step: StepComponents) -> Vec<NormalizedComponent> {
    let StepComponents {
        components,
        authoring_index,
        ..
    } = step;

    let mut consumed: HashSet<usize> = HashSet::new();
    let mut parents: HashSet<usize> = HashSet::new();
    let mut plan: Vec<Embedding> = Vec::new();

    for (parent, component) in components.iter().enumerate() {
        let Some(field) = component.as_field() else {
            continue;
        };
        if !field.kind.reveals_children() || consumed.contains(&parent) {
            continue;
        }
        for (option, choice) in field.options.iter().flatten().enumerate() {
            let Some(marker) = choice.conditional_child_id.as_deref() else {
                continue;
            };
            let Some(&child) = authoring_index.get(marker.trim()) else {
                tracing::warn!(parent = %field.id, marker, "conditional child not found in step");
                continue;
            };
            if child == parent || consumed.contains(&child) || parents.contains(&child) {
                tracing::debug!(parent = %field.id, marker, "conditional child marker ignored");
                continue;
            }
            consumed.insert(child);
            parents.insert(parent);
            plan.push(Embedding {
                parent,
                option,
                child,
            });
        }
    }

    if plan.is_empty() {
        return components;
    }

    let mut slots: Vec<Option<NormalizedComponent>> = components.into_iter().map(Some).collect();
    for embedding in &plan {
        let Some(child) = slots[embedding.child].take() else {
            continue;
        };
        let option = slots[embedding.parent]
            .as_mut()
            .and_then(NormalizedComponent::as_field_mut)
            .and_then(|field| field.options.as_mut())
            .and_then(|options| options.get_mut(embedding.option));
        if let Some(option) = option {
            option.children.get_or_insert_with(Vec::new).push(child);
            option.conditional_child_id = None;
        }
    }

    slots.into_iter().flatten().collect()
}
