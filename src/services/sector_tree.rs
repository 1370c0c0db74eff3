// src/services/sector_tree.rs

//! Utilitários puros sobre a floresta de setores devolvida por `GET /sectors/tree`.
//!
//! Nada aqui faz I/O nem altera a entrada: os percursos são preguiçosos,
//! finitos e podem ser refeitos quantas vezes for preciso, sempre na ordem
//! em que a API entregou os nós.

use std::collections::HashSet;

use crate::{
    common::error::AppError,
    models::sector::{Sector, SectorOption},
};

/// Marcador de recuo repetido uma vez por nível de ancestralidade.
pub const INDENT_MARKER: &str = "——";

// ---
// Percurso em pré-ordem
// ---

/// Percurso em profundidade (pré-ordem) que devolve `(profundidade, nó)`.
#[derive(Debug, Clone)]
pub struct Preorder<'a> {
    stack: Vec<(std::slice::Iter<'a, Sector>, usize)>,
}

impl<'a> Preorder<'a> {
    pub fn new(forest: &'a [Sector]) -> Self {
        Self { stack: vec![(forest.iter(), 0)] }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (usize, &'a Sector);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (siblings, depth) = self.stack.last_mut()?;
            let depth = *depth;

            match siblings.next() {
                Some(node) => {
                    if node.has_children() {
                        self.stack.push((node.children.iter(), depth + 1));
                    }
                    return Some((depth, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

// ---
// Achatamento para seletores
// ---

#[derive(Debug, Clone)]
pub struct SelectionOptions<'a> {
    walk: Preorder<'a>,
    prefix: String,
}

impl Iterator for SelectionOptions<'_> {
    type Item = SectorOption;

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.walk.next()?;
        Some(SectorOption {
            id: node.id.clone(),
            label: option_label(node, &self.prefix, depth),
        })
    }
}

fn option_label(node: &Sector, prefix: &str, depth: usize) -> String {
    let mut label = String::from(prefix);
    label.push_str(&INDENT_MARKER.repeat(depth));
    label.push_str(&node.name);
    if let Some(code) = node.code.as_deref().filter(|c| !c.is_empty()) {
        label.push_str(&format!(" [{code}]"));
    }
    label
}

/// Pares `{id, label}` para os dropdowns de "setor pai" e "destino".
pub fn flatten_for_selection<'a>(nodes: &'a [Sector], prefix: &str) -> SelectionOptions<'a> {
    SelectionOptions { walk: Preorder::new(nodes), prefix: prefix.to_string() }
}

/// Os registros completos, sem prefixo, para a visão em tabela.
pub fn flatten_for_listing(nodes: &[Sector]) -> impl Iterator<Item = &Sector> + Clone {
    Preorder::new(nodes).map(|(_, node)| node)
}

pub fn count_nodes(nodes: &[Sector]) -> usize {
    Preorder::new(nodes).count()
}

pub fn find_node<'a>(nodes: &'a [Sector], id: &str) -> Option<&'a Sector> {
    flatten_for_listing(nodes).find(|node| node.id == id)
}

/// `true` se `id` é o próprio `root` ou algum dos seus descendentes.
pub fn subtree_contains(root: &Sector, id: &str) -> bool {
    flatten_for_listing(std::slice::from_ref(root)).any(|node| node.id == id)
}

pub fn active_children_count(node: &Sector) -> usize {
    node.children.iter().filter(|child| child.is_active).count()
}

/// Opções de setor pai para o formulário.
///
/// Na edição ficam de fora o próprio setor e toda a sua subárvore, já que
/// mover um nó para baixo de um descendente criaria um ciclo.
pub fn parent_candidates(nodes: &[Sector], editing: Option<&str>) -> Vec<SectorOption> {
    let excluded: HashSet<&str> = editing
        .and_then(|id| find_node(nodes, id))
        .map(|node| flatten_for_listing(std::slice::from_ref(node)).map(|n| n.id.as_str()).collect())
        .unwrap_or_default();

    flatten_for_selection(nodes, "")
        .filter(|option| !excluded.contains(option.id.as_str()) && Some(option.id.as_str()) != editing)
        .collect()
}

/// Regras de re-parentesco checadas antes de qualquer envio.
pub fn validate_parent(
    nodes: &[Sector],
    sector_id: Option<&str>,
    parent_id: Option<&str>,
) -> Result<(), AppError> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };

    if sector_id == Some(parent_id) {
        return Err(AppError::SelfParent);
    }

    if find_node(nodes, parent_id).is_none() {
        return Err(AppError::ParentNotFound(parent_id.to_string()));
    }

    if let Some(sector_id) = sector_id {
        let node = find_node(nodes, sector_id)
            .ok_or_else(|| AppError::SectorNotFound(sector_id.to_string()))?;
        if subtree_contains(node, parent_id) {
            return Err(AppError::CyclicParent);
        }
    }

    Ok(())
}

// ---
// Consistência de `level`
// ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelViolation {
    pub sector_id: String,
    pub expected: i32,
    pub found: i32,
}

/// Nós cujo `level` não bate com `nível das raízes + profundidade`.
pub fn level_violations(nodes: &[Sector]) -> Vec<LevelViolation> {
    let Some(baseline) = nodes.first().map(|root| root.level) else {
        return Vec::new();
    };

    Preorder::new(nodes)
        .filter_map(|(depth, node)| {
            let expected = baseline + depth as i32;
            (node.level != expected).then(|| LevelViolation {
                sector_id: node.id.clone(),
                expected,
                found: node.level,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{scenario_forest, sector};

    fn labels(nodes: &[Sector]) -> Vec<String> {
        flatten_for_selection(nodes, "").map(|o| o.label).collect()
    }

    #[test]
    fn listing_is_depth_first_preorder() {
        let forest = scenario_forest();
        let ids: Vec<&str> = flatten_for_listing(&forest).map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn selection_labels_are_indented_per_depth() {
        let forest = scenario_forest();
        assert_eq!(labels(&forest), vec!["A", "——B", "——C", "————D"]);
    }

    #[test]
    fn selection_keeps_prefix_and_code_suffix() {
        let mut forest = scenario_forest();
        forest[0].children[1].code = Some("CTR".into());
        forest[0].children[0].code = Some(String::new());

        let options: Vec<String> = flatten_for_selection(&forest, "> ").map(|o| o.label).collect();
        assert_eq!(options, vec!["> A", "> ——B", "> ——C [CTR]", "> ————D"]);
    }

    #[test]
    fn empty_forest_yields_nothing() {
        assert_eq!(flatten_for_selection(&[], "").count(), 0);
        assert_eq!(flatten_for_listing(&[]).count(), 0);
        assert_eq!(count_nodes(&[]), 0);
        assert!(level_violations(&[]).is_empty());
    }

    #[test]
    fn both_flattenings_visit_every_node_once() {
        let forest = vec![
            sector("r1", 0, vec![sector("a", 1, vec![sector("a1", 2, vec![]), sector("a2", 2, vec![])])]),
            sector("r2", 0, vec![]),
            sector("r3", 0, vec![sector("b", 1, vec![sector("b1", 2, vec![sector("b11", 3, vec![])])])]),
        ];

        let total = count_nodes(&forest);
        assert_eq!(total, 9);

        let listed: Vec<&str> = flatten_for_listing(&forest).map(|s| s.id.as_str()).collect();
        let selected: Vec<String> = flatten_for_selection(&forest, "").map(|o| o.id).collect();
        assert_eq!(listed.len(), total);
        assert_eq!(selected, listed);

        let unique: HashSet<&str> = listed.iter().copied().collect();
        assert_eq!(unique.len(), total);
    }

    #[test]
    fn flattening_is_restartable_and_does_not_reorder() {
        let forest = vec![sector("z", 0, vec![]), sector("a", 0, vec![]), sector("m", 0, vec![])];
        let walk = flatten_for_selection(&forest, "");
        let first: Vec<String> = walk.clone().map(|o| o.id).collect();
        let second: Vec<String> = walk.map(|o| o.id).collect();
        assert_eq!(first, vec!["z", "a", "m"]);
        assert_eq!(first, second);
    }

    #[test]
    fn parent_candidates_exclude_self_and_descendants() {
        let forest = scenario_forest();

        let ids = |editing| -> Vec<String> {
            parent_candidates(&forest, editing).into_iter().map(|o| o.id).collect()
        };
        assert_eq!(ids(None), vec!["A", "B", "C", "D"]);
        assert_eq!(ids(Some("C")), vec!["A", "B"]);
        assert_eq!(ids(Some("B")), vec!["A", "C", "D"]);
        assert!(ids(Some("A")).is_empty());
    }

    #[test]
    fn parent_validation_blocks_self_and_cycles() {
        let forest = scenario_forest();

        assert!(matches!(validate_parent(&forest, Some("C"), Some("C")), Err(AppError::SelfParent)));
        assert!(matches!(validate_parent(&forest, Some("A"), Some("D")), Err(AppError::CyclicParent)));
        assert!(matches!(
            validate_parent(&forest, None, Some("X")),
            Err(AppError::ParentNotFound(id)) if id == "X"
        ));
        assert!(validate_parent(&forest, Some("D"), Some("B")).is_ok());
        assert!(validate_parent(&forest, Some("D"), None).is_ok());
        assert!(validate_parent(&forest, None, Some("A")).is_ok());
    }

    #[test]
    fn child_level_is_parent_level_plus_one() {
        let forest = scenario_forest();
        for (_, node) in Preorder::new(&forest) {
            for child in &node.children {
                assert_eq!(child.level, node.level + 1);
            }
        }
        assert!(level_violations(&forest).is_empty());

        let mut broken = scenario_forest();
        broken[0].children[1].children[0].level = 7;
        assert_eq!(
            level_violations(&broken),
            vec![LevelViolation { sector_id: "D".into(), expected: 2, found: 7 }]
        );
    }

    #[test]
    fn counts_only_active_direct_children() {
        let mut forest = scenario_forest();
        let root = &forest[0];
        assert_eq!(active_children_count(root), 2);

        forest[0].children[0].is_active = false;
        assert_eq!(active_children_count(&forest[0]), 1);
        assert!(subtree_contains(&forest[0], "D"));
        assert!(!subtree_contains(&forest[0].children[0], "D"));
    }
}
