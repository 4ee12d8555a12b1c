//! Pure traversal logic for the category forest.
//!
//! These functions operate on a snapshot of all categories so the services
//! stay testable without a store. Traversal is iterative with an explicit
//! queue and a visited set: depth is unbounded and the guards keep even a
//! corrupted (cyclic) snapshot from hanging the process.

use std::collections::{HashMap, HashSet, VecDeque};

use super::category::{Category, CategoryTreeNode};
use super::ids::CategoryId;

/// Collect `root` plus all transitive children from `categories`.
///
/// Each category appears exactly once; the root comes first, then children
/// in breadth-first order with siblings sorted by name. Returns an empty
/// vector when `root` is absent from the snapshot.
pub fn descendants(categories: &[Category], root: &CategoryId) -> Vec<Category> {
    let Some(start) = categories.iter().find(|c| c.id == *root) else {
        return Vec::new();
    };

    let children = children_index(categories);
    let mut visited: HashSet<CategoryId> = HashSet::new();
    let mut queue: VecDeque<&Category> = VecDeque::new();
    let mut collected = Vec::new();

    visited.insert(start.id);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        collected.push(current.clone());
        if let Some(kids) = children.get(&current.id) {
            for child in kids {
                if visited.insert(child.id) {
                    queue.push_back(child);
                }
            }
        }
    }

    collected
}

/// Index a snapshot by parent id, each child list sorted by name.
fn children_index(categories: &[Category]) -> HashMap<CategoryId, Vec<&Category>> {
    let mut index: HashMap<CategoryId, Vec<&Category>> = HashMap::new();
    for category in categories {
        if let Some(parent) = category.parent {
            index.entry(parent).or_default().push(category);
        }
    }
    for kids in index.values_mut() {
        kids.sort_by(|a, b| a.name.cmp(&b.name));
    }
    index
}

/// Assemble the full forest of [`CategoryTreeNode`]s from a snapshot.
///
/// Roots are categories without a parent, or whose parent is missing from
/// the snapshot (a dangling pointer must not hide a subtree). Siblings are
/// sorted by name at every level. The structure is rebuilt on every call;
/// no iterator state is retained.
pub fn build_forest(categories: &[Category]) -> Vec<CategoryTreeNode> {
    let known: HashSet<CategoryId> = categories.iter().map(|c| c.id).collect();
    let mut children: HashMap<CategoryId, Vec<Category>> = HashMap::new();
    let mut roots: Vec<Category> = Vec::new();

    for category in categories {
        match category.parent {
            Some(parent) if known.contains(&parent) => {
                children.entry(parent).or_default().push(category.clone());
            }
            _ => roots.push(category.clone()),
        }
    }

    roots.sort_by(|a, b| a.name.cmp(&b.name));
    for kids in children.values_mut() {
        // Reverse name order so popping from the back yields name order.
        kids.sort_by(|a, b| b.name.cmp(&a.name));
    }

    let mut visited: HashSet<CategoryId> = roots.iter().map(|c| c.id).collect();
    let mut forest = Vec::with_capacity(roots.len());

    for root in roots {
        forest.push(build_subtree(root, &mut children, &mut visited));
    }
    forest
}

struct Frame {
    category: Category,
    pending: Vec<Category>,
    built: Vec<CategoryTreeNode>,
}

fn build_subtree(
    root: Category,
    children: &mut HashMap<CategoryId, Vec<Category>>,
    visited: &mut HashSet<CategoryId>,
) -> CategoryTreeNode {
    let pending = children.remove(&root.id).unwrap_or_default();
    let mut stack = vec![Frame {
        category: root,
        pending,
        built: Vec::new(),
    }];

    loop {
        let top = stack.last_mut().map(|frame| frame.pending.pop());
        match top {
            Some(Some(child)) => {
                if visited.insert(child.id) {
                    let pending = children.remove(&child.id).unwrap_or_default();
                    stack.push(Frame {
                        category: child,
                        pending,
                        built: Vec::new(),
                    });
                }
            }
            Some(None) => {
                let Some(frame) = stack.pop() else {
                    unreachable!("matched a frame above")
                };
                let node = CategoryTreeNode {
                    category: frame.category,
                    children: frame.built,
                };
                match stack.last_mut() {
                    Some(parent) => parent.built.push(node),
                    None => return node,
                }
            }
            None => unreachable!("stack starts non-empty and returns before draining"),
        }
    }
}
