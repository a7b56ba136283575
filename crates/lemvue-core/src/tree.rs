// ── Comment tree ──
//
// Comments arrive flat with a materialized `path` (`0.12.34`). The tree is
// built once per fetch and afterwards only rewritten by path copying: a
// change allocates new nodes from the root down to the touched node, and
// every sibling subtree keeps its `Arc`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use lemvue_api::types::{CommentId, CommentView};

use crate::reconcile::List;

#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub view: Arc<CommentView>,
    /// Zero for roots.
    pub depth: usize,
    pub children: List<CommentNode>,
}

impl CommentNode {
    pub fn id(&self) -> CommentId {
        self.view.comment.id
    }

    fn leaf(view: Arc<CommentView>, depth: usize) -> Self {
        Self {
            view,
            depth,
            children: Arc::new(Vec::new()),
        }
    }
}

pub type CommentTree = List<CommentNode>;

/// Build a tree from a flat page of comments, keeping server order among
/// siblings. Comments whose parent is not in the page become roots.
pub fn build_comment_tree(flat: Vec<CommentView>) -> CommentTree {
    let ids: HashSet<CommentId> = flat.iter().map(|c| c.comment.id).collect();
    let mut children: HashMap<CommentId, Vec<CommentView>> = HashMap::new();
    let mut roots = Vec::new();

    for view in flat {
        match view.comment.parent_id() {
            Some(parent) if parent != view.comment.id && ids.contains(&parent) => {
                children.entry(parent).or_default().push(view);
            }
            _ => roots.push(view),
        }
    }

    Arc::new(
        roots
            .into_iter()
            .map(|view| build_node(view, 0, &mut children))
            .collect(),
    )
}

fn build_node(
    view: CommentView,
    depth: usize,
    children: &mut HashMap<CommentId, Vec<CommentView>>,
) -> Arc<CommentNode> {
    let kids = children.remove(&view.comment.id).unwrap_or_default();
    let kids = kids
        .into_iter()
        .map(|child| build_node(child, depth + 1, children))
        .collect();
    Arc::new(CommentNode {
        view: Arc::new(view),
        depth,
        children: Arc::new(kids),
    })
}

/// Put `new` first among the children of `parent`, at `parent depth + 1`.
/// Without a parent it goes first among the roots. An unknown parent
/// leaves the tree untouched.
pub fn insert_into_tree(
    tree: &CommentTree,
    new: Arc<CommentView>,
    parent: Option<CommentId>,
) -> CommentTree {
    let Some(parent) = parent else {
        let mut roots = Vec::with_capacity(tree.len() + 1);
        roots.push(Arc::new(CommentNode::leaf(new, 0)));
        roots.extend(tree.iter().cloned());
        return Arc::new(roots);
    };
    insert_under(tree, parent, &new).unwrap_or_else(|| Arc::clone(tree))
}

fn insert_under(
    nodes: &CommentTree,
    parent: CommentId,
    new: &Arc<CommentView>,
) -> Option<CommentTree> {
    for (idx, node) in nodes.iter().enumerate() {
        let rebuilt = if node.id() == parent {
            let mut kids = Vec::with_capacity(node.children.len() + 1);
            kids.push(Arc::new(CommentNode::leaf(Arc::clone(new), node.depth + 1)));
            kids.extend(node.children.iter().cloned());
            Some(Arc::new(kids))
        } else {
            insert_under(&node.children, parent, new)
        };
        if let Some(children) = rebuilt {
            let mut next = Vec::clone(nodes);
            next[idx] = Arc::new(CommentNode {
                view: Arc::clone(&node.view),
                depth: node.depth,
                children,
            });
            return Some(Arc::new(next));
        }
    }
    None
}

/// Swap in an edited comment, keeping its position, depth, and children.
pub fn replace_in_tree(tree: &CommentTree, updated: &Arc<CommentView>) -> CommentTree {
    let id = updated.comment.id;
    rewrite(tree, &|node| (node.id() == id).then(|| Arc::clone(updated)))
        .unwrap_or_else(|| Arc::clone(tree))
}

/// Shallow-patch every comment matching `predicate`.
pub fn patch_tree<P, F>(tree: &CommentTree, predicate: P, patch: F) -> CommentTree
where
    P: Fn(&CommentView) -> bool,
    F: Fn(&mut CommentView),
{
    rewrite(tree, &|node| {
        predicate(&node.view).then(|| {
            let mut view = CommentView::clone(&node.view);
            patch(&mut view);
            Arc::new(view)
        })
    })
    .unwrap_or_else(|| Arc::clone(tree))
}

/// Apply `edit` to every node; `None` from the whole walk means nothing
/// changed anywhere.
fn rewrite(
    nodes: &CommentTree,
    edit: &dyn Fn(&CommentNode) -> Option<Arc<CommentView>>,
) -> Option<CommentTree> {
    let mut next: Option<Vec<Arc<CommentNode>>> = None;
    for (idx, node) in nodes.iter().enumerate() {
        let view = edit(node);
        let children = rewrite(&node.children, edit);
        if view.is_none() && children.is_none() {
            continue;
        }
        let replaced = Arc::new(CommentNode {
            view: view.unwrap_or_else(|| Arc::clone(&node.view)),
            depth: node.depth,
            children: children.unwrap_or_else(|| Arc::clone(&node.children)),
        });
        next.get_or_insert_with(|| Vec::clone(nodes))[idx] = replaced;
    }
    next.map(Arc::new)
}

/// Pre-order walk, as the tree is displayed.
pub fn flatten(tree: &CommentTree) -> Vec<Arc<CommentNode>> {
    fn walk(nodes: &CommentTree, out: &mut Vec<Arc<CommentNode>>) {
        for node in nodes.iter() {
            out.push(Arc::clone(node));
            walk(&node.children, out);
        }
    }
    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}
