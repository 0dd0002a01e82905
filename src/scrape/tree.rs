// src/scrape/tree.rs
// =============================================================================
// A tiny view of an HTML element tree, and a depth-first walk over it.
//
// The page parsers only ever need four things from an element: its tag name,
// its attributes, its parent and its children. Keeping that behind the
// `TreeNode` trait means the link predicates don't care which HTML library
// produced the tree; we implement it for scraper's `ElementRef`.
//
// The walk is pre-order (a node before its children, children left to right)
// and stops at the first error the visitor returns.
// =============================================================================

use scraper::ElementRef;

pub trait TreeNode: Sized {
    /// Lowercase local name, e.g. "a" or "li"
    fn tag_name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    fn attribute_count(&self) -> usize;

    /// Parent element, or None at the root
    fn parent_node(&self) -> Option<Self>;

    /// Element children, in document order
    fn child_nodes(&self) -> Vec<Self>;

    fn is(&self, tag: &str) -> bool {
        self.tag_name() == tag
    }
}

impl<'a> TreeNode for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn attribute_count(&self) -> usize {
        self.value().attrs().count()
    }

    fn parent_node(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn child_nodes(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }
}

// Visits `root` and all its descendants in pre-order
//
// Uses an explicit stack instead of recursion, so deeply nested markup
// can't blow the call stack. Children are pushed in reverse so the leftmost
// one is popped first.
pub fn walk_preorder<N, E, F>(root: N, mut visit: F) -> Result<(), E>
where
    N: TreeNode,
    F: FnMut(&N) -> Result<(), E>,
{
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        visit(&node)?;

        let mut children = node.child_nodes();
        children.reverse();
        stack.extend(children);
    }

    Ok(())
}
