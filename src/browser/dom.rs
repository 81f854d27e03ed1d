//! Tree-ancestor predicate over any DOM-like node type.

use scraper::ElementRef;

use crate::error::BrowserError;

/// A node that can report its parent element.
pub trait AncestorWalk: Sized {
    /// The parent element, or `None` at the root.
    fn parent_element(&self) -> Result<Option<Self>, BrowserError>;
}

/// Whether any strict ancestor of `node` satisfies `predicate`.
///
/// The node itself is never tested.
pub fn has_ancestor_matching<N, P>(node: &N, mut predicate: P) -> Result<bool, BrowserError>
where
    N: AncestorWalk,
    P: FnMut(&N) -> bool,
{
    let mut current = node.parent_element()?;
    while let Some(ancestor) = current {
        if predicate(&ancestor) {
            return Ok(true);
        }
        current = ancestor.parent_element()?;
    }
    Ok(false)
}

impl AncestorWalk for ElementRef<'_> {
    fn parent_element(&self) -> Result<Option<Self>, BrowserError> {
        Ok(self.parent().and_then(ElementRef::wrap))
    }
}
