// Persistent append chain - the buffer representation shared by every
// pipeline layer
use std::sync::Arc;

/// Immutable, functionally-updated append log. `push` is O(1) and never
/// alters the receiver; nodes are reference-counted so a chain may be shared
/// between derived pipeline states without copying.
#[derive(Debug, Clone)]
pub struct Chain<T> {
    head: Option<Arc<Node<T>>>,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<Arc<Node<T>>>,
}

impl<T> Chain<T> {
    /// An empty chain (the explicit no-predecessor sentinel).
    pub fn new() -> Self {
        Self { head: None }
    }

    /// Returns a new chain with `value` appended. The receiver is unchanged
    /// and remains valid.
    pub fn push(&self, value: T) -> Self {
        Self {
            head: Some(Arc::new(Node {
                value,
                prev: self.head.clone(),
            })),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Chain<T> {
    /// Walks the predecessor links and materializes the values in insertion
    /// order (oldest first), together with the element count. O(n); the
    /// chain is unchanged.
    pub fn linearize(&self) -> (Vec<T>, usize) {
        let mut values = Vec::new();
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            values.push(node.value.clone());
            cursor = node.prev.as_deref();
        }
        values.reverse();

        let count = values.len();
        (values, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chain_linearizes_to_nothing() {
        let chain: Chain<i32> = Chain::new();
        let (values, count) = chain.linearize();

        assert!(chain.is_empty());
        assert!(values.is_empty());
        assert_eq!(count, 0);
    }

    #[test]
    fn test_linearize_restores_insertion_order() {
        let chain = Chain::new().push(1).push(2).push(3);
        let (values, count) = chain.linearize();

        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_push_leaves_previous_state_intact() {
        let base = Chain::new().push(1);
        let longer = base.push(2);

        let (base_values, base_count) = base.linearize();
        let (longer_values, _) = longer.linearize();

        assert_eq!(base_values, vec![1]);
        assert_eq!(base_count, 1);
        assert_eq!(longer_values, vec![1, 2]);
    }
}
