use std::collections::VecDeque;
use std::fmt;
use std::mem;

use crate::error::ForestError;
use crate::record::{Record, Value};

/// A node in a decision tree.
///
/// Each `Internal` node exclusively owns its two children, so a tree is a
/// strict binary tree with no sharing. Nodes are never mutated after training.
///
/// Unbounded trees can be as deep as the training set is long, so cloning,
/// comparing, rendering and dropping all walk the tree with an explicit stack.
#[derive(Debug)]
pub enum Node {
    /// A terminal node holding a fixed prediction.
    Leaf {
        /// Majority class of the training records that reached this node,
        /// or the caller's default class when none did.
        predicted_class: Value,
    },
    /// A splitting node.
    Internal {
        /// Majority class of the training records that reached this node.
        predicted_class: Value,
        /// Numeric attribute tested at this node.
        split_attribute: String,
        /// Instances with `value < split_threshold` go to `lesser_child`.
        split_threshold: f64,
        /// Subtree for `value < split_threshold`.
        lesser_child: Box<Node>,
        /// Subtree for `value >= split_threshold`.
        greater_equal_child: Box<Node>,
    },
}

impl Node {
    /// Create a leaf node.
    #[must_use]
    pub fn leaf(predicted_class: Value) -> Self {
        Node::Leaf { predicted_class }
    }

    /// Return the class stored at this node.
    ///
    /// For an `Internal` node this is the fallback class, never the result of
    /// a normal traversal.
    #[must_use]
    pub fn predicted_class(&self) -> &Value {
        match self {
            Node::Leaf { predicted_class } | Node::Internal { predicted_class, .. } => {
                predicted_class
            }
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Predict the class of a single instance.
    ///
    /// At each `Internal` node, goes to the lesser child when
    /// `instance[split_attribute] < split_threshold`, to the greater-equal
    /// child otherwise.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::MissingAttribute`] | `instance` lacks a tested attribute |
    /// | [`ForestError::NonNumericValue`] | a tested attribute holds text |
    pub fn predict(&self, instance: &Record) -> Result<&Value, ForestError> {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { predicted_class } => return Ok(predicted_class),
                Node::Internal {
                    split_attribute,
                    split_threshold,
                    lesser_child,
                    greater_equal_child,
                    ..
                } => {
                    node = if instance.number(split_attribute)? < *split_threshold {
                        &**lesser_child
                    } else {
                        &**greater_equal_child
                    };
                }
            }
        }
    }

    /// Return the total number of nodes in this subtree.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.walk().count()
    }

    /// Return the number of leaves in this subtree.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.walk().filter(|(n, _)| n.is_leaf()).count()
    }

    /// Return the maximum depth of this subtree. A single leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.walk().map(|(_, d)| d).max().unwrap_or(0)
    }

    /// Breadth-first iterator over `(node, depth)` pairs.
    pub(crate) fn walk(&self) -> impl Iterator<Item = (&Node, usize)> {
        let mut queue = VecDeque::from([(self, 0usize)]);
        std::iter::from_fn(move || {
            let (node, d) = queue.pop_front()?;
            if let Node::Internal {
                lesser_child,
                greater_equal_child,
                ..
            } = node
            {
                queue.push_back((&**lesser_child, d + 1));
                queue.push_back((&**greater_equal_child, d + 1));
            }
            Some((node, d))
        })
    }
}

/// Stand-in child for a node whose subtree is filled in or taken out later.
pub(crate) fn placeholder() -> Box<Node> {
    Box::new(Node::leaf(Value::Number(0.0)))
}

impl Clone for Node {
    fn clone(&self) -> Self {
        let mut root = Node::leaf(self.predicted_class().clone());
        let mut stack: Vec<(&Node, &mut Node)> = vec![(self, &mut root)];
        while let Some((source, target)) = stack.pop() {
            match source {
                Node::Leaf { predicted_class } => *target = Node::leaf(predicted_class.clone()),
                Node::Internal {
                    predicted_class,
                    split_attribute,
                    split_threshold,
                    lesser_child,
                    greater_equal_child,
                } => {
                    *target = Node::Internal {
                        predicted_class: predicted_class.clone(),
                        split_attribute: split_attribute.clone(),
                        split_threshold: *split_threshold,
                        lesser_child: placeholder(),
                        greater_equal_child: placeholder(),
                    };
                    if let Node::Internal {
                        lesser_child: lesser_target,
                        greater_equal_child: greater_equal_target,
                        ..
                    } = target
                    {
                        stack.push((&**greater_equal_child, &mut **greater_equal_target));
                        stack.push((&**lesser_child, &mut **lesser_target));
                    }
                }
            }
        }
        drop(stack);
        root
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some(pair) = stack.pop() {
            match pair {
                (Node::Leaf { predicted_class: a }, Node::Leaf { predicted_class: b }) => {
                    if a != b {
                        return false;
                    }
                }
                (
                    Node::Internal {
                        predicted_class: a_class,
                        split_attribute: a_attribute,
                        split_threshold: a_threshold,
                        lesser_child: a_lesser,
                        greater_equal_child: a_greater_equal,
                    },
                    Node::Internal {
                        predicted_class: b_class,
                        split_attribute: b_attribute,
                        split_threshold: b_threshold,
                        lesser_child: b_lesser,
                        greater_equal_child: b_greater_equal,
                    },
                ) => {
                    if a_class != b_class || a_attribute != b_attribute || a_threshold != b_threshold
                    {
                        return false;
                    }
                    stack.push((&**a_greater_equal, &**b_greater_equal));
                    stack.push((&**a_lesser, &**b_lesser));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        fn take_children(node: &mut Node, pending: &mut Vec<Node>) {
            if let Node::Internal {
                lesser_child,
                greater_equal_child,
                ..
            } = node
            {
                pending.push(mem::replace(&mut **lesser_child, Node::leaf(Value::Number(0.0))));
                pending.push(mem::replace(
                    &mut **greater_equal_child,
                    Node::leaf(Value::Number(0.0)),
                ));
            }
        }

        let mut pending = Vec::new();
        take_children(self, &mut pending);
        // Each popped node only has leaf children left when it goes out of scope.
        while let Some(mut node) = pending.pop() {
            take_children(&mut node, &mut pending);
        }
    }
}

/// One step of the depth-first rendering.
enum Line<'a> {
    Subtree(&'a Node, usize),
    Otherwise(&'a str, f64, usize),
}

/// Renders the tree one node per line, four spaces of indentation per level.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Line::Subtree(self, 0)];
        while let Some(line) = stack.pop() {
            match line {
                Line::Subtree(Node::Leaf { predicted_class }, level) => {
                    writeln!(f, "{:width$}class = {predicted_class}", "", width = 4 * level)?;
                }
                Line::Subtree(
                    Node::Internal {
                        split_attribute,
                        split_threshold,
                        lesser_child,
                        greater_equal_child,
                        ..
                    },
                    level,
                ) => {
                    writeln!(
                        f,
                        "{:width$}if {split_attribute} < {split_threshold}:",
                        "",
                        width = 4 * level
                    )?;
                    stack.push(Line::Subtree(&**greater_equal_child, level + 1));
                    stack.push(Line::Otherwise(split_attribute.as_str(), *split_threshold, level));
                    stack.push(Line::Subtree(&**lesser_child, level + 1));
                }
                Line::Otherwise(split_attribute, split_threshold, level) => {
                    writeln!(
                        f,
                        "{:width$}if {split_attribute} >= {split_threshold}:",
                        "",
                        width = 4 * level
                    )?;
                }
            }
        }
        Ok(())
    }
}
