use core::fmt::{self, Write as _};
use std::collections::VecDeque;

use crate::{Node, Tree};

impl<K, V> Tree<K, V> {
    /// Renders the tree as a Graphviz digraph, one `rank=same` group per
    /// tree level, red nodes drawn in red.
    pub(crate) fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
        K: fmt::Display,
        V: fmt::Display,
    {
        let root = match self.root() {
            Some(root) => root,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item<'tree, K, V> {
            Node(u32, &'tree Node<K, V>),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        let mut next_id = 1;
        queue.push_back(Item::Node(0, root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut links = String::new();

        loop {
            let level_width = queue.len();
            if level_width == 0 {
                break;
            }

            write!(w, "{{rank=same; ")?;

            for _ in 0..level_width {
                let item = queue.pop_front().expect("level width exceeds queue length");

                let (id, node) = match item {
                    Item::Node(id, node) => (id, node),
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let color = if node.red { "red" } else { "black" };
                write!(
                    w,
                    "\"graph{name}-{id}\" [label=\"{key}:{value}\" color={color}]; ",
                    key = node.key,
                    value = node.value,
                )?;

                for child in [node.left.as_deref(), node.right.as_deref()] {
                    let child_id = next_id;
                    next_id += 1;

                    match child {
                        Some(child) => {
                            queue.push_back(Item::Node(child_id, child));
                            writeln!(
                                links,
                                "\"graph{name}-{id}\" -> \"graph{name}-{child_id}\";"
                            )?;
                        }
                        None => {
                            queue.push_back(Item::Missing(child_id));
                            writeln!(
                                links,
                                "\"graph{name}-{id}\" -> \"graph{name}-missing{child_id}\";"
                            )?;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}
