use std::cmp::Ordering;

use serde_json::Value;

use super::{Comparison, Filter, FilterTest, JsonPath, Segment, Selector};

impl JsonPath {
    /// Evaluates against `root`. Matches come back in document order; recursive
    /// descent visits a node before its children.
    pub fn query<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for segment in &self.segments {
            let mut next = Vec::new();
            for node in current {
                match segment {
                    Segment::Child(selector) => select(node, selector, &mut next),
                    Segment::Descendant(selector) => descend(node, selector, &mut next),
                }
            }
            current = next;
        }
        current
    }

    pub fn query_owned(&self, root: &Value) -> Vec<Value> {
        self.query(root).into_iter().cloned().collect()
    }
}

fn select<'a>(node: &'a Value, selector: &Selector, out: &mut Vec<&'a Value>) {
    match selector {
        Selector::Name(name) => {
            if let Some(child) = node.as_object().and_then(|map| map.get(name)) {
                out.push(child);
            }
        }
        Selector::Wildcard => match node {
            Value::Array(items) => out.extend(items.iter()),
            Value::Object(map) => out.extend(map.values()),
            _ => {}
        },
        Selector::Index(index) => {
            if let Value::Array(items) = node {
                if let Some(position) = resolve_index(*index, items.len()) {
                    out.push(&items[position]);
                }
            }
        }
        Selector::Slice { start, end } => {
            if let Value::Array(items) = node {
                let len = items.len();
                let from = start.map_or(0, |value| clamp_bound(value, len));
                let to = end.map_or(len, |value| clamp_bound(value, len));
                if from < to {
                    out.extend(items[from..to].iter());
                }
            }
        }
        Selector::Union(selectors) => {
            for selector in selectors {
                select(node, selector, out);
            }
        }
        Selector::Filter(filter) => match node {
            Value::Array(items) => out.extend(items.iter().filter(|item| filter.accepts(item))),
            Value::Object(map) => out.extend(map.values().filter(|child| filter.accepts(child))),
            _ => {}
        },
    }
}

impl Filter {
    fn accepts(&self, candidate: &Value) -> bool {
        let resolved = self
            .field
            .iter()
            .try_fold(candidate, |current, name| current.as_object()?.get(name));
        match (&self.test, resolved) {
            (_, None) => false,
            (FilterTest::Exists, Some(_)) => true,
            (FilterTest::Compare(comparison, literal), Some(value)) => {
                compare(value, *comparison, literal)
            }
        }
    }
}

/// Numbers compare numerically and strings lexically; other mixes only support
/// `==`/`!=` by JSON equality.
fn compare(left: &Value, comparison: Comparison, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .zip(b.as_f64())
            .and_then(|(a, b)| a.partial_cmp(&b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    };
    match comparison {
        Comparison::Eq => ordering.map_or(left == right, Ordering::is_eq),
        Comparison::Ne => ordering.map_or(left != right, Ordering::is_ne),
        Comparison::Lt => ordering.is_some_and(Ordering::is_lt),
        Comparison::Le => ordering.is_some_and(Ordering::is_le),
        Comparison::Gt => ordering.is_some_and(Ordering::is_gt),
        Comparison::Ge => ordering.is_some_and(Ordering::is_ge),
    }
}

fn descend<'a>(node: &'a Value, selector: &Selector, out: &mut Vec<&'a Value>) {
    select(node, selector, out);
    match node {
        Value::Array(items) => {
            for item in items {
                descend(item, selector, out);
            }
        }
        Value::Object(map) => {
            for child in map.values() {
                descend(child, selector, out);
            }
        }
        _ => {}
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let position = if index < 0 { len + index } else { index };
    if (0..len).contains(&position) {
        usize::try_from(position).ok()
    } else {
        None
    }
}

fn clamp_bound(bound: i64, len: usize) -> usize {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let position = if bound < 0 { signed_len + bound } else { bound };
    usize::try_from(position.clamp(0, signed_len)).unwrap_or(len)
}
