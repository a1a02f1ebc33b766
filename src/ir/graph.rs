//! Dependency analysis over the named schema registry.
//!
//! Two independent results: a best-effort topological emission order
//! (post-order DFS that tolerates cycles) and the set of schemas that
//! participate in a reference cycle (Tarjan SCC). The compiler only
//! defers construction for references between members of the same
//! cycle, so the two must not be conflated.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::schema::SchemaNode;

/// Analyzer output consumed by the compiler and assembler.
#[derive(Debug)]
pub struct SchemaGraph {
    /// Dependency-first declaration order.
    pub emission_order: Vec<String>,
    /// Names that are members of some reference cycle.
    pub circular: BTreeSet<String>,
}

/// Analyze the registry. Dangling references contribute no edges; they
/// surface later as `unknown` validators, never as analyzer errors.
pub fn analyze(registry: &BTreeMap<String, SchemaNode>) -> SchemaGraph {
    let edges = build_edges(registry);
    SchemaGraph {
        emission_order: post_order(registry, &edges),
        circular: circular_members(registry, &edges),
    }
}

/// `A -> B` iff A's schema references B at any depth and B exists.
fn build_edges(registry: &BTreeMap<String, SchemaNode>) -> BTreeMap<String, Vec<String>> {
    registry
        .iter()
        .map(|(name, node)| {
            let mut refs = Vec::new();
            node.collect_references(&mut refs);
            refs.retain(|target| registry.contains_key(target));
            refs.sort();
            refs.dedup();
            (name.clone(), refs)
        })
        .collect()
}

#[derive(Clone, Copy, PartialEq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

fn post_order(
    registry: &BTreeMap<String, SchemaNode>,
    edges: &BTreeMap<String, Vec<String>>,
) -> Vec<String> {
    let mut states: HashMap<&str, VisitState> = registry
        .keys()
        .map(|name| (name.as_str(), VisitState::Unvisited))
        .collect();
    let mut order = Vec::with_capacity(registry.len());

    fn visit<'a>(
        name: &'a str,
        edges: &'a BTreeMap<String, Vec<String>>,
        states: &mut HashMap<&'a str, VisitState>,
        order: &mut Vec<String>,
    ) {
        states.insert(name, VisitState::InProgress);
        if let Some(deps) = edges.get(name) {
            for dep in deps {
                // A mid-stack dependency means a cycle; skip it rather
                // than recurse forever.
                if states.get(dep.as_str()) == Some(&VisitState::Unvisited) {
                    visit(dep, edges, states, order);
                }
            }
        }
        states.insert(name, VisitState::Done);
        order.push(name.to_string());
    }

    for name in registry.keys() {
        if states.get(name.as_str()) == Some(&VisitState::Unvisited) {
            visit(name, edges, &mut states, &mut order);
        }
    }
    order
}

/// Tarjan's strongly-connected-components algorithm. A component with
/// more than one member is circular; a singleton only with a self-edge.
fn circular_members(
    registry: &BTreeMap<String, SchemaNode>,
    edges: &BTreeMap<String, Vec<String>>,
) -> BTreeSet<String> {
    struct Tarjan<'a> {
        edges: &'a BTreeMap<String, Vec<String>>,
        index: usize,
        indices: HashMap<&'a str, usize>,
        lowlinks: HashMap<&'a str, usize>,
        stack: Vec<&'a str>,
        on_stack: BTreeSet<&'a str>,
        components: Vec<Vec<&'a str>>,
    }

    impl<'a> Tarjan<'a> {
        fn strongconnect(&mut self, v: &'a str) {
            self.indices.insert(v, self.index);
            self.lowlinks.insert(v, self.index);
            self.index += 1;
            self.stack.push(v);
            self.on_stack.insert(v);

            if let Some(deps) = self.edges.get(v) {
                for w in deps {
                    let w = w.as_str();
                    if !self.indices.contains_key(w) {
                        self.strongconnect(w);
                        let low = self.lowlinks[v].min(self.lowlinks[w]);
                        self.lowlinks.insert(v, low);
                    } else if self.on_stack.contains(w) {
                        let low = self.lowlinks[v].min(self.indices[w]);
                        self.lowlinks.insert(v, low);
                    }
                }
            }

            if self.lowlinks[v] == self.indices[v] {
                let mut component = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack.remove(w);
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                self.components.push(component);
            }
        }
    }

    let mut tarjan = Tarjan {
        edges,
        index: 0,
        indices: HashMap::new(),
        lowlinks: HashMap::new(),
        stack: Vec::new(),
        on_stack: BTreeSet::new(),
        components: Vec::new(),
    };

    for name in registry.keys() {
        if !tarjan.indices.contains_key(name.as_str()) {
            tarjan.strongconnect(name);
        }
    }

    let mut circular = BTreeSet::new();
    for component in &tarjan.components {
        let is_circular = component.len() > 1
            || component.first().is_some_and(|name| {
                edges
                    .get(*name)
                    .is_some_and(|deps| deps.iter().any(|d| d == name))
            });
        if is_circular {
            for name in component {
                circular.insert((*name).to_string());
            }
        }
    }
    circular
}
