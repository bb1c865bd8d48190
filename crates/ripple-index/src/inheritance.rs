use std::collections::{BTreeMap, BTreeSet, VecDeque};

use smol_str::SmolStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InheritanceEdge {
    pub subtype: SmolStr,
    pub supertype: SmolStr,
}

/// Inheritance index: type name → direct subtypes/supertypes.
///
/// Edges may name types that are not part of the universe (for example `java.lang.Object`
/// when the JDK is not loaded); callers filter those out when materializing hierarchies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InheritanceIndex {
    edges: Vec<InheritanceEdge>,
    subtypes: BTreeMap<SmolStr, Vec<SmolStr>>,
    supertypes: BTreeMap<SmolStr, Vec<SmolStr>>,
}

impl InheritanceIndex {
    pub fn extend(&mut self, edges: impl IntoIterator<Item = InheritanceEdge>) {
        self.edges.extend(edges);
        self.rebuild_maps();
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn direct_supertypes(&self, ty: &str) -> &[SmolStr] {
        self.supertypes.get(ty).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn direct_subtypes(&self, ty: &str) -> &[SmolStr] {
        self.subtypes.get(ty).map(Vec::as_slice).unwrap_or_default()
    }

    /// All known (transitive) subtypes of `base`, breadth first.
    #[must_use]
    pub fn all_subtypes(&self, base: &str) -> Vec<SmolStr> {
        walk(&self.subtypes, base)
    }

    /// All known (transitive) supertypes of `base`, breadth first.
    #[must_use]
    pub fn all_supertypes(&self, base: &str) -> Vec<SmolStr> {
        walk(&self.supertypes, base)
    }

    fn rebuild_maps(&mut self) {
        self.subtypes.clear();
        self.supertypes.clear();

        for edge in &self.edges {
            self.subtypes
                .entry(edge.supertype.clone())
                .or_default()
                .push(edge.subtype.clone());
            self.supertypes
                .entry(edge.subtype.clone())
                .or_default()
                .push(edge.supertype.clone());
        }

        // Keep results stable for deterministic tests.
        for children in self.subtypes.values_mut() {
            children.sort();
            children.dedup();
        }
        for parents in self.supertypes.values_mut() {
            parents.sort();
            parents.dedup();
        }
    }
}

fn walk(map: &BTreeMap<SmolStr, Vec<SmolStr>>, base: &str) -> Vec<SmolStr> {
    let mut out = Vec::new();
    let mut seen: BTreeSet<SmolStr> = BTreeSet::new();
    seen.insert(SmolStr::new(base));
    let mut queue: VecDeque<SmolStr> = map
        .get(base)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .collect();

    // Cyclic input (invalid Java, but possible mid-edit) must not loop forever.
    while let Some(next) = queue.pop_front() {
        if !seen.insert(next.clone()) {
            continue;
        }
        out.push(next.clone());
        if let Some(children) = map.get(&next) {
            queue.extend(children.iter().cloned());
        }
    }

    out
}
