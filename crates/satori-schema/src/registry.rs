//! # Facet Registry
//!
//! The table of known facets: each descriptor names a facet kind, its
//! activation predicate, the facets it specializes, the facets it cannot be
//! combined with, and a fixed priority used to break ordering ties.
//!
//! The built-in table is a `static` and is never mutated, so it is shared
//! across threads without synchronization.
//!
//! ## Linearization
//!
//! For a normalized spec the registry collects every activated facet plus
//! every facet those transitively specialize (a regex always drags in the
//! type facet). Each facet's count is the number of its ancestors still
//! waiting to be placed. Facets with count zero are placed in ascending
//! priority order; placing one decrements the counts of its descendants.
//! Any facet left with a nonzero count means the specialization edges do
//! not form a consistent order.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use satori_core::Mapping;

use crate::error::SchemaError;
use crate::facet::{type_names, FacetKind};

/// Static description of one facet.
#[derive(Debug, Clone, Copy)]
pub struct FacetDescriptor {
    pub kind: FacetKind,
    /// Tie-break order; lower comes first.
    pub priority: u16,
    /// Facets this one refines. Refined facets run earlier in the chain.
    pub specializes: &'static [FacetKind],
    /// Facets that may not be active together with this one.
    pub excludes: &'static [FacetKind],
    /// Whether a normalized spec activates this facet.
    pub activate: fn(&Mapping) -> bool,
}

/// A read-only set of facet descriptors.
#[derive(Debug, Clone, Copy)]
pub struct Registry<'a> {
    descriptors: &'a [FacetDescriptor],
}

fn single_type_in(spec: &Mapping, names: &[&str]) -> bool {
    match type_names(spec).as_deref() {
        Some([single]) => names.contains(&single.as_str()),
        _ => false,
    }
}

fn has_any(spec: &Mapping, keys: &[&str]) -> bool {
    keys.iter().any(|key| spec.contains_key(*key))
}

const STRUCTURAL: &[FacetKind] = &[FacetKind::Record, FacetKind::Map, FacetKind::List];

static BUILTIN: [FacetDescriptor; 9] = [
    FacetDescriptor {
        kind: FacetKind::Base,
        priority: 0,
        specializes: &[],
        excludes: &[],
        activate: |_| true,
    },
    FacetDescriptor {
        kind: FacetKind::Type,
        priority: 10,
        specializes: &[FacetKind::Base],
        excludes: &[],
        activate: |spec| spec.contains_key("type"),
    },
    FacetDescriptor {
        kind: FacetKind::Options,
        priority: 20,
        specializes: &[FacetKind::Base],
        excludes: &[],
        activate: |spec| spec.contains_key("options"),
    },
    FacetDescriptor {
        kind: FacetKind::Min,
        priority: 30,
        specializes: &[FacetKind::Base],
        excludes: &[],
        activate: |spec| spec.contains_key("min"),
    },
    FacetDescriptor {
        kind: FacetKind::Max,
        priority: 40,
        specializes: &[FacetKind::Base],
        excludes: &[],
        activate: |spec| spec.contains_key("max"),
    },
    FacetDescriptor {
        kind: FacetKind::Regex,
        priority: 50,
        specializes: &[FacetKind::Type],
        excludes: &[],
        activate: |spec| spec.contains_key("regex"),
    },
    FacetDescriptor {
        kind: FacetKind::Record,
        priority: 60,
        specializes: &[FacetKind::Type],
        excludes: STRUCTURAL,
        activate: |spec| has_any(spec, &["fields", "entries"]) || single_type_in(spec, &["record"]),
    },
    FacetDescriptor {
        kind: FacetKind::Map,
        priority: 70,
        specializes: &[FacetKind::Type],
        excludes: STRUCTURAL,
        activate: |spec| has_any(spec, &["key", "value"]) || single_type_in(spec, &["map"]),
    },
    FacetDescriptor {
        kind: FacetKind::List,
        priority: 80,
        specializes: &[FacetKind::Type],
        excludes: STRUCTURAL,
        activate: |spec| {
            has_any(spec, &["item", "element"]) || single_type_in(spec, &["list", "sequence"])
        },
    },
];

static GLOBAL: Registry<'static> = Registry {
    descriptors: &BUILTIN,
};

impl<'a> Registry<'a> {
    /// A registry over a custom descriptor table.
    pub const fn new(descriptors: &'a [FacetDescriptor]) -> Self {
        Self { descriptors }
    }

    /// The process-wide built-in registry.
    pub fn global() -> &'static Registry<'static> {
        &GLOBAL
    }

    pub fn descriptors(&self) -> &'a [FacetDescriptor] {
        self.descriptors
    }

    pub fn descriptor(&self, kind: FacetKind) -> Option<&'a FacetDescriptor> {
        self.descriptors.iter().find(|d| d.kind == kind)
    }

    /// Facets whose activation predicate accepts `spec`.
    pub fn activated(&self, spec: &Mapping) -> BTreeSet<FacetKind> {
        self.descriptors
            .iter()
            .filter(|d| (d.activate)(spec))
            .map(|d| d.kind)
            .collect()
    }

    /// Every facet `kind` transitively specializes. Contains `kind` itself
    /// only if the edges are cyclic.
    pub fn ancestors(&self, kind: FacetKind) -> BTreeSet<FacetKind> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![kind];
        while let Some(current) = stack.pop() {
            let Some(descriptor) = self.descriptor(current) else {
                continue;
            };
            for parent in descriptor.specializes {
                if seen.insert(*parent) {
                    stack.push(*parent);
                }
            }
        }
        seen
    }

    /// Order the facets activated by `spec`, most general first.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Inconsistent` if the facets cannot be ordered,
    /// if two mutually exclusive facets are both active, or if a facet
    /// specializes one that is not registered.
    pub fn linearize(&self, spec: &Mapping) -> Result<Vec<FacetKind>, SchemaError> {
        let activated = self.activated(spec);
        tracing::trace!(facets = ?activated, "activated facets");

        let mut members = BTreeSet::new();
        for kind in &activated {
            members.insert(*kind);
            members.extend(self.ancestors(*kind));
        }

        let missing: Vec<FacetKind> = members
            .iter()
            .copied()
            .filter(|kind| self.descriptor(*kind).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::Inconsistent { facets: missing });
        }

        let excluded: Vec<FacetKind> = members
            .iter()
            .copied()
            .filter(|kind| {
                members.iter().any(|other| {
                    other != kind && (self.excludes(*kind, *other) || self.excludes(*other, *kind))
                })
            })
            .collect();
        if !excluded.is_empty() {
            return Err(SchemaError::Inconsistent { facets: excluded });
        }

        let ancestors: BTreeMap<FacetKind, BTreeSet<FacetKind>> = members
            .iter()
            .map(|kind| (*kind, self.ancestors(*kind)))
            .collect();
        let mut counts: BTreeMap<FacetKind, usize> = ancestors
            .iter()
            .map(|(kind, above)| (*kind, above.intersection(&members).count()))
            .collect();

        let mut ready: BinaryHeap<Reverse<(u16, FacetKind)>> = counts
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(kind, _)| Reverse((self.priority(*kind), *kind)))
            .collect();

        let mut ordered = Vec::with_capacity(members.len());
        while let Some(Reverse((_, kind))) = ready.pop() {
            ordered.push(kind);
            for (descendant, above) in &ancestors {
                if !above.contains(&kind) {
                    continue;
                }
                if let Some(count) = counts.get_mut(descendant) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.push(Reverse((self.priority(*descendant), *descendant)));
                    }
                }
            }
        }

        let stuck: Vec<FacetKind> = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(kind, _)| kind)
            .collect();
        if !stuck.is_empty() {
            return Err(SchemaError::Inconsistent { facets: stuck });
        }
        Ok(ordered)
    }

    fn priority(&self, kind: FacetKind) -> u16 {
        self.descriptor(kind).map_or(u16::MAX, |d| d.priority)
    }

    fn excludes(&self, kind: FacetKind, other: FacetKind) -> bool {
        self.descriptor(kind)
            .is_some_and(|d| d.excludes.contains(&other))
    }
}
