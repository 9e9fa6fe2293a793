use crate::{
    schema::app::{ClassDef, ClassId, ClassKind},
    Error, Metadata, Result,
};
use indexmap::IndexSet;

/// Where a newly declared class sits in the hierarchy.
#[derive(Debug)]
pub(super) struct Resolved {
    /// The single mapped class the new class inherits from
    pub(super) mapped_base: Option<ClassId>,

    /// Abstract concrete base reached without crossing a mapped class
    pub(super) abstract_concrete_base: Option<ClassId>,

    /// Unmapped ancestors reached without crossing a mapped class,
    /// ancestors first
    pub(super) local_unmapped: Vec<ClassId>,

    /// Every unmapped ancestor, ancestors first
    pub(super) all_unmapped: Vec<ClassId>,
}

/// Walks the declared bases of `def`, depth first and left to right.
///
/// Unmapped classes are traversed; mapped classes end the walk along their
/// path. Exactly zero or one distinct mapped class may be found.
pub(super) fn resolve(metadata: &Metadata, def: &ClassDef) -> Result<Resolved> {
    let mut candidates = vec![];
    let mut local_unmapped = IndexSet::new();
    walk_to_mapped(
        metadata,
        &def.bases,
        &mut IndexSet::new(),
        &mut candidates,
        &mut local_unmapped,
    );

    // A candidate that is an ancestor of another candidate collapses into it
    let mapped: Vec<ClassId> = candidates
        .iter()
        .copied()
        .filter(|candidate| {
            !candidates
                .iter()
                .any(|other| other != candidate && metadata.is_descendant(*other, *candidate))
        })
        .collect();

    if mapped.len() > 1 {
        let names = mapped
            .iter()
            .map(|id| format!("'{}'", metadata.class_name(*id)))
            .collect::<Vec<_>>()
            .join(", ");

        return Err(Error::configuration(format!(
            "Class '{}' has multiple mapped bases: [{names}]",
            def.name
        )));
    }

    let mut all = IndexSet::new();
    walk_all(metadata, &def.bases, &mut all);

    let all_unmapped = all
        .into_iter()
        .filter(|id| !is_mapped_node(metadata, *id))
        .collect();

    // Unmapped classes the mapped base already inherits from have been
    // materialized on it.
    let mut inherited = IndexSet::new();
    if let Some(base) = mapped.first() {
        walk_all(metadata, &metadata.class(*base).bases, &mut inherited);
    }

    let local_unmapped: Vec<ClassId> = local_unmapped
        .into_iter()
        .filter(|id| !inherited.contains(id))
        .collect();
    let abstract_concrete_base = local_unmapped
        .iter()
        .rev()
        .copied()
        .find(|id| metadata.class(*id).kind == ClassKind::AbstractConcreteBase);

    Ok(Resolved {
        mapped_base: mapped.first().copied(),
        abstract_concrete_base,
        local_unmapped,
        all_unmapped,
    })
}

/// Mapped nodes end a walk. Abstract concrete bases are filtered like
/// unmapped classes: they have no table for subclasses to inherit from.
fn is_mapped_node(metadata: &Metadata, id: ClassId) -> bool {
    matches!(
        metadata.class(id).kind,
        ClassKind::Mapped | ClassKind::ConcreteBase
    )
}

fn walk_to_mapped(
    metadata: &Metadata,
    bases: &[ClassId],
    visited: &mut IndexSet<ClassId>,
    mapped: &mut Vec<ClassId>,
    unmapped: &mut IndexSet<ClassId>,
) {
    for base in bases {
        if !visited.insert(*base) {
            continue;
        }

        if is_mapped_node(metadata, *base) {
            mapped.push(*base);
            continue;
        }

        walk_to_mapped(metadata, &metadata.class(*base).bases, visited, mapped, unmapped);
        unmapped.insert(*base);
    }
}

fn walk_all(metadata: &Metadata, bases: &[ClassId], visited: &mut IndexSet<ClassId>) {
    for base in bases {
        if visited.contains(base) {
            continue;
        }

        walk_all(metadata, &metadata.class(*base).bases, visited);
        visited.insert(*base);
    }
}
