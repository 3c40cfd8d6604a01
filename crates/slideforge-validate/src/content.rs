//! Matching element children against a content model
//!
//! A particle is matched as a set of reachable child positions: starting
//! from position `p`, which positions can the particle end at? Sequences
//! thread the set through their items, choices take the union, repetition
//! iterates until the occurrence bound or a fixed point. The set never
//! holds more than `children.len() + 1` entries, so nothing backtracks
//! exponentially.

use std::cell::Cell;
use std::collections::BTreeSet;

use crate::schema::{ElementDecl, Particle, QName, SchemaSet, Term};

/// Outcome of matching one element's children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentMatch {
    Valid,
    /// Child at this index cannot be placed
    Unexpected(usize),
    /// Every child was placed but required content is missing
    Incomplete,
}

pub struct ContentMatcher<'a> {
    schemas: &'a SchemaSet,
    /// Furthest child index consumed by any attempt
    furthest: Cell<usize>,
}

impl<'a> ContentMatcher<'a> {
    pub fn new(schemas: &'a SchemaSet) -> Self {
        Self {
            schemas,
            furthest: Cell::new(0),
        }
    }

    /// Match `children` against `particle`; `None` allows no children
    pub fn check(&self, particle: Option<&Particle>, children: &[QName]) -> ContentMatch {
        let Some(particle) = particle else {
            return if children.is_empty() {
                ContentMatch::Valid
            } else {
                ContentMatch::Unexpected(0)
            };
        };

        self.furthest.set(0);
        let ends = self.particle(particle, children, 0);
        if ends.contains(&children.len()) {
            ContentMatch::Valid
        } else if self.furthest.get() < children.len() {
            ContentMatch::Unexpected(self.furthest.get())
        } else {
            ContentMatch::Incomplete
        }
    }

    fn particle(&self, particle: &Particle, children: &[QName], start: usize) -> BTreeSet<usize> {
        let occurs = particle.occurs;
        let mut frontier = BTreeSet::from([start]);

        for _ in 0..occurs.min {
            frontier = self.step(&particle.term, children, &frontier);
            if frontier.is_empty() {
                return frontier;
            }
        }

        let mut reached = frontier.clone();
        let mut count = occurs.min;
        while occurs.allows(count + 1) && !frontier.is_empty() {
            count += 1;
            let next: BTreeSet<usize> = self
                .step(&particle.term, children, &frontier)
                .difference(&reached)
                .copied()
                .collect();
            reached.extend(next.iter().copied());
            frontier = next;
        }
        reached
    }

    fn step(&self, term: &Term, children: &[QName], from: &BTreeSet<usize>) -> BTreeSet<usize> {
        from.iter()
            .flat_map(|&p| self.term(term, children, p))
            .collect()
    }

    fn term(&self, term: &Term, children: &[QName], pos: usize) -> BTreeSet<usize> {
        match term {
            Term::Element(decl) => self.single(children, pos, |q| *q == decl.name),
            Term::ElementRef(name) => self.single(children, pos, |q| q == name),
            Term::Any(wildcard) => self.single(children, pos, |q| wildcard.allows(&q.namespace)),
            Term::Sequence(items) => {
                let mut set = BTreeSet::from([pos]);
                for item in items {
                    set = set
                        .iter()
                        .flat_map(|&p| self.particle(item, children, p))
                        .collect();
                    if set.is_empty() {
                        break;
                    }
                }
                set
            }
            Term::Choice(items) => items
                .iter()
                .flat_map(|item| self.particle(item, children, pos))
                .collect(),
            Term::All(items) => self.all(items, children, pos),
            Term::Group(name) => match self.schemas.group(name) {
                Some(group) => self.particle(group, children, pos),
                // unknown group: accept any run of children
                None => (pos..=children.len()).collect(),
            },
        }
    }

    fn single(&self, children: &[QName], pos: usize, accepts: impl Fn(&QName) -> bool) -> BTreeSet<usize> {
        match children.get(pos) {
            Some(child) if accepts(child) => {
                if pos + 1 > self.furthest.get() {
                    self.furthest.set(pos + 1);
                }
                BTreeSet::from([pos + 1])
            }
            _ => BTreeSet::new(),
        }
    }

    /// `xsd:all`: each item at most once, in any order
    fn all(&self, items: &[Particle], children: &[QName], pos: usize) -> BTreeSet<usize> {
        let mut used = vec![false; items.len()];
        let mut end = pos;
        while let Some(child) = children.get(end) {
            let slot = items
                .iter()
                .enumerate()
                .position(|(i, item)| !used[i] && item_accepts(item, child));
            let Some(i) = slot else { break };
            used[i] = true;
            end += 1;
            if end > self.furthest.get() {
                self.furthest.set(end);
            }
        }
        let complete = items
            .iter()
            .zip(&used)
            .all(|(item, used)| *used || item.occurs.min == 0);
        if complete {
            BTreeSet::from([end])
        } else {
            BTreeSet::new()
        }
    }

    /// Declaration governing `child` inside `particle`, if the particle
    /// names it directly or through groups
    pub fn declaration(&self, particle: &Particle, child: &QName) -> Option<ElementDecl> {
        self.find_decl(particle, child, 0)
    }

    fn find_decl(&self, particle: &Particle, child: &QName, depth: usize) -> Option<ElementDecl> {
        if depth > 64 {
            return None;
        }
        match &particle.term {
            Term::Element(decl) if decl.name == *child => Some(decl.clone()),
            Term::ElementRef(name) if name == child => self.schemas.element(name).cloned(),
            Term::Sequence(items) | Term::Choice(items) | Term::All(items) => items
                .iter()
                .find_map(|item| self.find_decl(item, child, depth + 1)),
            Term::Group(name) => self
                .schemas
                .group(name)
                .and_then(|g| self.find_decl(g, child, depth + 1)),
            _ => None,
        }
    }
}

fn item_accepts(item: &Particle, child: &QName) -> bool {
    match &item.term {
        Term::Element(decl) => decl.name == *child,
        Term::ElementRef(name) => name == child,
        Term::Any(wildcard) => wildcard.allows(&child.namespace),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tests::{sample_set, SAMPLE_NS};
    use crate::schema::{Resolved, TypeRef};

    fn q(local: &str) -> QName {
        QName::new(SAMPLE_NS, local)
    }

    fn names(locals: &[&str]) -> Vec<QName> {
        locals.iter().map(|l| q(l)).collect()
    }

    fn slide_particle(set: &SchemaSet) -> Particle {
        let Resolved::Complex(ty) = set.resolve(Some(&TypeRef::Named(q("CT_Slide")))) else {
            panic!("expected complex type");
        };
        ty.particle.unwrap()
    }

    #[test]
    fn test_sequence_with_repeated_choice() {
        let set = sample_set();
        let particle = slide_particle(&set);
        let m = ContentMatcher::new(&set);

        assert_eq!(m.check(Some(&particle), &names(&["title"])), ContentMatch::Valid);
        assert_eq!(
            m.check(Some(&particle), &names(&["title", "sp", "pic", "sp", "notes", "notes"])),
            ContentMatch::Valid
        );
    }

    #[test]
    fn test_out_of_order_child_is_unexpected() {
        let set = sample_set();
        let particle = slide_particle(&set);
        let m = ContentMatcher::new(&set);

        assert_eq!(
            m.check(Some(&particle), &names(&["title", "notes", "sp"])),
            ContentMatch::Unexpected(2)
        );
        assert_eq!(
            m.check(Some(&particle), &names(&["sp"])),
            ContentMatch::Unexpected(0)
        );
    }

    #[test]
    fn test_max_occurs_enforced() {
        let set = sample_set();
        let particle = slide_particle(&set);
        let m = ContentMatcher::new(&set);
        assert_eq!(
            m.check(Some(&particle), &names(&["title", "notes", "notes", "notes"])),
            ContentMatch::Unexpected(3)
        );
    }

    #[test]
    fn test_missing_required_child_is_incomplete() {
        let set = sample_set();
        let particle = slide_particle(&set);
        let m = ContentMatcher::new(&set);
        assert_eq!(m.check(Some(&particle), &[]), ContentMatch::Incomplete);
    }

    #[test]
    fn test_groups_and_wildcards() {
        let set = sample_set();
        let Resolved::Complex(shape) = set.resolve(Some(&TypeRef::Named(q("CT_Shape")))) else {
            panic!("expected complex type");
        };
        let particle = shape.particle.unwrap();
        let m = ContentMatcher::new(&set);

        let mut children = names(&["name", "r", "br", "r", "extLst"]);
        assert_eq!(m.check(Some(&particle), &children), ContentMatch::Valid);

        children.insert(1, QName::new("urn:elsewhere", "r"));
        assert_eq!(m.check(Some(&particle), &children), ContentMatch::Unexpected(1));

        let decl = m.declaration(&particle, &q("r")).unwrap();
        assert_eq!(decl.type_ref, Some(TypeRef::Named(q("CT_Run"))));
    }

    #[test]
    fn test_all_group_any_order() {
        let set = sample_set();
        let meta = set.element(&q("meta")).unwrap();
        let Resolved::Complex(ty) = set.resolve(meta.type_ref.as_ref()) else {
            panic!("expected complex type");
        };
        let particle = ty.particle.unwrap();
        let m = ContentMatcher::new(&set);

        assert_eq!(m.check(Some(&particle), &names(&["date", "author"])), ContentMatch::Valid);
        assert_eq!(m.check(Some(&particle), &names(&["author"])), ContentMatch::Valid);
        assert_eq!(m.check(Some(&particle), &names(&["date"])), ContentMatch::Incomplete);
        assert_eq!(
            m.check(Some(&particle), &names(&["author", "author"])),
            ContentMatch::Unexpected(1)
        );
    }

    #[test]
    fn test_empty_content_model() {
        let set = sample_set();
        let m = ContentMatcher::new(&set);
        assert_eq!(m.check(None, &[]), ContentMatch::Valid);
        assert_eq!(m.check(None, &names(&["r"])), ContentMatch::Unexpected(0));
    }
}
