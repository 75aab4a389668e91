//! Candidate sets of inferred values
//!
//! A `TypeSet` is what every query on a composite returns: zero or more
//! candidate values, each either a plain [`Type`] or a handle to a composite
//! registered in a [`ProtocolStore`]. Sets keep first-insertion order and
//! never hold duplicates; equality ignores order.

use crate::core::types::Type;
use crate::protocols::{CompositeId, ProtocolStore};
use smallvec::SmallVec;
use std::collections::HashSet;
use std::fmt;

/// Size at which membership checks switch from a scan to a hash lookup
const INDEX_THRESHOLD: usize = 8;

/// One candidate of a [`TypeSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Type(Type),
    /// Identity of a composite; two handles are equal only if they name the
    /// same registered composite.
    Composite(CompositeId),
}

impl From<Type> for Value {
    fn from(ty: Type) -> Self {
        Value::Type(ty)
    }
}

impl From<CompositeId> for Value {
    fn from(id: CompositeId) -> Self {
        Value::Composite(id)
    }
}

#[derive(Clone, Default)]
pub struct TypeSet {
    values: SmallVec<[Value; 4]>,
    index: Option<HashSet<Value>>,
}

impl TypeSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(value: impl Into<Value>) -> Self {
        let mut set = Self::empty();
        set.insert(value.into());
        set
    }

    /// Insert a value, returning `false` if it was already present
    pub fn insert(&mut self, value: Value) -> bool {
        if self.contains(&value) {
            return false;
        }

        match &mut self.index {
            Some(index) => {
                index.insert(value.clone());
            }
            None if self.values.len() + 1 >= INDEX_THRESHOLD => {
                let mut index: HashSet<Value> = self.values.iter().cloned().collect();
                index.insert(value.clone());
                self.index = Some(index);
            }
            None => {}
        }
        self.values.push(value);
        true
    }

    pub fn union(&self, other: &TypeSet) -> TypeSet {
        let mut result = self.clone();
        result.extend(other.iter().cloned());
        result
    }

    pub fn union_all<I>(sets: I) -> TypeSet
    where
        I: IntoIterator<Item = TypeSet>,
    {
        let mut result = TypeSet::empty();
        for set in sets {
            if result.is_empty() {
                result = set;
            } else {
                result.extend(set.values);
            }
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn contains(&self, value: &Value) -> bool {
        match &self.index {
            Some(index) => index.contains(value),
            None => self.values.contains(value),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Ids of the composite candidates, in set order
    pub fn composites(&self) -> impl Iterator<Item = CompositeId> + '_ {
        self.values.iter().filter_map(|v| match v {
            Value::Composite(id) => Some(*id),
            Value::Type(_) => None,
        })
    }

    /// Merge composite candidates that are union-equal.
    ///
    /// Composites compare equal by kind only when facts are merged, so at
    /// most one composite survives; plain types are kept as they are.
    pub fn collapse_composites(&self, store: &ProtocolStore) -> TypeSet {
        let mut result = TypeSet::empty();
        let mut kept: Vec<CompositeId> = Vec::new();

        for value in self.iter() {
            let Value::Composite(id) = value else {
                result.insert(value.clone());
                continue;
            };
            let Some(candidate) = store.get(*id) else {
                result.insert(value.clone());
                continue;
            };

            let merged = kept.iter().position(|k| {
                store.get(*k).map_or(false, |existing| existing.union_equals(&candidate))
            });

            match merged {
                Some(slot) => {
                    if let Some(existing) = store.get(kept[slot]) {
                        let survivor = existing.union_merge(&candidate);
                        kept[slot] = survivor.id();
                    }
                }
                None => kept.push(*id),
            }
        }

        for id in kept {
            result.insert(Value::Composite(id));
        }
        result
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.iter()).finish()
    }
}

impl PartialEq for TypeSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl Eq for TypeSet {}

impl Extend<Value> for TypeSet {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl FromIterator<Value> for TypeSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = TypeSet::empty();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a TypeSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates() {
        let mut set = TypeSet::of(Type::Int);
        assert!(!set.insert(Value::Type(Type::Int)));
        assert!(set.insert(Value::Type(Type::Str)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_union_keeps_first_insertion_order() {
        let a: TypeSet = [Type::Int, Type::Str].into_iter().map(Value::from).collect();
        let b: TypeSet = [Type::Str, Type::Bool].into_iter().map(Value::from).collect();

        let union = a.union(&b);
        let order: Vec<_> = union.iter().cloned().collect();
        assert_eq!(
            order,
            vec![Value::Type(Type::Int), Value::Type(Type::Str), Value::Type(Type::Bool)]
        );
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: TypeSet = [Type::Int, Type::Str].into_iter().map(Value::from).collect();
        let b: TypeSet = [Type::Str, Type::Int].into_iter().map(Value::from).collect();
        assert_eq!(a, b);
        assert_ne!(a, TypeSet::of(Type::Int));
    }

    #[test]
    fn test_large_sets_stay_deduplicated() {
        let store = ProtocolStore::new();
        let ids: Vec<_> = (0..200).map(|_| store.create(None).id()).collect();

        let mut set: TypeSet = ids.iter().copied().map(Value::from).collect();
        assert_eq!(set.len(), 200);
        for id in &ids {
            assert!(!set.insert(Value::from(*id)));
        }
        assert_eq!(set.len(), 200);
        assert_eq!(set.iter().next(), Some(&Value::Composite(ids[0])));

        let reversed: TypeSet = ids.iter().rev().copied().map(Value::from).collect();
        assert_eq!(set, reversed);
        assert_eq!(set.union(&reversed).len(), 200);
    }

    #[test]
    fn test_union_all_of_nothing_is_empty() {
        assert!(TypeSet::union_all(Vec::new()).is_empty());
        let all = TypeSet::union_all(vec![TypeSet::empty(), TypeSet::of(Type::Float)]);
        assert_eq!(all, TypeSet::of(Type::Float));
    }
}
