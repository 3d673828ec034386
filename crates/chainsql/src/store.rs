//! Immutable builder state.
//!
//! Every builder is a [`Handle`] over an `Arc`'d state record (a [`Kind`]).
//! Mutating operations never touch the receiver: they shallow-clone the record,
//! replace one field and wrap the result in a new handle. Sequence fields are
//! [`List`]s, which are themselves `Arc`-backed, so the clone shares every
//! untouched clause with its predecessor and only the edited list is copied.
//!
//! Kinds are ordinary types implementing [`Kind`]; there is no runtime
//! registry, and using a record that is not a kind is a compile error.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A builder state record.
pub trait Kind: Clone + Default + fmt::Debug + Send + Sync + 'static {
    /// Tag used in `Debug` output.
    const NAME: &'static str;
}

/// Typed accessor for one field of a kind.
pub struct Field<K, T> {
    name: &'static str,
    get: fn(&K) -> &T,
    get_mut: fn(&mut K) -> &mut T,
}

impl<K, T> Field<K, T> {
    pub const fn new(
        name: &'static str,
        get: fn(&K) -> &T,
        get_mut: fn(&mut K) -> &mut T,
    ) -> Self {
        Self { name, get, get_mut }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<K, T> Clone for Field<K, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, T> Copy for Field<K, T> {}

impl<K, T> fmt::Debug for Field<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

/// A shared, copy-on-write sequence.
pub struct List<T>(Arc<Vec<T>>);

impl<T> List<T> {
    pub fn new() -> Self {
        List(Arc::new(Vec::new()))
    }

    /// True when both lists share the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> List<T> {
    fn make_mut(&mut self) -> &mut Vec<T> {
        Arc::make_mut(&mut self.0)
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for List<T> {
    fn clone(&self) -> Self {
        List(Arc::clone(&self.0))
    }
}

impl<T> Deref for List<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<T> From<Vec<T>> for List<T> {
    fn from(items: Vec<T>) -> Self {
        List(Arc::new(items))
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        List(Arc::new(iter.into_iter().collect()))
    }
}

/// An immutable builder value.
pub struct Handle<K: Kind> {
    state: Arc<K>,
}

impl<K: Kind> Handle<K> {
    /// A handle over the zero-valued state.
    pub fn new() -> Self {
        Self::from_state(K::default())
    }

    pub fn from_state(state: K) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// The current state snapshot.
    pub fn state(&self) -> &K {
        &self.state
    }

    pub fn get<T>(&self, field: Field<K, T>) -> &T {
        (field.get)(&self.state)
    }

    /// Return a new handle with `field` replaced by `value`.
    pub fn set<T>(&self, field: Field<K, T>, value: T) -> Self {
        self.update(field, |slot| *slot = value)
    }

    /// Return a new handle with `item` appended to a list field.
    pub fn append<T: Clone>(&self, field: Field<K, List<T>>, item: T) -> Self {
        self.update(field, |list| list.make_mut().push(item))
    }

    /// Return a new handle with `items` appended to a list field.
    pub fn extend<T: Clone>(
        &self,
        field: Field<K, List<T>>,
        items: impl IntoIterator<Item = T>,
    ) -> Self {
        self.update(field, |list| list.make_mut().extend(items))
    }

    /// Return a new handle with `field` reset to its zero value.
    pub fn delete<T: Default>(&self, field: Field<K, T>) -> Self {
        self.set(field, T::default())
    }

    fn update<T>(&self, field: Field<K, T>, edit: impl FnOnce(&mut T)) -> Self {
        let mut next = K::clone(&self.state);
        edit((field.get_mut)(&mut next));
        Self::from_state(next)
    }
}

impl<K: Kind> Clone for Handle<K> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<K: Kind> Default for Handle<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(K::NAME).field(&*self.state).finish()
    }
}

/// Implement [`Kind`] for a state record and declare one [`Field`] constant
/// per accessed field.
macro_rules! kind {
    ($kind:ident as $name:literal { $($konst:ident: $t:ty => $field:ident),* $(,)? }) => {
        impl $crate::store::Kind for $kind {
            const NAME: &'static str = $name;
        }

        #[allow(dead_code)]
        impl $kind {
            $(
                pub(crate) const $konst: $crate::store::Field<$kind, $t> = {
                    fn get(state: &$kind) -> &$t {
                        &state.$field
                    }
                    fn get_mut(state: &mut $kind) -> &mut $t {
                        &mut state.$field
                    }
                    $crate::store::Field::new(stringify!($field), get, get_mut)
                };
            )*
        }
    };
}

pub(crate) use kind;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Probe {
        tag: Option<String>,
        items: List<u32>,
        other: List<u32>,
    }

    kind!(Probe as "Probe" {
        TAG: Option<String> => tag,
        ITEMS: List<u32> => items,
        OTHER: List<u32> => other,
    });

    #[test]
    fn test_set_leaves_receiver_untouched() {
        let a = Handle::<Probe>::new();
        let b = a.set(Probe::TAG, Some("b".to_string()));
        assert_eq!(a.get(Probe::TAG), &None);
        assert_eq!(b.get(Probe::TAG).as_deref(), Some("b"));
    }

    #[test]
    fn test_divergent_appends_from_shared_ancestor() {
        let base = Handle::<Probe>::new().append(Probe::ITEMS, 1);
        let left = base.append(Probe::ITEMS, 2);
        let right = base.extend(Probe::ITEMS, [3, 4]);

        assert_eq!(&base.get(Probe::ITEMS)[..], &[1]);
        assert_eq!(&left.get(Probe::ITEMS)[..], &[1, 2]);
        assert_eq!(&right.get(Probe::ITEMS)[..], &[1, 3, 4]);
    }

    #[test]
    fn test_untouched_fields_are_shared() {
        let base = Handle::<Probe>::new().append(Probe::OTHER, 9);
        let next = base.append(Probe::ITEMS, 1);
        assert!(base.get(Probe::OTHER).ptr_eq(next.get(Probe::OTHER)));
        assert!(!base.get(Probe::ITEMS).ptr_eq(next.get(Probe::ITEMS)));
    }

    #[test]
    fn test_delete_resets_to_zero() {
        let a = Handle::<Probe>::new().extend(Probe::ITEMS, [1, 2]);
        let b = a.delete(Probe::ITEMS);
        assert!(b.get(Probe::ITEMS).is_empty());
        assert_eq!(a.get(Probe::ITEMS).len(), 2);
    }

    #[test]
    fn test_shared_across_threads() {
        let base = Handle::<Probe>::new().append(Probe::ITEMS, 0);
        let handles: Vec<_> = (1..=4u32)
            .map(|i| {
                let base = base.clone();
                std::thread::spawn(move || base.append(Probe::ITEMS, i))
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            let child = h.join().unwrap();
            assert_eq!(&child.get(Probe::ITEMS)[..], &[0, i as u32 + 1]);
        }
        assert_eq!(&base.get(Probe::ITEMS)[..], &[0]);
    }

    #[test]
    fn test_debug_uses_kind_name() {
        let dbg = format!("{:?}", Handle::<Probe>::new());
        assert!(dbg.starts_with("Probe("));
        assert_eq!(Probe::ITEMS.name(), "items");
    }
}
