//! Ordered, observable lists of shared primitive entities.
//!
//! An [`ObjectList`] is a cheap-to-clone handle: clones share the same
//! elements and observer registry, which is what undo commands need to keep
//! editing a list they captured earlier. Deep copies are explicit.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use uuid::Uuid;

use crate::error::{EditorError, EditorResult};
use crate::sexp::SExpr;
use crate::signal::Signal;
use crate::types::Version;
use crate::{shared, Shared};

/// Requirements on element types stored in an [`ObjectList`].
pub trait ListItem: Clone + PartialEq + std::fmt::Debug + 'static {
    /// The s-expression tag name of one element; also used in command texts
    /// and error messages.
    const TAG: &'static str;

    /// Per-field change event type of the element.
    type Event: Clone + std::fmt::Debug + 'static;

    /// The element's identity.
    fn uuid(&self) -> Uuid;

    /// The element's name, for types addressable by name.
    fn name_key(&self) -> Option<String> {
        None
    }

    /// The element's change-event stream.
    fn on_edited(&self) -> &Signal<Self::Event>;

    /// Serializes the element's content into `root` (a node tagged
    /// [`Self::TAG`]).
    fn serialize(&self, root: &mut SExpr);

    /// Deserializes an element from a node tagged [`Self::TAG`].
    ///
    /// # Errors
    ///
    /// Returns a parse or validation error on malformed content.
    fn deserialize(node: &SExpr, format: &Version) -> EditorResult<Self>;
}

/// What happened to a list element.
#[derive(Debug, Clone)]
pub enum ListChange<E> {
    /// The element was inserted.
    Added,
    /// The element was removed.
    Removed,
    /// A field of the element changed; carries the element's event.
    Edited(E),
}

/// Notification payload delivered to list observers.
#[derive(Debug, Clone)]
pub struct ListEvent<T: ListItem> {
    /// Index of the element at the time of the event.
    pub index: usize,
    /// The affected element.
    pub element: Shared<T>,
    /// What happened.
    pub change: ListChange<T::Event>,
}

struct Entry<T: ListItem> {
    element: Shared<T>,
    forward_id: u64,
}

struct Inner<T: ListItem> {
    entries: Vec<Entry<T>>,
}

/// An ordered list of shared elements with uuid/name lookup and observer
/// notification on insert, remove and edit.
pub struct ObjectList<T: ListItem> {
    inner: Rc<RefCell<Inner<T>>>,
    on_changed: Rc<Signal<ListEvent<T>>>,
}

impl<T: ListItem> ObjectList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                entries: Vec::new(),
            })),
            on_changed: Rc::new(Signal::new()),
        }
    }

    /// The observer signal; events fire on insert, remove and element edit.
    #[must_use]
    pub fn on_changed(&self) -> &Signal<ListEvent<T>> {
        &self.on_changed
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Inserts an element, clamping `index` into `[0, len]`. Returns the
    /// actual index.
    pub fn insert(&self, index: usize, element: Shared<T>) -> usize {
        let index = index.min(self.len());
        let forward_id = self.subscribe_forwarding(&element);
        self.inner.borrow_mut().entries.insert(
            index,
            Entry {
                element: Rc::clone(&element),
                forward_id,
            },
        );
        self.notify(index, element, ListChange::Added);
        index
    }

    /// Appends an element and returns its index.
    pub fn append(&self, element: Shared<T>) -> usize {
        self.insert(self.len(), element)
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::OutOfRange`] if `index` is out of bounds.
    pub fn remove(&self, index: usize) -> EditorResult<Shared<T>> {
        let entry = {
            let mut inner = self.inner.borrow_mut();
            if index >= inner.entries.len() {
                return Err(EditorError::out_of_range(index, inner.entries.len()));
            }
            inner.entries.remove(index)
        };
        entry.element.borrow().on_edited().unsubscribe(entry.forward_id);
        self.notify(index, Rc::clone(&entry.element), ListChange::Removed);
        Ok(entry.element)
    }

    /// Removes and returns the element with the given uuid.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::KeyNotFound`] if there is none.
    pub fn take_by_uuid(&self, uuid: Uuid) -> EditorResult<Shared<T>> {
        let index = self
            .index_of_uuid(uuid)
            .ok_or_else(|| EditorError::key_not_found(T::TAG, uuid))?;
        self.remove(index)
    }

    /// Removes and returns the element with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::KeyNotFound`] if there is none.
    pub fn take_by_name(&self, name: &str) -> EditorResult<Shared<T>> {
        let index = self
            .index_of_name(name)
            .ok_or_else(|| EditorError::key_not_found(T::TAG, name))?;
        self.remove(index)
    }

    /// Removes and returns the given element.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::KeyNotFound`] if the element is not contained.
    pub fn take(&self, element: &Shared<T>) -> EditorResult<Shared<T>> {
        let index = self
            .index_of(element)
            .ok_or_else(|| EditorError::key_not_found(T::TAG, element.borrow().uuid()))?;
        self.remove(index)
    }

    /// Swaps the elements at `i` and `j`.
    ///
    /// Implemented as two removes and two inserts, so observers see a
    /// remove/insert pair per moved element.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::OutOfRange`] if either index is out of bounds.
    pub fn swap(&self, i: usize, j: usize) -> EditorResult<()> {
        let count = self.len();
        if i >= count {
            return Err(EditorError::out_of_range(i, count));
        }
        if j >= count {
            return Err(EditorError::out_of_range(j, count));
        }
        if i == j {
            return Ok(());
        }
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        let element_j = self.remove(j)?;
        let element_i = self.remove(i)?;
        self.insert(i, element_j);
        self.insert(j, element_i);
        Ok(())
    }

    /// Index of the given element (pointer identity).
    #[must_use]
    pub fn index_of(&self, element: &Shared<T>) -> Option<usize> {
        self.inner
            .borrow()
            .entries
            .iter()
            .position(|entry| Rc::ptr_eq(&entry.element, element))
    }

    /// Index of the element with the given uuid.
    #[must_use]
    pub fn index_of_uuid(&self, uuid: Uuid) -> Option<usize> {
        self.inner
            .borrow()
            .entries
            .iter()
            .position(|entry| entry.element.borrow().uuid() == uuid)
    }

    /// Index of the element with the given name.
    #[must_use]
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.inner
            .borrow()
            .entries
            .iter()
            .position(|entry| entry.element.borrow().name_key().as_deref() == Some(name))
    }

    /// The element at `index`, if any.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<Shared<T>> {
        self.inner
            .borrow()
            .entries
            .get(index)
            .map(|entry| Rc::clone(&entry.element))
    }

    /// The element with the given uuid, if any.
    #[must_use]
    pub fn find(&self, uuid: Uuid) -> Option<Shared<T>> {
        self.index_of_uuid(uuid).and_then(|i| self.value(i))
    }

    /// The element with the given name, if any.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<Shared<T>> {
        self.index_of_name(name).and_then(|i| self.value(i))
    }

    /// The element with the given uuid.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::KeyNotFound`] if there is none.
    pub fn get(&self, uuid: Uuid) -> EditorResult<Shared<T>> {
        self.find(uuid)
            .ok_or_else(|| EditorError::key_not_found(T::TAG, uuid))
    }

    /// The element with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::KeyNotFound`] if there is none.
    pub fn get_by_name(&self, name: &str) -> EditorResult<Shared<T>> {
        self.find_by_name(name)
            .ok_or_else(|| EditorError::key_not_found(T::TAG, name))
    }

    /// Whether an element with the given name is contained.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.index_of_name(name).is_some()
    }

    /// Snapshot of all elements in order.
    #[must_use]
    pub fn elements(&self) -> Vec<Shared<T>> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|entry| Rc::clone(&entry.element))
            .collect()
    }

    /// All element uuids in list order.
    #[must_use]
    pub fn uuids(&self) -> Vec<Uuid> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|entry| entry.element.borrow().uuid())
            .collect()
    }

    /// The set of element uuids.
    #[must_use]
    pub fn uuid_set(&self) -> BTreeSet<Uuid> {
        self.uuids().into_iter().collect()
    }

    /// A new handle sharing the elements, reordered by uuid. `self` is not
    /// mutated.
    #[must_use]
    pub fn sorted_by_uuid(&self) -> Self {
        self.sorted_by(|a, b| a.borrow().uuid().cmp(&b.borrow().uuid()))
    }

    /// A new handle sharing the elements, reordered by name. `self` is not
    /// mutated.
    #[must_use]
    pub fn sorted_by_name(&self) -> Self {
        self.sorted_by(|a, b| a.borrow().name_key().cmp(&b.borrow().name_key()))
    }

    fn sorted_by(&self, compare: impl Fn(&Shared<T>, &Shared<T>) -> std::cmp::Ordering) -> Self {
        let list = Self::new();
        let mut elements = self.elements();
        elements.sort_by(compare);
        for element in elements {
            list.append(element);
        }
        list
    }

    /// Replaces the contents with deep copies of `other`'s elements,
    /// notifying observers about every removal and insertion.
    pub fn assign(&self, other: &Self) {
        self.clear();
        for element in other.elements() {
            self.append(shared(element.borrow().clone()));
        }
    }

    /// A new independent list with deep copies of all elements and no
    /// observers.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        let list = Self::new();
        for element in self.elements() {
            list.append(shared(element.borrow().clone()));
        }
        list
    }

    /// Removes all elements, notifying observers newest-first.
    pub fn clear(&self) {
        while !self.is_empty() {
            let _ = self.remove(self.len() - 1);
        }
    }

    /// Serializes all elements as children of `root`, one node per element
    /// tagged [`ListItem::TAG`].
    pub fn serialize_into(&self, root: &mut SExpr) {
        for element in self.elements() {
            let child = root.append_child(T::TAG);
            element.borrow().serialize(child);
        }
    }

    /// Deserializes all children of `node` tagged [`ListItem::TAG`].
    ///
    /// # Errors
    ///
    /// Returns a parse or validation error on malformed content.
    pub fn deserialize_from(node: &SExpr, format: &Version) -> EditorResult<Self> {
        let list = Self::new();
        for child in node.query(T::TAG) {
            list.append(shared(T::deserialize(child, format)?));
        }
        Ok(list)
    }

    fn subscribe_forwarding(&self, element: &Shared<T>) -> u64 {
        let weak_inner: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        let weak_signal: Weak<Signal<ListEvent<T>>> = Rc::downgrade(&self.on_changed);
        let weak_element: Weak<RefCell<T>> = Rc::downgrade(element);
        element.borrow().on_edited().subscribe_raw(move |event| {
            let (Some(inner), Some(signal), Some(element)) = (
                weak_inner.upgrade(),
                weak_signal.upgrade(),
                weak_element.upgrade(),
            ) else {
                return;
            };
            let index = inner
                .borrow()
                .entries
                .iter()
                .position(|entry| Rc::ptr_eq(&entry.element, &element));
            if let Some(index) = index {
                signal.notify(&ListEvent {
                    index,
                    element,
                    change: ListChange::Edited(event.clone()),
                });
            }
        })
    }

    fn notify(&self, index: usize, element: Shared<T>, change: ListChange<T::Event>) {
        self.on_changed.notify(&ListEvent {
            index,
            element,
            change,
        });
    }
}

impl<T: ListItem> Default for ObjectList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones the handle; both handles share elements and observers.
impl<T: ListItem> Clone for ObjectList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            on_changed: Rc::clone(&self.on_changed),
        }
    }
}

/// Lists are equal iff their elements are pairwise deep-equal.
impl<T: ListItem> PartialEq for ObjectList<T> {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        let lhs = self.elements();
        let rhs = other.elements();
        lhs.len() == rhs.len()
            && lhs
                .iter()
                .zip(&rhs)
                .all(|(a, b)| *a.borrow() == *b.borrow())
    }
}

impl<T: ListItem> std::fmt::Debug for ObjectList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectList")
            .field("tag", &T::TAG)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::PackagePad;
    use crate::types::CircuitIdentifier;

    fn pad(name: &str) -> Shared<PackagePad> {
        shared(PackagePad::new(
            Uuid::new_v4(),
            CircuitIdentifier::new(name).unwrap(),
        ))
    }

    fn pads(names: &[&str]) -> ObjectList<PackagePad> {
        let list = ObjectList::new();
        for name in names {
            list.append(pad(name));
        }
        list
    }

    #[test]
    fn insert_clamps_the_index() {
        let list = pads(&["1", "2"]);
        let index = list.insert(99, pad("3"));
        assert_eq!(index, 2);
        let index = list.insert(0, pad("0"));
        assert_eq!(index, 0);
        assert_eq!(list.len(), 4);
        assert_eq!(list.value(0).unwrap().borrow().name().as_str(), "0");
    }

    #[test]
    fn lookup_by_uuid_name_and_index() {
        let list = pads(&["1", "2", "3"]);
        let second = list.value(1).unwrap();
        let uuid = second.borrow().uuid();
        assert_eq!(list.index_of_uuid(uuid), Some(1));
        assert_eq!(list.index_of_name("3"), Some(2));
        assert!(Shared::ptr_eq(&list.get(uuid).unwrap(), &second));
        assert!(Shared::ptr_eq(&list.get_by_name("2").unwrap(), &second));
        assert!(matches!(
            list.get_by_name("9"),
            Err(EditorError::KeyNotFound { kind: "pad", .. })
        ));
        assert!(matches!(
            list.remove(7),
            Err(EditorError::OutOfRange { index: 7, count: 3 })
        ));
    }

    #[test]
    fn take_by_name_removes_and_returns() {
        let list = pads(&["1", "2"]);
        let taken = list.take_by_name("1").unwrap();
        assert_eq!(taken.borrow().name().as_str(), "1");
        assert_eq!(list.len(), 1);
        assert!(list.take_by_name("1").is_err());
    }

    #[test]
    fn swap_notifies_with_remove_insert_pairs() {
        let list = pads(&["1", "2", "3"]);
        let log: Shared<Vec<String>> = shared(Vec::new());
        let log2 = Shared::clone(&log);
        let _subscription = list.on_changed().subscribe(move |event| {
            let kind = match event.change {
                ListChange::Added => "add",
                ListChange::Removed => "remove",
                ListChange::Edited(_) => "edit",
            };
            log2.borrow_mut().push(format!("{kind}@{}", event.index));
        });

        list.swap(0, 2).unwrap();
        assert_eq!(list.uuids()[0], list.sorted_by_name().uuids()[2]);
        assert_eq!(
            *log.borrow(),
            vec!["remove@2", "remove@0", "add@0", "add@2"]
        );
    }

    #[test]
    fn element_edits_are_forwarded_with_the_index() {
        let list = pads(&["1", "2"]);
        let log: Shared<Vec<usize>> = shared(Vec::new());
        let log2 = Shared::clone(&log);
        let _subscription = list.on_changed().subscribe(move |event| {
            if matches!(event.change, ListChange::Edited(_)) {
                log2.borrow_mut().push(event.index);
            }
        });

        list.value(1)
            .unwrap()
            .borrow_mut()
            .set_name(CircuitIdentifier::new("9").unwrap());
        assert_eq!(*log.borrow(), vec![1]);

        // A removed element no longer notifies the list.
        let removed = list.remove(1).unwrap();
        removed
            .borrow_mut()
            .set_name(CircuitIdentifier::new("8").unwrap());
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn sorted_copies_share_elements_without_reordering_self() {
        let list = pads(&["2", "1"]);
        let sorted = list.sorted_by_name();
        assert_eq!(sorted.value(0).unwrap().borrow().name().as_str(), "1");
        assert_eq!(list.value(0).unwrap().borrow().name().as_str(), "2");
        assert!(Shared::ptr_eq(
            &sorted.value(0).unwrap(),
            &list.value(1).unwrap()
        ));
    }

    #[test]
    fn equality_is_pairwise_deep() {
        let list = pads(&["1", "2"]);
        let copy = list.deep_copy();
        assert_eq!(list, copy);
        copy.value(0)
            .unwrap()
            .borrow_mut()
            .set_name(CircuitIdentifier::new("9").unwrap());
        assert_ne!(list, copy);
        assert_ne!(list, pads(&["1"]));
    }

    #[test]
    fn assign_replaces_contents_with_copies() {
        let list = pads(&["1"]);
        let other = pads(&["2", "3"]);
        list.assign(&other);
        assert_eq!(list, other);
        assert!(!Shared::ptr_eq(
            &list.value(0).unwrap(),
            &other.value(0).unwrap()
        ));
    }
}
