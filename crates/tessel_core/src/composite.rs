//! Composite field bindings
//!
//! A composite field (a vector made of three floats, a bounds made of two
//! vectors) owns sub-fields and derives its own value from them. Every store
//! into a child re-derives the parent from the *current* values of all
//! children, attached or not. Re-derivation goes through [`batch::defer`], so
//! several children changed inside one [`batch`](crate::batch::batch) produce
//! a single parent notification. A child store that skipped notification
//! updates the parent silently too. Child events stop at the composite.
//!
//! Pushing a parent value down to the children is the composite's job; it
//! registers the push with [`CompositeBinding::push_down`], which writes the
//! children without re-deriving from half-updated siblings.

use std::cell::Cell;
use std::rc::Rc;

use crate::batch;
use crate::field::{Field, FieldValue, WeakField};
use crate::notify::{FieldId, ObserverId};

/// Re-derives a parent field whenever one of its children is stored
pub struct CompositeBinding<P: FieldValue> {
    parent: WeakField<P>,
    key: FieldId,
    rederive: Rc<dyn Fn()>,
    /// Set while the parent writes its children
    pushing: Rc<Cell<bool>>,
    /// Some child store since the last derivation asked to notify
    notify_pending: Rc<Cell<bool>>,
    watched: Vec<(FieldId, ObserverId)>,
}

impl<P: FieldValue> CompositeBinding<P> {
    /// Bind `parent` to a derivation from its children
    ///
    /// `derive` should hold weak handles to the children and return `None`
    /// once any of them is gone.
    pub fn new(parent: &Field<P>, derive: impl Fn() -> Option<P> + 'static) -> Self {
        let weak = parent.downgrade();
        let target = weak.clone();
        let notify_pending = Rc::new(Cell::new(false));
        let notify = notify_pending.clone();
        let rederive: Rc<dyn Fn()> = Rc::new(move || {
            let notify = notify.replace(false);
            let Some(parent) = target.upgrade() else {
                return;
            };
            let Some(value) = derive() else {
                return;
            };
            if notify {
                parent.set_value(value);
            } else if !parent.with_value(|current| current.same_value(&value)) {
                parent.set_value_without_notify(value);
            }
        });
        Self {
            parent: weak,
            key: parent.id(),
            rederive,
            pushing: Rc::new(Cell::new(false)),
            notify_pending,
            watched: Vec::new(),
        }
    }

    /// Observe `child`, making it a bubbling child of the parent
    pub fn watch<C: FieldValue>(&mut self, child: &Field<C>) {
        if let Some(parent) = self.parent.upgrade() {
            child.set_parent(&parent);
        }
        let key = self.key;
        let work = self.rederive.clone();
        let pushing = self.pushing.clone();
        let notify_pending = self.notify_pending.clone();
        child.on_stored_with_notify(move |_, notify| {
            if pushing.get() {
                return;
            }
            if notify {
                notify_pending.set(true);
            }
            batch::defer(key, work.clone());
        });
        let id = child.subscribe(|event| event.stop_propagation());
        self.watched.push((child.id(), id));
    }

    /// Run `push` after every store into the parent
    ///
    /// Child stores made by `push` do not re-derive the parent.
    pub fn push_down(&self, push: impl Fn(&P) + 'static) {
        let Some(parent) = self.parent.upgrade() else {
            return;
        };
        let pushing = self.pushing.clone();
        parent.on_stored(move |value| {
            let was_pushing = pushing.replace(true);
            push(value);
            pushing.set(was_pushing);
        });
    }

    /// Re-derive the parent now, notifying if the value changed
    pub fn rederive(&self) {
        self.notify_pending.set(true);
        (self.rederive)();
    }

    /// Ids of the watched children and their observers
    pub fn watched(&self) -> &[(FieldId, ObserverId)] {
        &self.watched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::batch;
    use std::cell::RefCell;

    struct Pair {
        parent: Field<String>,
        a: Field<i32>,
        b: Field<i32>,
        _binding: CompositeBinding<String>,
    }

    fn pair() -> Pair {
        let parent = Field::new(String::from("0:0"));
        let a = Field::new(0);
        let b = Field::new(0);
        for f in [&a, &b] {
            f.attach();
        }
        parent.attach();

        let (wa, wb) = (a.downgrade(), b.downgrade());
        let mut binding = CompositeBinding::new(&parent, move || {
            Some(format!("{}:{}", wa.upgrade()?.value(), wb.upgrade()?.value()))
        });
        binding.watch(&a);
        binding.watch(&b);

        let (wa, wb) = (a.downgrade(), b.downgrade());
        binding.push_down(move |text: &String| {
            let mut parts = text.split(':').map(|p| p.parse::<i32>().unwrap_or_default());
            for child in [&wa, &wb] {
                if let (Some(child), Some(part)) = (child.upgrade(), parts.next()) {
                    child.set_value_without_notify(part);
                }
            }
        });

        Pair {
            parent,
            a,
            b,
            _binding: binding,
        }
    }

    #[test]
    fn test_batched_children_notify_parent_once() {
        let p = pair();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        p.parent
            .subscribe(move |e| l.borrow_mut().push(e.new_value().clone()));

        batch(|| {
            p.a.set_value(1);
            p.b.set_value(2);
        });
        assert_eq!(*log.borrow(), vec!["1:2".to_string()]);
    }

    #[test]
    fn test_unbatched_child_rederives_immediately() {
        let p = pair();
        p.a.set_value(3);
        assert_eq!(p.parent.value(), "3:0");
        p.b.set_value(4);
        assert_eq!(p.parent.value(), "3:4");
    }

    #[test]
    fn test_child_event_does_not_reach_grandparent() {
        let p = pair();
        let grandparent = Field::new(0u8);
        p.parent.set_parent(&grandparent);

        let raw_child_events = Rc::new(RefCell::new(0));
        let r = raw_child_events.clone();
        grandparent.node().add_bubble_handler(move |change| {
            if change.downcast::<i32>().is_some() {
                *r.borrow_mut() += 1;
            }
        });

        p.a.set_value(5);
        assert_eq!(*raw_child_events.borrow(), 0);
        assert_eq!(p.parent.value(), "5:0");
    }

    #[test]
    fn test_detached_children_still_rederive_parent() {
        let p = pair();
        for f in [&p.a, &p.b] {
            f.detach();
        }
        p.parent.detach();

        p.a.set_value(1);
        assert_eq!(p.parent.value(), "1:0");
        p.b.set_value_without_notify(6);
        assert_eq!(p.parent.value(), "1:6");
    }

    #[test]
    fn test_silent_child_store_updates_parent_silently() {
        let p = pair();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        p.parent
            .subscribe(move |e| l.borrow_mut().push(e.new_value().clone()));

        p.a.set_value_without_notify(7);
        assert_eq!(p.parent.value(), "7:0");
        assert!(log.borrow().is_empty());

        p.b.set_value(1);
        assert_eq!(*log.borrow(), vec!["7:1".to_string()]);
    }

    #[test]
    fn test_push_down_does_not_rederive_from_half_pushed_children() {
        let p = pair();
        let stores = Rc::new(RefCell::new(Vec::new()));
        let s = stores.clone();
        p.parent.on_stored(move |v| s.borrow_mut().push(v.clone()));

        p.parent.set_value("4:5".to_string());
        assert_eq!((p.a.value(), p.b.value()), (4, 5));
        assert_eq!(p.parent.value(), "4:5");
        assert_eq!(*stores.borrow(), vec!["4:5".to_string()]);
    }
}
