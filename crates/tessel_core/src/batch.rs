//! Update batching for composite re-derivation
//!
//! Setting several sub-fields of a composite in one synchronous turn should
//! produce a single composite-level notification. Inside [`batch`], composite
//! bindings queue their re-derivation with [`defer`] instead of running it;
//! the queue is flushed once the outermost batch closes, each binding running
//! at most once per flush.
//!
//! ```ignore
//! batch(|| {
//!     vector.x().set_value(1.0);
//!     vector.y().set_value(2.0);
//! });
//! // vector observers saw exactly one ChangeEvent<Vec3>
//! ```
//!
//! Deferred work runs while the batch is still considered open, so nested
//! composites (a vector inside a bounds field) are coalesced as well.

use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::notify::FieldId;

type Deferred = (FieldId, Rc<dyn Fn()>);

thread_local! {
    static BATCH_DEPTH: Cell<u32> = const { Cell::new(0) };
    static PENDING: RefCell<SmallVec<[Deferred; 4]>> = RefCell::new(SmallVec::new());
}

/// Whether a batch is currently open on this thread
pub fn in_batch() -> bool {
    BATCH_DEPTH.with(|d| d.get() > 0)
}

/// Open a batch
pub fn batch_start() {
    BATCH_DEPTH.with(|d| d.set(d.get() + 1));
}

/// Close a batch, flushing deferred work when the outermost one closes
pub fn batch_end() {
    let depth = BATCH_DEPTH.with(|d| d.get());
    if depth == 0 {
        return;
    }
    if depth == 1 {
        flush();
    }
    BATCH_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
}

/// Run `f` inside a batch
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            batch_end();
        }
    }

    batch_start();
    let _guard = Guard;
    f()
}

/// Run `work` now, or once at the end of the current batch
///
/// Work queued under a key that is already pending is dropped; the first
/// registration keeps its place in the queue.
pub fn defer(key: FieldId, work: Rc<dyn Fn()>) {
    if !in_batch() {
        work();
        return;
    }
    PENDING.with(|pending| {
        let mut pending = pending.borrow_mut();
        if !pending.iter().any(|(k, _)| *k == key) {
            pending.push((key, work));
        }
    });
}

fn flush() {
    // Runs at depth 1 so that work queued by deferred work coalesces too
    loop {
        let queued = PENDING.with(|p| std::mem::take(&mut *p.borrow_mut()));
        if queued.is_empty() {
            break;
        }
        tracing::trace!(count = queued.len(), "flushing deferred composite updates");
        for (_, work) in queued {
            work();
        }
    }
}
