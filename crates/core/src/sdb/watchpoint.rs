//! Watchpoint pool.
//!
//! A fixed array of slots threaded onto two singly linked index lists: the free
//! list and the active list. Both push and pop at the head, so new watches are
//! listed most recent first and freed numbers are reused last-freed-first. A slot
//! is on exactly one list at any time; its number is its array index.

use crate::common::constants::{WATCH_EXPR_MAX, WATCH_POOL_SIZE};
use crate::common::{ExprError, WatchError};
use crate::sdb::expr::{EvalContext, Expr};

#[derive(Clone, Debug, Default)]
struct Slot {
    next: Option<usize>,
    expr: Option<Expr>,
    value: u64,
}

/// An active watch as shown by `info w`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchInfo {
    /// Watch number.
    pub id: usize,
    /// Watched expression text.
    pub expr: String,
    /// Last evaluated value.
    pub value: u64,
}

/// A value change found by `WatchPool::check`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchChange {
    /// Watch number.
    pub id: usize,
    /// Watched expression text.
    pub expr: String,
    /// Value before the step.
    pub old: u64,
    /// Value after the step.
    pub new: u64,
}

impl WatchChange {
    /// The change report line.
    pub fn line(&self) -> String {
        format!(
            "Watchpoint {:2}: {:<16} new:{:<10}({:#010x})      old:{:<10}({:#010x})",
            self.id, self.expr, self.new, self.new, self.old, self.old
        )
    }
}

/// Fixed-capacity watchpoint storage.
#[derive(Clone, Debug)]
pub struct WatchPool {
    slots: Vec<Slot>,
    free: Option<usize>,
    active: Option<usize>,
}

impl Default for WatchPool {
    fn default() -> Self {
        Self::new(WATCH_POOL_SIZE)
    }
}

impl WatchPool {
    /// Creates a pool of `capacity` slots, all free, handed out in ascending order.
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|i| Slot {
                next: (i + 1 < capacity).then_some(i + 1),
                ..Slot::default()
            })
            .collect();
        Self {
            slots,
            free: (capacity > 0).then_some(0),
            active: None,
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of active watches.
    pub fn len(&self) -> usize {
        self.active_ids().len()
    }

    /// True if no watch is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    /// Number of free slots.
    pub fn free_len(&self) -> usize {
        walk(&self.slots, self.free).count()
    }

    /// Adds a watch on `text`, recording its current value.
    ///
    /// # Returns
    ///
    /// The watch number.
    ///
    /// # Errors
    ///
    /// * `WatchError::TooLong` - the text exceeds `WATCH_EXPR_MAX` bytes.
    /// * `WatchError::Expr` - the expression does not lex or evaluate.
    /// * `WatchError::PoolFull` - every slot is active.
    ///
    /// The pool is unchanged on error.
    pub fn add(&mut self, text: &str, ctx: &dyn EvalContext) -> Result<usize, WatchError> {
        let text = text.trim();
        if text.len() > WATCH_EXPR_MAX {
            return Err(WatchError::TooLong(WATCH_EXPR_MAX));
        }
        let expr = Expr::parse(text)?;
        let value = expr.eval(ctx)?;

        let id = self.free.ok_or(WatchError::PoolFull(self.capacity()))?;
        let slot = &mut self.slots[id];
        self.free = slot.next;
        slot.next = self.active;
        slot.expr = Some(expr);
        slot.value = value;
        self.active = Some(id);

        tracing::debug!(id, expr = text, value, "watchpoint added");
        Ok(id)
    }

    /// Removes watch `id` and returns its slot to the head of the free list.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::NotFound` if no active watch has that number.
    pub fn remove(&mut self, id: usize) -> Result<(), WatchError> {
        let mut prev: Option<usize> = None;
        let mut cur = self.active;
        while let Some(i) = cur {
            if i == id {
                let next = self.slots[i].next;
                match prev {
                    Some(p) => self.slots[p].next = next,
                    None => self.active = next,
                }
                let slot = &mut self.slots[i];
                slot.next = self.free;
                slot.expr = None;
                self.free = Some(i);
                tracing::debug!(id, "watchpoint removed");
                return Ok(());
            }
            prev = cur;
            cur = self.slots[i].next;
        }
        Err(WatchError::NotFound(id))
    }

    /// Active watches, most recently added first.
    pub fn list(&self) -> Vec<WatchInfo> {
        walk(&self.slots, self.active)
            .filter_map(|i| {
                let slot = &self.slots[i];
                slot.expr.as_ref().map(|e| WatchInfo {
                    id: i,
                    expr: e.text().to_owned(),
                    value: slot.value,
                })
            })
            .collect()
    }

    /// Re-evaluates every active watch and records the new values.
    ///
    /// A watch whose expression fails to evaluate keeps its old value.
    ///
    /// # Returns
    ///
    /// One entry per watch whose value changed, in active-list order.
    pub fn check(&mut self, ctx: &dyn EvalContext) -> Vec<WatchChange> {
        let mut changes = Vec::new();
        for id in self.active_ids() {
            let slot = &mut self.slots[id];
            let Some(expr) = slot.expr.as_ref() else {
                continue;
            };
            match expr.eval(ctx) {
                Ok(new) if new != slot.value => {
                    changes.push(WatchChange {
                        id,
                        expr: expr.text().to_owned(),
                        old: slot.value,
                        new,
                    });
                    slot.value = new;
                }
                Ok(_) => {}
                Err(err) => skipped(id, &err),
            }
        }
        changes
    }

    fn active_ids(&self) -> Vec<usize> {
        walk(&self.slots, self.active).collect()
    }
}

fn skipped(id: usize, err: &ExprError) {
    tracing::warn!(id, %err, "watchpoint not evaluated");
}

/// Iterates a list starting at `head`.
fn walk(slots: &[Slot], head: Option<usize>) -> impl Iterator<Item = usize> + '_ {
    std::iter::successors(head, move |&i| slots[i].next)
}
