//! Pointer-driven drag state machine.
//!
//! `Idle -> Armed` on press, `Armed -> Dragging` once the pointer has moved
//! at least half a day, and back to `Idle` on release (commit) or cancel.
//! While dragging the real item is left untouched: the pending movement is
//! kept here and applied to a preview copy. Only `pointer_up` writes it
//! back, through the renderer's `assign_date_values`.

use std::mem;

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use super::labels::CellLabels;
use super::node::CellNode;
use super::{scale, CellRenderer, PointerEvent};
use crate::model::{ViewParams, WorkItem};

/// Result of a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDown<D> {
    /// A selection mode consumed the press; no drag started.
    Intercepted,
    Started(D),
}

/// Result of ending a drag.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome<M> {
    /// No drag was in progress for this item.
    Ignored,
    /// An existing item was moved (possibly by zero days).
    Committed {
        item_id: Uuid,
        movement: M,
        delta_days: i64,
    },
    /// An undated item received its first date(s).
    Created { item_id: Uuid, movement: M },
    /// The drag was abandoned and the item restored.
    Cancelled { item_id: Uuid },
}

#[derive(Debug, Clone)]
struct Session<D> {
    item_id: Uuid,
    direction: D,
    origin_x: f32,
    creating: bool,
    /// Item right after the press, including a create date. Movements are
    /// always computed from here so deltas never compound.
    snapshot: WorkItem,
    /// Item as it was before the press.
    original: WorkItem,
}

#[derive(Debug, Clone)]
enum DragState<D, M> {
    Idle,
    Armed {
        session: Session<D>,
    },
    Dragging {
        session: Session<D>,
        delta_days: i64,
        movement: M,
    },
}

/// Drives a [`CellRenderer`] through press, move and release.
#[derive(Debug, Clone)]
pub struct DragController<D, M> {
    state: DragState<D, M>,
}

impl<D, M> Default for DragController<D, M> {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
        }
    }
}

impl<D: Copy + std::fmt::Debug, M: Clone + std::fmt::Debug> DragController<D, M> {
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&self) -> Option<&Session<D>> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed { session } | DragState::Dragging { session, .. } => Some(session),
        }
    }

    /// Item currently pressed or dragged.
    pub fn active_item(&self) -> Option<Uuid> {
        self.session().map(|s| s.item_id)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    /// Pending movement and its day delta, once the pointer has moved.
    pub fn movement(&self) -> Option<(&M, i64)> {
        match &self.state {
            DragState::Dragging {
                movement,
                delta_days,
                ..
            } => Some((movement, *delta_days)),
            _ => None,
        }
    }

    /// Handle a press on `item`. Any drag still in progress is dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn pointer_down<R>(
        &mut self,
        renderer: &R,
        ev: &mut PointerEvent,
        date_for_create: Option<NaiveDate>,
        item: &mut WorkItem,
        view: &ViewParams,
        labels: &mut CellLabels,
        node: Option<&CellNode>,
    ) -> PointerDown<D>
    where
        R: CellRenderer<Direction = D, Movement = M>,
    {
        if let Some(stale) = self.active_item() {
            warn!(item = %stale, "press while a drag was active; dropping it");
        }
        self.state = DragState::Idle;

        let original = item.clone();
        let direction = renderer.on_mouse_down(ev, date_for_create, item, view, labels, node);
        if ev.default_prevented {
            debug!(item = %item.id, "press consumed by selection mode");
            return PointerDown::Intercepted;
        }

        debug!(item = %item.id, ?direction, kind = renderer.kind(), "drag armed");
        self.state = DragState::Armed {
            session: Session {
                item_id: item.id,
                direction,
                origin_x: ev.x,
                creating: date_for_create.is_some(),
                snapshot: item.clone(),
                original,
            },
        };
        PointerDown::Started(direction)
    }

    /// Handle pointer movement to `pointer_x` (timeline coordinates).
    /// Returns the pending movement once the drag has left the start day.
    pub fn pointer_move<R>(&mut self, renderer: &R, pointer_x: f32, view: &ViewParams) -> Option<&M>
    where
        R: CellRenderer<Direction = D, Movement = M>,
    {
        let (session, was_dragging) = match mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => return None,
            DragState::Armed { session } => (session, false),
            DragState::Dragging { session, .. } => (session, true),
        };

        let delta = scale::drag_days(pointer_x - session.origin_x, view);
        if delta == 0 && !was_dragging {
            self.state = DragState::Armed { session };
            return None;
        }

        let day_under_cursor = scale::date_at_offset(view, pointer_x);
        let movement =
            renderer.on_days_moved(&session.snapshot, day_under_cursor, delta, session.direction);
        self.state = DragState::Dragging {
            session,
            delta_days: delta,
            movement,
        };
        self.movement().map(|(m, _)| m)
    }

    /// Release: commit the pending movement into `item`. A release without
    /// movement commits a zero-day move, which leaves the dates unchanged.
    pub fn pointer_up<R>(
        &mut self,
        renderer: &R,
        item: &mut WorkItem,
        labels: Option<&mut CellLabels>,
        view: &ViewParams,
    ) -> DragOutcome<M>
    where
        R: CellRenderer<Direction = D, Movement = M>,
    {
        let (session, delta_days, movement) = match mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => return DragOutcome::Ignored,
            DragState::Armed { session } => {
                let day = scale::date_at_offset(view, session.origin_x);
                let movement = renderer.on_days_moved(&session.snapshot, day, 0, session.direction);
                (session, 0, movement)
            }
            DragState::Dragging {
                session,
                delta_days,
                movement,
            } => (session, delta_days, movement),
        };

        if item.id != session.item_id {
            warn!(expected = %session.item_id, got = %item.id, "release delivered to another item");
            return DragOutcome::Ignored;
        }

        renderer.assign_date_values(item, labels, &movement);
        debug!(item = %item.id, delta_days, creating = session.creating, "drag committed");

        if session.creating {
            DragOutcome::Created {
                item_id: item.id,
                movement,
            }
        } else {
            DragOutcome::Committed {
                item_id: item.id,
                movement,
                delta_days,
            }
        }
    }

    /// Abandon the drag and restore `item` to its state before the press,
    /// undoing a create.
    pub fn cancel<R>(
        &mut self,
        renderer: &R,
        item: &mut WorkItem,
        labels: Option<&mut CellLabels>,
    ) -> DragOutcome<M>
    where
        R: CellRenderer<Direction = D, Movement = M>,
    {
        let session = match mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => return DragOutcome::Ignored,
            DragState::Armed { session } | DragState::Dragging { session, .. } => session,
        };

        if item.id == session.item_id {
            *item = session.original;
            if let Some(labels) = labels {
                renderer.update_labels(false, labels, item);
            }
        }
        debug!(item = %session.item_id, "drag cancelled");
        DragOutcome::Cancelled {
            item_id: session.item_id,
        }
    }

    /// Forget the current drag without touching any item. Used when the
    /// dragged item disappeared mid-drag.
    pub fn abort(&mut self) {
        if let Some(id) = self.active_item() {
            debug!(item = %id, "drag aborted");
        }
        self.state = DragState::Idle;
    }

    /// Copy of the dragged item with the pending movement applied, for
    /// drawing. `None` unless `item_id` is being dragged.
    pub fn preview<R>(&self, renderer: &R, item_id: Uuid) -> Option<WorkItem>
    where
        R: CellRenderer<Direction = D, Movement = M>,
    {
        match &self.state {
            DragState::Dragging {
                session, movement, ..
            } if session.item_id == item_id => {
                let mut copy = session.snapshot.clone();
                renderer.assign_date_values(&mut copy, None, movement);
                Some(copy)
            }
            _ => None,
        }
    }
}
