//! Drag-reorder controller.
//!
//! Each press starts a gesture session owned by the controller. A session
//! is armed until the pointer travels more than [`DRAG_THRESHOLD_PX`] on
//! either axis, then tracks which entry is hovered and emits live moves.
//! Document-level pointer capture is acquired when the session starts and
//! released when it is dropped, whatever ended it.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::managers::command::Command;

pub const DRAG_THRESHOLD_PX: f64 = 20.0;

pub type CaptureId = u64;

/// Document-wide pointer move/up listeners provided by the host.
pub trait PointerCapture {
    fn capture(&self) -> CaptureId;
    fn release(&self, id: CaptureId);
}

struct CaptureGuard {
    capture: Rc<dyn PointerCapture>,
    id: CaptureId,
}

impl CaptureGuard {
    fn acquire(capture: Rc<dyn PointerCapture>) -> Self {
        let id = capture.capture();
        Self { capture, id }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.capture.release(self.id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragKind {
    Tab,
    Favourite,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Armed,
    Dragging,
}

struct DragSession {
    origin: Point,
    index: usize,
    hovered: Option<usize>,
    phase: Phase,
    _capture: CaptureGuard,
}

/// A reorder produced by a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragMove {
    pub kind: DragKind,
    pub from: usize,
    pub to: usize,
}

impl DragMove {
    pub fn command(self) -> Command {
        let (from, to) = (self.from, self.to);
        match self.kind {
            DragKind::Tab => Command::MoveTab { from, to },
            DragKind::Favourite => Command::MoveFavourite { from, to },
            DragKind::Group => Command::MoveFavouriteGroup { from, to },
        }
    }
}

pub struct DragController {
    capture: Rc<dyn PointerCapture>,
    sessions: HashMap<DragKind, DragSession>,
}

impl DragController {
    pub fn new(capture: Rc<dyn PointerCapture>) -> Self {
        Self {
            capture,
            sessions: HashMap::new(),
        }
    }

    /// Starts a session. Refused while another drag of the same kind is live.
    pub fn press(&mut self, kind: DragKind, index: usize, at: Point) -> bool {
        if self.sessions.contains_key(&kind) {
            return false;
        }
        let session = DragSession {
            origin: at,
            index,
            hovered: None,
            phase: Phase::Armed,
            _capture: CaptureGuard::acquire(Rc::clone(&self.capture)),
        };
        self.sessions.insert(kind, session);
        true
    }

    /// The pointer is over entry `index` of `kind`.
    pub fn hover(&mut self, kind: DragKind, index: usize) {
        if let Some(session) = self.sessions.get_mut(&kind) {
            if session.phase == Phase::Dragging && session.index != index {
                session.hovered = Some(index);
            }
        }
    }

    /// Pointer movement. Returns a move once the dragged entry should swap
    /// places with the hovered one.
    pub fn pointer_move(&mut self, kind: DragKind, at: Point) -> Option<DragMove> {
        let session = self.sessions.get_mut(&kind)?;
        match session.phase {
            Phase::Armed => {
                let dx = (at.x - session.origin.x).abs();
                let dy = (at.y - session.origin.y).abs();
                if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
                    debug!(?kind, index = session.index, "drag started");
                    session.phase = Phase::Dragging;
                }
                None
            }
            Phase::Dragging => {
                let to = session.hovered.filter(|to| *to != session.index)?;
                let from = session.index;
                session.index = to;
                Some(DragMove { kind, from, to })
            }
        }
    }

    /// Ends the session of `kind`, armed or dragging.
    pub fn release(&mut self, kind: DragKind) {
        if self.sessions.remove(&kind).is_some() {
            debug!(?kind, "drag session ended");
        }
    }

    /// Ends every session, e.g. on unmount.
    pub fn cancel_all(&mut self) {
        self.sessions.clear();
    }

    pub fn is_dragging(&self, kind: DragKind) -> bool {
        self.sessions
            .get(&kind)
            .is_some_and(|s| s.phase == Phase::Dragging)
    }

    pub fn is_active(&self, kind: DragKind) -> bool {
        self.sessions.contains_key(&kind)
    }
}
