//! Per-gesture drag state
//!
//! A [`DragSession`] exists from the pointer-down that captured a pointer to
//! the matching pointer-up or capture loss. Events for any other pointer are
//! not part of the session and must be ignored by the owner.

use crate::events::PointerId;
use crate::geometry::{Point, Vec2};

/// Ephemeral state of one drag gesture
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pointer_id: PointerId,
    start: Point,
    last: Point,
    accumulated: Vec2,
    /// +1 or -1, applied by the owner to main-axis deltas
    direction: f32,
    /// Pointer offset from the dragged element's origin at grab time
    grab_offset: f32,
}

impl DragSession {
    pub fn new(pointer_id: PointerId, start: Point) -> Self {
        Self {
            pointer_id,
            start,
            last: start,
            accumulated: Vec2::ZERO,
            direction: 1.0,
            grab_offset: 0.0,
        }
    }

    pub fn with_direction(mut self, direction: f32) -> Self {
        self.direction = if direction < 0.0 { -1.0 } else { 1.0 };
        self
    }

    pub fn with_grab_offset(mut self, offset: f32) -> Self {
        self.grab_offset = offset;
        self
    }

    pub fn pointer_id(&self) -> PointerId {
        self.pointer_id
    }

    /// Whether an event from `pointer_id` belongs to this session
    pub fn owns(&self, pointer_id: PointerId) -> bool {
        self.pointer_id == pointer_id
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn last(&self) -> Point {
        self.last
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn grab_offset(&self) -> f32 {
        self.grab_offset
    }

    /// Total movement since the session started
    pub fn accumulated(&self) -> Vec2 {
        self.accumulated
    }

    /// Record a move to `position`, returning the step since the last move
    pub fn update(&mut self, position: Point) -> Vec2 {
        let step = position.delta_from(self.last);
        self.last = position;
        self.accumulated = position.delta_from(self.start);
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_tracks_step_and_total() {
        let mut session = DragSession::new(2, Point::new(10.0, 10.0));
        assert!(session.owns(2));
        assert!(!session.owns(0));

        let step = session.update(Point::new(15.0, 8.0));
        assert_eq!(step, Vec2::new(5.0, -2.0));
        let step = session.update(Point::new(20.0, 8.0));
        assert_eq!(step, Vec2::new(5.0, 0.0));
        assert_eq!(session.accumulated(), Vec2::new(10.0, -2.0));
    }

    #[test]
    fn test_direction_is_normalized() {
        let session = DragSession::new(0, Point::ZERO).with_direction(-7.0);
        assert_eq!(session.direction(), -1.0);
        assert_eq!(session.with_direction(0.0).direction(), 1.0);
    }
}
