//! Button that repeats its action while held
//!
//! The action fires once on press, then again every
//! `repeat_interval_ms` after an initial `repeat_delay_ms`. Moving the pointer
//! off the button pauses the repeat; moving back resumes it.

use std::rc::Rc;

use tessel_core::{
    EventContext, EventResponse, InputEvent, InteractionEvent, InteractionState, PointerId, Rect,
    StateTransitions, TimerId, TimingConfig, WidgetConfig, WidgetId,
};

use crate::widget::Widget;

#[derive(Debug)]
struct Hold {
    pointer: PointerId,
    timer: TimerId,
    inside: bool,
}

pub struct RepeatButton {
    id: WidgetId,
    text: String,
    action: Option<Rc<dyn Fn()>>,
    delay_ms: u64,
    interval_ms: u64,
    rect: Rect,
    interaction: InteractionState,
    hold: Option<Hold>,
}

impl Default for RepeatButton {
    fn default() -> Self {
        Self::new("")
    }
}

impl RepeatButton {
    pub fn new(text: impl Into<String>) -> Self {
        let timing = TimingConfig::default();
        Self {
            id: WidgetId::next(),
            text: text.into(),
            action: None,
            delay_ms: timing.repeat_delay_ms,
            interval_ms: timing.repeat_interval_ms,
            rect: Rect::ZERO,
            interaction: InteractionState::Idle,
            hold: None,
        }
    }

    pub fn with_config(mut self, config: &WidgetConfig) -> Self {
        self.set_timing(config.timing.repeat_delay_ms, config.timing.repeat_interval_ms);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_action(&mut self, action: impl Fn() + 'static) {
        self.action = Some(Rc::new(action));
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Takes effect on the next press
    pub fn set_timing(&mut self, delay_ms: u64, interval_ms: u64) {
        self.delay_ms = delay_ms;
        self.interval_ms = interval_ms.max(1);
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn is_held(&self) -> bool {
        self.hold.is_some()
    }

    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    fn fire(&self) {
        if let Some(action) = &self.action {
            action();
        }
    }

    fn release(&mut self, ctx: &mut EventContext<'_>) {
        if let Some(hold) = self.hold.take() {
            ctx.scheduler.cancel(hold.timer);
            ctx.capture.release(hold.pointer, self.id);
        }
    }
}

impl Widget for RepeatButton {
    fn id(&self) -> WidgetId {
        self.id
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> EventResponse {
        match event {
            InputEvent::PointerDown(e) if e.is_primary() && self.rect.contains(e.position) => {
                if self.hold.is_some() || !ctx.capture.capture(e.pointer_id, self.id) {
                    return EventResponse::Ignored;
                }
                self.interaction.apply(InteractionEvent::PointerDown);
                self.fire();
                let timer = ctx
                    .scheduler
                    .schedule_repeating(self.id, self.delay_ms, self.interval_ms);
                self.hold = Some(Hold {
                    pointer: e.pointer_id,
                    timer,
                    inside: true,
                });
                EventResponse::Handled
            }
            InputEvent::PointerMove(e) => {
                let inside = self.rect.contains(e.position);
                let Some(hold) = self.hold.as_mut().filter(|h| h.pointer == e.pointer_id) else {
                    return EventResponse::Ignored;
                };
                if inside != hold.inside {
                    hold.inside = inside;
                    if inside {
                        ctx.scheduler.resume(hold.timer);
                    } else {
                        ctx.scheduler.pause(hold.timer);
                    }
                }
                EventResponse::Handled
            }
            InputEvent::Timer(id) if self.hold.as_ref().is_some_and(|h| h.timer == *id) => {
                self.fire();
                EventResponse::Handled
            }
            InputEvent::PointerUp(e) if self.hold.as_ref().is_some_and(|h| h.pointer == e.pointer_id) => {
                self.release(ctx);
                self.interaction.apply(InteractionEvent::PointerUp);
                EventResponse::Handled
            }
            InputEvent::PointerCaptureLost(pointer)
                if self.hold.as_ref().is_some_and(|h| h.pointer == *pointer) =>
            {
                self.release(ctx);
                self.interaction.apply(InteractionEvent::CaptureLost);
                EventResponse::Handled
            }
            _ => EventResponse::Ignored,
        }
    }

    fn set_attached(&mut self, _attached: bool) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tessel_core::{Point, PointerCapture, PointerEvent, TimerScheduler, Vec2};

    struct Host {
        capture: PointerCapture,
        scheduler: TimerScheduler,
    }

    impl Host {
        fn send(&mut self, b: &mut RepeatButton, event: InputEvent) {
            let mut ctx = EventContext::new(&mut self.capture, &mut self.scheduler);
            b.handle_event(&event, &mut ctx);
        }

        fn advance(&mut self, b: &mut RepeatButton, ms: u64) {
            for fired in self.scheduler.advance(ms) {
                self.send(b, InputEvent::Timer(fired.timer));
            }
        }
    }

    fn button(count: &Rc<Cell<u32>>) -> RepeatButton {
        let mut b = RepeatButton::new("+");
        b.set_timing(100, 50);
        b.set_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        let c = count.clone();
        b.set_action(move || c.set(c.get() + 1));
        b
    }

    fn host() -> Host {
        Host {
            capture: PointerCapture::new(),
            scheduler: TimerScheduler::new(),
        }
    }

    #[test]
    fn test_fires_on_press_then_repeats() {
        let count = Rc::new(Cell::new(0));
        let mut b = button(&count);
        let mut host = host();
        let at = Point::new(5.0, 5.0);
        host.send(&mut b, InputEvent::PointerDown(PointerEvent::primary(at)));
        assert_eq!(count.get(), 1);
        host.advance(&mut b, 99);
        assert_eq!(count.get(), 1);
        host.advance(&mut b, 1);
        assert_eq!(count.get(), 2);
        host.advance(&mut b, 100);
        assert_eq!(count.get(), 4);

        host.send(&mut b, InputEvent::PointerUp(PointerEvent::primary(at)));
        host.advance(&mut b, 1000);
        assert_eq!(count.get(), 4);
        assert!(host.scheduler.is_empty());
    }

    #[test]
    fn test_leaving_pauses_repeat() {
        let count = Rc::new(Cell::new(0));
        let mut b = button(&count);
        let mut host = host();
        host.send(&mut b, InputEvent::PointerDown(PointerEvent::primary(Point::new(5.0, 5.0))));
        host.send(
            &mut b,
            InputEvent::PointerMove(PointerEvent::moved(Point::new(50.0, 5.0), Vec2::new(45.0, 0.0))),
        );
        host.advance(&mut b, 1000);
        assert_eq!(count.get(), 1);
        host.send(
            &mut b,
            InputEvent::PointerMove(PointerEvent::moved(Point::new(5.0, 5.0), Vec2::new(-45.0, 0.0))),
        );
        host.advance(&mut b, 100);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_capture_loss_cancels() {
        let count = Rc::new(Cell::new(0));
        let mut b = button(&count);
        let mut host = host();
        host.send(&mut b, InputEvent::PointerDown(PointerEvent::primary(Point::new(5.0, 5.0))));
        host.capture.force_release(0);
        host.send(&mut b, InputEvent::PointerCaptureLost(0));
        assert!(!b.is_held());
        host.advance(&mut b, 1000);
        assert_eq!(count.get(), 1);
    }
}
