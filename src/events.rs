//!
//! The blocking event loop every probe sits in.
//!
//! Probes implement `ProbeHandler` for the three events they care about and say after each one
//! whether the loop should keep going.
use x11rb::{
    connection::Connection,
    errors::ReplyOrIdError,
    protocol::{
        Event,
        xproto::{
            ButtonPressEvent, ButtonReleaseEvent, ExposeEvent, KeyPressEvent, MotionNotifyEvent,
        },
    },
};

use crate::connection::Res;

/// The bit the server sets in an event's type byte when a client sent it with `SendEvent`.
pub const SENT_EVENT_FLAG: u8 = 0x80;

/// Strips the sent-event flag, leaving the event code.
#[must_use]
pub const fn event_code(response_type: u8) -> u8 {
    response_type & !SENT_EVENT_FLAG
}

/// Whether an event came from another client rather than the server.
#[must_use]
pub const fn is_sent_event(response_type: u8) -> bool {
    response_type & SENT_EVENT_FLAG != 0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// What the loop does after an event was handled.
pub enum Flow {
    Continue,
    Exit,
}

/// Reactions to the events probe windows select.
///
/// Every method continues the loop unless overridden.
pub trait ProbeHandler {
    /// Called when part of the window needs redrawing.
    fn on_expose(&mut self, _event: ExposeEvent) -> Result<Flow, ReplyOrIdError> {
        Ok(Flow::Continue)
    }

    fn on_key_press(&mut self, _event: KeyPressEvent) -> Result<Flow, ReplyOrIdError> {
        Ok(Flow::Continue)
    }

    fn on_button_press(&mut self, _event: ButtonPressEvent) -> Result<Flow, ReplyOrIdError> {
        Ok(Flow::Continue)
    }

    fn on_button_release(&mut self, _event: ButtonReleaseEvent) -> Result<Flow, ReplyOrIdError> {
        Ok(Flow::Continue)
    }

    /// Only windows selecting pointer motion get these.
    fn on_motion_notify(&mut self, _event: MotionNotifyEvent) -> Result<Flow, ReplyOrIdError> {
        Ok(Flow::Continue)
    }
}

/// Hands one event to the matching handler method.
pub fn dispatch<H: ProbeHandler + ?Sized>(
    handler: &mut H,
    event: &Event,
) -> Result<Flow, ReplyOrIdError> {
    match event {
        Event::Expose(e) => {
            log::trace!(
                "EVENT EXPOSE code {} sent {} window {} count {}",
                event_code(e.response_type),
                is_sent_event(e.response_type),
                e.window,
                e.count
            );
            handler.on_expose(*e)
        }
        Event::KeyPress(e) => {
            log::trace!(
                "EVENT KEYPRESS code {} sent {} detail {}",
                event_code(e.response_type),
                is_sent_event(e.response_type),
                e.detail
            );
            handler.on_key_press(*e)
        }
        Event::ButtonPress(e) => {
            log::trace!(
                "EVENT BUTTONPRESS code {} sent {} button {} at ({}, {})",
                event_code(e.response_type),
                is_sent_event(e.response_type),
                e.detail,
                e.event_x,
                e.event_y
            );
            handler.on_button_press(*e)
        }
        Event::ButtonRelease(e) => {
            log::trace!(
                "EVENT BUTTONRELEASE code {} button {}",
                event_code(e.response_type),
                e.detail
            );
            handler.on_button_release(*e)
        }
        Event::MotionNotify(e) => {
            log::trace!("EVENT MOTION at ({}, {})", e.event_x, e.event_y);
            handler.on_motion_notify(*e)
        }
        Event::Error(e) => {
            log::error!(
                "X11 error {:?} on request {:?}",
                e.error_kind,
                e.request_name
            );
            Ok(Flow::Continue)
        }
        _ => Ok(Flow::Continue),
    }
}

/// Waits for events and dispatches them until the handler asks to exit.
///
/// There is no timeout. Queued drawing is flushed after every event.
pub fn run_event_loop<C: Connection, H: ProbeHandler + ?Sized>(conn: &C, handler: &mut H) -> Res {
    conn.flush()?;
    loop {
        let event = conn.wait_for_event()?;
        let flow = dispatch(handler, &event)?;
        conn.flush()?;
        if flow == Flow::Exit {
            log::debug!("event loop finished");
            return Ok(());
        }
    }
}
