//! Active pointer and keyboard grabs, stepped through with key presses.
use x11rb::{
    connection::Connection,
    errors::ReplyOrIdError,
    protocol::xproto::{
        ButtonPressEvent, CreateWindowAux, EventMask, ExposeEvent, KeyPressEvent, Window,
    },
};

use crate::{
    config::Config,
    connection::{Canvas, ConnectionInputExt, ProbeConnection, Res, WindowSpec},
    events::{Flow, ProbeHandler, run_event_loop},
    stage::{GrabStage, StageAction},
};

pub const WINDOW: WindowSpec = WindowSpec {
    x: 100,
    y: 100,
    width: 500,
    height: 300,
    border: 2,
};

pub struct InputGrabProbe<'a, K> {
    pub conn: &'a K,
    pub window: Window,
    pub stage: GrabStage,
}

impl<'a, K> InputGrabProbe<'a, K> {
    pub const fn new(conn: &'a K, window: Window) -> Self {
        Self {
            conn,
            window,
            stage: GrabStage::Ungrabbed,
        }
    }
}

impl<K: Canvas + ConnectionInputExt> InputGrabProbe<'_, K> {
    fn perform(&self, action: StageAction) -> Res {
        match action {
            StageAction::GrabPointer => {
                println!("\n🎯 stage 2: grabbing the pointer...");
                let mask = EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE;
                match self.conn.grab_pointer(self.window, mask)? {
                    Some(status) => {
                        println!("✅ pointer grabbed, status: {status}");
                        println!("🖱️ click anywhere, the events come to this window");
                    }
                    None => println!("❌ pointer grab failed"),
                }
            }
            StageAction::ReleasePointerGrabKeyboard => {
                self.conn.ungrab_pointer()?;
                println!("✅ pointer released");
                println!("\n🎯 stage 3: grabbing the keyboard...");
                match self.conn.grab_keyboard(self.window)? {
                    Some(status) => {
                        println!("✅ keyboard grabbed, status: {status}");
                        println!("⌨️ type away, every key comes to this window");
                    }
                    None => println!("❌ keyboard grab failed"),
                }
            }
            StageAction::ReleaseKeyboardAndExit => {
                self.conn.ungrab_keyboard()?;
                println!("✅ keyboard released");
            }
        }
        Ok(())
    }
}

impl<K: Canvas + ConnectionInputExt> ProbeHandler for InputGrabProbe<'_, K> {
    fn on_expose(&mut self, _event: ExposeEvent) -> Result<Flow, ReplyOrIdError> {
        self.conn
            .clear_area(self.window, WINDOW.width, WINDOW.height)?;
        println!("🖼️ window cleared");
        Ok(Flow::Continue)
    }

    fn on_key_press(&mut self, _event: KeyPressEvent) -> Result<Flow, ReplyOrIdError> {
        println!("⌨️ key pressed (stage {})", self.stage.number());
        let action = self.stage.on_key_press();
        self.perform(action)?;
        match action.next_stage() {
            Some(next) => {
                self.stage = next;
                Ok(Flow::Continue)
            }
            None => Ok(Flow::Exit),
        }
    }

    fn on_button_press(&mut self, _event: ButtonPressEvent) -> Result<Flow, ReplyOrIdError> {
        println!("🖱️ mouse button pressed (stage {})", self.stage.number());
        if self.stage.tracks_pointer() {
            if let Some(p) = self.conn.query_pointer(self.window)? {
                println!("📍 pointer at ({}, {}) in the window", p.win_x, p.win_y);
                println!("📍 pointer at ({}, {}) on the screen", p.root_x, p.root_y);
            }
        }
        Ok(Flow::Continue)
    }
}

pub fn run<C: Connection>(conn: &ProbeConnection<'_, C>, _config: &Config) -> Res {
    let window = conn.create_window(
        WINDOW,
        &CreateWindowAux::new()
            .background_pixel(conn.screen.white_pixel)
            .event_mask(EventMask::EXPOSURE | EventMask::KEY_PRESS | EventMask::BUTTON_PRESS),
    )?;
    conn.create_foreground_gc(window, conn.screen.black_pixel)?;

    conn.map_window(window)?;
    conn.flush()?;
    println!("✅ window shown");
    println!("\n🎯 stage 1: normal events (click in the window or press a key)");

    run_event_loop(conn.conn, &mut InputGrabProbe::new(conn, window))?;

    println!("✅ input grab test finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connection::PointerPosition,
        testing::{Call, RecordingCanvas},
    };

    #[test]
    fn three_keys_walk_through_the_grabs() {
        let canvas = RecordingCanvas::default();
        canvas.grab_status.set(Some(0));
        let mut probe = InputGrabProbe::new(&canvas, 8);

        let key = KeyPressEvent::default();
        assert_eq!(probe.on_key_press(key).unwrap(), Flow::Continue);
        assert_eq!(probe.stage, GrabStage::PointerGrabbed);
        assert_eq!(probe.on_key_press(key).unwrap(), Flow::Continue);
        assert_eq!(probe.stage, GrabStage::KeyboardGrabbed);
        assert_eq!(probe.on_key_press(key).unwrap(), Flow::Exit);

        assert_eq!(
            canvas.calls(),
            vec![
                Call::GrabPointer(8),
                Call::UngrabPointer,
                Call::GrabKeyboard(8),
                Call::UngrabKeyboard,
            ]
        );
    }

    #[test]
    fn failed_grab_still_advances() {
        let canvas = RecordingCanvas::default();
        let mut probe = InputGrabProbe::new(&canvas, 8);

        probe.on_key_press(KeyPressEvent::default()).unwrap();
        assert_eq!(probe.stage, GrabStage::PointerGrabbed);
    }

    #[test]
    fn clicks_query_the_pointer_only_while_grabbed() {
        let canvas = RecordingCanvas::default();
        canvas.pointer.set(Some(PointerPosition {
            win_x: 1,
            win_y: 2,
            root_x: 101,
            root_y: 102,
        }));
        let mut probe = InputGrabProbe::new(&canvas, 8);
        let click = ButtonPressEvent::default();

        probe.on_button_press(click).unwrap();
        assert!(canvas.calls().is_empty());

        probe.stage = GrabStage::PointerGrabbed;
        probe.on_button_press(click).unwrap();
        assert_eq!(canvas.calls(), vec![Call::QueryPointer(8)]);

        canvas.clear();
        probe.stage = GrabStage::KeyboardGrabbed;
        probe.on_button_press(click).unwrap();
        assert!(canvas.calls().is_empty());
    }

    #[test]
    fn expose_clears_the_window() {
        let canvas = RecordingCanvas::default();
        let mut probe = InputGrabProbe::new(&canvas, 8);
        probe.on_expose(ExposeEvent::default()).unwrap();

        assert_eq!(
            canvas.calls(),
            vec![Call::Clear {
                window: 8,
                width: 500,
                height: 300
            }]
        );
    }
}
