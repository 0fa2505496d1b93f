//! A fake canvas that records the requests it would have sent.
use std::cell::{Cell, RefCell};

use x11rb::protocol::xproto::{Drawable, EventMask, Gcontext, Point, Rectangle, Window};

use crate::connection::{Canvas, ConnectionInputExt, PointerPosition, Res};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Fill {
        drawable: Drawable,
        gc: Gcontext,
        rects: Vec<Rectangle>,
    },
    Outline {
        drawable: Drawable,
        gc: Gcontext,
        rects: Vec<Rectangle>,
    },
    Polyline {
        drawable: Drawable,
        gc: Gcontext,
        points: Vec<Point>,
    },
    Text {
        drawable: Drawable,
        gc: Gcontext,
        x: i16,
        y: i16,
        text: String,
    },
    Clear {
        window: Window,
        width: u16,
        height: u16,
    },
    Copy {
        src: Drawable,
        dst: Drawable,
        width: u16,
        height: u16,
    },
    Image {
        drawable: Drawable,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        len: usize,
    },
    GrabPointer(Window),
    UngrabPointer,
    GrabKeyboard(Window),
    UngrabKeyboard,
    QueryPointer(Window),
}

#[derive(Default)]
pub struct RecordingCanvas {
    calls: RefCell<Vec<Call>>,
    /// What grabs answer with; `None` plays a failed reply.
    pub grab_status: Cell<Option<u8>>,
    pub pointer: Cell<Option<PointerPosition>>,
}

impl RecordingCanvas {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn push(&self, call: Call) -> Res {
        self.calls.borrow_mut().push(call);
        Ok(())
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rectangles(&self, drawable: Drawable, gc: Gcontext, rects: &[Rectangle]) -> Res {
        self.push(Call::Fill {
            drawable,
            gc,
            rects: rects.to_vec(),
        })
    }

    fn draw_rectangles(&self, drawable: Drawable, gc: Gcontext, rects: &[Rectangle]) -> Res {
        self.push(Call::Outline {
            drawable,
            gc,
            rects: rects.to_vec(),
        })
    }

    fn draw_polyline(&self, drawable: Drawable, gc: Gcontext, points: &[Point]) -> Res {
        self.push(Call::Polyline {
            drawable,
            gc,
            points: points.to_vec(),
        })
    }

    fn draw_text(&self, drawable: Drawable, gc: Gcontext, x: i16, y: i16, text: &str) -> Res {
        self.push(Call::Text {
            drawable,
            gc,
            x,
            y,
            text: text.to_owned(),
        })
    }

    fn clear_area(&self, window: Window, width: u16, height: u16) -> Res {
        self.push(Call::Clear {
            window,
            width,
            height,
        })
    }

    fn copy_area(
        &self,
        src: Drawable,
        dst: Drawable,
        _gc: Gcontext,
        width: u16,
        height: u16,
    ) -> Res {
        self.push(Call::Copy {
            src,
            dst,
            width,
            height,
        })
    }

    fn put_image(
        &self,
        drawable: Drawable,
        _gc: Gcontext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        data: &[u8],
    ) -> Res {
        self.push(Call::Image {
            drawable,
            x,
            y,
            width,
            height,
            len: data.len(),
        })
    }
}

impl ConnectionInputExt for RecordingCanvas {
    fn grab_pointer(
        &self,
        window: Window,
        _mask: EventMask,
    ) -> Result<Option<u8>, x11rb::errors::ReplyOrIdError> {
        self.push(Call::GrabPointer(window))?;
        Ok(self.grab_status.get())
    }

    fn ungrab_pointer(&self) -> Res {
        self.push(Call::UngrabPointer)
    }

    fn grab_keyboard(&self, window: Window) -> Result<Option<u8>, x11rb::errors::ReplyOrIdError> {
        self.push(Call::GrabKeyboard(window))?;
        Ok(self.grab_status.get())
    }

    fn ungrab_keyboard(&self) -> Res {
        self.push(Call::UngrabKeyboard)
    }

    fn query_pointer(
        &self,
        window: Window,
    ) -> Result<Option<PointerPosition>, x11rb::errors::ReplyOrIdError> {
        self.push(Call::QueryPointer(window))?;
        Ok(self.pointer.get())
    }
}
