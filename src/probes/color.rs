//! Colormap and colour allocation: three filled rectangles in allocated red, green and blue.
use x11rb::{
    connection::Connection,
    errors::ReplyOrIdError,
    protocol::xproto::{
        CreateWindowAux, EventMask, ExposeEvent, Gcontext, KeyPressEvent, Rectangle, Window,
    },
};

use crate::{
    config::Config,
    connection::{Canvas, ProbeConnection, Res, WindowSpec, fill_with},
    events::{Flow, ProbeHandler, run_event_loop},
    probes::color_gc,
};

pub const WINDOW: WindowSpec = WindowSpec {
    x: 100,
    y: 100,
    width: 400,
    height: 300,
    border: 2,
};

pub const RED_RECT: Rectangle = Rectangle {
    x: 50,
    y: 50,
    width: 100,
    height: 80,
};
pub const GREEN_RECT: Rectangle = Rectangle {
    x: 200,
    y: 50,
    width: 100,
    height: 80,
};
pub const BLUE_RECT: Rectangle = Rectangle {
    x: 125,
    y: 150,
    width: 100,
    height: 80,
};

/// One graphics context per allocated colour, `None` where allocation failed.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorGcs {
    pub red: Option<Gcontext>,
    pub green: Option<Gcontext>,
    pub blue: Option<Gcontext>,
}

pub struct ColorProbe<'a, K> {
    pub canvas: &'a K,
    pub window: Window,
    pub gcs: ColorGcs,
}

impl<K: Canvas> ProbeHandler for ColorProbe<'_, K> {
    fn on_expose(&mut self, _event: ExposeEvent) -> Result<Flow, ReplyOrIdError> {
        self.canvas
            .clear_area(self.window, WINDOW.width, WINDOW.height)?;
        fill_with(self.canvas, self.window, self.gcs.red, RED_RECT)?;
        fill_with(self.canvas, self.window, self.gcs.green, GREEN_RECT)?;
        fill_with(self.canvas, self.window, self.gcs.blue, BLUE_RECT)?;
        println!("🎨 window cleared and coloured rectangles drawn");
        Ok(Flow::Continue)
    }

    fn on_key_press(&mut self, _event: KeyPressEvent) -> Result<Flow, ReplyOrIdError> {
        Ok(Flow::Exit)
    }
}

pub fn run<C: Connection>(conn: &ProbeConnection<'_, C>, config: &Config) -> Res {
    let window = conn.create_window(
        WINDOW,
        &CreateWindowAux::new().event_mask(EventMask::EXPOSURE | EventMask::KEY_PRESS),
    )?;

    let colormap = conn.create_colormap(window)?;
    println!("✅ colormap created: {colormap}");

    let red = conn.alloc_color(colormap, config.red)?;
    let red = color_gc(conn, window, "red", red.as_ref())?;
    let green = conn.alloc_color(colormap, config.green)?;
    let green = color_gc(conn, window, "green", green.as_ref())?;
    let blue = conn.alloc_color(colormap, config.blue)?;
    let blue = color_gc(conn, window, "blue", blue.as_ref())?;

    conn.map_window(window)?;
    conn.flush()?;
    println!("✅ window shown with coloured rectangles");
    println!("🎯 press any key to exit");

    run_event_loop(
        conn.conn,
        &mut ColorProbe {
            canvas: conn,
            window,
            gcs: ColorGcs { red, green, blue },
        },
    )?;

    println!("✅ color test finished");
    Ok(())
}
