//!
//! Off screen drawing: a pixmap is painted once and copied to the window on every expose.
//!
//! `pixmap_test` and `simple_pixmap_test` share this module and only differ in their `Scene`.
use std::path::Path;

use x11rb::{
    connection::Connection,
    errors::ReplyOrIdError,
    protocol::xproto::{
        CreateWindowAux, EventMask, ExposeEvent, Gcontext, KeyPressEvent, Pixmap, Rectangle,
        Window,
    },
};

use crate::{
    config::Config,
    connection::{Canvas, ProbeConnection, Res, WindowSpec},
    events::{Flow, ProbeHandler, run_event_loop},
    pixels::load_image,
};

/// Window geometry, the black rectangle painted into the pixmap, and whether a configured
/// image is uploaded first.
#[derive(Clone, Copy, Debug)]
pub struct Scene {
    pub name: &'static str,
    pub window: WindowSpec,
    pub rect: Rectangle,
    pub with_image: bool,
}

pub const PIXMAP: Scene = Scene {
    name: "pixmap test",
    window: WindowSpec {
        x: 100,
        y: 100,
        width: 300,
        height: 300,
        border: 1,
    },
    rect: Rectangle {
        x: 50,
        y: 50,
        width: 200,
        height: 200,
    },
    with_image: false,
};

pub const SIMPLE_PIXMAP: Scene = Scene {
    name: "simple pixmap test",
    window: WindowSpec {
        x: 50,
        y: 50,
        width: 250,
        height: 200,
        border: 1,
    },
    rect: Rectangle {
        x: 25,
        y: 25,
        width: 200,
        height: 150,
    },
    with_image: true,
};

pub struct PixmapProbe<'a, K> {
    pub canvas: &'a K,
    pub window: Window,
    pub pixmap: Pixmap,
    pub gc: Gcontext,
    pub width: u16,
    pub height: u16,
}

impl<K: Canvas> ProbeHandler for PixmapProbe<'_, K> {
    fn on_expose(&mut self, _event: ExposeEvent) -> Result<Flow, ReplyOrIdError> {
        self.canvas
            .copy_area(self.pixmap, self.window, self.gc, self.width, self.height)?;
        println!("🖼️ pixmap copied to window");
        Ok(Flow::Continue)
    }

    fn on_key_press(&mut self, _event: KeyPressEvent) -> Result<Flow, ReplyOrIdError> {
        Ok(Flow::Exit)
    }
}

/// Paints the pixmap: white background, the optional image, then the black rectangle.
pub fn paint_pixmap(
    canvas: &impl Canvas,
    pixmap: Pixmap,
    white_gc: Gcontext,
    black_gc: Gcontext,
    scene: &Scene,
    image_path: Option<&Path>,
) -> Res {
    canvas.fill_rectangles(pixmap, white_gc, &[scene.window.area()])?;

    if let Some(path) = image_path {
        match load_image(path, scene.window.width, scene.window.height) {
            Ok(image) => {
                canvas.put_image(
                    pixmap,
                    black_gc,
                    0,
                    0,
                    image.width,
                    image.height,
                    &image.data,
                )?;
                println!("✅ image uploaded: {}x{}", image.width, image.height);
            }
            Err(e) => log::error!("couldn't load image {}! {e}", path.display()),
        }
    }

    canvas.fill_rectangles(pixmap, black_gc, &[scene.rect])
}

pub fn run<C: Connection>(conn: &ProbeConnection<'_, C>, config: &Config, scene: &Scene) -> Res {
    let spec = scene.window;
    let window = conn.create_window(
        spec,
        &CreateWindowAux::new().event_mask(EventMask::EXPOSURE | EventMask::KEY_PRESS),
    )?;
    conn.map_window(window)?;
    conn.flush()?;
    println!("✅ window shown: {window}");

    let pixmap = conn.create_pixmap(conn.screen.root_depth, window, spec.width, spec.height)?;
    println!("✅ pixmap created: {pixmap}");

    let white_gc = conn.create_foreground_gc(pixmap, conn.screen.white_pixel)?;
    let black_gc = conn.create_foreground_gc(pixmap, conn.screen.black_pixel)?;

    let image_path = if scene.with_image {
        config.pixmap_image.as_deref().map(Path::new)
    } else {
        None
    };
    paint_pixmap(conn, pixmap, white_gc, black_gc, scene, image_path)?;
    conn.flush()?;
    println!("✅ pixmap painted");
    println!("🎯 press any key to exit");

    run_event_loop(
        conn.conn,
        &mut PixmapProbe {
            canvas: conn,
            window,
            pixmap,
            gc: black_gc,
            width: spec.width,
            height: spec.height,
        },
    )?;

    println!("✅ {} finished", scene.name);
    Ok(())
}
