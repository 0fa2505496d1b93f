//!
//! This module extends `x11rb`'s `Connection` with the handful of requests the probes make.
//!
//! Creation requests register their ids in a `ResourceLedger` so `release_all` can free them.
//! Requests that answer with a reply (colours, fonts, grabs, ...) report a protocol error as
//! `None` after logging it, letting the probe carry on with the handle unset.
use std::cell::RefCell;

use x11rb::{
    COPY_DEPTH_FROM_PARENT, CURRENT_TIME, NONE,
    connection::Connection,
    cursor,
    errors::{ReplyError, ReplyOrIdError},
    protocol::xproto::{
        AllocColorReply, Atom, AtomEnum, ChangeWindowAttributesAux, Charinfo, Colormap,
        ColormapAlloc, ConnectionExt as _, CoordMode, CreateGCAux, CreateWindowAux, Cursor,
        Drawable, EventMask, Font, Gcontext, GrabMode, ImageFormat, Pixmap, Point, PropMode,
        Rectangle, Screen, Window, WindowClass,
    },
    resource_manager,
    wrapper::ConnectionExt as _,
};

use crate::resources::{Resource, ResourceLedger};

/// A shorthand for `Result<(),ReplyOrIdError>`.
///
/// `ReplyOrIdError` covers everything that can go wrong while talking to the server, so most
/// functions return this to be able to use `?`.
pub type Res = Result<(), ReplyOrIdError>;

/// A colour request with 16 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(65535, 65535, 65535);

    #[must_use]
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }

    /// The 8 bit per channel version, used for client side rendering.
    #[must_use]
    pub const fn to_rgb8(self) -> (u8, u8, u8) {
        (
            (self.red / 257) as u8,
            (self.green / 257) as u8,
            (self.blue / 257) as u8,
        )
    }
}

/// Where a probe window goes and how big it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSpec {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border: u16,
}

impl WindowSpec {
    /// A rectangle covering the whole window.
    #[must_use]
    pub const fn area(&self) -> Rectangle {
        Rectangle {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }
}

/// The interesting parts of a `QueryFont` reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontInfo {
    pub ascent: i16,
    pub descent: i16,
    pub min_width: i16,
    pub min_height: i16,
    pub max_width: i16,
    pub max_height: i16,
}

impl FontInfo {
    /// Builds the summary from the font's extents. Heights are ascent plus descent.
    #[must_use]
    pub const fn from_bounds(ascent: i16, descent: i16, min: Charinfo, max: Charinfo) -> Self {
        Self {
            ascent,
            descent,
            min_width: min.character_width,
            min_height: min.ascent + min.descent,
            max_width: max.character_width,
            max_height: max.ascent + max.descent,
        }
    }
}

/// Pointer coordinates relative to a window and to the root window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerPosition {
    pub win_x: i16,
    pub win_y: i16,
    pub root_x: i16,
    pub root_y: i16,
}

/// The answer to `QueryExtension`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtensionInfo {
    pub present: bool,
    pub major_opcode: u8,
    pub first_event: u8,
    pub first_error: u8,
}

/// Turns a protocol error reply into a logged `None`.
///
/// Connection errors are still returned, since nothing after them can work.
pub fn soft_reply<R>(what: &str, result: Result<R, ReplyError>) -> Result<Option<R>, ReplyError> {
    match result {
        Ok(reply) => Ok(Some(reply)),
        Err(ReplyError::X11Error(e)) => {
            log::error!("{what} failed: {:?} (bad value {})", e.error_kind, e.bad_value);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// The drawing requests probes use when redrawing.
///
/// Drawing only queues requests; the event loop flushes after every event.
pub trait Canvas {
    /// Fills rectangles with the graphics context's foreground.
    fn fill_rectangles(&self, drawable: Drawable, gc: Gcontext, rects: &[Rectangle]) -> Res;
    /// Outlines rectangles with the graphics context's foreground.
    fn draw_rectangles(&self, drawable: Drawable, gc: Gcontext, rects: &[Rectangle]) -> Res;
    /// Draws connected lines through `points`, each point relative to the drawable's origin.
    fn draw_polyline(&self, drawable: Drawable, gc: Gcontext, points: &[Point]) -> Res;
    /// Draws 8 bit text with the graphics context's font, filling the background behind it.
    ///
    /// Text longer than 255 bytes is cut.
    fn draw_text(&self, drawable: Drawable, gc: Gcontext, x: i16, y: i16, text: &str) -> Res;
    /// Clears a window area to its background.
    fn clear_area(&self, window: Window, width: u16, height: u16) -> Res;
    /// Copies the top left `width` x `height` area of `src` onto `dst`.
    fn copy_area(&self, src: Drawable, dst: Drawable, gc: Gcontext, width: u16, height: u16) -> Res;
    /// Uploads a BGRA image. The length of `data` must be width*height*4.
    fn put_image(
        &self,
        drawable: Drawable,
        gc: Gcontext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        data: &[u8],
    ) -> Res;
}

/// Fills a rectangle if the graphics context was actually created.
pub fn fill_with(
    canvas: &impl Canvas,
    drawable: Drawable,
    gc: Option<Gcontext>,
    rect: Rectangle,
) -> Res {
    match gc {
        Some(gc) => canvas.fill_rectangles(drawable, gc, &[rect]),
        None => {
            log::debug!("skipping fill at ({}, {}), no gc", rect.x, rect.y);
            Ok(())
        }
    }
}

/// Pointer and keyboard grabs.
pub trait ConnectionInputExt {
    /// Actively grabs the pointer for `window`, returning the grab status.
    fn grab_pointer(&self, window: Window, mask: EventMask) -> Result<Option<u8>, ReplyOrIdError>;
    fn ungrab_pointer(&self) -> Res;
    /// Actively grabs the keyboard for `window`, returning the grab status.
    fn grab_keyboard(&self, window: Window) -> Result<Option<u8>, ReplyOrIdError>;
    fn ungrab_keyboard(&self) -> Res;
    /// Asks where the pointer is relative to `window`.
    fn query_pointer(&self, window: Window) -> Result<Option<PointerPosition>, ReplyOrIdError>;
}

/// Server information and window properties.
pub trait ConnectionInfoExt {
    /// Interns an atom, creating it if needed.
    fn intern_atom(&self, name: &str) -> Result<Option<Atom>, ReplyOrIdError>;
    /// Replaces a `STRING` property on a window.
    fn set_string_property(&self, window: Window, property: Atom, data: &[u8]) -> Res;
    /// Sets `WM_NAME` so the window is recognisable.
    fn set_title(&self, window: Window, title: &str) -> Res;
    fn query_extension(&self, name: &str) -> Result<Option<ExtensionInfo>, ReplyOrIdError>;
    /// The number of extensions the server lists.
    fn count_extensions(&self) -> Result<Option<usize>, ReplyOrIdError>;
}

/// A connection to the X11 server plus the screen the probe runs on and its resource ledger.
pub struct ProbeConnection<'a, C: Connection> {
    /// A connection to the X11 server.
    pub conn: &'a C,
    /// The default screen.
    pub screen: &'a Screen,
    /// The screen's index.
    screen_num: usize,
    /// Everything created so far.
    ledger: RefCell<ResourceLedger>,
}

impl<'a, C: Connection> ProbeConnection<'a, C> {
    #[must_use]
    pub fn new(conn: &'a C, screen_num: usize) -> Self {
        let screen = &conn.setup().roots[screen_num];
        log::trace!("screen num {screen_num} root {}", screen.root);
        Self {
            conn,
            screen,
            screen_num,
            ledger: RefCell::new(ResourceLedger::new()),
        }
    }

    fn track(&self, resource: Resource) {
        self.ledger.borrow_mut().track(resource);
    }

    /// Creates an input/output child of the root window with the root visual.
    pub fn create_window(
        &self,
        spec: WindowSpec,
        aux: &CreateWindowAux,
    ) -> Result<Window, ReplyOrIdError> {
        let window = self.conn.generate_id()?;
        self.conn.create_window(
            COPY_DEPTH_FROM_PARENT,
            window,
            self.screen.root,
            spec.x,
            spec.y,
            spec.width,
            spec.height,
            spec.border,
            WindowClass::INPUT_OUTPUT,
            self.screen.root_visual,
            aux,
        )?;
        self.track(Resource::Window(window));
        log::debug!("created window {window} {}x{}", spec.width, spec.height);
        Ok(window)
    }

    pub fn map_window(&self, window: Window) -> Res {
        self.conn.map_window(window)?;
        Ok(())
    }

    /// Destroys a window right away instead of waiting for `release_all`.
    pub fn destroy_window(&self, window: Window) -> Res {
        self.ledger.borrow_mut().forget(Resource::Window(window));
        self.conn.destroy_window(window)?;
        Ok(())
    }

    /// Creates a colormap for the root visual, with no entries allocated.
    pub fn create_colormap(&self, window: Window) -> Result<Colormap, ReplyOrIdError> {
        let colormap = self.conn.generate_id()?;
        self.conn.create_colormap(
            ColormapAlloc::NONE,
            colormap,
            window,
            self.screen.root_visual,
        )?;
        self.track(Resource::Colormap(colormap));
        Ok(colormap)
    }

    /// Allocates a read only colour cell, waiting for the reply.
    pub fn alloc_color(
        &self,
        colormap: Colormap,
        color: Rgb,
    ) -> Result<Option<AllocColorReply>, ReplyOrIdError> {
        let reply = self
            .conn
            .alloc_color(colormap, color.red, color.green, color.blue)?
            .reply();
        Ok(soft_reply("alloc color", reply)?)
    }

    /// Sends every allocation before reading any reply.
    pub fn alloc_colors(
        &self,
        colormap: Colormap,
        colors: &[Rgb],
    ) -> Result<Vec<Option<AllocColorReply>>, ReplyOrIdError> {
        let cookies = colors
            .iter()
            .map(|c| self.conn.alloc_color(colormap, c.red, c.green, c.blue))
            .collect::<Result<Vec<_>, _>>()?;
        cookies
            .into_iter()
            .map(|cookie| -> Result<_, ReplyOrIdError> {
                Ok(soft_reply("alloc color", cookie.reply())?)
            })
            .collect()
    }

    pub fn create_gc(
        &self,
        drawable: Drawable,
        aux: &CreateGCAux,
    ) -> Result<Gcontext, ReplyOrIdError> {
        let gc = self.conn.generate_id()?;
        self.conn.create_gc(gc, drawable, aux)?;
        self.track(Resource::Gc(gc));
        Ok(gc)
    }

    /// A graphics context that only sets the foreground pixel.
    pub fn create_foreground_gc(
        &self,
        drawable: Drawable,
        pixel: u32,
    ) -> Result<Gcontext, ReplyOrIdError> {
        self.create_gc(drawable, &CreateGCAux::new().foreground(pixel))
    }

    /// A foreground graphics context for an allocated colour, or `None` if allocation failed.
    pub fn create_color_gc(
        &self,
        drawable: Drawable,
        reply: Option<&AllocColorReply>,
    ) -> Result<Option<Gcontext>, ReplyOrIdError> {
        reply
            .map(|r| self.create_foreground_gc(drawable, r.pixel))
            .transpose()
    }

    /// A black on white graphics context drawing with `font`.
    pub fn create_text_gc(
        &self,
        drawable: Drawable,
        font: Font,
    ) -> Result<Gcontext, ReplyOrIdError> {
        self.create_gc(
            drawable,
            &CreateGCAux::new()
                .foreground(self.screen.black_pixel)
                .background(self.screen.white_pixel)
                .font(font),
        )
    }

    /// Opens a server side font by name.
    ///
    /// A bad name only shows up later as an error event, so the id is always returned.
    pub fn open_font(&self, name: &str) -> Result<Font, ReplyOrIdError> {
        let font = self.conn.generate_id()?;
        self.conn.open_font(font, name.as_bytes())?;
        self.track(Resource::Font(font));
        log::debug!("opened font {name} as {font}");
        Ok(font)
    }

    pub fn query_font(&self, font: Font) -> Result<Option<FontInfo>, ReplyOrIdError> {
        let reply = soft_reply("query font", self.conn.query_font(font)?.reply())?;
        Ok(reply.map(|r| {
            FontInfo::from_bounds(r.font_ascent, r.font_descent, r.min_bounds, r.max_bounds)
        }))
    }

    pub fn create_pixmap(
        &self,
        depth: u8,
        drawable: Drawable,
        width: u16,
        height: u16,
    ) -> Result<Pixmap, ReplyOrIdError> {
        let pixmap = self.conn.generate_id()?;
        self.conn.create_pixmap(depth, pixmap, drawable, width, height)?;
        self.track(Resource::Pixmap(pixmap));
        Ok(pixmap)
    }

    /// Creates a cursor from a depth 1 source and mask pixmap.
    pub fn create_pixmap_cursor(
        &self,
        source: Pixmap,
        mask: Pixmap,
        foreground: Rgb,
        background: Rgb,
        hotspot: (u16, u16),
    ) -> Result<Cursor, ReplyOrIdError> {
        let cursor = self.conn.generate_id()?;
        self.conn.create_cursor(
            cursor,
            source,
            mask,
            foreground.red,
            foreground.green,
            foreground.blue,
            background.red,
            background.green,
            background.blue,
            hotspot.0,
            hotspot.1,
        )?;
        self.track(Resource::Cursor(cursor));
        Ok(cursor)
    }

    /// Creates a cursor from a glyph of the `cursor` font. The mask is the next glyph.
    pub fn create_glyph_cursor(
        &self,
        font: Font,
        glyph: u16,
        foreground: Rgb,
        background: Rgb,
    ) -> Result<Cursor, ReplyOrIdError> {
        let cursor = self.conn.generate_id()?;
        self.conn.create_glyph_cursor(
            cursor,
            font,
            font,
            glyph,
            glyph + 1,
            foreground.red,
            foreground.green,
            foreground.blue,
            background.red,
            background.green,
            background.blue,
        )?;
        self.track(Resource::Cursor(cursor));
        Ok(cursor)
    }

    /// Loads a named cursor from the user's cursor theme.
    pub fn load_theme_cursor(&self, name: &str) -> Result<Cursor, ReplyOrIdError> {
        let cursor = cursor::Handle::new(
            self.conn,
            self.screen_num,
            &resource_manager::new_from_default(self.conn)?,
        )?
        .reply()?
        .load_cursor(self.conn, name)?;
        if cursor != NONE {
            self.track(Resource::Cursor(cursor));
        }
        Ok(cursor)
    }

    pub fn set_window_cursor(&self, window: Window, cursor: Cursor) -> Res {
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().cursor(cursor),
        )?;
        Ok(())
    }

    /// Frees one resource with the request matching its kind.
    pub fn free(&self, resource: Resource) -> Res {
        log::trace!("freeing {resource:?}");
        match resource {
            Resource::Window(w) => self.conn.destroy_window(w)?,
            Resource::Gc(gc) => self.conn.free_gc(gc)?,
            Resource::Pixmap(p) => self.conn.free_pixmap(p)?,
            Resource::Colormap(c) => self.conn.free_colormap(c)?,
            Resource::Font(f) => self.conn.close_font(f)?,
            Resource::Cursor(c) => self.conn.free_cursor(c)?,
        };
        Ok(())
    }

    /// Frees a resource now and drops it from the ledger.
    pub fn release(&self, resource: Resource) -> Res {
        self.ledger.borrow_mut().forget(resource);
        self.free(resource)
    }

    /// Frees everything still in the ledger, newest first.
    ///
    /// Keeps going after a failure and returns the first error.
    pub fn release_all(&self) -> Res {
        let order = self.ledger.borrow_mut().drain_release_order();
        log::debug!("releasing {} resources", order.len());
        let mut first_error = None;
        for resource in order {
            if let Err(e) = self.free(resource) {
                log::error!("couldn't free {resource:?}: {e}");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn flush(&self) -> Res {
        self.conn.flush()?;
        Ok(())
    }
}

impl<C: Connection> Canvas for ProbeConnection<'_, C> {
    fn fill_rectangles(&self, drawable: Drawable, gc: Gcontext, rects: &[Rectangle]) -> Res {
        self.conn.poly_fill_rectangle(drawable, gc, rects)?;
        Ok(())
    }

    fn draw_rectangles(&self, drawable: Drawable, gc: Gcontext, rects: &[Rectangle]) -> Res {
        self.conn.poly_rectangle(drawable, gc, rects)?;
        Ok(())
    }

    fn draw_polyline(&self, drawable: Drawable, gc: Gcontext, points: &[Point]) -> Res {
        self.conn.poly_line(CoordMode::ORIGIN, drawable, gc, points)?;
        Ok(())
    }

    fn draw_text(&self, drawable: Drawable, gc: Gcontext, x: i16, y: i16, text: &str) -> Res {
        let bytes = text.as_bytes();
        let bytes = &bytes[..bytes.len().min(255)];
        self.conn.image_text8(drawable, gc, x, y, bytes)?;
        Ok(())
    }

    fn clear_area(&self, window: Window, width: u16, height: u16) -> Res {
        self.conn.clear_area(false, window, 0, 0, width, height)?;
        Ok(())
    }

    fn copy_area(
        &self,
        src: Drawable,
        dst: Drawable,
        gc: Gcontext,
        width: u16,
        height: u16,
    ) -> Res {
        self.conn.copy_area(src, dst, gc, 0, 0, 0, 0, width, height)?;
        Ok(())
    }

    fn put_image(
        &self,
        drawable: Drawable,
        gc: Gcontext,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        data: &[u8],
    ) -> Res {
        if let Err(e) = self
            .conn
            .put_image(
                ImageFormat::Z_PIXMAP,
                drawable,
                gc,
                width,
                height,
                x,
                y,
                0,
                self.screen.root_depth,
                data,
            )?
            .check()
        {
            log::error!("error putting image! {e}");
        }
        Ok(())
    }
}

impl<C: Connection> ConnectionInputExt for ProbeConnection<'_, C> {
    fn grab_pointer(&self, window: Window, mask: EventMask) -> Result<Option<u8>, ReplyOrIdError> {
        let reply = self
            .conn
            .grab_pointer(
                false,
                window,
                mask,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                NONE,
                CURRENT_TIME,
            )?
            .reply();
        Ok(soft_reply("grab pointer", reply)?.map(|r| u8::from(r.status)))
    }

    fn ungrab_pointer(&self) -> Res {
        self.conn.ungrab_pointer(CURRENT_TIME)?;
        Ok(())
    }

    fn grab_keyboard(&self, window: Window) -> Result<Option<u8>, ReplyOrIdError> {
        let reply = self
            .conn
            .grab_keyboard(
                false,
                window,
                CURRENT_TIME,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )?
            .reply();
        Ok(soft_reply("grab keyboard", reply)?.map(|r| u8::from(r.status)))
    }

    fn ungrab_keyboard(&self) -> Res {
        self.conn.ungrab_keyboard(CURRENT_TIME)?;
        Ok(())
    }

    fn query_pointer(&self, window: Window) -> Result<Option<PointerPosition>, ReplyOrIdError> {
        let reply = soft_reply("query pointer", self.conn.query_pointer(window)?.reply())?;
        Ok(reply.map(|r| PointerPosition {
            win_x: r.win_x,
            win_y: r.win_y,
            root_x: r.root_x,
            root_y: r.root_y,
        }))
    }
}

impl<C: Connection> ConnectionInfoExt for ProbeConnection<'_, C> {
    fn intern_atom(&self, name: &str) -> Result<Option<Atom>, ReplyOrIdError> {
        let reply = soft_reply(
            "intern atom",
            self.conn.intern_atom(false, name.as_bytes())?.reply(),
        )?;
        Ok(reply.map(|r| r.atom))
    }

    fn set_string_property(&self, window: Window, property: Atom, data: &[u8]) -> Res {
        self.conn.change_property8(
            PropMode::REPLACE,
            window,
            property,
            AtomEnum::STRING,
            data,
        )?;
        Ok(())
    }

    fn set_title(&self, window: Window, title: &str) -> Res {
        self.set_string_property(window, AtomEnum::WM_NAME.into(), title.as_bytes())
    }

    fn query_extension(&self, name: &str) -> Result<Option<ExtensionInfo>, ReplyOrIdError> {
        let reply = soft_reply(
            "query extension",
            self.conn.query_extension(name.as_bytes())?.reply(),
        )?;
        Ok(reply.map(|r| ExtensionInfo {
            present: r.present,
            major_opcode: r.major_opcode,
            first_event: r.first_event,
            first_error: r.first_error,
        }))
    }

    fn count_extensions(&self) -> Result<Option<usize>, ReplyOrIdError> {
        let reply = soft_reply("list extensions", self.conn.list_extensions()?.reply())?;
        Ok(reply.map(|r| r.names.len()))
    }
}
