use std::process::ExitCode;

use xprobe::probes::pixmap;

fn main() -> ExitCode {
    xprobe::launch("XCB Simple Pixmap Test", |conn, config| {
        pixmap::run(conn, config, &pixmap::SIMPLE_PIXMAP)
    })
}
