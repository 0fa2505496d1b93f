use std::process::ExitCode;

use xprobe::probes::pixmap;

fn main() -> ExitCode {
    xprobe::launch("XCB Pixmap Test", |conn, config| {
        pixmap::run(conn, config, &pixmap::PIXMAP)
    })
}
