use std::process::ExitCode;

use xprobe::probes::simple_cursor;

fn main() -> ExitCode {
    xprobe::launch("XCB Simple Cursor Test", |conn, config| {
        simple_cursor::run(conn, config)
    })
}
