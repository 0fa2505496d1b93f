use std::process::ExitCode;

use xprobe::probes::font;

fn main() -> ExitCode {
    xprobe::launch("XCB Font Test", |conn, config| font::run(conn, config))
}
