use std::process::ExitCode;

use xprobe::probes::window;

fn main() -> ExitCode {
    xprobe::launch("XCB Window Test", |conn, config| window::run(conn, config))
}
