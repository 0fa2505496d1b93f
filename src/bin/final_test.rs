use std::process::ExitCode;

use xprobe::probes::final_test;

fn main() -> ExitCode {
    xprobe::launch("FINAL XCB COMPREHENSIVE TEST", |conn, config| {
        final_test::run(conn, config)
    })
}
