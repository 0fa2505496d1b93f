use std::process::ExitCode;

use xprobe::probes::paint;

fn main() -> ExitCode {
    xprobe::launch("Simple Paint", |conn, config| paint::run(conn, config))
}
