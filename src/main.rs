use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use utility_lib::alloc::AllocPolicy;
use utility_lib::read::lines;
use utility_lib::split::split;

fn main() -> ExitCode {
    env_logger::init();

    if let Err(rejected) = AllocPolicy::strict().install() {
        log::warn!("allocation policy already installed, ignoring {:?}", rejected);
    }
    let policy = AllocPolicy::global();

    let stdin = io::stdin();
    let mut source = stdin.lock();
    let mut out = BufWriter::new(io::stdout().lock());

    for (number, line) in lines(&mut source, policy).enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("failed to read line {}: {}", number + 1, e);
                return ExitCode::FAILURE;
            },
        };

        let res = match split(&line, b',', policy) {
            Ok(Some(tokens)) => tokens
                .iter()
                .enumerate()
                .try_for_each(|(index, token)| writeln!(out, "{}:{}: {}", number + 1, index, token)),
            Ok(None) => writeln!(out, "{}: (no tokens)", number + 1),
            Err(e) => {
                log::error!("failed to split line {}: {}", number + 1, e);
                return ExitCode::FAILURE;
            },
        };

        if let Err(e) = res {
            log::error!("failed to write output: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match out.flush() {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
