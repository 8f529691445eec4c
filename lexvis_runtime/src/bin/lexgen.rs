//! # lexgen
//!
//! Grammar compilation tool: `.g4` lexer grammar to `<Name>Lexer.json`.

use std::io::Write;

fn main() {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    let code = lexvis_compiler::cli::run(std::env::args().skip(1), &mut out, &mut err);
    let _ = out.flush();
    let _ = err.flush();
    std::process::exit(code);
}
