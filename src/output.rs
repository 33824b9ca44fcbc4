//! Colored, prefixed status lines for the provisioning flow.

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn line(prefix: &str, color: Color, bold: bool, msg: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold));
    let _ = write!(stdout, "[{prefix}]");
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {msg}");
}

pub fn info(msg: &str) {
    line("INFO", Color::Cyan, false, msg);
}

pub fn success(msg: &str) {
    line("SUCCESS", Color::Green, true, msg);
}

pub fn warn(msg: &str) {
    line("WARNING", Color::Yellow, false, msg);
}

pub fn error(msg: &str) {
    line("ERROR", Color::Red, true, msg);
}
