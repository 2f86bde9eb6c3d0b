// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{IsTerminal, Write};

pub(super) const CHECK: char = '✓';
pub(super) const CROSS: char = '✗';
pub(super) const NOTICE: char = '!';

pub(super) fn print_stdout(text: &str) -> Result<()> {
    write_with_colored_symbols(&mut std::io::stdout(), text)
}

pub(super) fn print_stderr(text: &str) -> Result<()> {
    write_with_colored_symbols(&mut std::io::stderr(), text)
}

pub(super) fn print_with_red_cross_stderr(message: &str) -> Result<()> {
    print_stderr(&format!("{CROSS} {message}\n"))
}

fn symbol_color(symbol: char) -> Option<Color> {
    match symbol {
        CHECK => Some(Color::Green),
        CROSS => Some(Color::Red),
        NOTICE => Some(Color::Yellow),
        _ => None,
    }
}

/// Colours a leading status symbol on each line when `out` is a terminal.
fn write_with_colored_symbols<W: Write + IsTerminal>(out: &mut W, text: &str) -> Result<()> {
    if !out.is_terminal() {
        return write_all(out, text.as_bytes());
    }
    for line in text.split_inclusive('\n') {
        let mut chars = line.chars();
        match chars.next().and_then(|first| Some((first, symbol_color(first)?))) {
            Some((symbol, color)) => {
                execute!(
                    out,
                    SetForegroundColor(color),
                    Print(symbol),
                    ResetColor,
                    Print(chars.as_str())
                )?;
            }
            None => write_all(out, line.as_bytes())?,
        }
    }
    out.flush()?;
    Ok(())
}

fn write_all<W: Write>(w: &mut W, buf: &[u8]) -> Result<()> {
    w.write_all(buf)?;
    w.flush()?;
    Ok(())
}
