// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::io::{self, Read, Seek, SeekFrom};

const BLOCK_SIZE: u64 = 8 * 1024;

/// Returns the last `count` lines of `reader` without reading the whole
/// stream: blocks are read backwards from the end until enough line breaks
/// have been seen.
///
/// Line breaks are `\n` or `\r\n`; invalid UTF-8 is replaced lossily.
pub fn tail_lines<R: Read + Seek>(reader: &mut R, count: usize) -> io::Result<Vec<String>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let end = reader.seek(SeekFrom::End(0))?;
    let mut start = end;
    let mut blocks: Vec<Vec<u8>> = Vec::new();
    let mut breaks = 0usize;

    // One break more than requested guarantees `count` complete lines,
    // whether or not the stream ends with a newline.
    while start > 0 && breaks <= count {
        let size = BLOCK_SIZE.min(start);
        start -= size;
        reader.seek(SeekFrom::Start(start))?;
        let mut block = vec![0u8; size as usize];
        reader.read_exact(&mut block)?;
        breaks += block.iter().filter(|byte| **byte == b'\n').count();
        blocks.push(block);
    }

    let bytes: Vec<u8> = blocks.into_iter().rev().flatten().collect();
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let skip = lines.len().saturating_sub(count);
    Ok(lines[skip..].iter().map(|line| line.to_string()).collect())
}
