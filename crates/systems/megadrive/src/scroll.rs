//! Plane scroll from the horizontal scroll table and VSRAM.
//!
//! The horizontal table in VRAM holds one 4-byte entry per line (plane A
//! word, then plane B word). VSRAM holds one word pair (A, B) per 16-pixel
//! column. Both hold 10-bit values.

use crate::vdp::{HScrollMode, VScrollMode, VdpLayout};
use ir_core::ir::Scroll;

/// Lines covered by the horizontal scroll table (V30 mode).
pub const SCROLL_LINES: u32 = 240;
/// VSRAM columns in cell mode (40 cells / 2).
pub const VSCROLL_COLUMNS: usize = 20;
pub const VSCROLL_COLUMN_WIDTH: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    A,
    B,
}

impl Plane {
    fn word_offset(self) -> usize {
        match self {
            Plane::A => 0,
            Plane::B => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneScroll {
    pub scroll: Scroll,
    /// Horizontal entries that lay outside VRAM and were read as 0
    pub truncated_lines: usize,
    /// Vertical entries that lay outside VSRAM and were read as 0
    pub truncated_columns: usize,
}

fn word_at(bytes: &[u8], addr: usize) -> Option<u16> {
    bytes
        .get(addr..addr + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

/// Scroll offsets for one plane.
///
/// Without a known table base or without VSRAM the corresponding offset is 0;
/// the caller reports that. Entries past the end of a short VRAM or VSRAM
/// read as 0 and are counted.
pub fn plane_scroll(
    vram: &[u8],
    vsram: Option<&[u8]>,
    layout: &VdpLayout,
    plane: Plane,
) -> PlaneScroll {
    let mut scroll = Scroll::default();
    let mut truncated_lines = 0;
    let mut truncated_columns = 0;

    if let Some(table) = layout.hscroll_table_base {
        let mut read_line = |line: u32| -> i32 {
            let addr = table + line as usize * 4 + plane.word_offset();
            match word_at(vram, addr) {
                Some(word) => -((word & 0x03FF) as i32),
                None => {
                    truncated_lines += 1;
                    0
                }
            }
        };
        match layout.h_scroll_mode {
            HScrollMode::Full => scroll.x = read_line(0),
            HScrollMode::Cell => {
                scroll.rows = (0..SCROLL_LINES).map(|line| read_line(line & !7)).collect();
            }
            HScrollMode::Line => {
                scroll.rows = (0..SCROLL_LINES).map(&mut read_line).collect();
            }
        }
    }

    if let Some(vsram) = vsram {
        let mut read_column = |column: usize| -> i32 {
            match word_at(vsram, column * 4 + plane.word_offset()) {
                Some(word) => (word & 0x03FF) as i32,
                None => {
                    truncated_columns += 1;
                    0
                }
            }
        };
        match layout.v_scroll_mode {
            VScrollMode::Full => scroll.y = read_column(0),
            VScrollMode::Cell => {
                scroll.columns = (0..VSCROLL_COLUMNS).map(&mut read_column).collect();
                scroll.column_width = VSCROLL_COLUMN_WIDTH;
            }
        }
    }

    PlaneScroll {
        scroll,
        truncated_lines,
        truncated_columns,
    }
}
