//! VDP register block parsing.
//!
//! Only the registers that determine memory layout are read:
//!
//! | Reg | Use |
//! |-----|-----|
//! | 2   | plane A name table base |
//! | 3   | window name table base |
//! | 4   | plane B name table base |
//! | 5   | sprite attribute table base |
//! | 7   | backdrop color |
//! | 11  | scroll modes |
//! | 12  | H40 display mode |
//! | 13  | horizontal scroll table base |
//! | 16  | plane size |

use ir_core::logging::{log, LogCategory, LogLevel};

/// Registers 0-23 plus padding, as captured.
pub const REGISTER_BLOCK_MIN: usize = 32;

pub const DEFAULT_PLANE_A_BASE: usize = 0xC000;
pub const DEFAULT_PLANE_B_BASE: usize = 0xE000;
pub const DEFAULT_WINDOW_BASE: usize = 0xB000;
pub const DEFAULT_SPRITE_TABLE_BASE: usize = 0xD800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HScrollMode {
    Full,
    Cell,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VScrollMode {
    Full,
    /// One value per 2-cell (16 pixel) column
    Cell,
}

/// Scroll plane size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneSize {
    pub width: u32,
    pub height: u32,
}

impl Default for PlaneSize {
    fn default() -> Self {
        Self {
            width: 64,
            height: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VdpLayout {
    pub plane_a_base: usize,
    pub plane_b_base: usize,
    pub window_base: usize,
    pub sprite_table_base: usize,
    pub h_scroll_mode: HScrollMode,
    pub v_scroll_mode: VScrollMode,
    pub plane_size: PlaneSize,
    /// `None` when registers were unavailable.
    pub hscroll_table_base: Option<usize>,
    /// (palette line, color index), `None` when registers were unavailable.
    pub backdrop: Option<(u8, u8)>,
    pub h40: bool,
    /// True when this is the fixed default layout rather than real registers.
    pub from_defaults: bool,
}

impl Default for VdpLayout {
    fn default() -> Self {
        Self {
            plane_a_base: DEFAULT_PLANE_A_BASE,
            plane_b_base: DEFAULT_PLANE_B_BASE,
            window_base: DEFAULT_WINDOW_BASE,
            sprite_table_base: DEFAULT_SPRITE_TABLE_BASE,
            h_scroll_mode: HScrollMode::Full,
            v_scroll_mode: VScrollMode::Full,
            plane_size: PlaneSize::default(),
            hscroll_table_base: None,
            backdrop: None,
            h40: true,
            from_defaults: true,
        }
    }
}

impl VdpLayout {
    /// Window plane width in cells: 64 in H40 mode, 32 in H32.
    pub fn window_width(&self) -> u32 {
        if self.h40 {
            64
        } else {
            32
        }
    }
}

fn plane_dimension(code: u8) -> u32 {
    match code & 0x03 {
        0b01 => 64,
        0b11 => 128,
        // 0b10 is not a valid setting; hardware treats it like 32
        _ => 32,
    }
}

/// Parse the register block, or return the default layout when it is missing or short.
///
/// Callers must record a diagnostic when `from_defaults` is set.
pub fn parse(regs: Option<&[u8]>) -> VdpLayout {
    let regs = match regs {
        Some(regs) if regs.len() >= REGISTER_BLOCK_MIN => regs,
        other => {
            log(LogCategory::Layout, LogLevel::Warn, || {
                format!(
                    "VDP registers unavailable ({} bytes); using default layout",
                    other.map_or(0, <[u8]>::len)
                )
            });
            return VdpLayout::default();
        }
    };

    let h_scroll_mode = match regs[11] & 0x03 {
        0b00 => HScrollMode::Full,
        0b01 => HScrollMode::Cell,
        _ => HScrollMode::Line,
    };
    let v_scroll_mode = if regs[11] & 0x04 != 0 {
        VScrollMode::Cell
    } else {
        VScrollMode::Full
    };

    let layout = VdpLayout {
        plane_a_base: ((regs[2] & 0x38) as usize) << 10,
        plane_b_base: ((regs[4] & 0x07) as usize) << 13,
        window_base: ((regs[3] & 0x3E) as usize) << 10,
        sprite_table_base: ((regs[5] & 0x7E) as usize) << 9,
        h_scroll_mode,
        v_scroll_mode,
        plane_size: PlaneSize {
            width: plane_dimension(regs[16]),
            height: plane_dimension(regs[16] >> 4),
        },
        hscroll_table_base: Some(((regs[13] & 0x3F) as usize) << 10),
        backdrop: Some(((regs[7] >> 4) & 0x03, regs[7] & 0x0F)),
        h40: regs[12] & 0x01 != 0,
        from_defaults: false,
    };

    log(LogCategory::Layout, LogLevel::Debug, || {
        format!(
            "plane A=0x{:04X} B=0x{:04X} window=0x{:04X} SAT=0x{:04X} size={}x{} scroll={:?}/{:?}",
            layout.plane_a_base,
            layout.plane_b_base,
            layout.window_base,
            layout.sprite_table_base,
            layout.plane_size.width,
            layout.plane_size.height,
            layout.h_scroll_mode,
            layout.v_scroll_mode
        )
    });
    layout
}
