//! LCD I/O register block (0xFF40-0xFF4B).

// LCDC bits
const LCDC_ENABLE: u8 = 0x80;
const LCDC_WIN_TILEMAP: u8 = 0x40;
const LCDC_WIN_ENABLE: u8 = 0x20;
const LCDC_BG_WIN_TILES: u8 = 0x10;
const LCDC_BG_TILEMAP: u8 = 0x08;
const LCDC_OBJ_SIZE: u8 = 0x04;
const LCDC_OBJ_ENABLE: u8 = 0x02;
const LCDC_BG_WIN_ENABLE: u8 = 0x01;

/// Bytes read from the block: LCDC through WX.
pub const REGISTER_BLOCK_MIN: usize = 12;

/// Tiles per VRAM bank (0x8000-0x97FF).
pub const TILES_PER_BANK: u16 = 384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcdRegisters {
    pub lcdc: u8,
    pub scy: u8,
    pub scx: u8,
    pub bgp: u8,
    pub obp0: u8,
    pub obp1: u8,
    pub wy: u8,
    pub wx: u8,
    /// Post-boot values were assumed.
    pub from_defaults: bool,
}

impl Default for LcdRegisters {
    fn default() -> Self {
        Self {
            lcdc: 0x91,
            scy: 0,
            scx: 0,
            bgp: 0xFC,
            obp0: 0xFF,
            obp1: 0xFF,
            wy: 0,
            wx: 0,
            from_defaults: true,
        }
    }
}

impl LcdRegisters {
    /// Read the block; missing or short input gives post-boot defaults.
    pub fn parse(regs: Option<&[u8]>) -> Self {
        match regs {
            Some(r) if r.len() >= REGISTER_BLOCK_MIN => Self {
                lcdc: r[0x0],
                scy: r[0x2],
                scx: r[0x3],
                bgp: r[0x7],
                obp0: r[0x8],
                obp1: r[0x9],
                wy: r[0xA],
                wx: r[0xB],
                from_defaults: false,
            },
            _ => Self::default(),
        }
    }

    pub fn lcd_enabled(&self) -> bool {
        self.lcdc & LCDC_ENABLE != 0
    }

    pub fn bg_enabled(&self) -> bool {
        self.lcdc & LCDC_BG_WIN_ENABLE != 0
    }

    /// Window is on and its origin lies on screen.
    pub fn window_visible(&self) -> bool {
        self.lcdc & LCDC_WIN_ENABLE != 0 && self.wx < 167 && self.wy < 144
    }

    pub fn obj_enabled(&self) -> bool {
        self.lcdc & LCDC_OBJ_ENABLE != 0
    }

    pub fn tall_sprites(&self) -> bool {
        self.lcdc & LCDC_OBJ_SIZE != 0
    }

    /// Offset of the BG tile map within VRAM.
    pub fn bg_map_base(&self) -> usize {
        if self.lcdc & LCDC_BG_TILEMAP != 0 {
            0x1C00
        } else {
            0x1800
        }
    }

    pub fn window_map_base(&self) -> usize {
        if self.lcdc & LCDC_WIN_TILEMAP != 0 {
            0x1C00
        } else {
            0x1800
        }
    }

    /// Tile number within a bank for a BG/window map entry.
    ///
    /// Unsigned mode addresses tiles 0-255 from 0x8000; signed mode treats
    /// the entry as -128..127 around tile 256 (0x9000).
    pub fn bg_tile(&self, entry: u8) -> u16 {
        if self.lcdc & LCDC_BG_WIN_TILES != 0 {
            entry as u16
        } else {
            (256 + entry as i8 as i16) as u16
        }
    }
}
