//! System id -> adapter lookup over the closed set of supported systems.

use ir_core::error::DecodeError;
use ir_core::ir::FrameIR;
use ir_core::snapshot::{MemorySnapshot, Region};
use ir_core::system::SystemId;
use ir_core::Adapter;
use ir_gb::GbAdapter;
use ir_megadrive::MegaDriveAdapter;
use ir_nes::NesAdapter;
use ir_snes::SnesAdapter;

/// One adapter per supported system.
#[derive(Debug, Clone, Copy)]
pub enum SystemAdapter {
    MegaDrive(MegaDriveAdapter),
    Snes(SnesAdapter),
    Nes(NesAdapter),
    GameBoy(GbAdapter),
}

impl SystemAdapter {
    pub fn for_system(id: SystemId) -> Self {
        match id {
            SystemId::MegaDrive => SystemAdapter::MegaDrive(MegaDriveAdapter::new()),
            SystemId::Snes => SystemAdapter::Snes(SnesAdapter::new()),
            SystemId::Nes => SystemAdapter::Nes(NesAdapter::new()),
            SystemId::GameBoy => SystemAdapter::GameBoy(GbAdapter::dmg()),
            SystemId::GameBoyColor => SystemAdapter::GameBoy(GbAdapter::cgb()),
        }
    }

    fn inner(&self) -> &dyn Adapter {
        match self {
            SystemAdapter::MegaDrive(a) => a,
            SystemAdapter::Snes(a) => a,
            SystemAdapter::Nes(a) => a,
            SystemAdapter::GameBoy(a) => a,
        }
    }
}

impl Adapter for SystemAdapter {
    fn system(&self) -> SystemId {
        self.inner().system()
    }

    fn build_frame_ir(&self, snapshot: &MemorySnapshot) -> FrameIR {
        self.inner().build_frame_ir(snapshot)
    }

    fn regions(&self) -> &'static [Region] {
        self.inner().regions()
    }
}

/// Resolve a system id or alias. Unknown ids are `UnsupportedSystem`.
pub fn lookup(name: &str) -> Result<SystemAdapter, DecodeError> {
    let id: SystemId = name.parse()?;
    Ok(SystemAdapter::for_system(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_system_resolves_to_itself() {
        for id in SystemId::ALL {
            let adapter = lookup(id.as_str()).unwrap();
            assert_eq!(adapter.system(), id);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(lookup("genesis").unwrap().system(), SystemId::MegaDrive);
        assert_eq!(lookup("CGB").unwrap().system(), SystemId::GameBoyColor);
    }

    #[test]
    fn test_unknown_system() {
        assert_eq!(
            lookup("pce").unwrap_err(),
            DecodeError::UnsupportedSystem("pce".to_string())
        );
    }

    #[test]
    fn test_regions_follow_system() {
        let md = lookup("md").unwrap();
        assert!(md.regions().contains(&Region::Vsram));
        let gb = lookup("gb").unwrap();
        assert!(!gb.regions().contains(&Region::Palettes));
        assert!(lookup("gbc").unwrap().regions().contains(&Region::Palettes));
    }
}
