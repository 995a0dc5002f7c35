#![allow(dead_code)]

/// MPU hardware registers touched by the core.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reg {
  IntEnable = 0x38,
  BankSel = 0x6D,
  MemStartAddr = 0x6E,
  MemRw = 0x6F,
  WhoAmI = 0x75,
}

impl From<Reg> for u8 {
  fn from(r: Reg) -> Self {
    r as u8
  }
}

pub(crate) const WHO_AM_I_MPU: u8 = 0x68;

/// DMP memory is banked, 256 bytes per bank.
pub(crate) const DMP_BANK_SIZE: usize = 256;
/// Largest single burst through `MEM_R_W`.
pub(crate) const DMP_MEM_CHUNK: usize = 16;

pub(crate) const Q30: i32 = 1 << 30;

// DMP microcode fragments. Each DINAxx is the opcode byte 0xxx.
pub(crate) const DINA0C: u8 = 0x0c;
pub(crate) const DINA26: u8 = 0x26;
pub(crate) const DINA2C: u8 = 0x2c;
pub(crate) const DINA2D: u8 = 0x2d;
pub(crate) const DINA35: u8 = 0x35;
pub(crate) const DINA36: u8 = 0x36;
pub(crate) const DINA3D: u8 = 0x3d;
pub(crate) const DINA46: u8 = 0x46;
pub(crate) const DINA4C: u8 = 0x4c;
pub(crate) const DINA55: u8 = 0x55;
pub(crate) const DINA56: u8 = 0x56;
pub(crate) const DINA66: u8 = 0x66;
pub(crate) const DINA6C: u8 = 0x6c;
pub(crate) const DINA76: u8 = 0x76;
pub(crate) const DINA7D: u8 = 0x7d;
pub(crate) const DINA80: u8 = 0x80;
pub(crate) const DINAC9: u8 = 0xc9;
pub(crate) const DINACB: u8 = 0xcb;
pub(crate) const DINACD: u8 = 0xcd;
pub(crate) const DINAD8: u8 = 0xd8;
pub(crate) const DINAFE: u8 = 0xfe;

// gyro_sens * GYRO_SF_NUM / 2^30 = sens * (0.5 * pi / 180 / 200) * 2^14, in DMP units.
pub(crate) const GYRO_SF_NUM: i64 = 767_603_923;
pub(crate) const GYRO_SF2_NUM: i64 = 23_832_619_764_371;
