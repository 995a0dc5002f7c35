use micromath::vector::Vector3d;

use crate::orient::MountingMatrix;

/// Symbolic DMP memory locations.
///
/// `CFG_*`, `FCFG_*` and `CPASS_MTX_*` point into the firmware program and move
/// between firmware images, so the transport resolves them through its key table.
/// `D_b_o` keys name data memory directly (bank `b`, offset `o`).
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmpKey {
  CFG_6,
  CFG_7,
  CFG_18,
  FCFG_1,
  FCFG_2,
  FCFG_3,
  FCFG_5,
  FCFG_7,
  D_0_24,
  D_0_96,
  D_0_104,
  D_0_108,
  D_0_163,
  D_1_96,
  D_1_106,
  D_1_152,
  D_1_236,
  CPASS_MTX_00,
  CPASS_MTX_01,
  CPASS_MTX_02,
  CPASS_MTX_10,
  CPASS_MTX_11,
  CPASS_MTX_12,
  CPASS_MTX_20,
  CPASS_MTX_21,
  CPASS_MTX_22,
}

impl DmpKey {
  /// Compass mounting matrix keys in row-major order.
  pub const CPASS_MTX: [DmpKey; 9] = [
    DmpKey::CPASS_MTX_00,
    DmpKey::CPASS_MTX_01,
    DmpKey::CPASS_MTX_02,
    DmpKey::CPASS_MTX_10,
    DmpKey::CPASS_MTX_11,
    DmpKey::CPASS_MTX_12,
    DmpKey::CPASS_MTX_20,
    DmpKey::CPASS_MTX_21,
    DmpKey::CPASS_MTX_22,
  ];

  /// Fixed data-memory address, `None` for firmware-relative keys.
  pub const fn data_address(self) -> Option<u16> {
    match self {
      DmpKey::D_0_24 => Some(24),
      DmpKey::D_0_96 => Some(96),
      DmpKey::D_0_104 => Some(104),
      DmpKey::D_0_108 => Some(108),
      DmpKey::D_0_163 => Some(163),
      DmpKey::D_1_96 => Some(256 + 96),
      DmpKey::D_1_106 => Some(256 + 106),
      DmpKey::D_1_152 => Some(256 + 152),
      DmpKey::D_1_236 => Some(256 + 236),
      _ => None,
    }
  }
}

/// Which serial bus a slave sensor hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bus {
  #[default]
  Primary,
  Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endian {
  #[default]
  Big,
  Little,
}

/// Fixed-point full-scale range: `mantissa + fraction / 10000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixedRange {
  pub mantissa: i32,
  pub fraction: i32,
}

impl FixedRange {
  pub const fn new(mantissa: i32, fraction: i32) -> Self {
    Self { mantissa, fraction }
  }

  pub fn to_f32(self) -> f32 {
    self.mantissa as f32 + self.fraction as f32 / 10000.0
  }
}

/// Descriptor of an accelerometer, compass or pressure sensor attached to the MPU.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveDescriptor {
  pub bus: Bus,
  pub endian: Endian,
  pub range: FixedRange,
  pub orientation: MountingMatrix,
}

impl SlaveDescriptor {
  /// Primary bus, big endian.
  pub const fn new(range: FixedRange, orientation: MountingMatrix) -> Self {
    Self { bus: Bus::Primary, endian: Endian::Big, range, orientation }
  }
}

/// Gyro full-scale range as encoded in `GYRO_CONFIG.FS_SEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroFullScale {
  Dps250 = 0,
  Dps500 = 1,
  Dps1000 = 2,
  Dps2000 = 3,
}

impl GyroFullScale {
  pub fn dps(self) -> f32 {
    match self {
      GyroFullScale::Dps250 => 250.0,
      GyroFullScale::Dps500 => 500.0,
      GyroFullScale::Dps1000 => 1000.0,
      GyroFullScale::Dps2000 => 2000.0,
    }
  }
}

impl From<GyroFullScale> for u8 {
  fn from(fs: GyroFullScale) -> Self {
    fs as u8
  }
}

impl TryFrom<u8> for GyroFullScale {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(GyroFullScale::Dps250),
      1 => Ok(GyroFullScale::Dps500),
      2 => Ok(GyroFullScale::Dps1000),
      3 => Ok(GyroFullScale::Dps2000),
      _ => Err(()),
    }
  }
}

/// Read-only description of the hardware the DMP is driving.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
  /// Gyro mounting matrix.
  pub orientation: MountingMatrix,
  /// Raw `FS_SEL` code. Kept raw so a bad board file surfaces as an error.
  pub full_scale: u8,
  /// Factory sensitivity trim, LSB per dps. Zero means untrimmed.
  pub gyro_sens_trim: u16,
  /// Factory temperature offsets. Any nonzero axis enables factory compensation.
  pub offset_tc: Vector3d<i32>,
  /// Compass sensitivity adjustment, Q30. `None` keeps unity.
  pub compass_asa: Option<Vector3d<i32>>,
  pub accel: Option<SlaveDescriptor>,
  pub compass: Option<SlaveDescriptor>,
  pub pressure: Option<SlaveDescriptor>,
}

impl Default for DeviceConfig {
  fn default() -> Self {
    Self {
      orientation: MountingMatrix::IDENTITY,
      full_scale: GyroFullScale::Dps2000.into(),
      gyro_sens_trim: 0,
      offset_tc: Vector3d { x: 0, y: 0, z: 0 },
      compass_asa: None,
      accel: None,
      compass: None,
      pressure: None,
    }
  }
}
