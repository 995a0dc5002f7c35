//! Sensor calibration.
//!
//! Each `set_*_calibration` turns a full-scale range and a mounting matrix
//! into the host-side Q30 calibration matrix plus the DMP's axis routing
//! program and scale factors. [`Dmp::apply_calibration`] drives all three from
//! the [`DeviceConfig`](crate::DeviceConfig).

use crate::{
  defs::*,
  orient::{axis_program, MountingMatrix},
  state::State,
  transport::Transport,
  Bus, Dmp, DmpKey, Endian, Error, GyroFullScale, Platform,
};

const GYRO_SELECTORS: [u8; 3] = [DINAC9, DINA2C, DINACB];
const GYRO_SIGNS: [u8; 3] = [DINA36, DINA56, DINA76];
const ACCEL_SELECTORS: [u8; 3] = [DINA4C, DINACD, DINA6C];
const ACCEL_SIGNS: [u8; 3] = [DINA26, DINA46, DINA66];

const CPASS_POS: [u8; 4] = [0x40, 0, 0, 0];
const CPASS_NEG: [u8; 4] = [0xc0, 0, 0, 0];
const CPASS_ZERO: [u8; 4] = [0; 4];

/// Gyro sensitivity to the DMP gyro scale factor.
pub(crate) fn gyro_sf(sens: i32) -> i32 {
  (sens as i64 * GYRO_SF_NUM / Q30 as i64) as i32
}

/// Reciprocal scale factor at `D_0_24`. Zero sensitivity maps to zero.
pub(crate) fn gyro_sf2(sens: i32) -> i32 {
  if sens == 0 {
    return 0;
  }
  (GYRO_SF2_NUM / sens as i64) as i32
}

impl<T, P> Dmp<T, P>
where
  T: Transport,
  P: Platform,
{
  /// Program the gyro for `range_dps` full scale mounted as `orientation`.
  pub async fn set_gyro_calibration(&mut self, range_dps: f32, orientation: &MountingMatrix) -> Result<(), Error<T::Error>> {
    self.require(State::DmpOpened)?;

    let mut range = range_dps;
    if self.device.gyro_sens_trim != 0 {
      range *= (32768.0 / 250.0) / self.device.gyro_sens_trim as f32;
    }
    let scale = range / 32768.0;

    self.obj.gyro_sens = (range * 32768.0) as i32;
    self.obj.gyro_cal = orientation.to_q30(scale);
    self.obj.gyro_orient = orientation.to_q30(1.0);

    let (selectors, signs) = axis_program(orientation, &GYRO_SELECTORS, &GYRO_SIGNS);
    self.write_mem(DmpKey::FCFG_1, &selectors).await?;
    self.write_mem(DmpKey::FCFG_3, &signs).await?;

    self.obj.gyro_sf = gyro_sf(self.obj.gyro_sens);
    self.write_mem_i32(DmpKey::D_0_104, self.obj.gyro_sf).await?;
    self.write_mem_i32(DmpKey::D_0_24, gyro_sf2(self.obj.gyro_sens)).await
  }

  /// Program the accelerometer. Without an accel descriptor only the scale
  /// factor at `D_0_108` is written.
  pub async fn set_accel_calibration(&mut self, range_g: f32, orientation: &MountingMatrix) -> Result<(), Error<T::Error>> {
    self.require(State::DmpOpened)?;

    if self.bus.key_supported(DmpKey::D_1_152) {
      self.write_mem(DmpKey::D_1_152, &[0; 4]).await?;
    }

    let scale = range_g / 32768.0;
    if scale == 0.0 {
      self.obj.accel_sens = 0;
    }

    if self.device.accel.is_some() {
      self.obj.accel_cal = orientation.to_q30(scale);
      let (selectors, signs) = axis_program(orientation, &ACCEL_SELECTORS, &ACCEL_SIGNS);
      self.write_mem(DmpKey::FCFG_2, &selectors).await?;
      self.write_mem(DmpKey::FCFG_7, &signs).await?;
    }

    let sf = if self.obj.accel_sens != 0 { Q30 / self.obj.accel_sens } else { 0 };
    self.write_mem_u16(DmpKey::D_0_108, sf as u16).await
  }

  /// Program the compass mounting matrix.
  ///
  /// Matrix elements that fail to write are logged and skipped; the call
  /// still succeeds.
  pub async fn set_compass_calibration(&mut self, range: f32, orientation: &MountingMatrix) -> Result<(), Error<T::Error>> {
    self.require(State::DmpOpened)?;

    let scale = range / 32768.0;
    self.obj.compass_cal = orientation.to_q30(scale);
    self.obj.compass_sens = (scale * Q30 as f32) as i32;

    if self.bus.key_supported(DmpKey::CPASS_MTX_00) {
      for (&key, &o) in DmpKey::CPASS_MTX.iter().zip(orientation.as_array()) {
        let reg = match o {
          1 => &CPASS_POS,
          -1 => &CPASS_NEG,
          _ => &CPASS_ZERO,
        };
        if self.write_mem(key, reg).await.is_err() {
          warn!("compass matrix element {} skipped", key);
        }
      }
    }
    Ok(())
  }

  /// Calibrate every described sensor from the device configuration.
  pub async fn apply_calibration(&mut self) -> Result<(), Error<T::Error>> {
    let gyro = GyroFullScale::try_from(self.device.full_scale).map_err(|_| {
      error!("unrecognized gyro full scale {=u8}", self.device.full_scale);
      Error::InvalidParameter
    })?;
    self.require(State::DmpOpened)?;

    let gyro_orientation = self.device.orientation;
    let accel = self.device.accel;
    let compass = self.device.compass;

    if let Some(a) = accel {
      self.obj.accel_sens = ((a.range.to_f32() * 65536.0) as i32) / 2;
    }
    if let Some(c) = compass {
      self.obj.compass_sens = (c.range.to_f32() * 32768.0) as i32;
    }

    self.set_gyro_calibration(gyro.dps(), &gyro_orientation).await.inspect_err(|_| {
      error!("gyro calibration failed");
    })?;

    if let Some(a) = accel {
      self.set_accel_calibration(a.range.to_f32(), &a.orientation).await.inspect_err(|_| {
        error!("accel calibration failed");
      })?;
    }

    if let Some(c) = compass {
      self.set_compass_calibration(c.range.to_f32(), &c.orientation).await.inspect_err(|_| {
        error!("compass calibration failed");
      })?;
    }
    Ok(())
  }

  /// Tell the DMP the byte order of accelerometer samples.
  ///
  /// Only a secondary-bus accelerometer can be little endian; anything on the
  /// primary bus is read big endian.
  pub async fn apply_endian_accel(&mut self) -> Result<(), Error<T::Error>> {
    self.require_at_least(State::DmpOpened)?;
    let accel = self.device.accel.ok_or(Error::DeviceNotRecognized)?;

    let endian = if accel.bus == Bus::Secondary { accel.endian } else { Endian::Big };
    let regs: [u8; 4] = match endian {
      Endian::Little => [0, 64, 0, 0],
      Endian::Big => [0, 0, 64, 0],
    };
    self.write_mem(DmpKey::D_1_236, &regs).await
  }
}
