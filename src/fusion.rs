use micromath::vector::Vector3d;

use crate::{defs::Q30, interrupt::InterruptSources, motion::*, DeviceConfig};

const UNIT_QUAT: [i32; 4] = [Q30, 0, 0, 0];
const COMPASS_SENS_DEFAULT: i32 = 322_122_560;
const COMPASS_BIAS_P_INIT: i32 = 100_000;

/// Host-side mirror of everything the DMP has been told, plus the bias and
/// motion bookkeeping downstream fusion code reads.
///
/// Matrices are row-major Q30.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionState {
  pub gyro_cal: [i32; 9],
  pub gyro_orient: [i32; 9],
  pub gyro_sens: i32,
  pub gyro_sf: i32,

  pub accel_cal: [i32; 9],
  pub accel_sens: i32,

  pub compass_cal: [i32; 9],
  pub compass_sens: i32,
  pub compass_correction: [i32; 4],
  pub compass_correction_relative: [i32; 4],
  pub compass_disturb_correction: [i32; 4],
  pub compass_correction_offset: [i32; 4],
  pub relative_quat: [i32; 4],
  pub compass_scale: Vector3d<i32>,
  pub compass_test_scale: Vector3d<i32>,
  pub compass_asa: Vector3d<i32>,
  pub compass_bias_error: Vector3d<i32>,
  pub got_compass_bias: bool,

  pub got_no_motion_bias: bool,
  pub gyro_bias_err: i32,
  pub temp_slope: Vector3d<i32>,
  pub factory_temp_comp: bool,

  pub motion_state: MotionState,
  pub internal_motion_state: InternalMotionState,
  pub motion_duration: u16,
  pub no_motion_threshold: i32,
  pub no_motion_accel_threshold: i32,
  pub bias_update_time: i32,
  pub bias_calc_time: i32,
  pub accel_lpf_gain: i32,

  pub interrupt_sources: InterruptSources,
  /// Last value written to `INT_ENABLE`.
  pub int_config: u8,
}

impl FusionState {
  pub fn new(device: &DeviceConfig) -> Self {
    let mut compass_cal = [0; 9];
    compass_cal[0] = COMPASS_SENS_DEFAULT;
    compass_cal[4] = COMPASS_SENS_DEFAULT;
    compass_cal[8] = COMPASS_SENS_DEFAULT;

    Self {
      gyro_cal: [0; 9],
      gyro_orient: [0; 9],
      gyro_sens: 0,
      gyro_sf: 0,
      accel_cal: [0; 9],
      accel_sens: 0,
      compass_cal,
      compass_sens: COMPASS_SENS_DEFAULT,
      compass_correction: UNIT_QUAT,
      compass_correction_relative: UNIT_QUAT,
      compass_disturb_correction: UNIT_QUAT,
      compass_correction_offset: UNIT_QUAT,
      relative_quat: UNIT_QUAT,
      compass_scale: splat(65536),
      compass_test_scale: splat(65536),
      compass_asa: device.compass_asa.unwrap_or(splat(Q30)),
      compass_bias_error: splat(COMPASS_BIAS_P_INIT),
      got_compass_bias: false,
      got_no_motion_bias: false,
      gyro_bias_err: 1_310_720,
      temp_slope: splat(0),
      factory_temp_comp: false,
      motion_state: MotionState::Motion,
      internal_motion_state: InternalMotionState::Moving,
      motion_duration: 1536,
      no_motion_threshold: 20,
      no_motion_accel_threshold: 7_000_000,
      bias_update_time: 8000,
      bias_calc_time: 2000,
      accel_lpf_gain: 1_073_744,
      interrupt_sources: InterruptSources::empty(),
      int_config: 0,
    }
  }
}

fn splat(v: i32) -> Vector3d<i32> {
  Vector3d { x: v, y: v, z: v }
}
