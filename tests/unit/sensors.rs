use crate::common::*;
use inv_dmp::sensors::{AccelConfig, AccelIrq};
use inv_dmp::{DmpKey, Error, Sensors};
use std::sync::Mutex;

#[tokio::test]
async fn partial_accel_triplet_rejected() {
  let (mut dmp, bus, platform) = opened_dmp(six_axis()).await;
  let before = dmp.requested_sensors();

  let r = dmp.set_mpu_sensors(Sensors::THREE_AXIS_GYRO | Sensors::X_ACCEL | Sensors::Y_ACCEL).await;
  assert_eq!(r, Err(Error::NotImplemented));
  assert_eq!(dmp.requested_sensors(), before);
  assert!(bus.ops().is_empty());
  assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn partial_compass_and_pressure_rejected() {
  let (mut dmp, _, _) = opened_dmp(nine_axis()).await;
  assert_eq!(dmp.set_mpu_sensors(Sensors::Z_COMPASS).await, Err(Error::NotImplemented));
  assert_eq!(dmp.set_mpu_sensors(Sensors::X_PRESSURE).await, Err(Error::NotImplemented));
}

#[tokio::test]
async fn compass_without_descriptor_rejected() {
  let (mut dmp, _, _) = opened_dmp(six_axis()).await;
  assert_eq!(dmp.set_mpu_sensors(Sensors::NINE_AXIS).await, Err(Error::DeviceNotRecognized));
}

#[tokio::test]
async fn change_while_opened_only_restores_rate() {
  let (mut dmp, bus, platform) = opened_dmp(gyro_only()).await;
  dmp.set_mpu_sensors(Sensors::THREE_AXIS_GYRO).await.unwrap();

  assert_eq!(dmp.requested_sensors(), Sensors::THREE_AXIS_GYRO);
  assert_eq!(platform.calls(), vec![Call::SetFifoRate(4)]);
  assert!(bus.ops().is_empty());
}

#[tokio::test]
async fn enabling_dmp_processor_stages_accel_and_fifo() {
  let (mut dmp, _, platform) = opened_dmp(gyro_only()).await;
  dmp.set_mpu_sensors(Sensors::THREE_AXIS_GYRO).await.unwrap();
  platform.clear();

  dmp.set_mpu_sensors(Sensors::THREE_AXIS_GYRO | Sensors::DMP_PROCESSOR).await.unwrap();
  assert_eq!(
    platform.calls(),
    vec![
      Call::ConfigAccel(AccelConfig::OdrResume(200_000), false),
      Call::ConfigAccel(AccelConfig::IrqResume(AccelIrq::None), false),
      Call::InitFifo,
      Call::SetFifoRate(4),
    ]
  );
}

#[tokio::test]
async fn change_while_started_applies_live() {
  let (mut dmp, bus, platform) = started_dmp(nine_axis()).await;
  let sensors = Sensors::SIX_AXIS | Sensors::DMP_PROCESSOR;
  dmp.set_mpu_sensors(sensors).await.unwrap();

  assert_eq!(platform.calls(), vec![Call::Start(sensors), Call::Stop(!sensors), Call::SetFifoRate(4)]);
  assert_eq!(bus.mem_keys(), vec![DmpKey::CFG_18, DmpKey::D_1_106, DmpKey::D_1_96, DmpKey::D_0_96]);
  assert_eq!(dmp.requested_sensors(), sensors);
}

#[tokio::test]
async fn dropping_dmp_with_accel_resumes_data_ready() {
  let (mut dmp, _, platform) = started_dmp(six_axis()).await;
  dmp.set_mpu_sensors(Sensors::SIX_AXIS).await.unwrap();

  assert_eq!(platform.calls().last(), Some(&Call::ConfigAccel(AccelConfig::IrqResume(AccelIrq::DataReady), true)));
}

static SEEN: Mutex<Vec<(Sensors, Sensors)>> = Mutex::new(Vec::new());

fn record_mode(old: Sensors, new: Sensors) -> Result<(), Error<BusFault>> {
  SEEN.lock().unwrap().push((old, new));
  Ok(())
}

fn refuse_mode(_: Sensors, _: Sensors) -> Result<(), Error<BusFault>> {
  Err(Error::InvalidParameter)
}

#[tokio::test]
async fn mode_change_callback_sees_old_and_new() {
  let (mut dmp, _, _) = opened_dmp(six_axis()).await;
  dmp.register_mode_change_callback(Some(record_mode));
  dmp.set_mpu_sensors(Sensors::THREE_AXIS_GYRO).await.unwrap();

  let seen = SEEN.lock().unwrap();
  assert_eq!(seen.as_slice(), &[(Sensors::SIX_AXIS | Sensors::DMP_PROCESSOR, Sensors::THREE_AXIS_GYRO)]);
}

#[tokio::test]
async fn mode_change_veto_aborts() {
  let (mut dmp, _, platform) = started_dmp(six_axis()).await;
  let before = dmp.requested_sensors();
  dmp.register_mode_change_callback(Some(refuse_mode));

  assert_eq!(dmp.set_mpu_sensors(Sensors::THREE_AXIS_GYRO).await, Err(Error::InvalidParameter));
  assert_eq!(dmp.requested_sensors(), before);
  assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn gyro_presence_follows_request() {
  let (mut dmp, _, _) = opened_dmp(six_axis()).await;
  assert!(dmp.gyro_present());
  dmp.set_mpu_sensors(Sensors::THREE_AXIS_ACCEL).await.unwrap();
  assert!(!dmp.gyro_present());
}
