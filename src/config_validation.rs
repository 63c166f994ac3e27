use crate::descriptor::SensorDescriptor;
use crate::models;
use crate::timing::Fps;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingSensorModel,
    UnknownSensorModel(String),
    InvalidI2cAddress(u8),
    InvalidWindowIndex(usize),
    InvalidFps { num: u32, den: u32 },
    FpsOutOfRange { num: u32, den: u32 },
}

pub fn parse_sensor_model(name: &str) -> Result<&'static SensorDescriptor, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingSensorModel);
    }

    models::find(name).ok_or_else(|| ValidationError::UnknownSensorModel(name.to_string()))
}

/// 0 はモデル既定のアドレス
pub fn parse_i2c_address(address: u8, descriptor: &SensorDescriptor) -> Result<u8, ValidationError> {
    match address {
        0 => Ok(descriptor.i2c_address),
        0x08..=0x77 => Ok(address),
        _ => Err(ValidationError::InvalidI2cAddress(address)),
    }
}

pub fn parse_window_index(index: usize, descriptor: &SensorDescriptor) -> Result<usize, ValidationError> {
    if index < descriptor.windows.len() {
        Ok(index)
    } else {
        Err(ValidationError::InvalidWindowIndex(index))
    }
}

/// 分子・分母ともに 0 の場合はウィンドウ既定のフレームレート（None）
pub fn parse_fps(
    num: u32,
    den: u32,
    descriptor: &SensorDescriptor,
    window_index: usize,
) -> Result<Option<u32>, ValidationError> {
    if num == 0 && den == 0 {
        return Ok(None);
    }
    if num == 0 || den == 0 || num > 0xFFFF || den > 0xFFFF {
        return Err(ValidationError::InvalidFps { num, den });
    }

    let window = descriptor
        .window(window_index)
        .ok_or(ValidationError::InvalidWindowIndex(window_index))?;
    let fps = Fps::new(num, den);
    descriptor
        .fps_range(window)
        .check(fps)
        .map_err(|_| ValidationError::FpsOutOfRange { num, den })?;

    Ok(Some(fps.encode()))
}
