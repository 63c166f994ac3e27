use crate::config_validation::{
    parse_fps, parse_i2c_address, parse_sensor_model, parse_window_index, ValidationError,
};
use crate::descriptor::SensorDescriptor;

/// センサー設定
///
/// この構造体はビルド時に`cfg.toml`ファイルから読み込まれた設定を保持します。
/// `cfg.toml` が無い場合は既定値が使われます（`cfg.toml.example` を参照）。
#[toml_cfg::toml_config]
pub struct Config {
    #[default("sc2336p")]
    sensor_model: &'static str,

    #[default(0)] // 0 = モデル既定のアドレス
    i2c_address: u8,

    #[default(0)]
    window_index: u32,

    // 0/0 = ウィンドウ既定のフレームレート
    #[default(0)]
    fps_num: u32,

    #[default(0)]
    fps_den: u32,

    #[default(false)]
    hflip: bool,

    #[default(false)]
    vflip: bool,

    #[default(false)]
    debug_mode: bool,
}

/// 設定エラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("センサーモデルが不明です: {0}")]
    UnknownSensorModel(String),
    #[error("I2Cアドレスが無効です (0x08-0x77): 0x{0:02x}")]
    InvalidI2cAddress(u8),
    #[error("ウィンドウ番号が無効です: {0}")]
    InvalidWindowIndex(usize),
    #[error("フレームレートが無効です: {num}/{den}")]
    InvalidFps { num: u32, den: u32 },
}

/// 検証済みのセンサー設定
#[derive(Debug, Clone)]
pub struct SensorConfig {
    /// 使用するセンサーモデル
    pub model: &'static SensorDescriptor,

    /// I2Cアドレス（7ビット）
    pub i2c_address: u8,

    /// 起動時のウィンドウ（解像度プリセット）
    pub window_index: usize,

    /// 起動時のフレームレート `(num << 16) | den`、None はウィンドウ既定
    pub fps: Option<u32>,

    pub hflip: bool,
    pub vflip: bool,

    /// デバッグモード（詳細ログ）
    pub debug_mode: bool,
}

impl SensorConfig {
    /// 設定ファイルから設定をロードします
    pub fn load() -> Result<Self, ConfigError> {
        // toml_cfg によって生成された定数
        let config = CONFIG;

        Self::from_values(
            config.sensor_model,
            config.i2c_address,
            config.window_index as usize,
            config.fps_num,
            config.fps_den,
            config.hflip,
            config.vflip,
            config.debug_mode,
        )
    }

    /// 個別の値から設定を検証・構築します
    #[allow(clippy::too_many_arguments)]
    pub fn from_values(
        sensor_model: &str,
        i2c_address: u8,
        window_index: usize,
        fps_num: u32,
        fps_den: u32,
        hflip: bool,
        vflip: bool,
        debug_mode: bool,
    ) -> Result<Self, ConfigError> {
        let model = parse_sensor_model(sensor_model).map_err(map_validation_error)?;
        let i2c_address = parse_i2c_address(i2c_address, model).map_err(map_validation_error)?;
        let window_index = parse_window_index(window_index, model).map_err(map_validation_error)?;
        let fps = parse_fps(fps_num, fps_den, model, window_index).map_err(map_validation_error)?;

        Ok(SensorConfig {
            model,
            i2c_address,
            window_index,
            fps,
            hflip,
            vflip,
            debug_mode,
        })
    }
}

fn map_validation_error(err: ValidationError) -> ConfigError {
    match err {
        ValidationError::MissingSensorModel => ConfigError::UnknownSensorModel(
            "センサーモデルが設定されていません。cfg.tomlを確認してください。".to_string(),
        ),
        ValidationError::UnknownSensorModel(v) => ConfigError::UnknownSensorModel(v),
        ValidationError::InvalidI2cAddress(v) => ConfigError::InvalidI2cAddress(v),
        ValidationError::InvalidWindowIndex(v) => ConfigError::InvalidWindowIndex(v),
        ValidationError::InvalidFps { num, den } | ValidationError::FpsOutOfRange { num, den } => {
            ConfigError::InvalidFps { num, den }
        }
    }
}
