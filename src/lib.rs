/*!
 * # ISP Sensor Core
 *
 * Ingenic系ISPプラットフォーム向けイメージセンサー制御ライブラリ
 *
 * センサードライバ間で共通するロジック（ゲイン変換、FPS→VTS計算、
 * ストリーミング状態遷移、レジスタI/O）をハードウェア非依存で提供します。
 * I2Cと遅延は `embedded-hal` 1.0 のトレイト経由で注入します。
 *
 * ## モジュール構成
 * - `gain`: ISPゲイン（log2単位）からセンサーゲインコードへの変換
 * - `timing`: フレームレートとVTS/露光上限の計算
 * - `state`: DEINIT → INIT → RUNNING の状態遷移
 * - `bus`: 16ビットアドレス/8ビット値のレジスタアクセス
 * - `sensor`: 上記を組み合わせたセンサーインスタンス
 * - `models`: 同梱センサーモデル（sc2336p, imx335, os04a10）
 * - `config`: `cfg.toml` からのビルド時設定
 */

// 公開モジュール
pub mod attr;
pub mod bus;
pub mod config;
pub mod config_validation;
pub mod descriptor;
pub mod error;
pub mod gain;
pub mod models;
pub mod regs;
pub mod sensor;
pub mod state;
pub mod timing;

// 内部で使用する型をまとめてエクスポート
pub use attr::{SensorAttr, SensorWindow};
pub use bus::RegisterBus;
pub use config::{ConfigError, SensorConfig};
pub use descriptor::{ExposureMode, ExposureSpec, FlipSpec, SensorDescriptor};
pub use error::{SensorError, SensorResult};
pub use gain::{GainAllocation, GainEntry, GainError, GainSpec};
pub use regs::{RegOp, RegisterField};
pub use sensor::{AttrSync, NoSync, Sensor};
pub use state::{StreamState, StreamStep};
pub use timing::{ExposureLimits, Fps, FpsRange};

/// ライブラリのバージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
