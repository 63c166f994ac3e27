/// センサー制御のエラー型
use embedded_hal::i2c::ErrorKind;

use crate::gain::GainError;

/// センサー操作の結果型
pub type SensorResult<T> = Result<T, SensorError>;

/// センサー制御で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    /// I2C転送エラー（NACK、バスエラーなど）
    #[error("I2C transfer failed at register 0x{reg:04x}: {kind:?}")]
    I2c { reg: u16, kind: ErrorKind },

    /// 分子または分母が0のフレームレート
    #[error("invalid fps encoding: 0x{0:08x}")]
    InvalidFps(u32),

    /// 許容範囲外のフレームレート（24.8固定小数点）
    #[error("fps {requested_q8:#x} (q8) outside [{min_q8:#x}, {max_q8:#x}]")]
    FpsOutOfRange {
        requested_q8: u32,
        min_q8: u32,
        max_q8: u32,
    },

    /// センサーから読み出したHTSが0
    #[error("sensor reported zero HTS")]
    ZeroHts,

    /// 計算したVTSがレジスタ幅を超える
    #[error("VTS {vts} exceeds register capacity {max_vts}")]
    VtsOverflow { vts: u32, max_vts: u32 },

    /// ゲイン変換エラー
    #[error(transparent)]
    Gain(#[from] GainError),

    /// チップIDが一致しない
    #[error("chip id mismatch: expected 0x{expected:06x}, found 0x{found:06x}")]
    ChipIdMismatch { expected: u32, found: u32 },

    /// 存在しないウィンドウ番号
    #[error("no sensor window at index {0}")]
    InvalidWindow(usize),

    /// ストリーミング中は実行できない操作
    #[error("operation not allowed while streaming")]
    Busy,

    /// レジスタ数やシフト量が不正なフィールド定義
    #[error("malformed register field {0}")]
    InvalidField(&'static str),

    /// フィールド幅に収まらない値
    #[error("value {value:#x} does not fit field at 0x{reg:04x} (max {max:#x})")]
    FieldOverflow { reg: u16, value: u32, max: u32 },

    /// このセンサーモデルが対応していない操作
    #[error("{0} is not supported by this sensor")]
    Unsupported(&'static str),
}

impl SensorError {
    /// I2Cエラーかどうか
    pub fn is_transport(&self) -> bool {
        matches!(self, SensorError::I2c { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::NoAcknowledgeSource;

    #[test]
    fn test_i2c_error_display_includes_register() {
        let err = SensorError::I2c {
            reg: 0x320e,
            kind: ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
        };
        let msg = err.to_string();
        assert!(msg.contains("0x320e"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_field_overflow_display() {
        let err = SensorError::FieldOverflow {
            reg: 0x30e8,
            value: 0x800,
            max: 0x7ff,
        };
        assert!(err.to_string().contains("0x30e8"));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_gain_error_is_wrapped() {
        let err: SensorError = GainError::EmptyTable.into();
        assert!(matches!(err, SensorError::Gain(GainError::EmptyTable)));
        assert!(!err.is_transport());
    }
}
