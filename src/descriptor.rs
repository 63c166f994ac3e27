//! センサーモデルの静的な定義
//!
//! 同系統のドライバ間で異なる部分はすべてここに集めます。バスアドレス、
//! チップID、クロック、タイミングとゲインのレジスタ配置、ゲイン方式、
//! モードテーブルです。[`crate::sensor`] のエンジンは全モデルで共通です。

use crate::attr::SensorWindow;
use crate::error::{SensorError, SensorResult};
use crate::gain::{GainError, GainSpec};
use crate::regs::{RegOp, RegisterField};
use crate::timing::FpsRange;

/// 露光時間の設定方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureMode {
    /// レジスタに露光ライン数を設定する
    Lines,
    /// レジスタにシャッター開始ライン `vts - lines` を設定する（Sony SHR）
    Shutter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposureSpec {
    pub field: RegisterField,
    pub mode: ExposureMode,
}

/// ミラー/フリップ制御ビット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipSpec {
    pub reg: u16,
    pub hflip_mask: u8,
    pub vflip_mask: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct SensorDescriptor {
    pub name: &'static str,
    /// 7ビットI2Cアドレス
    pub i2c_address: u8,
    pub chip_id: u32,
    pub chip_id_field: RegisterField,
    /// VTS/HTSタイミングの元になるピクセルクロック（Hz）
    pub sclk: u64,
    pub hts_field: RegisterField,
    pub vts_field: RegisterField,
    /// VTSと最長露光の差（ライン数）
    pub vts_margin: u32,
    pub min_integration_time: u32,
    /// 受け付ける最低フレームレート（24.8固定小数点）
    pub min_fps_q8: u32,
    pub again: GainSpec,
    pub again_field: RegisterField,
    pub max_again: u32,
    pub dgain: Option<(GainSpec, RegisterField)>,
    pub max_dgain: u32,
    pub exposure: ExposureSpec,
    pub flip: Option<FlipSpec>,
    pub stream_on: &'static [RegOp],
    pub stream_off: &'static [RegOp],
    pub windows: &'static [SensorWindow],
}

impl SensorDescriptor {
    pub fn window(&self, index: usize) -> Option<&'static SensorWindow> {
        self.windows.get(index)
    }

    /// ウィンドウで受け付けるフレームレート: モデルの最小値からウィンドウ既定値まで
    pub fn fps_range(&self, window: &SensorWindow) -> FpsRange {
        FpsRange::new(self.min_fps_q8, window.native_fps().to_q8())
    }

    /// フレーム長レジスタに設定できる最大VTS
    pub fn max_vts(&self) -> u32 {
        self.vts_field.max_value()
    }

    /// モデル定義の整合性を確認します
    ///
    /// - 全レジスタフィールドが1〜4レジスタで構成されていること
    /// - ゲイン方式が正しく、`max_again` に到達できること
    /// - ゲインコードがゲインレジスタの幅に収まること
    pub fn validate(&self) -> SensorResult<()> {
        let mut fields = vec![
            ("chip_id", self.chip_id_field),
            ("hts", self.hts_field),
            ("vts", self.vts_field),
            ("again", self.again_field),
            ("exposure", self.exposure.field),
        ];
        if let Some((_, field)) = &self.dgain {
            fields.push(("dgain", *field));
        }
        if let Some((name, _)) = fields.iter().find(|(_, f)| !f.is_well_formed()) {
            return Err(SensorError::InvalidField(*name));
        }

        self.again.validate()?;
        if self.max_again > self.again.max_gain() {
            return Err(GainError::OutOfRange {
                isp_gain: self.max_again,
                max_gain: self.again.max_gain(),
            }
            .into());
        }
        check_code_width(&self.again, &self.again_field)?;

        if let Some((dgain, field)) = &self.dgain {
            dgain.validate()?;
            check_code_width(dgain, field)?;
        }
        Ok(())
    }
}

fn check_code_width(gain: &GainSpec, field: &RegisterField) -> SensorResult<()> {
    let (code, max) = (gain.max_code(), field.max_value());
    if code > max {
        return Err(SensorError::FieldOverflow {
            reg: field.first_reg(),
            value: code,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{imx335::IMX335, sc2336p::SC2336P};

    #[test]
    fn test_empty_field_is_rejected() {
        let mut desc = SC2336P;
        desc.hts_field = RegisterField::be(&[]);
        assert_eq!(desc.validate(), Err(SensorError::InvalidField("hts")));
    }

    #[test]
    fn test_oversized_field_is_rejected() {
        let mut desc = IMX335;
        desc.vts_field = RegisterField::le(&[0x3030, 0x3031, 0x3032, 0x3033, 0x3034]);
        assert_eq!(desc.validate(), Err(SensorError::InvalidField("vts")));
    }

    #[test]
    fn test_gain_code_wider_than_register_is_rejected() {
        let mut desc = IMX335;
        // 最大コード100は3ビットに収まらない
        desc.again_field = RegisterField::le(&[0x30e8]).with_msb_mask(0x07);
        assert_eq!(
            desc.validate(),
            Err(SensorError::FieldOverflow {
                reg: 0x30e8,
                value: 100,
                max: 7,
            })
        );
    }
}
