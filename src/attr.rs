//! インスタンスごとのセンサー属性
//!
//! [`SensorAttr`] はタイミングやゲインを変更するたびにISPコアが読み返す
//! レコードです（露光上限、フレーム寸法、現在のゲイン/露光）。
//! [`crate::Sensor`] はそれぞれ自分のコピーを持ちます。

use crate::descriptor::SensorDescriptor;
use crate::regs::RegOp;
use crate::timing::{ExposureLimits, Fps};

/// 同梱センサーが使うメディアバスのピクセルコード
pub mod mbus {
    pub const SBGGR10_1X10: u32 = 0x3007;
    pub const SGRBG10_1X10: u32 = 0x300a;
    pub const SGBRG10_1X10: u32 = 0x300e;
    pub const SRGGB10_1X10: u32 = 0x300f;
}

/// 解像度/フレームレートのプリセットと、それを選択するレジスタテーブル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorWindow {
    pub width: u32,
    pub height: u32,
    /// `(num << 16) | den` 形式の既定フレームレート（`set_fps` の上限）
    pub fps: u32,
    /// `regs` が設定するライン長
    pub hts: u32,
    /// `regs` が設定するフレーム長
    pub vts: u32,
    pub mbus_code: u32,
    pub regs: &'static [RegOp],
}

impl SensorWindow {
    pub fn native_fps(&self) -> Fps {
        Fps::new(self.fps >> 16, (self.fps & 0xFFFF).max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorAttr {
    pub name: &'static str,
    pub chip_id: u32,
    pub cbus_addr: u8,
    pub max_again: u32,
    pub max_dgain: u32,
    pub min_integration_time: u32,
    pub min_integration_time_native: u32,
    pub max_integration_time_native: u32,
    pub integration_time_limit: u32,
    pub total_width: u32,
    pub total_height: u32,
    pub max_integration_time: u32,
    /// 最後に書き込んだアナログゲインコード
    pub again: u32,
    /// 最後に書き込んだデジタルゲインコード
    pub dgain: u32,
    /// 最後に設定した露光時間（ライン数）
    pub integration_time: u32,
    /// 現在のフレームレート `(num << 16) | den`
    pub fps: u32,
    pub window_index: usize,
}

impl SensorAttr {
    /// `descriptor` の `window_index` 番ウィンドウで動作するときの属性
    ///
    /// ウィンドウが存在しない場合は `None` を返します。
    pub fn from_descriptor(descriptor: &SensorDescriptor, window_index: usize) -> Option<Self> {
        let window = descriptor.windows.get(window_index)?;
        let limits = ExposureLimits::from_vts(window.vts, descriptor.vts_margin);
        Some(Self {
            name: descriptor.name,
            chip_id: descriptor.chip_id,
            cbus_addr: descriptor.i2c_address,
            max_again: descriptor.max_again,
            max_dgain: descriptor.max_dgain,
            min_integration_time: descriptor.min_integration_time,
            min_integration_time_native: descriptor.min_integration_time,
            max_integration_time_native: limits.max_integration_time_native,
            integration_time_limit: limits.integration_time_limit,
            total_width: window.hts,
            total_height: limits.total_height,
            max_integration_time: limits.max_integration_time,
            again: 0,
            dgain: 0,
            integration_time: 0,
            fps: window.fps,
            window_index,
        })
    }

    pub fn apply_limits(&mut self, limits: ExposureLimits) {
        self.max_integration_time_native = limits.max_integration_time_native;
        self.integration_time_limit = limits.integration_time_limit;
        self.total_height = limits.total_height;
        self.max_integration_time = limits.max_integration_time;
    }

    pub fn limits(&self) -> ExposureLimits {
        ExposureLimits {
            max_integration_time_native: self.max_integration_time_native,
            integration_time_limit: self.integration_time_limit,
            total_height: self.total_height,
            max_integration_time: self.max_integration_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models;

    #[test]
    fn test_attr_from_first_window() {
        let desc = &models::sc2336p::SC2336P;
        let attr = SensorAttr::from_descriptor(desc, 0).unwrap();
        let window = &desc.windows[0];
        assert_eq!(attr.total_width, window.hts);
        assert_eq!(attr.total_height, window.vts);
        assert_eq!(attr.max_integration_time, window.vts - desc.vts_margin);
        assert_eq!(attr.fps, window.fps);
    }

    #[test]
    fn test_attr_missing_window() {
        assert!(SensorAttr::from_descriptor(&models::sc2336p::SC2336P, 99).is_none());
    }

    #[test]
    fn test_apply_limits_roundtrip() {
        let mut attr = SensorAttr::from_descriptor(&models::imx335::IMX335, 0).unwrap();
        let limits = ExposureLimits::from_vts(5000, 9);
        attr.apply_limits(limits);
        assert_eq!(attr.limits(), limits);
    }
}
