//! SmartSens SC2336P（2MP 1/2.9"）
//!
//! アナログゲインは 0x3e08/0x3e09 の粗/微調整の組です。粗調整がゲインを2倍にし、
//! 微調整は1/16刻みで x1.0〜x1.94 を掛けます。露光は 0x3e00〜0x3e02 に
//! ライン数を4ビット左シフトして格納します。

use crate::attr::{mbus, SensorWindow};
use crate::descriptor::{ExposureMode, ExposureSpec, FlipSpec, SensorDescriptor};
use crate::gain::{GainEntry, GainSpec};
use crate::regs::{delay, w, RegOp, RegisterField};

const SENSOR_SCLK: u64 = 81_000_000;

static AGAIN_LUT: &[GainEntry] = &[
    GainEntry::new(0x0080, 0), GainEntry::new(0x0088, 5732), GainEntry::new(0x0090, 11136), GainEntry::new(0x0098, 16248),
    GainEntry::new(0x00a0, 21098), GainEntry::new(0x00a8, 25711), GainEntry::new(0x00b0, 30109), GainEntry::new(0x00b8, 34312),
    GainEntry::new(0x00c0, 38336), GainEntry::new(0x00c8, 42196), GainEntry::new(0x00d0, 45904), GainEntry::new(0x00d8, 49472),
    GainEntry::new(0x00e0, 52911), GainEntry::new(0x00e8, 56229), GainEntry::new(0x00f0, 59434), GainEntry::new(0x00f8, 62534),
    GainEntry::new(0x0180, 65536), GainEntry::new(0x0188, 71268), GainEntry::new(0x0190, 76672), GainEntry::new(0x0198, 81784),
    GainEntry::new(0x01a0, 86634), GainEntry::new(0x01a8, 91247), GainEntry::new(0x01b0, 95645), GainEntry::new(0x01b8, 99848),
    GainEntry::new(0x01c0, 103872), GainEntry::new(0x01c8, 107732), GainEntry::new(0x01d0, 111440), GainEntry::new(0x01d8, 115008),
    GainEntry::new(0x01e0, 118447), GainEntry::new(0x01e8, 121765), GainEntry::new(0x01f0, 124970), GainEntry::new(0x01f8, 128070),
    GainEntry::new(0x0380, 131072), GainEntry::new(0x0388, 136804), GainEntry::new(0x0390, 142208), GainEntry::new(0x0398, 147320),
    GainEntry::new(0x03a0, 152170), GainEntry::new(0x03a8, 156783), GainEntry::new(0x03b0, 161181), GainEntry::new(0x03b8, 165384),
    GainEntry::new(0x03c0, 169408), GainEntry::new(0x03c8, 173268), GainEntry::new(0x03d0, 176976), GainEntry::new(0x03d8, 180544),
    GainEntry::new(0x03e0, 183983), GainEntry::new(0x03e8, 187301), GainEntry::new(0x03f0, 190506), GainEntry::new(0x03f8, 193606),
    GainEntry::new(0x0780, 196608), GainEntry::new(0x0788, 202340), GainEntry::new(0x0790, 207744), GainEntry::new(0x0798, 212856),
    GainEntry::new(0x07a0, 217706), GainEntry::new(0x07a8, 222319), GainEntry::new(0x07b0, 226717), GainEntry::new(0x07b8, 230920),
    GainEntry::new(0x07c0, 234944), GainEntry::new(0x07c8, 238804), GainEntry::new(0x07d0, 242512), GainEntry::new(0x07d8, 246080),
    GainEntry::new(0x07e0, 249519), GainEntry::new(0x07e8, 252837), GainEntry::new(0x07f0, 256042), GainEntry::new(0x07f8, 259142),
    GainEntry::new(0x0f80, 262144), GainEntry::new(0x0f88, 267876), GainEntry::new(0x0f90, 273280), GainEntry::new(0x0f98, 278392),
    GainEntry::new(0x0fa0, 283242), GainEntry::new(0x0fa8, 287855), GainEntry::new(0x0fb0, 292253), GainEntry::new(0x0fb8, 296456),
    GainEntry::new(0x0fc0, 300480), GainEntry::new(0x0fc8, 304340), GainEntry::new(0x0fd0, 308048), GainEntry::new(0x0fd8, 311616),
    GainEntry::new(0x0fe0, 315055), GainEntry::new(0x0fe8, 318373), GainEntry::new(0x0ff0, 321578), GainEntry::new(0x0ff8, 324678),
];

const MAX_AGAIN: u32 = 324678;

static MODE_1920X1080_30: &[RegOp] = &[
    w(0x0103, 0x01),
    delay(10),
    w(0x0100, 0x00),
    w(0x36e9, 0x80),
    w(0x37f9, 0x80),
    w(0x301f, 0x02),
    w(0x3200, 0x00),
    w(0x3201, 0x00),
    w(0x3202, 0x00),
    w(0x3203, 0x00),
    w(0x3204, 0x07),
    w(0x3205, 0x87),
    w(0x3206, 0x04),
    w(0x3207, 0x3f),
    w(0x3208, 0x07),
    w(0x3209, 0x80),
    w(0x320a, 0x04),
    w(0x320b, 0x38),
    // HTS 2400
    w(0x320c, 0x09),
    w(0x320d, 0x60),
    // VTS 1125
    w(0x320e, 0x04),
    w(0x320f, 0x65),
    w(0x3301, 0x07),
    w(0x3304, 0x50),
    w(0x3e00, 0x00),
    w(0x3e01, 0x8c),
    w(0x3e02, 0x00),
    w(0x3e08, 0x00),
    w(0x3e09, 0x80),
    w(0x36e9, 0x24),
    w(0x37f9, 0x24),
];

static MODE_1280X720_60: &[RegOp] = &[
    w(0x0103, 0x01),
    delay(10),
    w(0x0100, 0x00),
    w(0x36e9, 0x80),
    w(0x37f9, 0x80),
    w(0x301f, 0x1b),
    w(0x3208, 0x05),
    w(0x3209, 0x00),
    w(0x320a, 0x02),
    w(0x320b, 0xd0),
    // HTS 1800
    w(0x320c, 0x07),
    w(0x320d, 0x08),
    // VTS 750
    w(0x320e, 0x02),
    w(0x320f, 0xee),
    w(0x3e00, 0x00),
    w(0x3e01, 0x5d),
    w(0x3e02, 0x00),
    w(0x3e08, 0x00),
    w(0x3e09, 0x80),
    w(0x36e9, 0x24),
    w(0x37f9, 0x24),
];

static WINDOWS: &[SensorWindow] = &[
    SensorWindow {
        width: 1920,
        height: 1080,
        fps: 30 << 16 | 1,
        hts: 2400,
        vts: 1125,
        mbus_code: mbus::SBGGR10_1X10,
        regs: MODE_1920X1080_30,
    },
    SensorWindow {
        width: 1280,
        height: 720,
        fps: 60 << 16 | 1,
        hts: 1800,
        vts: 750,
        mbus_code: mbus::SBGGR10_1X10,
        regs: MODE_1280X720_60,
    },
];

pub static SC2336P: SensorDescriptor = SensorDescriptor {
    name: "sc2336p",
    i2c_address: 0x30,
    chip_id: 0x9b3a,
    chip_id_field: RegisterField::be(&[0x3107, 0x3108]),
    sclk: SENSOR_SCLK,
    hts_field: RegisterField::be(&[0x320c, 0x320d]),
    vts_field: RegisterField::be(&[0x320e, 0x320f]),
    vts_margin: 4,
    min_integration_time: 2,
    min_fps_q8: 5 << 8,
    again: GainSpec::Lut(AGAIN_LUT),
    again_field: RegisterField::be(&[0x3e08, 0x3e09]),
    max_again: MAX_AGAIN,
    dgain: None,
    max_dgain: 0,
    exposure: ExposureSpec {
        field: RegisterField::be(&[0x3e00, 0x3e01, 0x3e02])
            .with_shift(4)
            .with_msb_mask(0x0F),
        mode: ExposureMode::Lines,
    },
    flip: Some(FlipSpec {
        reg: 0x3221,
        hflip_mask: 0x06,
        vflip_mask: 0x60,
    }),
    stream_on: &[w(0x0100, 0x01)],
    stream_off: &[w(0x0100, 0x00)],
    windows: WINDOWS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gain::validate_lut;

    #[test]
    fn test_lut_is_ascending_and_ends_at_max() {
        assert!(validate_lut(AGAIN_LUT).is_ok());
        assert_eq!(AGAIN_LUT.last().unwrap().gain, MAX_AGAIN);
        assert!(SC2336P.validate().is_ok());
    }

    #[test]
    fn test_windows_match_sensor_clock() {
        for window in WINDOWS {
            let fps = window.native_fps();
            assert_eq!(
                u64::from(window.hts) * u64::from(window.vts) * u64::from(fps.num),
                SENSOR_SCLK * u64::from(fps.den)
            );
        }
    }
}
