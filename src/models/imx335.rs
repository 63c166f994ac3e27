//! Sony IMX335（5MP 1/2.8"）
//!
//! ゲインは GAIN 0x30e8/0x30e9 の0.3dB刻みコード（アナログ 0〜100）です。
//! 露光はシャッター開始ライン SHR0 = VMAX - lines として設定します。

use crate::attr::{mbus, SensorWindow};
use crate::descriptor::{ExposureMode, ExposureSpec, SensorDescriptor};
use crate::gain::GainSpec;
use crate::regs::{delay, w, RegOp, RegisterField};

/// 2倍（6.02dB）あたり0.3dB刻みで20コード
const GAIN_STEPS_PER_LOG2: u32 = 20;
const MAX_AGAIN_CODE: u32 = 100;

static MODE_2592X1944_30: &[RegOp] = &[
    w(0x3000, 0x01),
    w(0x3002, 0x01),
    w(0x300c, 0x5b),
    w(0x300d, 0x40),
    w(0x3018, 0x00),
    // VMAX 4500
    w(0x3030, 0x94),
    w(0x3031, 0x11),
    w(0x3032, 0x00),
    // HMAX 550
    w(0x3034, 0x26),
    w(0x3035, 0x02),
    w(0x3050, 0x00),
    w(0x315a, 0x02),
    w(0x316a, 0x7e),
    w(0x319e, 0x01),
    w(0x31a1, 0x00),
    w(0x3288, 0x21),
    w(0x328a, 0x02),
    w(0x3414, 0x05),
    w(0x3416, 0x18),
    w(0x3648, 0x01),
    w(0x364a, 0x04),
    w(0x364c, 0x04),
    w(0x3678, 0x01),
    w(0x367c, 0x31),
    w(0x367e, 0x31),
    w(0x3706, 0x10),
    w(0x3708, 0x03),
    w(0x3714, 0x02),
    w(0x3715, 0x02),
    w(0x3716, 0x01),
    w(0x3717, 0x03),
    w(0x371c, 0x3d),
    w(0x371d, 0x3f),
    w(0x372c, 0x00),
    w(0x372d, 0x00),
    w(0x372e, 0x46),
    w(0x372f, 0x00),
];

static MODE_2592X1944_25: &[RegOp] = &[
    w(0x3000, 0x01),
    w(0x3002, 0x01),
    w(0x300c, 0x5b),
    w(0x300d, 0x40),
    w(0x3018, 0x00),
    // VMAX 4500
    w(0x3030, 0x94),
    w(0x3031, 0x11),
    w(0x3032, 0x00),
    // HMAX 660
    w(0x3034, 0x94),
    w(0x3035, 0x02),
    w(0x3050, 0x00),
    w(0x315a, 0x02),
    w(0x316a, 0x7e),
    w(0x319e, 0x01),
    w(0x31a1, 0x00),
    w(0x3288, 0x21),
    w(0x328a, 0x02),
    w(0x3414, 0x05),
    w(0x3416, 0x18),
];

static WINDOWS: &[SensorWindow] = &[
    SensorWindow {
        width: 2592,
        height: 1944,
        fps: 30 << 16 | 1,
        hts: 550,
        vts: 4500,
        mbus_code: mbus::SRGGB10_1X10,
        regs: MODE_2592X1944_30,
    },
    SensorWindow {
        width: 2592,
        height: 1944,
        fps: 25 << 16 | 1,
        hts: 660,
        vts: 4500,
        mbus_code: mbus::SRGGB10_1X10,
        regs: MODE_2592X1944_25,
    },
];

pub static IMX335: SensorDescriptor = SensorDescriptor {
    name: "imx335",
    i2c_address: 0x1a,
    chip_id: 0x08,
    chip_id_field: RegisterField::be(&[0x3112]),
    sclk: 74_250_000,
    hts_field: RegisterField::le(&[0x3034, 0x3035]),
    vts_field: RegisterField::le(&[0x3030, 0x3031, 0x3032]).with_msb_mask(0x0F),
    vts_margin: 9,
    min_integration_time: 1,
    min_fps_q8: 5 << 8,
    again: GainSpec::Step {
        steps_per_log2: GAIN_STEPS_PER_LOG2,
        max_code: MAX_AGAIN_CODE,
    },
    again_field: RegisterField::le(&[0x30e8, 0x30e9]).with_msb_mask(0x07),
    max_again: (MAX_AGAIN_CODE << 16) / GAIN_STEPS_PER_LOG2,
    dgain: None,
    max_dgain: 0,
    exposure: ExposureSpec {
        field: RegisterField::le(&[0x3058, 0x3059, 0x305a]).with_msb_mask(0x0F),
        mode: ExposureMode::Shutter,
    },
    flip: None,
    stream_on: &[w(0x3000, 0x00), delay(20), w(0x3002, 0x00)],
    stream_off: &[w(0x3000, 0x01), w(0x3002, 0x01)],
    windows: WINDOWS,
};
