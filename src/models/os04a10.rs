//! OmniVision OS04A10（4MP）
//!
//! アナログゲインは 0x3508/0x3509 の1/128分解能の線形値です。テーブルは
//! センサーが実際に反映する刻み（x2までは1/16、以降はオクターブごとに粗く）
//! に従います。デジタルゲインは 0x350a/0x350b のQ10線形値です。

use crate::attr::{mbus, SensorWindow};
use crate::descriptor::{ExposureMode, ExposureSpec, FlipSpec, SensorDescriptor};
use crate::gain::{GainEntry, GainSpec};
use crate::regs::{delay, w, RegOp, RegisterField};

static AGAIN_LUT: &[GainEntry] = &[
    GainEntry::new(0x0080, 0), GainEntry::new(0x0088, 5732), GainEntry::new(0x0090, 11136), GainEntry::new(0x0098, 16248),
    GainEntry::new(0x00a0, 21098), GainEntry::new(0x00a8, 25711), GainEntry::new(0x00b0, 30109), GainEntry::new(0x00b8, 34312),
    GainEntry::new(0x00c0, 38336), GainEntry::new(0x00c8, 42196), GainEntry::new(0x00d0, 45904), GainEntry::new(0x00d8, 49472),
    GainEntry::new(0x00e0, 52911), GainEntry::new(0x00e8, 56229), GainEntry::new(0x00f0, 59434), GainEntry::new(0x00f8, 62534),
    GainEntry::new(0x0100, 65536), GainEntry::new(0x0110, 71268), GainEntry::new(0x0120, 76672), GainEntry::new(0x0130, 81784),
    GainEntry::new(0x0140, 86634), GainEntry::new(0x0150, 91247), GainEntry::new(0x0160, 95645), GainEntry::new(0x0170, 99848),
    GainEntry::new(0x0180, 103872), GainEntry::new(0x0190, 107732), GainEntry::new(0x01a0, 111440), GainEntry::new(0x01b0, 115008),
    GainEntry::new(0x01c0, 118447), GainEntry::new(0x01d0, 121765), GainEntry::new(0x01e0, 124970), GainEntry::new(0x01f0, 128070),
    GainEntry::new(0x0200, 131072), GainEntry::new(0x0220, 136804), GainEntry::new(0x0240, 142208), GainEntry::new(0x0260, 147320),
    GainEntry::new(0x0280, 152170), GainEntry::new(0x02a0, 156783), GainEntry::new(0x02c0, 161181), GainEntry::new(0x02e0, 165384),
    GainEntry::new(0x0300, 169408), GainEntry::new(0x0320, 173268), GainEntry::new(0x0340, 176976), GainEntry::new(0x0360, 180544),
    GainEntry::new(0x0380, 183983), GainEntry::new(0x03a0, 187301), GainEntry::new(0x03c0, 190506), GainEntry::new(0x03e0, 193606),
    GainEntry::new(0x0400, 196608), GainEntry::new(0x0440, 202340), GainEntry::new(0x0480, 207744), GainEntry::new(0x04c0, 212856),
    GainEntry::new(0x0500, 217706), GainEntry::new(0x0540, 222319), GainEntry::new(0x0580, 226717), GainEntry::new(0x05c0, 230920),
    GainEntry::new(0x0600, 234944), GainEntry::new(0x0640, 238804), GainEntry::new(0x0680, 242512), GainEntry::new(0x06c0, 246080),
    GainEntry::new(0x0700, 249519), GainEntry::new(0x0740, 252837), GainEntry::new(0x0780, 256042), GainEntry::new(0x07c0, 259142),
];

static DGAIN_LUT: &[GainEntry] = &[
    GainEntry::new(0x0400, 0), GainEntry::new(0x0500, 21098), GainEntry::new(0x0600, 38336), GainEntry::new(0x0700, 52911),
    GainEntry::new(0x0800, 65536), GainEntry::new(0x0900, 76672), GainEntry::new(0x0a00, 86634), GainEntry::new(0x0b00, 95645),
    GainEntry::new(0x0c00, 103872), GainEntry::new(0x0d00, 111440), GainEntry::new(0x0e00, 118447), GainEntry::new(0x0f00, 124970),
    GainEntry::new(0x1000, 131072),
];

static MODE_2560X1440_30: &[RegOp] = &[
    w(0x0103, 0x01),
    delay(5),
    w(0x0109, 0x01),
    w(0x0104, 0x02),
    w(0x0102, 0x00),
    w(0x0305, 0x5c),
    w(0x0306, 0x00),
    w(0x0307, 0x00),
    w(0x030a, 0x01),
    w(0x0317, 0x09),
    w(0x3501, 0x07),
    w(0x3502, 0xc8),
    w(0x3508, 0x00),
    w(0x3509, 0x80),
    w(0x3808, 0x0a),
    w(0x3809, 0x00),
    w(0x380a, 0x05),
    w(0x380b, 0xa0),
    // HTS 1600
    w(0x380c, 0x06),
    w(0x380d, 0x40),
    // VTS 2000
    w(0x380e, 0x07),
    w(0x380f, 0xd0),
    w(0x3820, 0x80),
    w(0x3821, 0x00),
];

static MODE_2688X1520_25: &[RegOp] = &[
    w(0x0103, 0x01),
    delay(5),
    w(0x0109, 0x01),
    w(0x0104, 0x02),
    w(0x0102, 0x00),
    w(0x0305, 0x5c),
    w(0x0306, 0x00),
    w(0x0307, 0x00),
    w(0x030a, 0x01),
    w(0x0317, 0x09),
    w(0x3501, 0x09),
    w(0x3502, 0x58),
    w(0x3508, 0x00),
    w(0x3509, 0x80),
    w(0x3808, 0x0a),
    w(0x3809, 0x80),
    w(0x380a, 0x05),
    w(0x380b, 0xf0),
    // HTS 1600
    w(0x380c, 0x06),
    w(0x380d, 0x40),
    // VTS 2400
    w(0x380e, 0x09),
    w(0x380f, 0x60),
    w(0x3820, 0x80),
    w(0x3821, 0x00),
];

static WINDOWS: &[SensorWindow] = &[
    SensorWindow {
        width: 2560,
        height: 1440,
        fps: 30 << 16 | 1,
        hts: 1600,
        vts: 2000,
        mbus_code: mbus::SBGGR10_1X10,
        regs: MODE_2560X1440_30,
    },
    SensorWindow {
        width: 2688,
        height: 1520,
        fps: 25 << 16 | 1,
        hts: 1600,
        vts: 2400,
        mbus_code: mbus::SBGGR10_1X10,
        regs: MODE_2688X1520_25,
    },
];

pub static OS04A10: SensorDescriptor = SensorDescriptor {
    name: "os04a10",
    i2c_address: 0x36,
    chip_id: 0x530441,
    chip_id_field: RegisterField::be(&[0x300a, 0x300b, 0x300c]),
    sclk: 96_000_000,
    hts_field: RegisterField::be(&[0x380c, 0x380d]),
    vts_field: RegisterField::be(&[0x380e, 0x380f]),
    vts_margin: 8,
    min_integration_time: 2,
    min_fps_q8: 5 << 8,
    again: GainSpec::Lut(AGAIN_LUT),
    again_field: RegisterField::be(&[0x3508, 0x3509]).with_msb_mask(0x0F),
    max_again: 259142,
    dgain: Some((
        GainSpec::Lut(DGAIN_LUT),
        RegisterField::be(&[0x350a, 0x350b]).with_msb_mask(0x3F),
    )),
    max_dgain: 131072,
    exposure: ExposureSpec {
        field: RegisterField::be(&[0x3501, 0x3502]),
        mode: ExposureMode::Lines,
    },
    flip: Some(FlipSpec {
        reg: 0x3820,
        hflip_mask: 0x08,
        vflip_mask: 0x04,
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
    fn test_tables_are_valid() {
        assert!(validate_lut(AGAIN_LUT).is_ok());
        assert!(validate_lut(DGAIN_LUT).is_ok());
        assert_eq!(AGAIN_LUT.last().unwrap().gain, OS04A10.max_again);
        assert!(OS04A10.validate().is_ok());
    }

    #[test]
    fn test_again_codes_are_q7_linear() {
        // x2 = 0x100
        let entry = AGAIN_LUT.iter().find(|e| e.gain == 65536).unwrap();
        assert_eq!(entry.reg_value, 0x100);
    }
}
