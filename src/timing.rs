//! フレームタイミングの計算
//!
//! ISPコアはフレームレートを `(fps_num << 16) | fps_den` で表します。
//! 範囲チェックは24.8固定小数点で行い、フレーム長（VTS）はセンサークロックと
//! ライン長（HTS）から `vts = sclk * den / hts / num` で求めます。
//! 2回の除算の切り捨てはそのまま残します。VTSから導く露光上限がこれに依存します。

use crate::error::{SensorError, SensorResult};

/// 有理数 `num / den` で表したフレームレート（fps）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fps {
    pub num: u32,
    pub den: u32,
}

impl Fps {
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// ISPの `(num << 16) | den` 形式をデコードします
    pub fn decode(encoded: u32) -> SensorResult<Self> {
        let fps = Self {
            num: encoded >> 16,
            den: encoded & 0xFFFF,
        };
        if fps.num == 0 || fps.den == 0 {
            return Err(SensorError::InvalidFps(encoded));
        }
        Ok(fps)
    }

    pub fn encode(&self) -> u32 {
        ((self.num & 0xFFFF) << 16) | (self.den & 0xFFFF)
    }

    /// 24.8固定小数点値。分母が0の場合は0
    pub fn to_q8(&self) -> u32 {
        if self.den == 0 {
            return 0;
        }
        let q8 = (u64::from(self.num) << 8) / u64::from(self.den);
        q8.min(u64::from(u32::MAX)) as u32
    }
}

/// 受け付けるフレームレートの範囲（24.8固定小数点）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpsRange {
    pub min_q8: u32,
    pub max_q8: u32,
}

impl FpsRange {
    pub const fn new(min_q8: u32, max_q8: u32) -> Self {
        Self { min_q8, max_q8 }
    }

    /// 分子または分母が0のフレームレートは `InvalidFps` で拒否します
    pub fn check(&self, fps: Fps) -> SensorResult<()> {
        if fps.num == 0 || fps.den == 0 {
            return Err(SensorError::InvalidFps(fps.encode()));
        }
        let q8 = fps.to_q8();
        if q8 < self.min_q8 || q8 > self.max_q8 {
            return Err(SensorError::FpsOutOfRange {
                requested_q8: q8,
                min_q8: self.min_q8,
                max_q8: self.max_q8,
            });
        }
        Ok(())
    }
}

/// 指定クロックとライン長で `fps` を得るフレーム長（ライン数）
pub fn compute_vts(sclk: u64, hts: u32, fps: Fps) -> SensorResult<u32> {
    if hts == 0 {
        return Err(SensorError::ZeroHts);
    }
    if fps.num == 0 || fps.den == 0 {
        return Err(SensorError::InvalidFps(fps.encode()));
    }
    let vts = sclk * u64::from(fps.den) / u64::from(hts) / u64::from(fps.num);
    Ok(vts.min(u64::from(u32::MAX)) as u32)
}

/// 自動露出ループが参照する露光上限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExposureLimits {
    pub max_integration_time_native: u32,
    pub integration_time_limit: u32,
    pub total_height: u32,
    pub max_integration_time: u32,
}

impl ExposureLimits {
    /// `margin` はセンサー固有のブランキング/読み出しオフセット（ライン数）
    pub fn from_vts(vts: u32, margin: u32) -> Self {
        let max_it = vts.saturating_sub(margin);
        Self {
            max_integration_time_native: max_it,
            integration_time_limit: max_it,
            total_height: vts,
            max_integration_time: max_it,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_and_q8() {
        let fps = Fps::decode((25 << 16) | 1).unwrap();
        assert_eq!(fps, Fps::new(25, 1));
        assert_eq!(fps.to_q8(), 25 << 8);

        // 30000/1001 = 29.97
        let ntsc = Fps::new(30000, 1001);
        assert_eq!(ntsc.to_q8(), (29 << 8) + 248);
    }

    #[test]
    fn test_decode_rejects_zero_parts() {
        assert_eq!(Fps::decode(25 << 16), Err(SensorError::InvalidFps(25 << 16)));
        assert_eq!(Fps::decode(1), Err(SensorError::InvalidFps(1)));
    }

    #[test]
    fn test_range_check() {
        let range = FpsRange::new(5 << 8, 30 << 8);
        assert!(range.check(Fps::new(30, 1)).is_ok());
        assert!(range.check(Fps::new(5, 1)).is_ok());
        assert!(matches!(
            range.check(Fps::new(31, 1)),
            Err(SensorError::FpsOutOfRange { requested_q8, .. }) if requested_q8 == 31 << 8
        ));
        assert!(range.check(Fps::new(4, 1)).is_err());
    }

    #[test]
    fn test_zero_denominator_does_not_panic() {
        let range = FpsRange::new(5 << 8, 30 << 8);
        assert_eq!(Fps::new(30, 0).to_q8(), 0);
        assert_eq!(
            range.check(Fps::new(30, 0)),
            Err(SensorError::InvalidFps(30 << 16))
        );
        assert_eq!(range.check(Fps::new(0, 1)), Err(SensorError::InvalidFps(1)));
    }

    #[test]
    fn test_q8_of_large_parts() {
        // (num % den) << 8 が u32 を溢れる大きさの分母
        assert_eq!(Fps::new(0x0100_0001, 0x0200_0000).to_q8(), 128);
    }

    #[test]
    fn test_vts_truncates() {
        // 81MHz, HTS 2400, 30fps -> 1125ライン
        assert_eq!(compute_vts(81_000_000, 2400, Fps::new(30, 1)).unwrap(), 1125);
        // 81e6 / 2400 / 7 = 4821.43 -> 4821
        assert_eq!(compute_vts(81_000_000, 2400, Fps::new(7, 1)).unwrap(), 4821);
    }

    #[test]
    fn test_vts_zero_hts() {
        assert_eq!(compute_vts(81_000_000, 0, Fps::new(30, 1)), Err(SensorError::ZeroHts));
    }

    #[test]
    fn test_exposure_limits() {
        let limits = ExposureLimits::from_vts(1125, 4);
        assert_eq!(limits.total_height, 1125);
        assert_eq!(limits.max_integration_time, 1121);
        assert_eq!(limits.integration_time_limit, 1121);
        assert_eq!(limits.max_integration_time_native, 1121);
    }
}
