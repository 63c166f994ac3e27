//! アナログ/デジタルゲイン変換
//!
//! ISPはゲインを小数部16ビットのlog2単位で表します。値 `G` は
//! `2^(G / 65536)` 倍のゲインを意味します。センサーへはデータシートの
//! テーブルから引いたコード（[`GainSpec::Lut`]）か、デシベル刻みの線形コード
//! （[`GainSpec::Step`]）を設定します。割り当て結果には実際に得られた
//! 量子化後のゲインを返し、ISPが残りをデジタルで補正できるようにします。

use log::{debug, warn};

/// ISPのlog2ゲイン表現の小数部ビット数
pub const LOG2_GAIN_SHIFT: u32 = 16;

/// ゲインテーブルの1行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainEntry {
    /// センサーのゲインレジスタに設定するコード
    pub reg_value: u32,
    /// ISPのlog2単位のゲイン
    pub gain: u32,
}

impl GainEntry {
    pub const fn new(reg_value: u32, gain: u32) -> Self {
        Self { reg_value, gain }
    }
}

/// ゲイン割り当ての結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainAllocation {
    pub reg_value: u32,
    /// 量子化後のゲイン（log2単位）
    pub gain: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GainError {
    #[error("gain table is empty")]
    EmptyTable,
    #[error("gain table is not strictly ascending at index {index}")]
    NotAscending { index: usize },
    #[error("step gain needs a non-zero step count")]
    ZeroStep,
    #[error("isp gain {isp_gain} has no mapping (max {max_gain})")]
    OutOfRange { isp_gain: u32, max_gain: u32 },
}

/// センサーがゲインをレジスタコードに符号化する方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainSpec {
    /// ゲイン昇順のデータシートテーブル
    Lut(&'static [GainEntry]),
    /// ゲインが2倍になるごとに `steps_per_log2` 進む線形コード。
    /// Sonyセンサーは1コード0.3dB、つまり6.02dBあたり20コード。
    Step { steps_per_log2: u32, max_code: u32 },
}

impl GainSpec {
    pub fn validate(&self) -> Result<(), GainError> {
        match *self {
            GainSpec::Lut(lut) => validate_lut(lut),
            GainSpec::Step { steps_per_log2, .. } => {
                if steps_per_log2 == 0 {
                    Err(GainError::ZeroStep)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// この方式で表せる最大ゲイン
    pub fn max_gain(&self) -> u32 {
        match *self {
            GainSpec::Lut(lut) => lut.last().map(|e| e.gain).unwrap_or(0),
            GainSpec::Step {
                steps_per_log2,
                max_code,
            } => step_code_to_gain(max_code, steps_per_log2),
        }
    }

    /// 出力されうる最大のレジスタコード
    pub fn max_code(&self) -> u32 {
        match *self {
            GainSpec::Lut(lut) => lut.iter().map(|e| e.reg_value).max().unwrap_or(0),
            GainSpec::Step { max_code, .. } => max_code,
        }
    }

    /// `isp_gain` を `max_gain` を上限としてレジスタコードに変換します
    ///
    /// `shift` はISPコアとのインターフェースを揃えるための引数で、
    /// どちらの方式でも使用しません。
    pub fn alloc(&self, isp_gain: u32, shift: u8, max_gain: u32) -> Result<GainAllocation, GainError> {
        match *self {
            GainSpec::Lut(lut) => alloc_lut(lut, isp_gain, shift, max_gain),
            GainSpec::Step {
                steps_per_log2,
                max_code,
            } => {
                if steps_per_log2 == 0 {
                    return Err(GainError::ZeroStep);
                }
                let cap = max_code.min(gain_to_step_code(max_gain, steps_per_log2));
                Ok(alloc_step(isp_gain, shift, steps_per_log2, cap))
            }
        }
    }
}

/// テーブルが空でなく、ゲインが狭義単調増加であることを確認します
pub fn validate_lut(lut: &[GainEntry]) -> Result<(), GainError> {
    if lut.is_empty() {
        return Err(GainError::EmptyTable);
    }
    match lut.windows(2).position(|pair| pair[1].gain <= pair[0].gain) {
        Some(i) => Err(GainError::NotAscending { index: i + 1 }),
        None => Ok(()),
    }
}

/// `max_again` 以下のエントリだけを対象に、`isp_gain` 以下で最大のエントリを探します
///
/// - `isp_gain == 0` は先頭エントリを選び、ゲイン0を返す
/// - 先頭エントリ未満の非ゼロゲインは先頭エントリに丸める
/// - 対象の最終エントリを超えるゲインは、そのエントリがちょうど
///   `max_again` の場合のみ丸め、それ以外は対応なしとする
pub fn alloc_lut(
    lut: &[GainEntry],
    isp_gain: u32,
    _shift: u8,
    max_again: u32,
) -> Result<GainAllocation, GainError> {
    let first = lut.first().ok_or(GainError::EmptyTable)?;
    if isp_gain == 0 {
        return Ok(GainAllocation {
            reg_value: first.reg_value,
            gain: 0,
        });
    }

    let eligible = &lut[..lut.partition_point(|e| e.gain <= max_again)];
    let Some(last) = eligible.last() else {
        warn!("gain table has no entry below max_again {}", max_again);
        return Err(GainError::OutOfRange {
            isp_gain,
            max_gain: max_again,
        });
    };

    if isp_gain > last.gain {
        if last.gain == max_again {
            return Ok(GainAllocation {
                reg_value: last.reg_value,
                gain: last.gain,
            });
        }
        return Err(GainError::OutOfRange {
            isp_gain,
            max_gain: last.gain,
        });
    }

    let idx = eligible.partition_point(|e| e.gain <= isp_gain);
    if idx == 0 {
        debug!(
            "isp gain {} below table floor {}, clamping",
            isp_gain, first.gain
        );
    }
    let entry = eligible[idx.saturating_sub(1)];
    Ok(GainAllocation {
        reg_value: entry.reg_value,
        gain: entry.gain,
    })
}

/// 線形ステップ符号化: `code = isp_gain * steps_per_log2 >> 16`、上限 `max_code`
pub fn alloc_step(isp_gain: u32, _shift: u8, steps_per_log2: u32, max_code: u32) -> GainAllocation {
    let code = gain_to_step_code(isp_gain, steps_per_log2).min(max_code);
    GainAllocation {
        reg_value: code,
        gain: step_code_to_gain(code, steps_per_log2),
    }
}

fn gain_to_step_code(gain: u32, steps_per_log2: u32) -> u32 {
    ((u64::from(gain) * u64::from(steps_per_log2)) >> LOG2_GAIN_SHIFT) as u32
}

fn step_code_to_gain(code: u32, steps_per_log2: u32) -> u32 {
    if steps_per_log2 == 0 {
        return 0;
    }
    ((u64::from(code) << LOG2_GAIN_SHIFT) / u64::from(steps_per_log2)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    // x1, x1.25, x1.5, x2, x4
    const LUT: &[GainEntry] = &[
        GainEntry::new(0x10, 0),
        GainEntry::new(0x14, 21097),
        GainEntry::new(0x18, 38336),
        GainEntry::new(0x20, 65536),
        GainEntry::new(0x40, 131072),
    ];

    #[test]
    fn test_zero_gain_selects_first_entry() {
        let a = alloc_lut(LUT, 0, 0, 131072).unwrap();
        assert_eq!(a, GainAllocation { reg_value: 0x10, gain: 0 });
    }

    #[test]
    fn test_floor_quantization() {
        let a = alloc_lut(LUT, 40000, 0, 131072).unwrap();
        assert_eq!(a.reg_value, 0x18);
        assert_eq!(a.gain, 38336);
    }

    #[test]
    fn test_exact_match_selects_entry() {
        let a = alloc_lut(LUT, 65536, 0, 131072).unwrap();
        assert_eq!(a.reg_value, 0x20);
        assert_eq!(a.gain, 65536);
    }

    #[test]
    fn test_clamps_to_max_again_entry() {
        let a = alloc_lut(LUT, 500_000, 0, 131072).unwrap();
        assert_eq!(a.reg_value, 0x40);
        assert_eq!(a.gain, 131072);
    }

    #[test]
    fn test_max_again_limits_eligible_entries() {
        // max_again は x2 エントリと一致
        let a = alloc_lut(LUT, 100_000, 0, 65536).unwrap();
        assert_eq!(a.reg_value, 0x20);
    }

    #[test]
    fn test_beyond_table_without_max_entry_is_out_of_range() {
        // max_again がテーブル上のどのエントリとも一致しない
        let err = alloc_lut(LUT, 100_000, 0, 70_000).unwrap_err();
        assert!(matches!(err, GainError::OutOfRange { isp_gain: 100_000, .. }));
    }

    #[test]
    fn test_below_first_entry_clamps_instead_of_underflow() {
        const OFFSET_LUT: &[GainEntry] = &[GainEntry::new(0x80, 1000), GainEntry::new(0x90, 9000)];
        let a = alloc_lut(OFFSET_LUT, 500, 0, 9000).unwrap();
        assert_eq!(a, GainAllocation { reg_value: 0x80, gain: 1000 });
    }

    #[test]
    fn test_validate_rejects_unsorted_table() {
        let bad = [GainEntry::new(0, 0), GainEntry::new(1, 10), GainEntry::new(2, 10)];
        assert_eq!(validate_lut(&bad), Err(GainError::NotAscending { index: 2 }));
        assert_eq!(validate_lut(&[]), Err(GainError::EmptyTable));
        assert!(validate_lut(LUT).is_ok());
    }

    #[test]
    fn test_step_gain_sony_style() {
        // 6.02dB (x2) = 65536 -> 0.3dB刻みで20コード
        let a = alloc_step(65536, 0, 20, 100);
        assert_eq!(a.reg_value, 20);
        assert_eq!(a.gain, 65536);

        let a = alloc_step(70000, 0, 20, 100);
        assert_eq!(a.reg_value, 21);
        assert!(a.gain <= 70000);
    }

    #[test]
    fn test_step_gain_clamps_to_max_code() {
        let a = alloc_step(u32::MAX, 0, 20, 100);
        assert_eq!(a.reg_value, 100);
        assert_eq!(a.gain, 327680);
    }

    #[test]
    fn test_max_gain_and_code_per_encoding() {
        assert_eq!(GainSpec::Lut(LUT).max_gain(), 131072);
        assert_eq!(GainSpec::Lut(LUT).max_code(), 0x40);
        let step = GainSpec::Step {
            steps_per_log2: 20,
            max_code: 100,
        };
        assert_eq!(step.max_gain(), 327680);
        assert_eq!(step.max_code(), 100);
        assert_eq!(step.alloc(1_000_000, 0, 65536).unwrap().reg_value, 20);
    }

    #[test]
    fn test_zero_step_is_rejected() {
        let step = GainSpec::Step {
            steps_per_log2: 0,
            max_code: 10,
        };
        assert_eq!(step.validate(), Err(GainError::ZeroStep));
        assert_eq!(step.alloc(10, 0, 10), Err(GainError::ZeroStep));
    }
}
