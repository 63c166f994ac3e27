//! レジスタテーブルと複数バイトにまたがるレジスタフィールド
//!
//! センサーは16ビットのレジスタアドレスと8ビットの値で設定します。
//! モードプリセットは [`RegOp`] のスライスで、1バイトを超える値
//! （VTS、HTS、シャッター、ゲインコード）は [`RegisterField`] で表します。

/// 1つのフィールドが占有できるレジスタ数の上限（u32に収まる範囲）
pub const MAX_FIELD_REGS: usize = 4;

/// レジスタシーケンスの1ステップ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegOp {
    Write { reg: u16, value: u8 },
    /// 書き込み間にセンサーが必要とする待ち時間
    Delay { ms: u16 },
}

/// レジスタ書き込みエントリの短縮形
pub const fn w(reg: u16, value: u8) -> RegOp {
    RegOp::Write { reg, value }
}

/// 待ち時間エントリの短縮形
pub const fn delay(ms: u16) -> RegOp {
    RegOp::Delay { ms }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// 先頭レジスタが最上位バイト
    BigEndian,
    /// 先頭レジスタが最下位バイト
    LittleEndian,
}

/// 連続する8ビットレジスタに分割して格納される値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterField {
    pub regs: &'static [u16],
    pub order: ByteOrder,
    /// 分割前に適用する左シフト（例: 露光値を `lines << 4` で格納）
    pub shift: u8,
    /// 最上位レジスタのマスク
    pub msb_mask: u8,
}

impl RegisterField {
    pub const fn be(regs: &'static [u16]) -> Self {
        Self {
            regs,
            order: ByteOrder::BigEndian,
            shift: 0,
            msb_mask: 0xFF,
        }
    }

    pub const fn le(regs: &'static [u16]) -> Self {
        Self {
            regs,
            order: ByteOrder::LittleEndian,
            shift: 0,
            msb_mask: 0xFF,
        }
    }

    pub const fn with_shift(mut self, shift: u8) -> Self {
        self.shift = shift;
        self
    }

    pub const fn with_msb_mask(mut self, mask: u8) -> Self {
        self.msb_mask = mask;
        self
    }

    /// レジスタ数が1〜[`MAX_FIELD_REGS`]で、シフト後の値がu32に収まるか
    pub fn is_well_formed(&self) -> bool {
        (1..=MAX_FIELD_REGS).contains(&self.regs.len())
            && u32::from(self.shift) < 8 * self.regs.len() as u32
    }

    /// 先頭レジスタ（エラー報告用）
    pub fn first_reg(&self) -> u16 {
        self.regs.first().copied().unwrap_or(0)
    }

    /// フィールドが保持できる最大値（シフト前）。不正な形のフィールドは0
    pub fn max_value(&self) -> u32 {
        if !self.is_well_formed() {
            return 0;
        }
        let bits = 8 * (self.regs.len() as u32 - 1) + (8 - self.msb_mask.leading_zeros());
        let raw_max = if bits >= 32 { u32::MAX } else { (1u32 << bits) - 1 };
        raw_max >> self.shift
    }

    /// `value` をレジスタ順の `(reg, byte)` に分割します
    pub fn encode(&self, value: u32) -> Vec<(u16, u8)> {
        let raw = value.checked_shl(u32::from(self.shift)).unwrap_or(0);
        let n = self.regs.len();
        self.regs
            .iter()
            .enumerate()
            .map(|(i, &reg)| {
                let byte_index = match self.order {
                    ByteOrder::BigEndian => n - 1 - i,
                    ByteOrder::LittleEndian => i,
                };
                let mut byte = raw.checked_shr(8 * byte_index as u32).unwrap_or(0) as u8;
                if byte_index == n - 1 {
                    byte &= self.msb_mask;
                }
                (reg, byte)
            })
            .collect()
    }

    /// レジスタ順に読み出したバイト列から値を復元します
    pub fn decode(&self, bytes: &[u8]) -> u32 {
        let n = self.regs.len();
        let raw = bytes.iter().take(n).enumerate().fold(0u32, |acc, (i, &b)| {
            let byte_index = match self.order {
                ByteOrder::BigEndian => n - 1 - i,
                ByteOrder::LittleEndian => i,
            };
            let b = if byte_index == n - 1 { b & self.msb_mask } else { b };
            acc | u32::from(b).checked_shl(8 * byte_index as u32).unwrap_or(0)
        });
        raw.checked_shr(u32::from(self.shift)).unwrap_or(0)
    }
}

/// テーブル内のレジスタ書き込み数（待ち時間は除く）
pub fn count_writes(table: &[RegOp]) -> usize {
    table
        .iter()
        .filter(|op| matches!(op, RegOp::Write { .. }))
        .count()
}
