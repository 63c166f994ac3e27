//! センサーレジスタバス
//!
//! このプラットフォームのイメージセンサーはI2C上の単純なプロトコルを使います。
//! 書き込みは2バイトのビッグエンディアンアドレスに1バイトのデータ、
//! 読み出しは2バイトのアドレス書き込みの後に1バイト読み出しです。
//! `embedded_hal` 1.0 のI2C実装であれば何でも利用できます。
//!
//! 呼び出しはブロッキングで排他制御は行いません。バスの所有者が
//! センサーへのアクセスを直列化します。

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, error};

use crate::error::{SensorError, SensorResult};
use crate::regs::{RegOp, RegisterField};

/// I2Cバス上の1台のセンサーへのレジスタアクセス
pub struct RegisterBus<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D> RegisterBus<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// I2Cバスと遅延プロバイダを返却します
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn read(&mut self, reg: u16) -> SensorResult<u8> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), &mut value)
            .map_err(|e| {
                let kind = e.kind();
                error!(
                    "sensor 0x{:02x}: read of 0x{:04x} failed: {:?}",
                    self.address, reg, kind
                );
                SensorError::I2c { reg, kind }
            })?;
        Ok(value[0])
    }

    pub fn write(&mut self, reg: u16, value: u8) -> SensorResult<()> {
        let [hi, lo] = reg.to_be_bytes();
        self.i2c
            .write(self.address, &[hi, lo, value])
            .map_err(|e| {
                let kind = e.kind();
                error!(
                    "sensor 0x{:02x}: write 0x{:04x}=0x{:02x} failed: {:?}",
                    self.address, reg, value, kind
                );
                SensorError::I2c { reg, kind }
            })
    }

    /// レジスタシーケンスを順番に書き込みます
    ///
    /// 最初の書き込み失敗で中断し、それまでに書いたレジスタはそのまま残ります。
    /// 発行した書き込み数を返します。
    pub fn write_table(&mut self, table: &[RegOp]) -> SensorResult<usize> {
        let mut written = 0;
        for op in table {
            match *op {
                RegOp::Write { reg, value } => {
                    self.write(reg, value)?;
                    written += 1;
                }
                RegOp::Delay { ms } => self.delay.delay_ms(u32::from(ms)),
            }
        }
        debug!(
            "sensor 0x{:02x}: wrote {} registers",
            self.address, written
        );
        Ok(written)
    }

    pub fn read_field(&mut self, field: &RegisterField) -> SensorResult<u32> {
        let mut bytes = [0u8; 4];
        for (slot, &reg) in bytes.iter_mut().zip(field.regs) {
            *slot = self.read(reg)?;
        }
        Ok(field.decode(&bytes[..field.regs.len().min(4)]))
    }

    /// フィールド幅を超える値は1バイトも書き込まずに拒否します
    pub fn write_field(&mut self, field: &RegisterField, value: u32) -> SensorResult<()> {
        let max = field.max_value();
        if value > max {
            error!(
                "sensor 0x{:02x}: value {:#x} too wide for field at 0x{:04x}",
                self.address,
                value,
                field.first_reg()
            );
            return Err(SensorError::FieldOverflow {
                reg: field.first_reg(),
                value,
                max,
            });
        }
        for (reg, byte) in field.encode(value) {
            self.write(reg, byte)?;
        }
        Ok(())
    }

    /// `mask` で選択したビットのリード・モディファイ・ライト
    pub fn update_bits(&mut self, reg: u16, mask: u8, value: u8) -> SensorResult<u8> {
        let current = self.read(reg)?;
        let next = (current & !mask) | (value & mask);
        if next != current {
            self.write(reg, next)?;
        }
        Ok(next)
    }
}
