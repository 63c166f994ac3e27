use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

/// テスト用のI2Cセンサーモック
///
/// 16ビットアドレス/8ビット値のレジスタマップをシミュレートします。
/// 書き込まれたレジスタを記録し、エラー注入でI2C失敗を再現できます。
/// 内部状態は `Arc<Mutex<_>>` で共有されるため、`Sensor` に渡した後も
/// クローンから検証できます。
#[derive(Debug, Clone, Default)]
pub struct MockI2c {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    registers: HashMap<u16, u8>,
    writes: Vec<(u16, u8)>,
    reads: Vec<u16>,
    expected_address: Option<u8>,
    /// 成功した書き込みがこの回数に達した後の書き込みを失敗させる
    fail_after_writes: Option<usize>,
    simulate_write_error: bool,
    simulate_read_error: bool,
}

impl MockI2c {
    /// 新しいモックを作成します（どのアドレスにも応答）
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定アドレス以外にはNACKを返すモックを作成します
    pub fn with_address(address: u8) -> Self {
        let mock = Self::new();
        mock.state.lock().unwrap().expected_address = Some(address);
        mock
    }

    /// テスト用: レジスタ値を設定（書き込みログには残らない）
    pub fn set_register(&self, reg: u16, value: u8) {
        self.state.lock().unwrap().registers.insert(reg, value);
    }

    /// テスト用: 複数レジスタを設定
    pub fn set_registers(&self, values: &[(u16, u8)]) {
        let mut state = self.state.lock().unwrap();
        for &(reg, value) in values {
            state.registers.insert(reg, value);
        }
    }

    /// テスト用: 現在のレジスタ値（未設定は0）
    pub fn register(&self, reg: u16) -> u8 {
        self.state
            .lock()
            .unwrap()
            .registers
            .get(&reg)
            .copied()
            .unwrap_or(0)
    }

    /// テスト用: 書き込み履歴を取得
    pub fn get_writes(&self) -> Vec<(u16, u8)> {
        self.state.lock().unwrap().writes.clone()
    }

    /// テスト用: 指定レジスタへの書き込み値の履歴
    pub fn writes_to(&self, reg: u16) -> Vec<u8> {
        self.state
            .lock()
            .unwrap()
            .writes
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|&(_, v)| v)
            .collect()
    }

    /// テスト用: 読み出されたレジスタの履歴
    pub fn get_reads(&self) -> Vec<u16> {
        self.state.lock().unwrap().reads.clone()
    }

    /// テスト用: 書き込み・読み出し履歴をクリア
    pub fn clear_history(&self) {
        let mut state = self.state.lock().unwrap();
        state.writes.clear();
        state.reads.clear();
    }

    /// テスト用: 書き込みエラーをシミュレート
    pub fn set_write_error(&self, enable: bool) {
        self.state.lock().unwrap().simulate_write_error = enable;
    }

    /// テスト用: 読み出しエラーをシミュレート
    pub fn set_read_error(&self, enable: bool) {
        self.state.lock().unwrap().simulate_read_error = enable;
    }

    /// テスト用: `count` 回書き込みに成功した後の書き込みを失敗させる
    pub fn fail_after_writes(&self, count: usize) {
        self.state.lock().unwrap().fail_after_writes = Some(count);
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        if let Some(expected) = state.expected_address {
            if expected != address {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
        }

        let mut pointer: Option<u16> = None;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    if bytes.len() < 2 {
                        return Err(ErrorKind::Other);
                    }
                    let reg = u16::from_be_bytes([bytes[0], bytes[1]]);
                    for (offset, &value) in bytes[2..].iter().enumerate() {
                        let target = reg.wrapping_add(offset as u16);
                        let exhausted = state
                            .fail_after_writes
                            .is_some_and(|limit| state.writes.len() >= limit);
                        if state.simulate_write_error || exhausted {
                            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
                        }
                        state.registers.insert(target, value);
                        state.writes.push((target, value));
                    }
                    pointer = Some(reg);
                }
                Operation::Read(buffer) => {
                    if state.simulate_read_error {
                        return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
                    }
                    let reg = pointer.ok_or(ErrorKind::Other)?;
                    for (offset, slot) in buffer.iter_mut().enumerate() {
                        let target = reg.wrapping_add(offset as u16);
                        *slot = state.registers.get(&target).copied().unwrap_or(0);
                        state.reads.push(target);
                    }
                }
            }
        }
        Ok(())
    }
}

/// テスト用の遅延プロバイダ（実際には待たずに合計時間を記録）
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    total_ns: Arc<Mutex<u64>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// 要求された遅延の合計（ミリ秒）
    pub fn total_ms(&self) -> u64 {
        *self.total_ns.lock().unwrap() / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.lock().unwrap() += u64::from(ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_write_then_read() {
        let mut mock = MockI2c::new();
        mock.write(0x30, &[0x32, 0x0e, 0x04]).unwrap();

        let mut buf = [0u8; 1];
        mock.write_read(0x30, &[0x32, 0x0e], &mut buf).unwrap();
        assert_eq!(buf[0], 0x04);
        assert_eq!(mock.get_reads(), vec![0x320e]);
    }

    #[test]
    fn test_mock_wrong_address_nacks() {
        let mut mock = MockI2c::with_address(0x30);
        let result = mock.write(0x1a, &[0x01, 0x00, 0x01]);
        assert_eq!(
            result,
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        );
        assert!(mock.get_writes().is_empty());
    }

    #[test]
    fn test_mock_write_error() {
        let mut mock = MockI2c::new();
        mock.set_write_error(true);
        assert!(mock.write(0x30, &[0x01, 0x00, 0x01]).is_err());
        assert_eq!(mock.register(0x0100), 0);
    }

    #[test]
    fn test_mock_delay_accumulates() {
        let mut delay = MockDelay::new();
        delay.delay_ms(5);
        delay.delay_ms(10);
        assert_eq!(delay.total_ms(), 15);
    }
}
