//! センサードライバのインスタンス
//!
//! [`Sensor`] は [`SensorDescriptor`] をレジスタバスに結び付け、ISPコアが
//! 操作するインスタンスごとの状態（ストリーミング状態、選択中のウィンドウ、
//! 属性レコード）を保持します。全メソッドが `&mut self` を取り、
//! 1台のセンサーへのアクセスは呼び出し側が直列化します。

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info, warn};

use crate::attr::{SensorAttr, SensorWindow};
use crate::bus::RegisterBus;
use crate::descriptor::{ExposureMode, SensorDescriptor};
use crate::error::{SensorError, SensorResult};
use crate::gain::GainAllocation;
use crate::state::{plan_transition, StreamState, StreamStep};
use crate::timing::{compute_vts, ExposureLimits, Fps};

/// タイミング変更のたびに属性レコードを受け取る
pub trait AttrSync {
    fn sync_attr(&mut self, attr: &SensorAttr);
}

/// 更新を無視する同期先
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSync;

impl AttrSync for NoSync {
    fn sync_attr(&mut self, _attr: &SensorAttr) {}
}

impl<F> AttrSync for F
where
    F: FnMut(&SensorAttr),
{
    fn sync_attr(&mut self, attr: &SensorAttr) {
        (*self)(attr)
    }
}

pub struct Sensor<I2C, D, S = NoSync> {
    bus: RegisterBus<I2C, D>,
    descriptor: &'static SensorDescriptor,
    attr: SensorAttr,
    state: StreamState,
    sync: S,
}

impl<I2C, D> Sensor<I2C, D, NoSync>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, descriptor: &'static SensorDescriptor) -> SensorResult<Self> {
        Self::with_sync(i2c, delay, descriptor, NoSync)
    }
}

impl<I2C, D, S> Sensor<I2C, D, S>
where
    I2C: I2c,
    D: DelayNs,
    S: AttrSync,
{
    pub fn with_sync(
        i2c: I2C,
        delay: D,
        descriptor: &'static SensorDescriptor,
        sync: S,
    ) -> SensorResult<Self> {
        descriptor.validate()?;
        let attr =
            SensorAttr::from_descriptor(descriptor, 0).ok_or(SensorError::InvalidWindow(0))?;
        Ok(Self {
            bus: RegisterBus::new(i2c, delay, descriptor.i2c_address),
            descriptor,
            attr,
            state: StreamState::Deinit,
            sync,
        })
    }

    /// モデル既定以外のバスアドレスを使用します
    pub fn at_address(self, address: u8) -> Self {
        let Self {
            bus,
            descriptor,
            mut attr,
            state,
            sync,
        } = self;
        let (i2c, delay) = bus.release();
        attr.cbus_addr = address;
        Self {
            bus: RegisterBus::new(i2c, delay, address),
            descriptor,
            attr,
            state,
            sync,
        }
    }

    pub fn release(self) -> (I2C, D) {
        self.bus.release()
    }

    pub fn descriptor(&self) -> &'static SensorDescriptor {
        self.descriptor
    }

    pub fn attr(&self) -> &SensorAttr {
        &self.attr
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn window(&self) -> &'static SensorWindow {
        let descriptor = self.descriptor;
        &descriptor.windows[self.attr.window_index]
    }

    /// チップIDレジスタを読み出し、モデルと照合します
    pub fn detect(&mut self) -> SensorResult<u32> {
        let found = self.bus.read_field(&self.descriptor.chip_id_field)?;
        if found != self.descriptor.chip_id {
            warn!(
                "{}: unexpected chip id 0x{:06x} at 0x{:02x}",
                self.descriptor.name,
                found,
                self.bus.address()
            );
            return Err(SensorError::ChipIdMismatch {
                expected: self.descriptor.chip_id,
                found,
            });
        }
        info!(
            "{} detected at 0x{:02x} (chip id 0x{:06x})",
            self.descriptor.name,
            self.bus.address(),
            found
        );
        Ok(found)
    }

    /// 電源サイクル相当のリセット
    ///
    /// 次のストリーム開始でモードテーブルを再度書き込み、属性は選択中の
    /// ウィンドウの既定値に戻ります。
    pub fn init(&mut self) -> SensorResult<()> {
        self.reset_attr(self.attr.window_index)?;
        self.state = StreamState::Deinit;
        debug!("{}: init, window {}", self.descriptor.name, self.attr.window_index);
        self.sync.sync_attr(&self.attr);
        Ok(())
    }

    /// 別の解像度/フレームレートのプリセットに切り替えます。ストリーミング中は不可
    pub fn select_window(&mut self, index: usize) -> SensorResult<()> {
        if self.state == StreamState::Running {
            return Err(SensorError::Busy);
        }
        self.reset_attr(index)?;
        self.state = StreamState::Deinit;
        let window = self.window();
        info!(
            "{}: window {} selected ({}x{})",
            self.descriptor.name, index, window.width, window.height
        );
        self.sync.sync_attr(&self.attr);
        Ok(())
    }

    fn reset_attr(&mut self, index: usize) -> SensorResult<()> {
        let mut attr = SensorAttr::from_descriptor(self.descriptor, index)
            .ok_or(SensorError::InvalidWindow(index))?;
        attr.cbus_addr = self.bus.address();
        self.attr = attr;
        Ok(())
    }

    /// ストリーミングの開始/停止
    ///
    /// 状態は成功したステップごとに進みます。モードテーブル書き込み後に
    /// ストリーム開始が失敗した場合は `Init` に留まり、次回はストリーム開始
    /// だけを再試行します。
    ///
    /// モードテーブルはVTSと露光をウィンドウ既定値に戻すため、書き込み直後に
    /// 属性レコードが保持するタイミングを再設定します。
    pub fn s_stream(&mut self, enable: bool) -> SensorResult<()> {
        let plan = plan_transition(self.state, enable);
        if plan.is_noop() {
            debug!(
                "{}: stream {} ignored in state {:?}",
                self.descriptor.name,
                if enable { "on" } else { "off" },
                self.state
            );
            return Ok(());
        }
        for step in plan.steps {
            let table = match step {
                StreamStep::WriteModeTable => self.window().regs,
                StreamStep::WriteStreamOn => self.descriptor.stream_on,
                StreamStep::WriteStreamOff => self.descriptor.stream_off,
            };
            self.bus.write_table(table)?;
            if *step == StreamStep::WriteModeTable {
                self.restore_timing()?;
            }
            self.state = step.resulting_state();
            debug!("{}: {:?} -> {:?}", self.descriptor.name, step, self.state);
        }
        info!(
            "{} stream {}",
            self.descriptor.name,
            if enable { "on" } else { "off" }
        );
        Ok(())
    }

    /// モードテーブル適用後、属性レコードのVTSと露光をハードウェアへ戻します
    fn restore_timing(&mut self) -> SensorResult<()> {
        let default_vts = self.window().vts;
        if self.attr.total_height != default_vts {
            self.bus
                .write_field(&self.descriptor.vts_field, self.attr.total_height)?;
            debug!(
                "{}: vts {} restored over table default {}",
                self.descriptor.name, self.attr.total_height, default_vts
            );
        }
        if self.attr.integration_time != 0 {
            let lines = self.attr.integration_time;
            self.set_integration_time(lines)?;
        }
        Ok(())
    }

    /// `fps`（`(num << 16) | den`）に合わせてフレーム長を再設定します
    ///
    /// 範囲外のレートやHTSが読めない場合は何も書き込みません。
    /// 新しいVTSを返します。
    ///
    /// VTSと露光上限を確定した時点で同期先へ通知します。Shutter方式の
    /// 露光再設定が失敗しても、ISPはハードウェアと同じVTSを受け取ります。
    pub fn set_fps(&mut self, fps: u32) -> SensorResult<u32> {
        let requested = Fps::decode(fps)?;
        let range = self.descriptor.fps_range(self.window());
        if let Err(e) = range.check(requested) {
            warn!("{}: {}", self.descriptor.name, e);
            return Err(e);
        }

        let hts = self.bus.read_field(&self.descriptor.hts_field)?;
        let vts = compute_vts(self.descriptor.sclk, hts, requested)?;
        let max_vts = self.descriptor.max_vts();
        if vts > max_vts {
            return Err(SensorError::VtsOverflow { vts, max_vts });
        }
        self.bus.write_field(&self.descriptor.vts_field, vts)?;

        self.attr.total_width = hts;
        self.attr
            .apply_limits(ExposureLimits::from_vts(vts, self.descriptor.vts_margin));
        self.attr.fps = fps;
        debug!(
            "{}: fps {}/{} -> hts {} vts {}",
            self.descriptor.name, requested.num, requested.den, hts, vts
        );

        self.sync.sync_attr(&self.attr);

        // シャッター位置はフレーム終端からの相対値
        if self.descriptor.exposure.mode == ExposureMode::Shutter && self.attr.integration_time != 0
        {
            let lines = self.attr.integration_time;
            if self.set_integration_time(lines)? != lines {
                self.sync.sync_attr(&self.attr);
            }
        }
        Ok(vts)
    }

    /// 現在の上限で制限した露光時間を設定し、実際に適用したライン数を返します
    pub fn set_integration_time(&mut self, lines: u32) -> SensorResult<u32> {
        let lines = lines.clamp(
            self.attr.min_integration_time,
            self.attr.max_integration_time.max(self.attr.min_integration_time),
        );
        let value = match self.descriptor.exposure.mode {
            ExposureMode::Lines => lines,
            ExposureMode::Shutter => self.attr.total_height.saturating_sub(lines),
        };
        self.bus.write_field(&self.descriptor.exposure.field, value)?;
        self.attr.integration_time = lines;
        Ok(lines)
    }

    /// ISPのアナログゲインをレジスタコードに変換します（ハードウェアには触れない）
    pub fn alloc_again(&self, isp_gain: u32, shift: u8) -> SensorResult<GainAllocation> {
        Ok(self
            .descriptor
            .again
            .alloc(isp_gain, shift, self.attr.max_again)?)
    }

    /// レジスタ幅を超えるコードは `FieldOverflow` で拒否します
    pub fn set_analog_gain(&mut self, code: u32) -> SensorResult<()> {
        self.bus.write_field(&self.descriptor.again_field, code)?;
        self.attr.again = code;
        Ok(())
    }

    /// アナログゲインを割り当てて設定し、量子化後のゲインを返します
    pub fn apply_analog_gain(&mut self, isp_gain: u32) -> SensorResult<GainAllocation> {
        let allocation = self.alloc_again(isp_gain, 0)?;
        self.set_analog_gain(allocation.reg_value)?;
        Ok(allocation)
    }

    /// デジタルゲイン段を持たないモデルは常に等倍を返します
    pub fn alloc_dgain(&self, isp_gain: u32, shift: u8) -> SensorResult<GainAllocation> {
        match &self.descriptor.dgain {
            Some((gain, _)) => Ok(gain.alloc(isp_gain, shift, self.attr.max_dgain)?),
            None => Ok(GainAllocation {
                reg_value: 0,
                gain: 0,
            }),
        }
    }

    pub fn set_digital_gain(&mut self, code: u32) -> SensorResult<()> {
        match &self.descriptor.dgain {
            Some((_, field)) => {
                self.bus.write_field(field, code)?;
                self.attr.dgain = code;
            }
            None => debug!("{}: no digital gain stage", self.descriptor.name),
        }
        Ok(())
    }

    pub fn set_flip(&mut self, hflip: bool, vflip: bool) -> SensorResult<()> {
        let flip = self
            .descriptor
            .flip
            .ok_or(SensorError::Unsupported("flip"))?;
        let mut bits = 0;
        if hflip {
            bits |= flip.hflip_mask;
        }
        if vflip {
            bits |= flip.vflip_mask;
        }
        self.bus
            .update_bits(flip.reg, flip.hflip_mask | flip.vflip_mask, bits)?;
        Ok(())
    }

    /// デバッグ用のレジスタ直接読み出し
    pub fn read_register(&mut self, reg: u16) -> SensorResult<u8> {
        self.bus.read(reg)
    }

    /// デバッグ用のレジスタ直接書き込み
    pub fn write_register(&mut self, reg: u16, value: u8) -> SensorResult<()> {
        self.bus.write(reg, value)
    }
}
