use isp_sensor_core::bus::mock::{MockDelay, MockI2c};
use isp_sensor_core::{Sensor, SensorAttr, SensorConfig, SensorError};

/// モックI2C上で設定されたセンサーを一通り動かすシミュレーター
fn main() -> anyhow::Result<()> {
    // 設定ファイル読み込み
    let config = SensorConfig::load()
        .map_err(|e| anyhow::anyhow!("設定ファイルの読み込みエラー: {}", e))?;
    let descriptor = config.model;

    // チップIDをあらかじめ書き込んだモックバス
    let i2c = MockI2c::with_address(config.i2c_address);
    i2c.set_registers(&descriptor.chip_id_field.encode(descriptor.chip_id));

    let debug_mode = config.debug_mode;
    let mut sensor = Sensor::with_sync(
        i2c.clone(),
        MockDelay::new(),
        descriptor,
        move |attr: &SensorAttr| {
            if debug_mode {
                println!(
                    "sync: vts={} max_it={} fps=0x{:08x}",
                    attr.total_height, attr.max_integration_time, attr.fps
                );
            }
        },
    )?
    .at_address(config.i2c_address);

    sensor.detect()?;
    sensor.select_window(config.window_index)?;
    sensor.s_stream(true)?;

    match sensor.set_flip(config.hflip, config.vflip) {
        Ok(()) | Err(SensorError::Unsupported(_)) => {}
        Err(e) => return Err(e.into()),
    }

    if let Some(fps) = config.fps {
        sensor.set_fps(fps)?;
    }

    // x2 のアナログゲインと最大露光の半分
    let again = sensor.apply_analog_gain(65536)?;
    let max_it = sensor.attr().max_integration_time;
    let it = sensor.set_integration_time(max_it / 2)?;

    let window = sensor.window();
    let attr = sensor.attr();
    println!("{} v{}", attr.name, isp_sensor_core::VERSION);
    println!(
        "  window {}x{} @ {}/{} fps",
        window.width,
        window.height,
        attr.fps >> 16,
        attr.fps & 0xFFFF
    );
    println!(
        "  hts {} vts {} max_it {}",
        attr.total_width, attr.total_height, attr.max_integration_time
    );
    println!(
        "  again code 0x{:04x} (gain {}), integration time {} lines",
        again.reg_value, again.gain, it
    );

    sensor.s_stream(false)?;
    println!("  {} register writes", i2c.get_writes().len());
    Ok(())
}
