/// ストリーミング状態遷移
///
/// センサーは `Deinit`（レジスタ未設定）→ `Init`（モードテーブル書き込み済み）
/// → `Running`（ストリーム出力中）の3状態を持ちます。
/// 遷移の計画はこのモジュールの純粋関数で決定し、実際のレジスタ書き込みは
/// `Sensor` が1ステップずつ実行します。

/// センサーのストリーミング状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// 電源投入直後、モードテーブル未書き込み
    #[default]
    Deinit,
    /// モードテーブル書き込み済み、ストリーム停止中
    Init,
    /// ストリーム出力中
    Running,
}

/// 遷移中に実行するレジスタ書き込み
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStep {
    /// 解像度/FPSプリセットの全レジスタ
    WriteModeTable,
    /// ストリーム開始レジスタ
    WriteStreamOn,
    /// ストリーム停止レジスタ
    WriteStreamOff,
}

impl StreamStep {
    /// このステップが成功した後の状態
    pub fn resulting_state(&self) -> StreamState {
        match self {
            StreamStep::WriteModeTable => StreamState::Init,
            StreamStep::WriteStreamOn => StreamState::Running,
            StreamStep::WriteStreamOff => StreamState::Init,
        }
    }
}

/// 遷移計画
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamPlan {
    pub steps: &'static [StreamStep],
    pub next: StreamState,
}

impl StreamPlan {
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

/// 現在の状態と要求から遷移計画を決定します
///
/// - 有効化: `Deinit` ならモードテーブル→ストリーム開始、`Init` ならストリーム開始、
///   `Running` なら何もしない
/// - 無効化: `Init`/`Running` ならストリーム停止して `Init`、`Deinit` なら何もしない
pub fn plan_transition(state: StreamState, enable: bool) -> StreamPlan {
    use StreamStep::*;

    match (state, enable) {
        (StreamState::Deinit, true) => StreamPlan {
            steps: &[WriteModeTable, WriteStreamOn],
            next: StreamState::Running,
        },
        (StreamState::Init, true) => StreamPlan {
            steps: &[WriteStreamOn],
            next: StreamState::Running,
        },
        (StreamState::Running, true) => StreamPlan {
            steps: &[],
            next: StreamState::Running,
        },
        (StreamState::Deinit, false) => StreamPlan {
            steps: &[],
            next: StreamState::Deinit,
        },
        (StreamState::Init | StreamState::Running, false) => StreamPlan {
            steps: &[WriteStreamOff],
            next: StreamState::Init,
        },
    }
}
