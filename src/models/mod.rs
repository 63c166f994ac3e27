/// 同梱センサーモデル
///
/// モデルごとの差分は `SensorDescriptor` に集約されています。
/// 新しいセンサーを追加する場合はここにモジュールを追加し `ALL` に登録します。
pub mod imx335;
pub mod os04a10;
pub mod sc2336p;

use crate::descriptor::SensorDescriptor;

/// 同梱されている全センサー
pub static ALL: &[&SensorDescriptor] = &[&sc2336p::SC2336P, &imx335::IMX335, &os04a10::OS04A10];

/// 名前からセンサーを検索します（大文字小文字は区別しない）
pub fn find(name: &str) -> Option<&'static SensorDescriptor> {
    let name = name.trim();
    ALL.iter()
        .copied()
        .find(|desc| desc.name.eq_ignore_ascii_case(name))
}

/// 同梱センサー名の一覧
pub fn names() -> impl Iterator<Item = &'static str> {
    ALL.iter().map(|desc| desc.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("IMX335").map(|d| d.name), Some("imx335"));
        assert_eq!(find(" sc2336p ").map(|d| d.name), Some("sc2336p"));
        assert!(find("ov9999").is_none());
    }

    #[test]
    fn test_all_models_validate() {
        for desc in ALL {
            assert!(desc.validate().is_ok(), "{} failed validation", desc.name);
            assert!(!desc.windows.is_empty());
        }
    }

    #[test]
    fn test_names_lists_every_model() {
        let names: Vec<_> = names().collect();
        assert_eq!(names, vec!["sc2336p", "imx335", "os04a10"]);
    }
}
