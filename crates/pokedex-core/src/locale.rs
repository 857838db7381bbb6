//! Static Japanese display names for upstream enumerated values.
//!
//! Categories (types) prefer the upstream localized record; these tables are
//! the offline fallback. Abilities and stats fall back to the raw key,
//! habitat, color and shape fall back to [`UNKNOWN`].

/// Marker for values with no known translation.
pub const UNKNOWN: &str = "不明";

pub fn type_name(key: &str) -> Option<&'static str> {
    let name = match key {
        "normal" => "ノーマル",
        "fire" => "ほのお",
        "water" => "みず",
        "electric" => "でんき",
        "grass" => "くさ",
        "ice" => "こおり",
        "fighting" => "かくとう",
        "poison" => "どく",
        "ground" => "じめん",
        "flying" => "ひこう",
        "psychic" => "エスパー",
        "bug" => "むし",
        "rock" => "いわ",
        "ghost" => "ゴースト",
        "dragon" => "ドラゴン",
        "dark" => "あく",
        "steel" => "はがね",
        "fairy" => "フェアリー",
        _ => return None,
    };
    Some(name)
}

pub fn ability_name(key: &str) -> Option<&'static str> {
    let name = match key {
        "overgrow" => "しんりょく",
        "chlorophyll" => "ようりょくそ",
        "blaze" => "もうか",
        "solar-power" => "サンパワー",
        "torrent" => "げきりゅう",
        "rain-dish" => "あめうけざら",
        "static" => "せいでんき",
        "lightning-rod" => "ひらいしん",
        _ => return None,
    };
    Some(name)
}

pub fn stat_name(key: &str) -> Option<&'static str> {
    let name = match key {
        "hp" => "HP",
        "attack" => "こうげき",
        "defense" => "ぼうぎょ",
        "special-attack" => "とくこう",
        "special-defense" => "とくぼう",
        "speed" => "すばやさ",
        _ => return None,
    };
    Some(name)
}

pub fn habitat_name(key: &str) -> Option<&'static str> {
    let name = match key {
        "cave" => "洞窟",
        "forest" => "森",
        "grassland" => "草原",
        "mountain" => "山",
        "rare" => "珍しい",
        "rough-terrain" => "荒地",
        "sea" => "海",
        "urban" => "都会",
        "waters-edge" => "水辺",
        _ => return None,
    };
    Some(name)
}

pub fn color_name(key: &str) -> Option<&'static str> {
    let name = match key {
        "black" => "黒",
        "blue" => "青",
        "brown" => "茶",
        "gray" => "灰",
        "green" => "緑",
        "pink" => "ピンク",
        "purple" => "紫",
        "red" => "赤",
        "white" => "白",
        "yellow" => "黄",
        _ => return None,
    };
    Some(name)
}

pub fn shape_name(key: &str) -> Option<&'static str> {
    let name = match key {
        "ball" => "ボール型",
        "squid" => "イカ型",
        "fish" => "魚型",
        "arms" => "手足型",
        "blob" => "塊",
        "upright" => "直立型",
        "quadruped" => "四足型",
        "wings" => "翼型",
        "tentacles" => "触手型",
        "heads" => "頭型",
        "humanoid" => "人型",
        "bug-wings" => "昆虫の羽型",
        "armor" => "鎧型",
        _ => return None,
    };
    Some(name)
}

/// Translate with a table, falling back to the raw key.
pub fn or_key(table: fn(&str) -> Option<&'static str>, key: &str) -> String {
    table(key).map(str::to_string).unwrap_or_else(|| key.to_string())
}

/// Translate an optional key with a table, falling back to [`UNKNOWN`].
pub fn or_unknown(table: fn(&str) -> Option<&'static str>, key: Option<&str>) -> String {
    key.and_then(table).unwrap_or(UNKNOWN).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks() {
        assert_eq!(or_key(ability_name, "overgrow"), "しんりょく");
        assert_eq!(or_key(ability_name, "pressure"), "pressure");
        assert_eq!(or_key(stat_name, "special-attack"), "とくこう");
        assert_eq!(or_unknown(habitat_name, Some("sea")), "海");
        assert_eq!(or_unknown(habitat_name, Some("space")), UNKNOWN);
        assert_eq!(or_unknown(shape_name, None), UNKNOWN);
    }

    #[test]
    fn test_type_table() {
        assert_eq!(type_name("electric"), Some("でんき"));
        assert_eq!(type_name("stellar"), None);
    }
}
