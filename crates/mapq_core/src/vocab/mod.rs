//! Fixed business vocabulary: allowed themes, allowed map types and the inference tables.
//!
//! All lookups are exact, case-sensitive string matches.

pub const ALLOWED_THEMES: [&str; 10] = [
    "指挥",
    "禁毒",
    "治安",
    "要素管控",
    "风险统计",
    "处置态势",
    "热点巡逻",
    "专项治理",
    "勤务管理",
    "矛盾纠纷",
];

pub const ALLOWED_MAPTYPES: [&str; 4] = ["散点图", "热力图", "聚合点统计分布图", "统计分布图"];

/// Default map type for themes that have an obvious visualization.
pub const THEME_DEFAULT_MAPTYPE: [(&str, &str); 3] = [
    ("禁毒", "热力图"),
    ("热点巡逻", "热力图"),
    ("风险统计", "统计分布图"),
];

/// Ordered keyword hints matched as substrings of point-of-interest values.
/// Order is the tie-break when several keywords occur in one value.
pub const POI_KEYWORD_MAPTYPE: [(&str, &str); 4] = [
    ("聚合", "聚合点统计分布图"),
    ("点位", "散点图"),
    ("散点", "散点图"),
    ("热点", "热力图"),
];

pub fn is_allowed_theme(value: &str) -> bool {
    ALLOWED_THEMES.contains(&value)
}

pub fn is_allowed_maptype(value: &str) -> bool {
    ALLOWED_MAPTYPES.contains(&value)
}

pub fn theme_default_maptype(theme: &str) -> Option<&'static str> {
    THEME_DEFAULT_MAPTYPE
        .iter()
        .find(|(t, _)| *t == theme)
        .map(|(_, mt)| *mt)
}
