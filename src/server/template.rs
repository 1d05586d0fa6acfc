//! 模板参数化
//!
//! 模板中带有 `lot=<value>` 标记（值可带引号），每个标记都会被替换为
//! 请求的批号。

use std::sync::OnceLock;

use regex::{NoExpand, Regex};

fn lot_token() -> &'static Regex {
    static LOT_TOKEN: OnceLock<Regex> = OnceLock::new();
    LOT_TOKEN.get_or_init(|| {
        Regex::new(r#"lot=["']?[^"'&]*["']?"#).expect("lot token pattern is valid")
    })
}

/// 将所有 `lot=<value>` 标记替换为 `lot`
pub fn substitute_lot(html: &str, lot: &str) -> String {
    lot_token().replace_all(html, NoExpand(lot)).into_owned()
}

/// 模板请求中的批号：优先取 `lot` 参数，
/// 否则取第一个查询参数的键 (`?12345`)
pub fn requested_lot(query: &[(String, String)]) -> Option<String> {
    query
        .iter()
        .find(|(key, _)| key == "lot")
        .map(|(_, value)| value.clone())
        .or_else(|| query.first().map(|(key, _)| key.clone()))
        .filter(|lot| !lot.is_empty())
}
