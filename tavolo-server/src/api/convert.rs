//! URL 参数与 Record ID 的转换
//!
//! URL 路径里只出现记录的 key（`/qr/{rid}/{tid}` 中的 `rid`），
//! 服务内部统一使用 `"table:id"` 形式的完整 ID。

/// Build a full `"table:key"` id from a path segment
///
/// Accepts either the bare key or an already-qualified id; a qualified id
/// for a different table is left untouched and fails the later lookup.
pub fn record_ref(table: &str, key: &str) -> String {
    if key.contains(':') {
        key.to_string()
    } else {
        format!("{}:{}", table, key)
    }
}

/// Key part of a `"table:key"` id, for building URLs
pub fn record_key(id: &str) -> &str {
    id.split_once(':').map(|(_, key)| key).unwrap_or(id)
}
