//! PostgreSQL 连接池与仓储公共工具
//!
//! 错误映射统一在这里：唯一约束冲突 → AlreadyExists，零行 →
//! NotFound，检查约束冲突单独暴露给验证码递减，其余带操作标签包装。

use domain::{DomainError, DomainResult};
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

pub mod repositories;

pub type DbPool = PgPool;

/// PostgreSQL 唯一约束冲突
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL 检查约束冲突
const CHECK_VIOLATION: &str = "23514";

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// 统一的 sqlx 错误映射
pub(crate) fn map_sqlx_err(op: &'static str, entity: &'static str, err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::RowNotFound => DomainError::not_found(entity),
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            DomainError::already_exists(entity)
        }
        _ => DomainError::storage(op, err.to_string()),
    }
}

pub(crate) fn is_check_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(CHECK_VIOLATION))
}

/// 按白名单组装动态 UPDATE 语句
///
/// 未知键在任何 I/O 之前失败；SET 子句按 BTreeMap 的键序组装，
/// id 参数永远排在最后。`extra_set` 用于追加 `last_updated_at = NOW()`
/// 这类非参数列。
pub(crate) fn build_update_sql(
    table: &str,
    whitelist: &[&str],
    fields: &application::repository::UpdateFields,
    extra_set: &str,
) -> DomainResult<String> {
    let unknown: Vec<String> = fields
        .keys()
        .filter(|key| !whitelist.contains(&key.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(DomainError::invalid_fields(unknown));
    }
    if fields.is_empty() {
        return Err(DomainError::invalid_values("empty update"));
    }

    let sets: Vec<String> = fields
        .keys()
        .enumerate()
        .map(|(i, key)| format!("{} = ${}", key, i + 1))
        .collect();

    Ok(format!(
        "UPDATE {} SET {}{} WHERE id = ${}",
        table,
        sets.join(", "),
        extra_set,
        fields.len() + 1
    ))
}

/// 把 JSON 值绑定到对应的 Postgres 类型
///
/// 字符串数组列（text_blocks / links / render_order）来自 JSON 数组，
/// jsonb 列（widgets / tags）来自 JSON 对象。
pub(crate) fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &serde_json::Value,
) -> DomainResult<Query<'q, Postgres, PgArguments>> {
    use serde_json::Value;

    Ok(match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => query.bind(s.clone()),
        Value::Array(items) => {
            let strings = items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_owned).ok_or_else(|| {
                        DomainError::invalid_values("array fields must contain strings")
                    })
                })
                .collect::<DomainResult<Vec<String>>>()?;
            query.bind(strings)
        }
        Value::Object(_) => query.bind(sqlx::types::Json(value.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_build_update_sql_stable_order_id_last() {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), json!("t"));
        fields.insert("description".to_string(), json!("d"));
        fields.insert("image".to_string(), json!("i"));

        let sql = build_update_sql(
            "templates",
            &["title", "description", "image"],
            &fields,
            ", last_updated_at = NOW()",
        )
        .unwrap();

        // BTreeMap 键序：description, image, title
        assert_eq!(
            sql,
            "UPDATE templates SET description = $1, image = $2, title = $3, \
             last_updated_at = NOW() WHERE id = $4"
        );
    }

    #[test]
    fn test_build_update_sql_rejects_unknown_key_before_io() {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), json!("t"));
        fields.insert("owner_id".to_string(), json!("x"));

        let err = build_update_sql("templates", &["title"], &fields, "").unwrap_err();
        assert_eq!(
            err,
            DomainError::invalid_fields(vec!["owner_id".to_string()])
        );
    }

    #[test]
    fn test_build_update_sql_rejects_empty_map() {
        let fields = BTreeMap::new();
        assert!(build_update_sql("templates", &["title"], &fields, "").is_err());
    }
}
