//! 目录服务的数据库迁移

use shiroha_adapter_postgres::Migration;

const CREATE_GAMES: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    game_id       UUID PRIMARY KEY,
    title         VARCHAR(255) NOT NULL,
    description   TEXT,
    thumbnail_url VARCHAR(255),
    release_date  DATE,
    developer     VARCHAR(255),
    rating        NUMERIC(3, 1),
    category_id   INTEGER,
    is_active     BOOLEAN NOT NULL DEFAULT TRUE,
    extra_ways    JSONB
);
"#;

/// 按版本排列的迁移
pub fn catalog_migrations() -> Vec<Migration> {
    vec![Migration::new(1, "create_games", CREATE_GAMES)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_versions_are_unique() {
        let migrations = catalog_migrations();
        let versions: HashSet<i64> = migrations.iter().map(|m| m.version).collect();
        assert_eq!(versions.len(), migrations.len());
    }
}
