//! Criterion resolution: one search predicate in, candidate user IDs out.

use tracing::{debug, trace};

use roster_store::{Row, Value, placeholders};
use roster_types::UserId;

use crate::config::TextMatch;
use crate::directory::Directory;
use crate::error::Result;

/// A named search predicate carrying its free-text fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchCriterion {
    /// Substring match on the display name.
    UserName(String),
    /// Substring match on the phonetic name.
    Kana(String),
    /// Substring match on the mail address.
    Mail(String),
    /// Match on the free-text goal; full-text capable.
    Goal(String),
    /// Users with an active membership in a matching active department.
    DepartmentName(String),
    /// Users with an active membership in a matching active role;
    /// full-text capable.
    RoleName(String),
    /// Users assigned to a matching office.
    OfficeName(String),
    /// Users holding a matching skill.
    SkillName(String),
}

impl SearchCriterion {
    /// The fragment being searched for.
    pub fn fragment(&self) -> &str {
        match self {
            SearchCriterion::UserName(f)
            | SearchCriterion::Kana(f)
            | SearchCriterion::Mail(f)
            | SearchCriterion::Goal(f)
            | SearchCriterion::DepartmentName(f)
            | SearchCriterion::RoleName(f)
            | SearchCriterion::OfficeName(f)
            | SearchCriterion::SkillName(f) => f,
        }
    }

    /// Stable label for logging.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            SearchCriterion::UserName(_) => "user_name",
            SearchCriterion::Kana(_) => "kana",
            SearchCriterion::Mail(_) => "mail",
            SearchCriterion::Goal(_) => "goal",
            SearchCriterion::DepartmentName(_) => "department_name",
            SearchCriterion::RoleName(_) => "role_name",
            SearchCriterion::OfficeName(_) => "office_name",
            SearchCriterion::SkillName(_) => "skill_name",
        }
    }
}

/// Build the match clause and its parameter for one text column.
fn match_clause(column: &str, fragment: &str, mode: TextMatch) -> (String, Value) {
    match mode {
        TextMatch::Substring => (
            format!("LOWER({column}) LIKE ?"),
            Value::Text(format!("%{}%", fragment.to_lowercase())),
        ),
        TextMatch::FullText => (
            format!("MATCH({column}) AGAINST (?)"),
            Value::Text(fragment.to_string()),
        ),
    }
}

fn user_ids_from(rows: &[Row]) -> Result<Vec<UserId>> {
    let mut ids = Vec::with_capacity(rows.len());
    for row in rows {
        ids.push(UserId::new(row.text("user_id")?));
    }
    Ok(ids)
}

impl Directory {
    /// Resolve one criterion to candidate user IDs.
    ///
    /// The output is unordered and may contain duplicates when a user
    /// matches through several intermediate paths; it is deliberately not
    /// deduplicated.
    pub(crate) async fn resolve(&self, criterion: &SearchCriterion) -> Result<Vec<UserId>> {
        match criterion {
            SearchCriterion::UserName(f) => {
                self.user_column_ids("user_name", f, TextMatch::Substring).await
            }
            SearchCriterion::Kana(f) => {
                self.user_column_ids("kana", f, TextMatch::Substring).await
            }
            SearchCriterion::Mail(f) => {
                self.user_column_ids("mail", f, TextMatch::Substring).await
            }
            SearchCriterion::Goal(f) => {
                self.user_column_ids("goal", f, self.config.text_match).await
            }
            SearchCriterion::DepartmentName(f) => {
                let (clause, param) = match_clause("department_name", f, TextMatch::Substring);
                self.two_stage(
                    format!("SELECT department_id FROM department WHERE {clause} AND active = TRUE"),
                    param,
                    "department_id",
                    "SELECT user_id FROM department_role_member WHERE department_id IN (",
                    ") AND belong = TRUE",
                )
                .await
            }
            SearchCriterion::RoleName(f) => {
                let (clause, param) = match_clause("role_name", f, self.config.text_match);
                self.two_stage(
                    format!("SELECT role_id FROM role WHERE {clause} AND active = TRUE"),
                    param,
                    "role_id",
                    "SELECT user_id FROM department_role_member WHERE role_id IN (",
                    ") AND belong = TRUE",
                )
                .await
            }
            SearchCriterion::OfficeName(f) => {
                let (clause, param) = match_clause("office_name", f, TextMatch::Substring);
                self.two_stage(
                    format!("SELECT office_id FROM office WHERE {clause}"),
                    param,
                    "office_id",
                    "SELECT user_id FROM user WHERE office_id IN (",
                    ")",
                )
                .await
            }
            SearchCriterion::SkillName(f) => {
                let (clause, param) = match_clause("skill_name", f, TextMatch::Substring);
                self.two_stage(
                    format!("SELECT skill_id FROM skill WHERE {clause}"),
                    param,
                    "skill_id",
                    "SELECT user_id FROM skill_member WHERE skill_id IN (",
                    ")",
                )
                .await
            }
        }
    }

    /// Single-stage resolution against a user-table column.
    async fn user_column_ids(
        &self,
        column: &str,
        fragment: &str,
        mode: TextMatch,
    ) -> Result<Vec<UserId>> {
        let (clause, param) = match_clause(column, fragment, mode);
        let sql = format!("SELECT user_id FROM user WHERE {clause}");
        let rows = self.executor.fetch(&sql, &[param]).await?;
        user_ids_from(&rows)
    }

    /// Two-stage resolution: find intermediate IDs, then the users
    /// attached to them.
    ///
    /// An empty first stage short-circuits to an empty result; the
    /// second-stage query must never run with an empty `IN ()` filter.
    async fn two_stage(
        &self,
        stage1_sql: String,
        stage1_param: Value,
        stage1_column: &str,
        stage2_prefix: &str,
        stage2_suffix: &str,
    ) -> Result<Vec<UserId>> {
        let rows = self.executor.fetch(&stage1_sql, &[stage1_param]).await?;

        let mut intermediate: Vec<Value> = Vec::with_capacity(rows.len());
        for row in &rows {
            intermediate.push(row.text(stage1_column)?.into());
        }

        if intermediate.is_empty() {
            trace!(column = stage1_column, "stage-1 lookup matched nothing");
            return Ok(Vec::new());
        }
        debug!(
            column = stage1_column,
            matches = intermediate.len(),
            "stage-1 lookup resolved"
        );

        let sql = format!(
            "{}{}{}",
            stage2_prefix,
            placeholders(intermediate.len()),
            stage2_suffix
        );
        let rows = self.executor.fetch(&sql, &intermediate).await?;
        user_ids_from(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use roster_store::MockExecutor;

    use crate::config::DirectoryConfig;

    fn id_rows(column: &str, ids: &[&str]) -> Vec<Row> {
        ids.iter()
            .map(|id| Row::new().with(column, *id))
            .collect()
    }

    #[tokio::test]
    async fn test_user_name_substring_is_lowercased_and_wrapped() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_rows(id_rows("user_id", &["u1"]));

        let directory = Directory::new(mock.clone());
        let ids = directory
            .resolve(&SearchCriterion::UserName("Tanaka".into()))
            .await
            .unwrap();

        assert_eq!(ids, vec![UserId::from("u1")]);
        let call = &mock.calls()[0];
        assert!(call.sql.contains("LOWER(user_name) LIKE ?"));
        assert_eq!(call.params, vec![Value::Text("%tanaka%".to_string())]);
    }

    #[tokio::test]
    async fn test_office_two_stage_builds_in_clause() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_rows(id_rows("office_id", &["of-1", "of-2"]));
        mock.push_rows(id_rows("user_id", &["u1", "u2", "u3"]));

        let directory = Directory::new(mock.clone());
        let ids = directory
            .resolve(&SearchCriterion::OfficeName("Osaka".into()))
            .await
            .unwrap();

        assert_eq!(ids.len(), 3);
        let calls = mock.calls();
        assert!(calls[0].sql.contains("FROM office"));
        assert!(calls[1].sql.contains("office_id IN (?, ?)"));
        assert_eq!(
            calls[1].params,
            vec![
                Value::Text("of-1".to_string()),
                Value::Text("of-2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_stage_one_never_issues_stage_two() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_rows(vec![]);

        let directory = Directory::new(mock.clone());
        let ids = directory
            .resolve(&SearchCriterion::SkillName("rust".into()))
            .await
            .unwrap();

        assert!(ids.is_empty());
        assert_eq!(mock.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_candidates_are_preserved() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_rows(id_rows("department_id", &["d1", "d2"]));
        // u1 belongs to both matching departments.
        mock.push_rows(id_rows("user_id", &["u1", "u2", "u1"]));

        let directory = Directory::new(mock.clone());
        let ids = directory
            .resolve(&SearchCriterion::DepartmentName("sales".into()))
            .await
            .unwrap();

        assert_eq!(
            ids,
            vec![UserId::from("u1"), UserId::from("u2"), UserId::from("u1")]
        );
    }

    #[tokio::test]
    async fn test_goal_uses_full_text_when_configured() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_rows(id_rows("user_id", &["u1"]));

        let config = DirectoryConfig::new().with_text_match(TextMatch::FullText);
        let directory = Directory::with_config(mock.clone(), config);
        directory
            .resolve(&SearchCriterion::Goal("learn rust".into()))
            .await
            .unwrap();

        let call = &mock.calls()[0];
        assert!(call.sql.contains("MATCH(goal) AGAINST (?)"));
        // Full-text fragments are passed through untouched.
        assert_eq!(call.params, vec![Value::Text("learn rust".to_string())]);
    }

    #[tokio::test]
    async fn test_mail_ignores_full_text_config() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_rows(id_rows("user_id", &["u1"]));

        let config = DirectoryConfig::new().with_text_match(TextMatch::FullText);
        let directory = Directory::with_config(mock.clone(), config);
        directory
            .resolve(&SearchCriterion::Mail("@example.com".into()))
            .await
            .unwrap();

        assert!(mock.calls()[0].sql.contains("LOWER(mail) LIKE ?"));
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent_against_unchanged_store() {
        let mock = Arc::new(MockExecutor::new());
        mock.push_rows(id_rows("user_id", &["u2", "u1", "u2"]));
        mock.push_rows(id_rows("user_id", &["u2", "u1", "u2"]));

        let directory = Directory::new(mock.clone());
        let first = directory
            .resolve(&SearchCriterion::Kana("たなか".into()))
            .await
            .unwrap();
        let second = directory
            .resolve(&SearchCriterion::Kana("たなか".into()))
            .await
            .unwrap();

        assert_eq!(first, second);
    }
}
