//! Random sampling of enriched user records.

use rand::Rng;
use tracing::{debug, trace};

use roster_store::Row;
use roster_types::UserId;

use crate::directory::Directory;
use crate::error::{DirectoryError, Result};
use crate::types::UserRecord;

/// Options for [`Directory::sample`].
#[derive(Debug, Clone, Default)]
pub struct SampleOptions {
    /// The user on whose behalf samples are drawn. Carried for caller
    /// parity and logging; it does not influence which offsets come up.
    pub seed_user: Option<UserId>,

    /// How many samples to draw. Defaults to one.
    pub count: Option<usize>,
}

impl SampleOptions {
    /// Options for a single anonymous sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the seed user.
    pub fn with_seed_user(mut self, user_id: UserId) -> Self {
        self.seed_user = Some(user_id);
        self
    }

    /// Set the sample count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl Directory {
    /// Draw pseudo-random enriched user records.
    ///
    /// The population size comes from the count cache, so a stale count
    /// is possible and tolerated. Offsets are drawn independently:
    /// duplicates — and therefore duplicate users — are possible and not
    /// filtered out. An offset that lands past the real table end (count
    /// ran ahead of a delete) silently yields nothing.
    ///
    /// Fails with [`DirectoryError::EmptyPopulation`] when the population
    /// is zero, before any offset is drawn.
    pub async fn sample(&self, options: SampleOptions) -> Result<Vec<UserRecord>> {
        let population = self.count_cache.get(self.executor.as_ref()).await?;
        if population == 0 {
            return Err(DirectoryError::EmptyPopulation);
        }

        let wanted = options.count.unwrap_or(1);
        if let Some(seed) = &options.seed_user {
            trace!(seed_user = %seed, wanted, "sampling users");
        }

        let offsets: Vec<u64> = {
            let mut rng = rand::rng();
            (0..wanted).map(|_| rng.random_range(0..population)).collect()
        };
        debug!(population, wanted, "drew sample offsets");

        let mut records = Vec::with_capacity(wanted);
        for offset in offsets {
            if let Some(record) = self.sample_at(offset).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Fetch and enrich the user at one row offset.
    async fn sample_at(&self, offset: u64) -> Result<Option<UserRecord>> {
        let rows = self
            .executor
            .fetch(
                "SELECT user_id, user_name, kana, entry_date, goal FROM user \
                 ORDER BY entry_date ASC, kana ASC LIMIT 1 OFFSET ?",
                &[offset.into()],
            )
            .await?;
        let Some(row) = rows.first() else {
            debug!(offset, "sample offset past table end, skipping");
            return Ok(None);
        };

        let mut record = UserRecord {
            user_id: UserId::new(row.text("user_id")?),
            user_name: row.text("user_name")?.to_string(),
            kana: row.text("kana")?.to_string(),
            entry_date: row.timestamp("entry_date")?,
            office_name: None,
            icon_file_name: None,
            department_name: None,
            skill_names: Vec::new(),
            goal: row.opt_text("goal")?,
        };

        let attribute_rows = self
            .executor
            .fetch(
                r#"
SELECT o.office_name, f.file_name, d.department_name, s.skill_name
FROM user u
LEFT JOIN office o ON u.office_id = o.office_id
LEFT JOIN file f ON u.user_icon_id = f.file_id
LEFT JOIN department_role_member drm ON u.user_id = drm.user_id AND drm.belong = TRUE
LEFT JOIN department d ON drm.department_id = d.department_id
LEFT JOIN skill_member sm ON u.user_id = sm.user_id
LEFT JOIN skill s ON sm.skill_id = s.skill_id
WHERE u.user_id = ?
"#,
                &[record.user_id.as_str().into()],
            )
            .await?;

        fold_attributes(&mut record, &attribute_rows)?;
        Ok(Some(record))
    }
}

/// Fold the multi-row attribute join into one record.
///
/// Scalar attributes repeat on every row; the skill column is what
/// multiplies rows, so it is collected into a duplicate-free list.
fn fold_attributes(record: &mut UserRecord, rows: &[Row]) -> Result<()> {
    for row in rows {
        if record.office_name.is_none() {
            record.office_name = row.opt_text("office_name")?;
        }
        if record.icon_file_name.is_none() {
            record.icon_file_name = row.opt_text("file_name")?;
        }
        if record.department_name.is_none() {
            record.department_name = row.opt_text("department_name")?;
        }
        if let Some(skill) = row.opt_text("skill_name")? {
            if !record.skill_names.contains(&skill) {
                record.skill_names.push(skill);
            }
        }
    }
    Ok(())
}
