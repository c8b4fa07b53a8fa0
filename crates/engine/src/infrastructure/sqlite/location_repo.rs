//! SQLite-backed location store.

use async_trait::async_trait;
use atlas_domain::{
    CampaignId, CharacterId, Description, Location, LocationId, LocationName, UserId,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use super::{connect, map_sqlx_error};
use crate::infrastructure::ports::{LocationFilter, LocationRepo, ParentScope, RepoError};

const COLUMNS: &str = "id, campaign_id, name, description, parent_id, owned_by, created_by, created_at, updated_at";

/// SQLite implementation of the location store.
///
/// `(campaign_id, name)` is unique, and the composite foreign key
/// `(campaign_id, parent_id)` guarantees a parent lives in the same campaign.
pub struct SqliteLocationRepo {
    pool: SqlitePool,
}

impl SqliteLocationRepo {
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = connect(db_path).await?;
        Self::with_pool(pool).await
    }

    /// Use an existing pool, creating the schema if needed.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, RepoError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS locations (
                id TEXT NOT NULL PRIMARY KEY,
                campaign_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                parent_id TEXT,
                owned_by TEXT,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (campaign_id, name),
                UNIQUE (campaign_id, id),
                FOREIGN KEY (campaign_id, parent_id) REFERENCES locations (campaign_id, id)
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("create_locations_table", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_locations_campaign_parent ON locations (campaign_id, parent_id)",
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("create_locations_index", e))?;

        Ok(Self { pool })
    }
}

fn parse_id<T: FromStr>(raw: &str, column: &str) -> Result<T, RepoError> {
    raw.parse()
        .map_err(|_| RepoError::serialization(format!("invalid {column}: {raw}")))
}

fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("invalid {column} '{raw}': {e}")))
}

fn column<'r>(row: &'r SqliteRow, name: &str) -> Result<&'r str, RepoError> {
    row.try_get(name)
        .map_err(|e| RepoError::database("decode_location", e))
}

fn optional_column<'r>(row: &'r SqliteRow, name: &str) -> Result<Option<&'r str>, RepoError> {
    row.try_get(name)
        .map_err(|e| RepoError::database("decode_location", e))
}

fn row_to_location(row: &SqliteRow) -> Result<Location, RepoError> {
    let id: LocationId = parse_id(column(row, "id")?, "id")?;
    let campaign_id: CampaignId = parse_id(column(row, "campaign_id")?, "campaign_id")?;
    let name = LocationName::new(column(row, "name")?)
        .map_err(|e| RepoError::serialization(e.to_string()))?;
    let description = Description::new(column(row, "description")?)
        .map_err(|e| RepoError::serialization(e.to_string()))?;
    let parent_id: Option<LocationId> = optional_column(row, "parent_id")?
        .map(|raw| parse_id(raw, "parent_id"))
        .transpose()?;
    let owned_by: Option<CharacterId> = optional_column(row, "owned_by")?
        .map(|raw| parse_id(raw, "owned_by"))
        .transpose()?;
    let created_by: UserId = parse_id(column(row, "created_by")?, "created_by")?;
    let created_at = parse_timestamp(column(row, "created_at")?, "created_at")?;
    let updated_at = parse_timestamp(column(row, "updated_at")?, "updated_at")?;

    Ok(Location::new(campaign_id, name, created_by, created_at)
        .with_id(id)
        .with_description(description)
        .with_parent(parent_id)
        .with_owner(owned_by)
        .with_updated_at(updated_at))
}

#[async_trait]
impl LocationRepo for SqliteLocationRepo {
    async fn get(&self, id: LocationId) -> Result<Option<Location>, RepoError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM locations WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_location", e))?;

        row.as_ref().map(row_to_location).transpose()
    }

    async fn create(&self, location: &Location) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO locations (id, campaign_id, name, description, parent_id, owned_by, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(location.id().to_string())
        .bind(location.campaign_id().to_string())
        .bind(location.name().as_str())
        .bind(location.description().as_str())
        .bind(location.parent_id().map(|id| id.to_string()))
        .bind(location.owned_by().map(|id| id.to_string()))
        .bind(location.created_by().to_string())
        .bind(location.created_at().to_rfc3339())
        .bind(location.updated_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_location", e))?;

        Ok(())
    }

    async fn update(&self, location: &Location) -> Result<(), RepoError> {
        // campaign_id is part of the match, never of the SET list.
        let result = sqlx::query(
            r#"
            UPDATE locations
            SET name = ?, description = ?, parent_id = ?, owned_by = ?, updated_at = ?
            WHERE id = ? AND campaign_id = ?
            "#,
        )
        .bind(location.name().as_str())
        .bind(location.description().as_str())
        .bind(location.parent_id().map(|id| id.to_string()))
        .bind(location.owned_by().map(|id| id.to_string()))
        .bind(location.updated_at().to_rfc3339())
        .bind(location.id().to_string())
        .bind(location.campaign_id().to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_location", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Location", location.id()));
        }
        Ok(())
    }

    async fn delete(
        &self,
        id: LocationId,
        now: DateTime<Utc>,
    ) -> Result<Vec<LocationId>, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_location", e))?;

        let row = sqlx::query("SELECT campaign_id, parent_id FROM locations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_location", e))?
            .ok_or_else(|| RepoError::not_found("Location", id))?;
        let campaign_id = column(&row, "campaign_id")?.to_string();
        let parent_id = optional_column(&row, "parent_id")?.map(str::to_string);

        let children = sqlx::query(
            "SELECT id FROM locations WHERE campaign_id = ? AND parent_id = ? ORDER BY name, id",
        )
        .bind(&campaign_id)
        .bind(id.to_string())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("delete_location", e))?;
        let promoted = children
            .iter()
            .map(|row| parse_id(column(row, "id")?, "id"))
            .collect::<Result<Vec<LocationId>, RepoError>>()?;

        sqlx::query(
            "UPDATE locations SET parent_id = ?, updated_at = ? WHERE campaign_id = ? AND parent_id = ?",
        )
        .bind(parent_id)
        .bind(now.to_rfc3339())
        .bind(&campaign_id)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("delete_location", e))?;

        sqlx::query("DELETE FROM locations WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_location", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_location", e))?;

        Ok(promoted)
    }

    async fn list_in_campaign(
        &self,
        campaign_id: CampaignId,
        filter: &LocationFilter,
    ) -> Result<Vec<Location>, RepoError> {
        let mut query = format!("SELECT {COLUMNS} FROM locations WHERE campaign_id = ?");
        match filter.parent {
            ParentScope::Any => {}
            ParentScope::RootsOnly => query.push_str(" AND parent_id IS NULL"),
            ParentScope::ChildrenOf(_) => query.push_str(" AND parent_id = ?"),
        }
        if filter.owned_by.is_some() {
            query.push_str(" AND owned_by = ?");
        }
        query.push_str(" ORDER BY name, id");

        // SQLite's lower() only folds ASCII, so name matching and the paging
        // that depends on it happen after the rows are decoded.
        let page_in_sql = filter.name_contains.is_none();
        if page_in_sql {
            query.push_str(" LIMIT ? OFFSET ?");
        }

        let mut q = sqlx::query(&query).bind(campaign_id.to_string());
        if let ParentScope::ChildrenOf(parent_id) = filter.parent {
            q = q.bind(parent_id.to_string());
        }
        if let Some(owner) = filter.owned_by {
            q = q.bind(owner.to_string());
        }
        if page_in_sql {
            // SQLite treats a negative LIMIT as "no limit".
            let limit = filter.limit.map_or(-1, i64::from);
            let offset = i64::from(filter.offset.unwrap_or(0));
            q = q.bind(limit).bind(offset);
        }

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_locations", e))?;
        let locations = rows
            .iter()
            .map(row_to_location)
            .collect::<Result<Vec<_>, _>>()?;
        if page_in_sql {
            return Ok(locations);
        }

        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(locations
            .into_iter()
            .filter(|l| filter.matches(l))
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn find_by_name(
        &self,
        campaign_id: CampaignId,
        name: &LocationName,
    ) -> Result<Option<Location>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM locations WHERE campaign_id = ? AND name = ?"
        ))
        .bind(campaign_id.to_string())
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_location_by_name", e))?;

        row.as_ref().map(row_to_location).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryLocationRepo;
    use tempfile::tempdir;

    async fn repo(dir: &tempfile::TempDir) -> SqliteLocationRepo {
        let path = dir.path().join("locations.db");
        SqliteLocationRepo::new(path.to_str().unwrap()).await.unwrap()
    }

    fn location(campaign: CampaignId, name: &str, parent: Option<LocationId>) -> Location {
        Location::new(
            campaign,
            LocationName::new(name).unwrap(),
            UserId::new(),
            Utc::now(),
        )
        .with_parent(parent)
    }

    #[tokio::test]
    async fn round_trips_every_column() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;
        let campaign = CampaignId::new();
        let parent = location(campaign, "Kingdom", None);
        let child = location(campaign, "Capital", Some(parent.id()))
            .with_description(Description::new("Seat of the crown").unwrap())
            .with_owner(Some(CharacterId::new()));

        repo.create(&parent).await.unwrap();
        repo.create(&child).await.unwrap();

        let loaded = repo.get(child.id()).await.unwrap().unwrap();
        assert_eq!(loaded.id(), child.id());
        assert_eq!(loaded.parent_id(), Some(parent.id()));
        assert_eq!(loaded.owned_by(), child.owned_by());
        assert_eq!(loaded.description().as_str(), "Seat of the crown");
        assert_eq!(loaded.created_at(), child.created_at());
    }

    #[tokio::test]
    async fn duplicate_name_is_a_constraint_violation() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;
        let campaign = CampaignId::new();
        repo.create(&location(campaign, "Mill", None)).await.unwrap();

        let err = repo
            .create(&location(campaign, "Mill", None))
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation(), "got {err:?}");
    }

    #[tokio::test]
    async fn cross_campaign_parent_is_a_constraint_violation() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;
        let other = location(CampaignId::new(), "Other", None);
        repo.create(&other).await.unwrap();

        let err = repo
            .create(&location(CampaignId::new(), "Stray", Some(other.id())))
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation(), "got {err:?}");
    }

    #[tokio::test]
    async fn delete_promotes_children_in_one_transaction() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;
        let campaign = CampaignId::new();
        let a = location(campaign, "A", None);
        let b = location(campaign, "B", Some(a.id()));
        let c = location(campaign, "C", Some(b.id()));
        for l in [&a, &b, &c] {
            repo.create(l).await.unwrap();
        }

        let promoted = repo.delete(b.id(), Utc::now()).await.unwrap();
        assert_eq!(promoted, vec![c.id()]);
        assert!(repo.get(b.id()).await.unwrap().is_none());
        assert_eq!(
            repo.get(c.id()).await.unwrap().unwrap().parent_id(),
            Some(a.id())
        );

        // Deleting the root makes its children roots.
        let promoted = repo.delete(a.id(), Utc::now()).await.unwrap();
        assert_eq!(promoted, vec![c.id()]);
        assert!(repo.get(c.id()).await.unwrap().unwrap().is_root());
    }

    #[tokio::test]
    async fn delete_of_missing_row_is_not_found() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;
        let err = repo.delete(LocationId::new(), Utc::now()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_cannot_move_rows_between_campaigns() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;
        let original = location(CampaignId::new(), "Fort", None);
        repo.create(&original).await.unwrap();

        let moved = location(CampaignId::new(), "Fort", None).with_id(original.id());
        assert!(repo.update(&moved).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn list_applies_filters_in_sql() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;
        let campaign = CampaignId::new();
        let owner = CharacterId::new();
        let root = location(campaign, "Valley", None);
        repo.create(&root).await.unwrap();
        repo.create(&location(campaign, "North Farm", Some(root.id())).with_owner(Some(owner)))
            .await
            .unwrap();
        repo.create(&location(campaign, "South Farm", Some(root.id())))
            .await
            .unwrap();
        repo.create(&location(campaign, "Old Road", Some(root.id())))
            .await
            .unwrap();

        let farms = repo
            .list_in_campaign(
                campaign,
                &LocationFilter::children_of(root.id()).with_name_contains("FARM"),
            )
            .await
            .unwrap();
        let names: Vec<&str> = farms.iter().map(|l| l.name().as_str()).collect();
        assert_eq!(names, ["North Farm", "South Farm"]);

        let owned = repo
            .list_in_campaign(campaign, &LocationFilter::all().with_owner(owner))
            .await
            .unwrap();
        assert_eq!(owned.len(), 1);

        let page = repo
            .list_in_campaign(campaign, &LocationFilter::all().paged(Some(2), Some(1)))
            .await
            .unwrap();
        let names: Vec<&str> = page.iter().map(|l| l.name().as_str()).collect();
        assert_eq!(names, ["Old Road", "South Farm"]);

        let roots = repo
            .list_in_campaign(campaign, &LocationFilter::roots())
            .await
            .unwrap();
        assert_eq!(roots.len(), 1);

        repo.create(&location(campaign, "ÉCOLE DES ARTS", Some(root.id())))
            .await
            .unwrap();
        let schools = repo
            .list_in_campaign(campaign, &LocationFilter::all().with_name_contains("école"))
            .await
            .unwrap();
        let names: Vec<&str> = schools.iter().map(|l| l.name().as_str()).collect();
        assert_eq!(names, ["ÉCOLE DES ARTS"]);

        // Paging applies to the matching rows, not to the whole campaign.
        let second_farm = repo
            .list_in_campaign(
                campaign,
                &LocationFilter::all()
                    .with_name_contains("farm")
                    .paged(Some(5), Some(1)),
            )
            .await
            .unwrap();
        let names: Vec<&str> = second_farm.iter().map(|l| l.name().as_str()).collect();
        assert_eq!(names, ["South Farm"]);
    }

    #[tokio::test]
    async fn name_filter_matches_the_in_memory_store() {
        let dir = tempdir().unwrap();
        let sqlite = repo(&dir).await;
        let memory = InMemoryLocationRepo::new();
        let campaign = CampaignId::new();
        for name in ["ÉCOLE", "Ölmühle", "Straße", "Harbor"] {
            let row = location(campaign, name, None);
            sqlite.create(&row).await.unwrap();
            memory.create(&row).await.unwrap();
        }

        for needle in ["école", "ÖLMÜHLE", "straße", "ARB", "missing"] {
            let filter = LocationFilter::all().with_name_contains(needle);
            let from_sqlite: Vec<LocationId> = sqlite
                .list_in_campaign(campaign, &filter)
                .await
                .unwrap()
                .iter()
                .map(|l| l.id())
                .collect();
            let from_memory: Vec<LocationId> = memory
                .list_in_campaign(campaign, &filter)
                .await
                .unwrap()
                .iter()
                .map(|l| l.id())
                .collect();
            assert_eq!(from_sqlite, from_memory, "needle {needle:?}");
        }
    }

    #[tokio::test]
    async fn find_by_name_is_exact_and_scoped_to_campaign() {
        let dir = tempdir().unwrap();
        let repo = repo(&dir).await;
        let campaign = CampaignId::new();
        let well = location(campaign, "Wishing Well", None);
        repo.create(&well).await.unwrap();

        let name = LocationName::new("Wishing Well").unwrap();
        assert_eq!(
            repo.find_by_name(campaign, &name).await.unwrap().map(|l| l.id()),
            Some(well.id())
        );
        assert!(repo
            .find_by_name(CampaignId::new(), &name)
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_by_name(campaign, &LocationName::new("Wishing").unwrap())
            .await
            .unwrap()
            .is_none());
    }
}
