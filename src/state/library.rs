use super::data::{ArtworkRecord, ImageVariant, MergeAction, MergeStats};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The Library manages the SQLite artwork catalog.
/// It stores one row per artwork, keyed by title, with a content hash
/// so unchanged artworks are skipped on re-import.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the catalog at `db_path` and initialize the schema.
    /// The parent directory is created if needed.
    pub fn open(db_path: &Path) -> crate::Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| crate::ArtworkError::io(parent, e))?;
        }

        let conn = Connection::open(db_path)?;
        info!("📁 Database opened at: {}", db_path.display());

        let library = Library {
            conn,
            db_path: db_path.to_path_buf(),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// In-memory catalog, mostly for tests and dry runs
    pub fn open_in_memory() -> SqlResult<Self> {
        let library = Library {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Create the artworks table and indexes if they don't exist
    fn init_schema(&self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS artworks (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                title               TEXT NOT NULL UNIQUE,
                art_description     TEXT NOT NULL DEFAULT '',
                dimensions          TEXT NOT NULL DEFAULT '',
                small_image_url     TEXT NOT NULL DEFAULT '',
                small_image_width   INTEGER,
                small_image_height  INTEGER,
                medium_image_url    TEXT NOT NULL DEFAULT '',
                medium_image_width  INTEGER,
                medium_image_height INTEGER,
                large_image_url     TEXT NOT NULL DEFAULT '',
                large_image_width   INTEGER,
                large_image_height  INTEGER,
                link_to_print       TEXT NOT NULL DEFAULT '',
                date_produced       TEXT,
                original_price      REAL NOT NULL DEFAULT 0,
                for_sale            INTEGER NOT NULL DEFAULT 0,
                location            TEXT NOT NULL DEFAULT '',
                medium              TEXT NOT NULL DEFAULT '',
                categories          TEXT NOT NULL DEFAULT '',
                is_featured         INTEGER NOT NULL DEFAULT 0,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL,
                content_hash        TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_artworks_featured
             ON artworks(is_featured)",
            [],
        )?;

        debug!("Database schema initialized");
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Get a count of artworks in the catalog
    pub fn artwork_count(&self) -> SqlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM artworks", [], |row| row.get(0))
    }

    /// Id and stored content hash of the artwork with this title
    pub fn find_by_title(&self, title: &str) -> SqlResult<Option<(i64, String)>> {
        self.conn
            .query_row(
                "SELECT id, content_hash FROM artworks WHERE title = ?1",
                [title],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
    }

    /// Load a stored artwork back into a record
    pub fn get_artwork(&self, title: &str) -> SqlResult<Option<ArtworkRecord>> {
        self.conn
            .query_row(
                "SELECT title, art_description, dimensions,
                        small_image_url, small_image_width, small_image_height,
                        medium_image_url, medium_image_width, medium_image_height,
                        large_image_url, large_image_width, large_image_height,
                        link_to_print, date_produced, original_price, for_sale,
                        location, medium, categories, is_featured
                 FROM artworks WHERE title = ?1",
                [title],
                |row| {
                    Ok(ArtworkRecord {
                        title: row.get(0)?,
                        art_description: row.get(1)?,
                        dimensions: row.get(2)?,
                        small_image: ImageVariant {
                            url: row.get(3)?,
                            width: row.get(4)?,
                            height: row.get(5)?,
                        },
                        medium_image: ImageVariant {
                            url: row.get(6)?,
                            width: row.get(7)?,
                            height: row.get(8)?,
                        },
                        large_image: ImageVariant {
                            url: row.get(9)?,
                            width: row.get(10)?,
                            height: row.get(11)?,
                        },
                        link_to_print: row.get(12)?,
                        date_produced: row.get(13)?,
                        original_price: row.get(14)?,
                        for_sale: row.get(15)?,
                        location: row.get(16)?,
                        medium: row.get(17)?,
                        categories: row.get(18)?,
                        is_featured: row.get(19)?,
                    })
                },
            )
            .optional()
    }

    /// Insert or update one artwork, matched by title.
    /// Skipped when the stored content hash is unchanged.
    pub fn merge_artwork(&self, record: &ArtworkRecord) -> SqlResult<MergeAction> {
        merge_into(&self.conn, record)
    }

    /// Merge every record in a single transaction.
    /// The first database error rolls back the whole run.
    /// With `dry_run` nothing is written and every record counts as inserted.
    pub fn merge_all(&mut self, records: &[ArtworkRecord], dry_run: bool) -> SqlResult<MergeStats> {
        let mut stats = MergeStats::default();

        if dry_run {
            for record in records {
                info!("  [DRY RUN] Would merge: {}", record.title);
                stats.record(MergeAction::Inserted);
            }
            return Ok(stats);
        }

        let tx = self.conn.transaction()?;
        for record in records {
            let action = merge_into(&tx, record)?;
            stats.record(action);
        }
        tx.commit()?;

        info!("✅ All changes committed successfully");
        Ok(stats)
    }
}

/// Upsert on any connection (plain or inside a transaction)
fn merge_into(conn: &Connection, record: &ArtworkRecord) -> SqlResult<MergeAction> {
    let content_hash = record.content_hash();

    let existing: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, content_hash FROM artworks WHERE title = ?1",
            [&record.title],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    if let Some((_, existing_hash)) = &existing {
        if *existing_hash == content_hash {
            debug!("  Skipping '{}' - no changes detected", record.title);
            return Ok(MergeAction::Skipped);
        }
    }

    let now = Utc::now().to_rfc3339();
    let id: i64 = conn.query_row(
        "INSERT INTO artworks (
            title, art_description, dimensions,
            small_image_url, small_image_width, small_image_height,
            medium_image_url, medium_image_width, medium_image_height,
            large_image_url, large_image_width, large_image_height,
            link_to_print, date_produced, original_price, for_sale, location,
            medium, categories, is_featured, created_at, updated_at, content_hash
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?21, ?22
        )
        ON CONFLICT(title) DO UPDATE SET
            art_description = excluded.art_description,
            dimensions = excluded.dimensions,
            small_image_url = excluded.small_image_url,
            small_image_width = excluded.small_image_width,
            small_image_height = excluded.small_image_height,
            medium_image_url = excluded.medium_image_url,
            medium_image_width = excluded.medium_image_width,
            medium_image_height = excluded.medium_image_height,
            large_image_url = excluded.large_image_url,
            large_image_width = excluded.large_image_width,
            large_image_height = excluded.large_image_height,
            link_to_print = excluded.link_to_print,
            date_produced = excluded.date_produced,
            original_price = excluded.original_price,
            for_sale = excluded.for_sale,
            location = excluded.location,
            medium = excluded.medium,
            categories = excluded.categories,
            is_featured = excluded.is_featured,
            updated_at = excluded.updated_at,
            content_hash = excluded.content_hash
        RETURNING id",
        params![
            record.title,
            record.art_description,
            record.dimensions,
            record.small_image.url,
            record.small_image.width,
            record.small_image.height,
            record.medium_image.url,
            record.medium_image.width,
            record.medium_image.height,
            record.large_image.url,
            record.large_image.width,
            record.large_image.height,
            record.link_to_print,
            record.date_produced,
            record.original_price,
            record.for_sale,
            record.location,
            record.medium,
            record.categories,
            record.is_featured,
            now,
            content_hash,
        ],
        |row| row.get(0),
    )?;

    let action = if existing.is_some() {
        MergeAction::Updated
    } else {
        MergeAction::Inserted
    };
    info!("  {:?}: {} (ID: {})", action, record.title, id);
    Ok(action)
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
