use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::Name).string().not_null())
                    .col(ColumnDef::new(Profiles::Description).text())
                    .col(ColumnDef::new(Profiles::Tags).string())
                    .col(ColumnDef::new(Profiles::Occupations).string())
                    .col(ColumnDef::new(Profiles::Category).string())
                    .col(ColumnDef::new(Profiles::Years).string())
                    .col(
                        ColumnDef::new(Profiles::Likes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Profiles::LikedBy).string())
                    .col(
                        ColumnDef::new(Profiles::Views)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Profiles::SearchHits)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Profiles::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Profiles::FeaturedRank).integer())
                    .col(ColumnDef::new(Profiles::FeaturedSince).timestamp())
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profiles_likes")
                    .table(Profiles::Table)
                    .col(Profiles::Likes)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profiles_featured")
                    .table(Profiles::Table)
                    .col(Profiles::IsFeatured)
                    .to_owned(),
            )
            .await?;

        // Full-text index over name/description/category, kept in sync with
        // the base table by triggers (external-content FTS5).
        let conn = manager.get_connection();
        conn.execute_unprepared(
            "CREATE VIRTUAL TABLE IF NOT EXISTS profiles_fts USING fts5(
                name, description, category,
                content='profiles', content_rowid='id'
            )",
        )
        .await?;
        conn.execute_unprepared(
            "CREATE TRIGGER IF NOT EXISTS profiles_fts_ai AFTER INSERT ON profiles BEGIN
                INSERT INTO profiles_fts(rowid, name, description, category)
                VALUES (new.id, new.name, new.description, new.category);
            END",
        )
        .await?;
        conn.execute_unprepared(
            "CREATE TRIGGER IF NOT EXISTS profiles_fts_ad AFTER DELETE ON profiles BEGIN
                INSERT INTO profiles_fts(profiles_fts, rowid, name, description, category)
                VALUES ('delete', old.id, old.name, old.description, old.category);
            END",
        )
        .await?;
        conn.execute_unprepared(
            "CREATE TRIGGER IF NOT EXISTS profiles_fts_au AFTER UPDATE ON profiles BEGIN
                INSERT INTO profiles_fts(profiles_fts, rowid, name, description, category)
                VALUES ('delete', old.id, old.name, old.description, old.category);
                INSERT INTO profiles_fts(rowid, name, description, category)
                VALUES (new.id, new.name, new.description, new.category);
            END",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared("DROP TRIGGER IF EXISTS profiles_fts_au")
            .await?;
        conn.execute_unprepared("DROP TRIGGER IF EXISTS profiles_fts_ad")
            .await?;
        conn.execute_unprepared("DROP TRIGGER IF EXISTS profiles_fts_ai")
            .await?;
        conn.execute_unprepared("DROP TABLE IF EXISTS profiles_fts")
            .await?;

        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    Name,
    Description,
    Tags,
    Occupations,
    Category,
    Years,
    Likes,
    LikedBy,
    Views,
    SearchHits,
    IsFeatured,
    FeaturedRank,
    FeaturedSince,
    CreatedAt,
}
