use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccessRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccessRequests::WorkspaceId).string().not_null())
                    .col(ColumnDef::new(AccessRequests::UserId).string().not_null())
                    .col(ColumnDef::new(AccessRequests::Status).string_len(16).not_null())
                    .col(ColumnDef::new(AccessRequests::Message).text())
                    .col(ColumnDef::new(AccessRequests::ReviewedBy).string())
                    .col(ColumnDef::new(AccessRequests::ReviewedAt).big_integer())
                    .col(ColumnDef::new(AccessRequests::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_access_requests_workspace_id")
                            .from(AccessRequests::Table, AccessRequests::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_access_requests_workspace_id")
                    .table(AccessRequests::Table)
                    .col(AccessRequests::WorkspaceId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Partial unique index closing the check-then-insert race: two
        // concurrent submissions cannot both land a PENDING row.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_access_requests_pending \
                 ON access_requests (workspace_id, user_id) WHERE status = 'PENDING'",
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Workspaces {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum AccessRequests {
    Table,
    Id,
    WorkspaceId,
    UserId,
    Status,
    Message,
    ReviewedBy,
    ReviewedAt,
    CreatedAt,
}
