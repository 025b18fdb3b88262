use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLogs::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityLogs::WorkspaceId).string().not_null())
                    .col(ColumnDef::new(ActivityLogs::BoardId).string())
                    .col(ColumnDef::new(ActivityLogs::TaskId).string())
                    .col(ColumnDef::new(ActivityLogs::UserId).string())
                    .col(ColumnDef::new(ActivityLogs::Event).string().not_null())
                    .col(ColumnDef::new(ActivityLogs::Detail).text())
                    .col(
                        ColumnDef::new(ActivityLogs::Read)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ActivityLogs::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_logs_workspace_id")
                            .from(ActivityLogs::Table, ActivityLogs::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Feed reads are newest-first per workspace.
        manager
            .create_index(
                Index::create()
                    .name("idx_activity_logs_workspace_created")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::WorkspaceId)
                    .col(ActivityLogs::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
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
enum ActivityLogs {
    Table,
    Id,
    WorkspaceId,
    BoardId,
    TaskId,
    UserId,
    Event,
    Detail,
    Read,
    CreatedAt,
}
