use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Boards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Boards::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Boards::WorkspaceId).string().not_null())
                    .col(ColumnDef::new(Boards::Name).string().not_null())
                    .col(ColumnDef::new(Boards::Slug).string().not_null())
                    .col(ColumnDef::new(Boards::Description).text())
                    .col(ColumnDef::new(Boards::Color).string())
                    .col(ColumnDef::new(Boards::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Boards::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_boards_workspace_id")
                            .from(Boards::Table, Boards::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Board slugs are only unique within their workspace.
        manager
            .create_index(
                Index::create()
                    .name("idx_boards_workspace_slug")
                    .table(Boards::Table)
                    .col(Boards::WorkspaceId)
                    .col(Boards::Slug)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BoardCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BoardCategories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BoardCategories::BoardId).string().not_null())
                    .col(ColumnDef::new(BoardCategories::Name).string().not_null())
                    .col(ColumnDef::new(BoardCategories::Color).string().not_null())
                    .col(ColumnDef::new(BoardCategories::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_categories_board_id")
                            .from(BoardCategories::Table, BoardCategories::BoardId)
                            .to(Boards::Table, Boards::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_board_categories_board_id")
                    .table(BoardCategories::Table)
                    .col(BoardCategories::BoardId)
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
enum Boards {
    Table,
    Id,
    WorkspaceId,
    Name,
    Slug,
    Description,
    Color,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BoardCategories {
    Table,
    Id,
    BoardId,
    Name,
    Color,
    CreatedAt,
}
