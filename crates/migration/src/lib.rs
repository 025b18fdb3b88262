pub use sea_orm_migration::prelude::*;

mod m20260806_000001_users;
mod m20260806_000002_workspaces;
mod m20260806_000003_boards;
mod m20260806_000004_tasks;
mod m20260806_000005_access_requests;
mod m20260806_000006_activity_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260806_000001_users::Migration),
            Box::new(m20260806_000002_workspaces::Migration),
            Box::new(m20260806_000003_boards::Migration),
            Box::new(m20260806_000004_tasks::Migration),
            Box::new(m20260806_000005_access_requests::Migration),
            Box::new(m20260806_000006_activity_logs::Migration),
        ]
    }
}
