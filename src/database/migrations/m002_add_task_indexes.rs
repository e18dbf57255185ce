use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Backs the per-stage task cap lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_source_stage")
                    .table(ProjectTasks::Table)
                    .col(ProjectTasks::ProjectId)
                    .col(ProjectTasks::Origin)
                    .col(ProjectTasks::SourceId)
                    .col(ProjectTasks::Stage)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_heuristics_project")
                    .table(PersonalHeuristics::Table)
                    .col(PersonalHeuristics::ProjectId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_heuristics_project")
                    .table(PersonalHeuristics::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tasks_source_stage")
                    .table(ProjectTasks::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ProjectTasks {
    Table,
    ProjectId,
    Origin,
    SourceId,
    Stage,
}

#[derive(DeriveIden)]
enum PersonalHeuristics {
    Table,
    ProjectId,
}
