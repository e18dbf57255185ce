use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organisations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Organisations::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Organisations::Name).string().not_null())
                    .col(ColumnDef::new(Organisations::Description).text())
                    .col(
                        ColumnDef::new(Organisations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Organisations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Projects::OrganisationId).uuid())
                    .col(ColumnDef::new(Projects::UserId).string())
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_organisation_id")
                            .from(Projects::Table, Projects::OrganisationId)
                            .to(Organisations::Table, Organisations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Plans::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Plans::ProjectId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Plans::Blocks).json_binary().not_null())
                    .col(
                        ColumnDef::new(Plans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Plans::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plans_project_id")
                            .from(Plans::Table, Plans::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SuccessFactors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SuccessFactors::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SuccessFactors::Title).string().not_null())
                    .col(ColumnDef::new(SuccessFactors::Description).text().not_null())
                    .col(
                        ColumnDef::new(SuccessFactors::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SuccessFactorRatings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SuccessFactorRatings::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SuccessFactorRatings::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(SuccessFactorRatings::FactorId).string().not_null())
                    .col(ColumnDef::new(SuccessFactorRatings::Resonance).integer().not_null())
                    .col(ColumnDef::new(SuccessFactorRatings::Notes).text())
                    .col(
                        ColumnDef::new(SuccessFactorRatings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SuccessFactorRatings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ratings_project_id")
                            .from(SuccessFactorRatings::Table, SuccessFactorRatings::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ratings_factor_id")
                            .from(SuccessFactorRatings::Table, SuccessFactorRatings::FactorId)
                            .to(SuccessFactors::Table, SuccessFactors::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("idx_ratings_project_factor")
                            .table(SuccessFactorRatings::Table)
                            .col(SuccessFactorRatings::ProjectId)
                            .col(SuccessFactorRatings::FactorId)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PersonalHeuristics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PersonalHeuristics::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PersonalHeuristics::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(PersonalHeuristics::FactorId).string())
                    .col(ColumnDef::new(PersonalHeuristics::Name).string().not_null())
                    .col(ColumnDef::new(PersonalHeuristics::Description).text())
                    .col(
                        ColumnDef::new(PersonalHeuristics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PersonalHeuristics::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_heuristics_project_id")
                            .from(PersonalHeuristics::Table, PersonalHeuristics::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_heuristics_factor_id")
                            .from(PersonalHeuristics::Table, PersonalHeuristics::FactorId)
                            .to(SuccessFactors::Table, SuccessFactors::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectTasks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProjectTasks::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ProjectTasks::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(ProjectTasks::Text).text().not_null())
                    .col(ColumnDef::new(ProjectTasks::Stage).string().not_null())
                    .col(ColumnDef::new(ProjectTasks::Origin).string().not_null())
                    .col(ColumnDef::new(ProjectTasks::SourceId).string())
                    .col(
                        ColumnDef::new(ProjectTasks::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ProjectTasks::Notes).text())
                    .col(ColumnDef::new(ProjectTasks::Priority).string())
                    .col(ColumnDef::new(ProjectTasks::Owner).string())
                    .col(
                        ColumnDef::new(ProjectTasks::Status)
                            .string()
                            .not_null()
                            .default("todo"),
                    )
                    .col(
                        ColumnDef::new(ProjectTasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectTasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_project_id")
                            .from(ProjectTasks::Table, ProjectTasks::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Policies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Policies::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Policies::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Policies::OrganisationId).uuid())
                    .col(ColumnDef::new(Policies::Name).string().not_null())
                    .col(ColumnDef::new(Policies::Description).text())
                    .col(
                        ColumnDef::new(Policies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Policies::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_policies_project_id")
                            .from(Policies::Table, Policies::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FrameworkSelections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FrameworkSelections::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FrameworkSelections::ProjectId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(FrameworkSelections::FrameworkCodes)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FrameworkSelections::ProjectSize).string())
                    .col(ColumnDef::new(FrameworkSelections::PathClarity).string())
                    .col(
                        ColumnDef::new(FrameworkSelections::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FrameworkSelections::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_framework_selections_project_id")
                            .from(FrameworkSelections::Table, FrameworkSelections::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FrameworkSelections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Policies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectTasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PersonalHeuristics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SuccessFactorRatings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SuccessFactors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Plans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organisations::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Organisations {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    OrganisationId,
    UserId,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Plans {
    Table,
    Id,
    ProjectId,
    Blocks,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SuccessFactors {
    Table,
    Id,
    Title,
    Description,
    Position,
}

#[derive(DeriveIden)]
enum SuccessFactorRatings {
    Table,
    Id,
    ProjectId,
    FactorId,
    Resonance,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PersonalHeuristics {
    Table,
    Id,
    ProjectId,
    FactorId,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProjectTasks {
    Table,
    Id,
    ProjectId,
    Text,
    Stage,
    Origin,
    SourceId,
    Completed,
    Notes,
    Priority,
    Owner,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Policies {
    Table,
    Id,
    ProjectId,
    OrganisationId,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FrameworkSelections {
    Table,
    Id,
    ProjectId,
    FrameworkCodes,
    ProjectSize,
    PathClarity,
    CreatedAt,
    UpdatedAt,
}
