use sea_orm_migration::prelude::*;

use super::{
    id_column, id_list_column, nullable_id_column, nullable_timestamp_column, timestamp_column,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Collaborator tables first, then the tables that reference them
        self.create_users_table(manager).await?;
        self.create_assets_table(manager).await?;
        self.create_product_templates_table(manager).await?;
        self.create_work_order_stages_table(manager).await?;
        self.create_schedules_table(manager).await?;
        self.create_activities_table(manager).await?;
        self.create_reminders_table(manager).await?;
        self.create_work_orders_table(manager).await?;
        self.create_work_order_assets_table(manager).await?;
        self.create_work_order_assignments_table(manager).await?;

        self.create_indexes(manager).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkOrderAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkOrderAssets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkOrders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MaintenanceReminders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MaintenanceActivities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MaintenanceSchedules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkOrderStages::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(ProductMaintenanceTemplates::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

impl Migration {
    async fn create_users_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(id_column(manager, Users::Id).primary_key())
                    .col(ColumnDef::new(Users::Email).string())
                    .col(ColumnDef::new(Users::DisplayName).string())
                    .to_owned(),
            )
            .await
    }

    async fn create_assets_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(id_column(manager, Assets::Id).primary_key())
                    .col(ColumnDef::new(Assets::Name).string().not_null())
                    .col(nullable_id_column(manager, Assets::ProductId))
                    .col(ColumnDef::new(Assets::InstallationDate).date())
                    .col(id_list_column(Assets::SopIds))
                    .col(id_list_column(Assets::IncidentPlanIds))
                    .col(id_list_column(Assets::FileIds))
                    .col(id_list_column(Assets::LocationIds))
                    .col(timestamp_column(manager, Assets::CreatedAt))
                    .col(nullable_timestamp_column(manager, Assets::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn create_product_templates_table(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductMaintenanceTemplates::Table)
                    .if_not_exists()
                    .col(id_column(manager, ProductMaintenanceTemplates::Id).primary_key())
                    .col(id_column(manager, ProductMaintenanceTemplates::ProductId))
                    .col(
                        ColumnDef::new(ProductMaintenanceTemplates::Title)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProductMaintenanceTemplates::Description).text())
                    .col(
                        ColumnDef::new(ProductMaintenanceTemplates::ScheduleType)
                            .string()
                            .not_null()
                            .default("monthly"),
                    )
                    .col(
                        ColumnDef::new(ProductMaintenanceTemplates::IntervalUnit)
                            .string()
                            .not_null()
                            .default("month"),
                    )
                    .col(
                        ColumnDef::new(ProductMaintenanceTemplates::IntervalValue)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(ProductMaintenanceTemplates::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(nullable_timestamp_column(
                        manager,
                        ProductMaintenanceTemplates::DeletedAt,
                    ))
                    .to_owned(),
            )
            .await
    }

    async fn create_work_order_stages_table(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkOrderStages::Table)
                    .if_not_exists()
                    .col(id_column(manager, WorkOrderStages::Id).primary_key())
                    .col(ColumnDef::new(WorkOrderStages::Name).string().not_null())
                    .col(
                        ColumnDef::new(WorkOrderStages::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(WorkOrderStages::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_schedules_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceSchedules::Table)
                    .if_not_exists()
                    .col(id_column(manager, MaintenanceSchedules::Id).primary_key())
                    .col(id_column(manager, MaintenanceSchedules::AssetId))
                    .col(ColumnDef::new(MaintenanceSchedules::Title).string().not_null())
                    .col(ColumnDef::new(MaintenanceSchedules::Description).text())
                    .col(
                        ColumnDef::new(MaintenanceSchedules::ScheduleType)
                            .string()
                            .not_null()
                            .default("monthly"),
                    )
                    .col(
                        ColumnDef::new(MaintenanceSchedules::IntervalUnit)
                            .string()
                            .not_null()
                            .default("month"),
                    )
                    .col(
                        ColumnDef::new(MaintenanceSchedules::IntervalValue)
                            .integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(MaintenanceSchedules::IntervalValue).gte(1)),
                    )
                    .col(ColumnDef::new(MaintenanceSchedules::StartDate).date().not_null())
                    .col(
                        ColumnDef::new(MaintenanceSchedules::NextDueDate)
                            .date()
                            .not_null(),
                    )
                    .col(id_list_column(MaintenanceSchedules::AssignedUserIds))
                    .col(
                        ColumnDef::new(MaintenanceSchedules::Timezone)
                            .string()
                            .not_null()
                            .default("UTC"),
                    )
                    .col(timestamp_column(manager, MaintenanceSchedules::CreatedAt))
                    .col(timestamp_column(manager, MaintenanceSchedules::UpdatedAt))
                    .col(nullable_timestamp_column(
                        manager,
                        MaintenanceSchedules::DeletedAt,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_schedules_asset_id")
                            .from(MaintenanceSchedules::Table, MaintenanceSchedules::AssetId)
                            .to(Assets::Table, Assets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_activities_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceActivities::Table)
                    .if_not_exists()
                    .col(id_column(manager, MaintenanceActivities::Id).primary_key())
                    .col(id_column(manager, MaintenanceActivities::ScheduleId))
                    .col(id_column(manager, MaintenanceActivities::AssetId))
                    .col(
                        ColumnDef::new(MaintenanceActivities::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(MaintenanceActivities::ScheduledAt)
                            .date()
                            .not_null(),
                    )
                    .col(nullable_id_column(manager, MaintenanceActivities::CompletedBy))
                    .col(nullable_timestamp_column(
                        manager,
                        MaintenanceActivities::CompletedOn,
                    ))
                    .col(ColumnDef::new(MaintenanceActivities::DurationMinutes).integer())
                    .col(nullable_id_column(manager, MaintenanceActivities::WorkOrderId))
                    .col(timestamp_column(manager, MaintenanceActivities::CreatedAt))
                    .col(timestamp_column(manager, MaintenanceActivities::UpdatedAt))
                    .col(nullable_timestamp_column(
                        manager,
                        MaintenanceActivities::DeletedAt,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_activities_schedule_id")
                            .from(MaintenanceActivities::Table, MaintenanceActivities::ScheduleId)
                            .to(MaintenanceSchedules::Table, MaintenanceSchedules::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_reminders_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceReminders::Table)
                    .if_not_exists()
                    .col(id_column(manager, MaintenanceReminders::Id).primary_key())
                    .col(id_column(manager, MaintenanceReminders::ScheduleId))
                    .col(id_column(manager, MaintenanceReminders::ActivityId))
                    .col(
                        ColumnDef::new(MaintenanceReminders::NotificationType)
                            .string()
                            .not_null()
                            .default("email"),
                    )
                    .col(ColumnDef::new(MaintenanceReminders::RemindOn).date().not_null())
                    .col(
                        ColumnDef::new(MaintenanceReminders::Notified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(nullable_timestamp_column(
                        manager,
                        MaintenanceReminders::NotifiedAt,
                    ))
                    .col(timestamp_column(manager, MaintenanceReminders::CreatedAt))
                    .col(nullable_timestamp_column(
                        manager,
                        MaintenanceReminders::DeletedAt,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_reminders_schedule_id")
                            .from(MaintenanceReminders::Table, MaintenanceReminders::ScheduleId)
                            .to(MaintenanceSchedules::Table, MaintenanceSchedules::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_reminders_activity_id")
                            .from(MaintenanceReminders::Table, MaintenanceReminders::ActivityId)
                            .to(MaintenanceActivities::Table, MaintenanceActivities::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_work_orders_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkOrders::Table)
                    .if_not_exists()
                    .col(id_column(manager, WorkOrders::Id).primary_key())
                    .col(ColumnDef::new(WorkOrders::Title).string().not_null())
                    .col(ColumnDef::new(WorkOrders::Description).text())
                    .col(id_column(manager, WorkOrders::StageId))
                    .col(ColumnDef::new(WorkOrders::Severity).string().not_null())
                    .col(ColumnDef::new(WorkOrders::Category).string().not_null())
                    .col(ColumnDef::new(WorkOrders::Source).string().not_null())
                    .col(nullable_id_column(manager, WorkOrders::MaintenanceScheduleId))
                    .col(ColumnDef::new(WorkOrders::OccurrenceDate).date())
                    .col(ColumnDef::new(WorkOrders::DueDate).date())
                    .col(timestamp_column(manager, WorkOrders::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_orders_stage_id")
                            .from(WorkOrders::Table, WorkOrders::StageId)
                            .to(WorkOrderStages::Table, WorkOrderStages::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_work_order_assets_table(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkOrderAssets::Table)
                    .if_not_exists()
                    .col(id_column(manager, WorkOrderAssets::Id).primary_key())
                    .col(id_column(manager, WorkOrderAssets::WorkOrderId))
                    .col(id_column(manager, WorkOrderAssets::AssetId))
                    .col(id_list_column(WorkOrderAssets::SopIds))
                    .col(id_list_column(WorkOrderAssets::IncidentPlanIds))
                    .col(id_list_column(WorkOrderAssets::FileIds))
                    .col(id_list_column(WorkOrderAssets::LocationIds))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_order_assets_work_order_id")
                            .from(WorkOrderAssets::Table, WorkOrderAssets::WorkOrderId)
                            .to(WorkOrders::Table, WorkOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_work_order_assignments_table(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkOrderAssignments::Table)
                    .if_not_exists()
                    .col(id_column(manager, WorkOrderAssignments::Id).primary_key())
                    .col(id_column(manager, WorkOrderAssignments::WorkOrderId))
                    .col(id_list_column(WorkOrderAssignments::UserIds))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_order_assignments_work_order_id")
                            .from(WorkOrderAssignments::Table, WorkOrderAssignments::WorkOrderId)
                            .to(WorkOrders::Table, WorkOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_indexes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        // Due-schedule scan
        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_schedules_next_due_date")
                    .table(MaintenanceSchedules::Table)
                    .col(MaintenanceSchedules::NextDueDate)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_schedules_asset_id")
                    .table(MaintenanceSchedules::Table)
                    .col(MaintenanceSchedules::AssetId)
                    .to_owned(),
            )
            .await?;

        // Overdue sweep
        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_activities_status_scheduled_at")
                    .table(MaintenanceActivities::Table)
                    .col(MaintenanceActivities::Status)
                    .col(MaintenanceActivities::ScheduledAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_activities_schedule_id")
                    .table(MaintenanceActivities::Table)
                    .col(MaintenanceActivities::ScheduleId)
                    .to_owned(),
            )
            .await?;

        // Reminder dispatch
        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_reminders_notified_remind_on")
                    .table(MaintenanceReminders::Table)
                    .col(MaintenanceReminders::Notified)
                    .col(MaintenanceReminders::RemindOn)
                    .to_owned(),
            )
            .await?;

        // One work order per schedule occurrence
        manager
            .create_index(
                Index::create()
                    .name("uq_work_orders_schedule_occurrence")
                    .table(WorkOrders::Table)
                    .col(WorkOrders::MaintenanceScheduleId)
                    .col(WorkOrders::OccurrenceDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    DisplayName,
}

#[derive(DeriveIden)]
enum Assets {
    Table,
    Id,
    Name,
    ProductId,
    InstallationDate,
    SopIds,
    IncidentPlanIds,
    FileIds,
    LocationIds,
    CreatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum ProductMaintenanceTemplates {
    Table,
    Id,
    ProductId,
    Title,
    Description,
    ScheduleType,
    IntervalUnit,
    IntervalValue,
    Position,
    DeletedAt,
}

#[derive(DeriveIden)]
enum WorkOrderStages {
    Table,
    Id,
    Name,
    IsDefault,
    Position,
}

#[derive(DeriveIden)]
enum MaintenanceSchedules {
    Table,
    Id,
    AssetId,
    Title,
    Description,
    ScheduleType,
    IntervalUnit,
    IntervalValue,
    StartDate,
    NextDueDate,
    AssignedUserIds,
    Timezone,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum MaintenanceActivities {
    Table,
    Id,
    ScheduleId,
    AssetId,
    Status,
    ScheduledAt,
    CompletedBy,
    CompletedOn,
    DurationMinutes,
    WorkOrderId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum MaintenanceReminders {
    Table,
    Id,
    ScheduleId,
    ActivityId,
    NotificationType,
    RemindOn,
    Notified,
    NotifiedAt,
    CreatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum WorkOrders {
    Table,
    Id,
    Title,
    Description,
    StageId,
    Severity,
    Category,
    Source,
    MaintenanceScheduleId,
    OccurrenceDate,
    DueDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum WorkOrderAssets {
    Table,
    Id,
    WorkOrderId,
    AssetId,
    SopIds,
    IncidentPlanIds,
    FileIds,
    LocationIds,
}

#[derive(DeriveIden)]
enum WorkOrderAssignments {
    Table,
    Id,
    WorkOrderId,
    UserIds,
}
