pub use super::assets::Entity as Assets;
pub use super::maintenance_activities::Entity as MaintenanceActivities;
pub use super::maintenance_reminders::Entity as MaintenanceReminders;
pub use super::maintenance_schedules::Entity as MaintenanceSchedules;
pub use super::product_maintenance_templates::Entity as ProductMaintenanceTemplates;
pub use super::tenants::Entity as Tenants;
pub use super::users::Entity as Users;
pub use super::work_order_assets::Entity as WorkOrderAssets;
pub use super::work_order_assignments::Entity as WorkOrderAssignments;
pub use super::work_order_stages::Entity as WorkOrderStages;
pub use super::work_orders::Entity as WorkOrders;
