use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "owner")]
    Owner,
    #[sea_orm(string_value = "driver")]
    Driver,
    #[sea_orm(string_value = "staff")]
    Staff,
    #[sea_orm(string_value = "passenger")]
    Passenger,
    #[sea_orm(string_value = "mechanic")]
    Mechanic,
    #[sea_orm(string_value = "shop")]
    Shop,
    #[sea_orm(string_value = "service_provider")]
    ServiceProvider,
    #[sea_orm(string_value = "taxi_rank_admin")]
    TaxiRankAdmin,
    #[sea_orm(string_value = "taxi_marshal")]
    TaxiMarshal,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    /// Roles allowed to manage records of their own tenant
    pub fn is_tenant_manager(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Staff | UserRole::TaxiRankAdmin)
    }

    /// Roles that may be chosen at self-registration
    pub fn is_self_service(self) -> bool {
        matches!(
            self,
            UserRole::Owner
                | UserRole::Driver
                | UserRole::Passenger
                | UserRole::Mechanic
                | UserRole::Shop
                | UserRole::ServiceProvider
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub tenant_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_delete = "Cascade"
    )]
    Tenant,
    #[sea_orm(has_one = "super::owner_profile::Entity")]
    OwnerProfile,
    #[sea_orm(has_one = "super::driver_profile::Entity")]
    DriverProfile,
    #[sea_orm(has_one = "super::staff_profile::Entity")]
    StaffProfile,
    #[sea_orm(has_one = "super::marshal_profile::Entity")]
    MarshalProfile,
    #[sea_orm(has_one = "super::service_provider_profile::Entity")]
    ServiceProviderProfile,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::owner_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OwnerProfile.def()
    }
}

impl Related<super::driver_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DriverProfile.def()
    }
}

impl Related<super::staff_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StaffProfile.def()
    }
}

impl Related<super::marshal_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MarshalProfile.def()
    }
}

impl Related<super::service_provider_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceProviderProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_cannot_self_register() {
        assert!(!UserRole::Admin.is_self_service());
        assert!(!UserRole::TaxiMarshal.is_self_service());
        assert!(UserRole::Passenger.is_self_service());
    }

    #[test]
    fn test_role_serializes_snake_case() {
        let json = serde_json::to_string(&UserRole::TaxiRankAdmin).unwrap();
        assert_eq!(json, "\"taxi_rank_admin\"");
    }
}
