//! Reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,
    pub vehicle_id: String,

    /// First rental day (inclusive)
    pub start_date: Date,
    /// Last rental day (inclusive)
    pub end_date: Date,

    /// Reservation status: pending, accepted, refused, cancelled
    pub status: String,

    /// Total price in minor currency units, fixed at creation
    pub total_price: i64,

    pub cin: String,
    pub phone: String,

    pub option_gps: bool,
    pub option_extra_driver: bool,
    /// Insurance level: none, basic, premium
    pub option_insurance: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
