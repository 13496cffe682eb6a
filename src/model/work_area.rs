use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Fixed set of work fronts a person can be assigned to on entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
    EnumIter, AsRefStr,
)]
pub enum WorkArea {
    #[serde(rename = "Mina Norte")]
    #[strum(serialize = "Mina Norte")]
    MinaNorte,
    #[serde(rename = "Mina Sur")]
    #[strum(serialize = "Mina Sur")]
    MinaSur,
    #[strum(serialize = "Procesamiento")]
    Procesamiento,
    #[serde(rename = "Administración")]
    #[strum(serialize = "Administración")]
    Administracion,
    #[strum(serialize = "Mantenimiento")]
    Mantenimiento,
}
