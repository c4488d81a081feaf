//! Statistics payload served by `GET /statistics`.
//!
//! Every section is optional: older backends omit the priority breakdown and
//! an empty database yields empty arrays.

use serde::{Deserialize, Serialize};

use super::common::{lenient_f64, lenient_u64, UserId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default, alias = "stats_par_statut")]
    pub stats_by_status: Option<StatusCounts>,
    #[serde(default, alias = "temps_moyen_par_technicien")]
    pub mean_resolution_by_technician: Option<Vec<TechnicianResolution>>,
    #[serde(default, alias = "tickets_par_priorite")]
    pub tickets_by_priority: Option<Vec<PriorityCount>>,
}

/// Ticket counts per status. Missing counters read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(default, alias = "total_ouverts", deserialize_with = "lenient_u64")]
    pub open: u64,
    #[serde(default, alias = "total_en_cours", deserialize_with = "lenient_u64")]
    pub in_progress: u64,
    #[serde(default, alias = "total_resolus", deserialize_with = "lenient_u64")]
    pub resolved: u64,
    #[serde(default, alias = "total_fermes", deserialize_with = "lenient_u64")]
    pub closed: u64,
}

/// Mean resolution time of one technician
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicianResolution {
    #[serde(default, alias = "id_technicien", alias = "id")]
    pub technician_id: Option<UserId>,
    #[serde(default, alias = "nom", alias = "name")]
    pub technician_name: Option<String>,
    #[serde(
        default,
        alias = "temps_moyen_heures",
        alias = "avg_resolution_time",
        deserialize_with = "lenient_f64"
    )]
    pub mean_hours: f64,
}

/// Number of tickets at one priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityCount {
    #[serde(alias = "priorité", alias = "priorite")]
    pub priority: String,
    #[serde(default, alias = "nombre", alias = "count", deserialize_with = "lenient_u64")]
    pub total: u64,
}
