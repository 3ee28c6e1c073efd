//! Domain entities (business view) and the payloads callers hand in.

use geo::MultiPolygon;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference category of a service; no ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceType {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// The user who created the provider; never changes.
    pub manager_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: Uuid,
    pub name: String,
    pub mpoly: MultiPolygon<f64>,
    pub provider_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub zone_id: Uuid,
    pub service_type_id: Uuid,
    pub cost: Decimal,
}

/// Provider creation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Ignored: the acting user always becomes the manager.
    #[serde(default)]
    pub manager: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Ignored: the manager cannot be reassigned.
    #[serde(default)]
    pub manager: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneInput {
    pub name: String,
    pub mpoly: MultiPolygon<f64>,
    pub provider: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZonePatch {
    pub name: Option<String>,
    pub mpoly: Option<MultiPolygon<f64>>,
    pub provider: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInput {
    pub name: String,
    pub zone: Option<Uuid>,
    pub service_type: Option<Uuid>,
    pub cost: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub zone: Option<Uuid>,
    pub service_type: Option<Uuid>,
    pub cost: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneFilter {
    pub provider: Option<Uuid>,
    /// Only zones hosting at least one service of this type.
    pub service_type: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFilter {
    pub provider: Option<Uuid>,
    pub service_type: Option<Uuid>,
    pub zone: Option<Uuid>,
}

impl Provider {
    pub(crate) fn apply(&mut self, patch: ProviderPatch) {
        if let Some(v) = patch.name { self.name = v; }
        if let Some(v) = patch.email { self.email = v; }
        if let Some(v) = patch.phone { self.phone = v; }
        if let Some(v) = patch.address { self.address = v; }
    }
}

impl Zone {
    pub(crate) fn apply(&mut self, patch: ZonePatch) {
        if let Some(v) = patch.name { self.name = v; }
        if let Some(v) = patch.mpoly { self.mpoly = v; }
        if let Some(v) = patch.provider { self.provider_id = v; }
    }
}

impl Service {
    pub(crate) fn apply(&mut self, patch: ServicePatch) {
        if let Some(v) = patch.name { self.name = v; }
        if let Some(v) = patch.zone { self.zone_id = v; }
        if let Some(v) = patch.service_type { self.service_type_id = v; }
        if let Some(v) = patch.cost { self.cost = v; }
    }
}
