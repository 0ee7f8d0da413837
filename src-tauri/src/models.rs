//! Inventory Models
//!
//! Vehicle-domain types exchanged with the AutoGest API. Field names on the
//! wire are the service's Portuguese names; the Rust side uses English.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dashboard counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(rename = "total_veiculos")]
    pub total: u64,
    #[serde(rename = "em_estoque")]
    pub in_stock: u64,
    #[serde(rename = "vendidos")]
    pub sold: u64,
}

/// Inventory status of a vehicle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VehicleStatus {
    #[default]
    #[serde(rename = "EM_ESTOQUE")]
    InStock,
    #[serde(rename = "VENDIDO")]
    Sold,
    #[serde(other)]
    Unknown,
}

/// A vehicle record owned by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    #[serde(rename = "marca")]
    pub brand: String,
    #[serde(rename = "modelo")]
    pub model: String,
    #[serde(rename = "placa")]
    pub plate: String,
    #[serde(rename = "ano", default)]
    pub year: Option<i32>,
    #[serde(rename = "valor", serialize_with = "rust_decimal::serde::float::serialize")]
    pub value: Decimal,
    #[serde(default)]
    pub status: VehicleStatus,
    #[serde(rename = "renave_numero", default)]
    pub renave_number: Option<String>,
    #[serde(rename = "data_saida", default)]
    pub sold_at: Option<chrono::NaiveDateTime>,
}

impl Vehicle {
    pub fn is_in_stock(&self) -> bool {
        self.status == VehicleStatus::InStock
    }
}

/// Fields for a vehicle about to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    #[serde(rename = "marca")]
    pub brand: String,
    #[serde(rename = "modelo")]
    pub model: String,
    #[serde(rename = "placa")]
    pub plate: String,
    #[serde(rename = "valor", serialize_with = "rust_decimal::serde::float::serialize")]
    pub value: Decimal,
    #[serde(rename = "ano", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "renave_numero", default, skip_serializing_if = "Option::is_none")]
    pub renave_number: Option<String>,
}

impl NewVehicle {
    /// Validate and normalize for transmission
    ///
    /// Text fields are trimmed and the plate is upper-cased.
    pub fn prepare(self) -> Result<Self, String> {
        let brand = required("brand", &self.brand)?;
        let model = required("model", &self.model)?;
        let plate = normalize_plate(&self.plate).ok_or_else(|| "plate is required".to_string())?;

        if self.value.is_sign_negative() && !self.value.is_zero() {
            return Err("value must not be negative".into());
        }

        let renave_number = self
            .renave_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Self {
            brand,
            model,
            plate,
            value: self.value,
            year: self.year,
            renave_number,
        })
    }
}

/// Buyer and price for a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDetails {
    #[serde(rename = "nome")]
    pub buyer_name: String,
    #[serde(rename = "documento")]
    pub buyer_document: String,
    #[serde(rename = "endereco")]
    pub buyer_address: String,
    #[serde(rename = "valor_venda", serialize_with = "rust_decimal::serde::float::serialize")]
    pub final_value: Decimal,
}

impl SaleDetails {
    pub fn prepare(self) -> Result<Self, String> {
        let buyer_name = required("buyer name", &self.buyer_name)?;
        let buyer_document = required("buyer document", &self.buyer_document)?;

        if self.final_value.is_sign_negative() && !self.final_value.is_zero() {
            return Err("final value must not be negative".into());
        }

        Ok(Self {
            buyer_name,
            buyer_document,
            buyer_address: self.buyer_address.trim().to_string(),
            final_value: self.final_value,
        })
    }
}

/// Registry data resolved from a plate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleLookup {
    #[serde(rename = "placa")]
    pub plate: String,
    #[serde(rename = "marca")]
    pub brand: String,
    #[serde(rename = "modelo")]
    pub model: String,
    #[serde(rename = "ano", default)]
    pub year: Option<i32>,
}

/// RENAVE document generated by the service for a vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenaveDocument {
    #[serde(rename = "arquivo")]
    pub file: String,
}

/// Trim and upper-case a plate; `None` when nothing is left
pub fn normalize_plate(plate: &str) -> Option<String> {
    let plate = plate.trim();
    if plate.is_empty() {
        None
    } else {
        Some(plate.to_uppercase())
    }
}

fn required(field: &str, value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uno() -> NewVehicle {
        NewVehicle {
            brand: " Fiat ".into(),
            model: "Uno".into(),
            plate: "abc1234".into(),
            value: Decimal::from(15000),
            year: None,
            renave_number: Some("   ".into()),
        }
    }

    #[test]
    fn prepare_normalizes_plate_and_trims() {
        let prepared = uno().prepare().unwrap();
        assert_eq!(prepared.brand, "Fiat");
        assert_eq!(prepared.plate, "ABC1234");
        assert_eq!(prepared.renave_number, None);
    }

    #[test]
    fn prepare_rejects_blank_fields_and_negative_value() {
        let mut blank_plate = uno();
        blank_plate.plate = "  ".into();
        assert!(blank_plate.prepare().is_err());

        let mut blank_model = uno();
        blank_model.model = String::new();
        assert!(blank_model.prepare().is_err());

        let mut negative = uno();
        negative.value = Decimal::new(-1, 2);
        assert_eq!(negative.prepare().unwrap_err(), "value must not be negative");

        let mut free = uno();
        free.value = Decimal::ZERO;
        assert!(free.prepare().is_ok());
    }

    #[test]
    fn new_vehicle_uses_wire_names() {
        let body = serde_json::to_value(uno().prepare().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"marca": "Fiat", "modelo": "Uno", "placa": "ABC1234", "valor": 15000.0})
        );
    }

    #[test]
    fn vehicle_parses_service_payload() {
        let vehicle: Vehicle = serde_json::from_value(json!({
            "id": 7,
            "marca": "Fiat",
            "modelo": "Uno",
            "placa": "ABC1234",
            "valor": 15000.5,
            "status": "VENDIDO",
            "renave_numero": null,
            "data_saida": "2024-03-01T10:15:00"
        }))
        .unwrap();

        assert_eq!(vehicle.id, 7);
        assert_eq!(vehicle.value, Decimal::new(150005, 1));
        assert_eq!(vehicle.status, VehicleStatus::Sold);
        assert!(!vehicle.is_in_stock());
        assert!(vehicle.sold_at.is_some());
    }

    #[test]
    fn missing_status_defaults_to_in_stock_and_unknown_is_kept_apart() {
        let listed: Vehicle = serde_json::from_value(json!({
            "id": 1, "marca": "VW", "modelo": "Gol", "placa": "AAA0001", "valor": 1, "ano": 2010
        }))
        .unwrap();
        assert!(listed.is_in_stock());
        assert_eq!(listed.year, Some(2010));

        let reserved: Vehicle = serde_json::from_value(json!({
            "id": 2, "marca": "VW", "modelo": "Gol", "placa": "AAA0002", "valor": 1, "status": "RESERVADO"
        }))
        .unwrap();
        assert_eq!(reserved.status, VehicleStatus::Unknown);
    }

    #[test]
    fn sale_details_wire_names_and_validation() {
        let sale = SaleDetails {
            buyer_name: "Maria".into(),
            buyer_document: "123.456.789-00".into(),
            buyer_address: " Rua A, 1 ".into(),
            final_value: Decimal::from(14000),
        }
        .prepare()
        .unwrap();

        let body = serde_json::to_value(&sale).unwrap();
        assert_eq!(body["nome"], "Maria");
        assert_eq!(body["endereco"], "Rua A, 1");
        assert_eq!(body["valor_venda"], 14000.0);

        let nameless = SaleDetails { buyer_name: " ".into(), ..sale };
        assert!(nameless.prepare().is_err());
    }

    #[test]
    fn dashboard_summary_maps_counters() {
        let summary: DashboardSummary =
            serde_json::from_value(json!({"total_veiculos": 5, "em_estoque": 3, "vendidos": 2}))
                .unwrap();
        assert_eq!(summary, DashboardSummary { total: 5, in_stock: 3, sold: 2 });
    }

    #[test]
    fn normalize_plate_handles_blank() {
        assert_eq!(normalize_plate(" xyz9999 ").as_deref(), Some("XYZ9999"));
        assert_eq!(normalize_plate("   "), None);
    }
}
