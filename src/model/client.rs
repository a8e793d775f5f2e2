use serde::{Deserialize, Serialize};

use super::loose::LooseObject;

/// Contact data printed in the client box. Display only, never validated.
/// Missing or null fields read as blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<LooseObject>")]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<Option<LooseObject>> for ClientInfo {
    fn from(raw: Option<LooseObject>) -> Self {
        let raw = raw.unwrap_or_default();
        Self {
            name: raw.text(&["name", "nombre", "client_name"]).unwrap_or_default(),
            email: raw.text(&["email", "correo", "client_email"]).unwrap_or_default(),
            phone: raw
                .text(&["phone", "telefono", "teléfono", "client_phone"])
                .unwrap_or_default(),
        }
    }
}

impl ClientInfo {
    pub fn display_name(&self) -> &str {
        match self.name.trim() {
            "" => super::UNNAMED,
            name => name,
        }
    }
}

/// Tax identity of the buyer, required on invoices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LooseObject")]
pub struct FiscalInfo {
    pub tax_id: String,
    pub legal_name: String,
    pub address: String,
}

impl From<LooseObject> for FiscalInfo {
    fn from(raw: LooseObject) -> Self {
        Self {
            tax_id: raw.text(&["tax_id", "taxId", "rfc"]).unwrap_or_default(),
            legal_name: raw
                .text(&["legal_name", "legalName", "razon_social"])
                .unwrap_or_default(),
            address: raw
                .text(&["address", "direccion", "fiscal_address"])
                .unwrap_or_default(),
        }
    }
}

impl FiscalInfo {
    pub fn is_empty(&self) -> bool {
        self.tax_id.trim().is_empty()
            && self.legal_name.trim().is_empty()
            && self.address.trim().is_empty()
    }
}
