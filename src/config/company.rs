use serde::{Deserialize, Serialize};

use crate::pdf::{BandingPolicy, PageSize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub organization: Organization,
    #[serde(default)]
    pub document: DocumentSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub pdf: PdfSettings,
}

/// Identity printed in the banner and the footer of every page.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Organization {
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub email: String,
    #[serde(default)]
    pub website: Option<String>,
    /// Letters drawn inside the logo mark; derived from `name` when absent.
    #[serde(default)]
    pub initials: Option<String>,
}

impl Organization {
    pub fn logo_initials(&self) -> String {
        if let Some(initials) = self.initials.as_deref().map(str::trim) {
            if !initials.is_empty() {
                return initials.chars().take(3).collect::<String>().to_uppercase();
            }
        }
        let derived: String = self
            .name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .filter(|c| c.is_alphanumeric())
            .take(2)
            .collect();
        if derived.is_empty() {
            "?".to_string()
        } else {
            derived.to_uppercase()
        }
    }

    /// Single contact line used by the page footer.
    pub fn contact_line(&self) -> String {
        let mut parts = vec![self.email.clone()];
        if let Some(phone) = &self.phone {
            parts.push(phone.clone());
        }
        if let Some(website) = &self.website {
            parts.push(website.clone());
        }
        parts.join("  |  ")
    }
}

impl Default for Organization {
    fn default() -> Self {
        Self {
            name: "Your Company Name".to_string(),
            tagline: None,
            address: "123 Business Street".to_string(),
            phone: None,
            email: "sales@yourcompany.com".to_string(),
            website: None,
            initials: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DocumentSettings {
    pub currency_prefix: String,
    /// Default tax rate for receipts and invoices (0.16 = 16%).
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default = "default_tax_label")]
    pub tax_label: String,
    #[serde(default = "default_validity_days")]
    pub quote_validity_days: u32,
    #[serde(default)]
    pub quote_notice: Option<String>,
    #[serde(default)]
    pub invoice_notice: Option<String>,
}

fn default_tax_label() -> String {
    "IVA".to_string()
}

fn default_validity_days() -> u32 {
    15
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            currency_prefix: "$".to_string(),
            tax_rate: 0.0,
            tax_label: default_tax_label(),
            quote_validity_days: default_validity_days(),
            quote_notice: None,
            invoice_notice: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LayoutSettings {
    #[serde(default)]
    pub page: PageSize,
    #[serde(default)]
    pub banding: BandingPolicy,
    #[serde(default = "default_top_n")]
    pub top_n_items: usize,
}

fn default_top_n() -> usize {
    5
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            page: PageSize::default(),
            banding: BandingPolicy::default(),
            top_n_items: default_top_n(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PdfSettings {
    pub output_dir: String,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            output_dir: "~/.quotedoc/output".to_string(),
        }
    }
}
