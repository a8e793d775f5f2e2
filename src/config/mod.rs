mod company;

pub use company::{Config, DocumentSettings, LayoutSettings, Organization, PdfSettings};

use crate::error::{DocError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.quotedoc/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "quotedoc") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.quotedoc/
    let home = dirs_home().ok_or_else(|| {
        DocError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".quotedoc"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the configured output directory. Relative paths are taken
/// relative to the config directory.
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(DocError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    parse_config(&content).map_err(|e| DocError::ConfigParse { path, source: e })
}

pub fn parse_config(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[organization]
name = "Your Company Name"
# tagline = "Industrial supplies"   # optional
address = "123 Business Street, Springfield"
email = "sales@yourcompany.com"
# phone = "+1-555-123-4567"         # optional
# website = "www.yourcompany.com"   # optional
# initials = "YC"                   # optional, derived from name otherwise

[document]
currency_prefix = "$"
tax_rate = 0.16          # default for receipts and invoices
tax_label = "IVA"
quote_validity_days = 15
# quote_notice = "Prices are subject to change without notice."
# invoice_notice = "This document is a printed representation of a tax invoice."

[layout]
page = "a4"              # "a4" or "letter"
banding = "continuous"   # "continuous" or "reset" (zebra rows restart on each page)
top_n_items = 5

[pdf]
output_dir = "output"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses() {
        let config = parse_config(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.organization.name, "Your Company Name");
        assert_eq!(config.document.currency_prefix, "$");
        assert!((config.document.tax_rate - 0.16).abs() < 1e-9);
        assert_eq!(config.layout.top_n_items, 5);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = parse_config("[organization]\nname = \"Acme\"\naddress = \"x\"\nemail = \"a@b.c\"\n")
            .unwrap();
        assert_eq!(config.document.quote_validity_days, 15);
        assert_eq!(config.document.tax_label, "IVA");
    }

    #[test]
    fn relative_output_dir_resolves_under_config() {
        let dir = Path::new("/tmp/quotedoc-config");
        assert_eq!(
            resolve_output_dir("output", dir),
            PathBuf::from("/tmp/quotedoc-config/output")
        );
        assert_eq!(resolve_output_dir("/abs/out", dir), PathBuf::from("/abs/out"));
    }

    #[test]
    fn initials_derive_from_name() {
        let org = Organization {
            name: "acme industrial supply".to_string(),
            ..Organization::default()
        };
        assert_eq!(org.logo_initials(), "AI");
    }
}
