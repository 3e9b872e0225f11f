/// Reverse-engineers a representative Terraform snippet from a deployment log
///
/// Each known failure shape is a `Signature`: a predicate over the lower-cased
/// log text plus a builder that renders the snippet. Signatures are evaluated
/// in a fixed priority order and the first one that matches wins.
use crate::traits::Outcome;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    SubnetNotFound,
    RouteTableMissing,
    AuthorizationFailed,
    QuotaExceeded,
    InvalidResourceName,
    ValidNetwork,
    Fallback,
}

/// One detection rule; `build` receives the lower-cased log text
pub struct Signature {
    pub kind: SignatureKind,
    matches: fn(&str, Outcome) -> bool,
    build: fn(&str) -> String,
}

impl Signature {
    pub fn matches(&self, lowered: &str, outcome: Outcome) -> bool {
        (self.matches)(lowered, outcome)
    }

    pub fn build(&self, lowered: &str) -> String {
        (self.build)(lowered)
    }
}

/// Priority order; the fallback always matches so synthesis never fails
pub static SIGNATURES: &[Signature] = &[
    Signature {
        kind: SignatureKind::SubnetNotFound,
        matches: |t, _| {
            t.contains("subnetnotfound") || (t.contains("cannot find subnet") && t.contains("virtual network"))
        },
        build: build_subnet_not_found,
    },
    Signature {
        kind: SignatureKind::RouteTableMissing,
        matches: |t, _| {
            t.contains("route table")
                && (t.contains("resourcenotfound") || t.contains("not found") || t.contains("association invalid"))
        },
        build: build_route_table_missing,
    },
    Signature {
        kind: SignatureKind::AuthorizationFailed,
        matches: |t, _| t.contains("authorizationfailed"),
        build: |_| AUTHORIZATION_FAILED.to_string(),
    },
    Signature {
        kind: SignatureKind::QuotaExceeded,
        matches: |t, _| t.contains("quotaexceeded"),
        build: |_| QUOTA_EXCEEDED.to_string(),
    },
    Signature {
        kind: SignatureKind::InvalidResourceName,
        matches: |t, _| {
            t.contains("invalidresourcename") || (t.contains("storage account name") && t.contains("lower-case"))
        },
        build: build_invalid_storage_name,
    },
    Signature {
        kind: SignatureKind::ValidNetwork,
        matches: |_, outcome| outcome == Outcome::Pass,
        build: |_| VALID_NETWORK.to_string(),
    },
    Signature {
        kind: SignatureKind::Fallback,
        matches: |_, _| true,
        build: |_| FALLBACK.to_string(),
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticSnippet {
    pub kind: SignatureKind,
    pub text: String,
}

pub struct ConfigSynthesizer;

impl ConfigSynthesizer {
    /// Name the signature that a log would be synthesized with
    pub fn classify(log_text: &str, outcome: Outcome) -> SignatureKind {
        let lowered = log_text.to_lowercase();
        Self::select(&lowered, outcome).kind
    }

    pub fn synthesize(log_text: &str, outcome: Outcome) -> SyntheticSnippet {
        let lowered = log_text.to_lowercase();
        let signature = Self::select(&lowered, outcome);
        SyntheticSnippet {
            kind: signature.kind,
            text: signature.build(&lowered),
        }
    }

    fn select(lowered: &str, outcome: Outcome) -> &'static Signature {
        SIGNATURES
            .iter()
            .find(|s| s.matches(lowered, outcome))
            .unwrap_or(&SIGNATURES[SIGNATURES.len() - 1])
    }
}

static SUBNET_NAMED: Lazy<Regex> = Lazy::new(|| Regex::new(r"subnet named '([^']+)'").unwrap());
static SUBNET_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"subnet '([^']+)'").unwrap());
static VNET_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"virtual network '([^']+)'").unwrap());
static ROUTE_TABLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"route table "([^"]+)""#).unwrap());
static STORAGE_ACCOUNT_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"storage account "([^"]+)""#).unwrap());

/// First capture group of `re` in `text`, if any
fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}

fn build_subnet_not_found(t: &str) -> String {
    let subnet = capture(&SUBNET_NAMED, t)
        .or_else(|| capture(&SUBNET_QUOTED, t))
        .unwrap_or("subnet-prod");
    let vnet = capture(&VNET_QUOTED, t).unwrap_or("vnet-main");

    format!(
        r#"resource "azurerm_virtual_network" "vnet" {{
  name                = "{vnet}"
  address_space       = ["10.0.0.0/16"]
  location            = "eastus"
  resource_group_name = "rg-prod-eastus"
}}

resource "azurerm_subnet" "subnet" {{
  name                 = "{subnet}"
  resource_group_name  = "rg-prod-eastus"
  virtual_network_name = azurerm_virtual_network.vnet.name
  address_prefixes     = ["10.0.1.0/24"]
}}

resource "azurerm_network_interface" "nic" {{
  name                = "vmnic01"
  location            = "eastus"
  resource_group_name = "rg-prod-eastus"

  ip_configuration {{
    name                          = "internal"
    private_ip_address_allocation = "Dynamic"
    # intentionally no subnet reference here
  }}
}}"#
    )
}

fn build_route_table_missing(t: &str) -> String {
    let subnet = capture(&SUBNET_QUOTED, t).unwrap_or("web-subnet");
    let route_table = capture(&ROUTE_TABLE_QUOTED, t).unwrap_or("rt-app");

    format!(
        r#"resource "azurerm_subnet" "web" {{
  name                 = "{subnet}"
  resource_group_name  = "rg-app-eastus"
  virtual_network_name = "vnet-app"
  address_prefixes     = ["10.0.2.0/24"]
}}

# Association references a route table that is not defined
resource "azurerm_subnet_route_table_association" "assoc" {{
  subnet_id      = azurerm_subnet.web.id
  route_table_id = azurerm_route_table.{route_table}.id
}}"#
    )
}

fn build_invalid_storage_name(t: &str) -> String {
    let account = capture(&STORAGE_ACCOUNT_QUOTED, t).unwrap_or("Prod_Stor!");

    format!(
        r#"resource "azurerm_storage_account" "sa" {{
  name                     = "{account}"
  resource_group_name      = "rg-storage"
  location                 = "eastus"
  account_tier             = "Standard"
  account_replication_type = "LRS"
}}"#
    )
}

const AUTHORIZATION_FAILED: &str = r#"provider "azurerm" {
  features {}
  # likely missing/invalid credentials or wrong scope
}

data "azurerm_virtual_network" "target" {
  name                = "vnet-sec"
  resource_group_name = "rg-sec"
}"#;

const QUOTA_EXCEEDED: &str = r#"resource "azurerm_resource_group" "rg" {
  name     = "rg-compute-eastus2"
  location = "eastus2"
}

resource "azurerm_subnet" "subnet" {
  name                 = "subnet-compute"
  resource_group_name  = azurerm_resource_group.rg.name
  virtual_network_name = "vnet-main"
  address_prefixes     = ["10.0.1.0/24"]
}

resource "azurerm_network_interface" "nic" {
  name                = "vmnic01"
  location            = azurerm_resource_group.rg.location
  resource_group_name = azurerm_resource_group.rg.name

  ip_configuration {
    name                          = "internal"
    subnet_id                     = azurerm_subnet.subnet.id
    private_ip_address_allocation = "Dynamic"
  }
}

resource "azurerm_linux_virtual_machine" "vm" {
  name                  = "vm-compute-01"
  resource_group_name   = azurerm_resource_group.rg.name
  location              = azurerm_resource_group.rg.location
  size                  = "Standard_D16s_v5"
  admin_username        = "azureuser"
  network_interface_ids = [azurerm_network_interface.nic.id]
}"#;

/// Resource group, virtual network and subnet, fully cross-referenced
pub const VALID_NETWORK: &str = r#"resource "azurerm_resource_group" "rg" {
  name     = "rg-demo"
  location = "eastus"
}

resource "azurerm_virtual_network" "vnet" {
  name                = "vnet-main"
  address_space       = ["10.1.0.0/16"]
  location            = azurerm_resource_group.rg.location
  resource_group_name = azurerm_resource_group.rg.name
}

resource "azurerm_subnet" "subnet" {
  name                 = "subnet-app"
  resource_group_name  = azurerm_resource_group.rg.name
  virtual_network_name = azurerm_virtual_network.vnet.name
  address_prefixes     = ["10.1.1.0/24"]
}"#;

const FALLBACK: &str = r#"resource "azurerm_resource_group" "rg" {
  name     = "rg-unknown"
  location = "eastus"
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;

    #[test]
    fn test_priority_order() {
        let kinds: Vec<SignatureKind> = SIGNATURES.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SignatureKind::SubnetNotFound,
                SignatureKind::RouteTableMissing,
                SignatureKind::AuthorizationFailed,
                SignatureKind::QuotaExceeded,
                SignatureKind::InvalidResourceName,
                SignatureKind::ValidNetwork,
                SignatureKind::Fallback,
            ]
        );
    }

    #[test]
    fn test_subnet_not_found_beats_quota() {
        let log = "Error: SubnetNotFound ... also QuotaExceeded for cores";
        assert_eq!(
            ConfigSynthesizer::classify(log, Outcome::Fail),
            SignatureKind::SubnetNotFound
        );
    }

    #[test]
    fn test_subnet_not_found_extracts_entities() {
        let log = "Code=\"InvalidResourceReference\" Cannot find subnet named 'subnet-prod' in virtual network 'vnet-main'.";
        let snippet = ConfigSynthesizer::synthesize(log, Outcome::Fail);

        let flat = normalize(&snippet.text);
        assert_eq!(snippet.kind, SignatureKind::SubnetNotFound);
        assert!(flat.contains(r#"resource "azurerm_subnet" "subnet" { name = "subnet-prod""#));
        assert!(flat.contains(r#"name = "vnet-main""#));
        assert!(flat.contains(r#"resource "azurerm_network_interface" "nic""#));
        assert!(!snippet.text.contains("subnet_id"));
    }

    #[test]
    fn test_extraction_miss_uses_defaults() {
        let snippet = ConfigSynthesizer::synthesize("SubnetNotFound", Outcome::Fail);
        assert!(snippet.text.contains(r#""subnet-prod""#));
        assert!(snippet.text.contains(r#""vnet-main""#));

        let snippet = ConfigSynthesizer::synthesize("route table lookup: not found", Outcome::Fail);
        assert_eq!(snippet.kind, SignatureKind::RouteTableMissing);
        assert!(snippet.text.contains(r#""web-subnet""#));
        assert!(snippet.text.contains("azurerm_route_table.rt-app.id"));

        let snippet = ConfigSynthesizer::synthesize("InvalidResourceName", Outcome::Fail);
        assert!(snippet.text.contains(r#""Prod_Stor!""#));
    }

    #[test]
    fn test_route_table_captures() {
        let log = r#"ResourceNotFound: route table "rt-edge" referenced by subnet 'app-subnet'"#;
        let snippet = ConfigSynthesizer::synthesize(log, Outcome::Fail);
        assert!(snippet.text.contains(r#""app-subnet""#));
        assert!(snippet.text.contains("azurerm_route_table.rt-edge.id"));
    }

    #[test]
    fn test_pass_log_without_phrase_is_valid_network() {
        let snippet = ConfigSynthesizer::synthesize("Apply complete! Resources: 3 added.", Outcome::Pass);
        assert_eq!(snippet.kind, SignatureKind::ValidNetwork);
        assert_eq!(snippet.text, VALID_NETWORK);
    }

    #[test]
    fn test_fail_log_without_phrase_falls_back() {
        let snippet = ConfigSynthesizer::synthesize("something odd happened", Outcome::Fail);
        assert_eq!(snippet.kind, SignatureKind::Fallback);
        assert!(snippet.text.contains("rg-unknown"));
    }

    #[test]
    fn test_case_insensitive_detection() {
        assert_eq!(
            ConfigSynthesizer::classify("AuthorizationFailed: client lacks permission", Outcome::Pass),
            SignatureKind::AuthorizationFailed
        );
        assert_eq!(
            ConfigSynthesizer::classify("Storage account name must be LOWER-CASE", Outcome::Fail),
            SignatureKind::InvalidResourceName
        );
    }
}
