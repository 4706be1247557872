// merakifw - Meraki MX firewalled services report
// Copyright (C) 2024 merakifw contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Dashboard API resources used by the report.
//!
//! Only the fields the report reads are modelled; everything else in the
//! responses is ignored.

use crate::client::ApiClient;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const APPLIANCE: &str = "appliance";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub product_types: Vec<String>,
}

impl Network {
    /// MX networks are the only ones exposing firewalled services.
    pub fn is_appliance(&self) -> bool {
        self.product_types.iter().any(|p| p == APPLIANCE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FirewalledService {
    pub service: String,
    pub access: String,
    #[serde(default)]
    pub allowed_ips: Vec<String>,
}

/// The three Dashboard calls the tool needs.
pub trait Dashboard {
    fn organizations(&self) -> Result<Vec<Organization>>;
    fn organization_networks(&self, org_id: &str) -> Result<Vec<Network>>;
    fn firewalled_services(&self, network_id: &str) -> Result<Vec<FirewalledService>>;
}

impl Dashboard for ApiClient {
    fn organizations(&self) -> Result<Vec<Organization>> {
        self.get_all_pages(&["organizations"])
            .context("listing organizations")
    }

    fn organization_networks(&self, org_id: &str) -> Result<Vec<Network>> {
        self.get_all_pages(&["organizations", org_id, "networks"])
            .with_context(|| format!("listing networks for organization {}", org_id))
    }

    fn firewalled_services(&self, network_id: &str) -> Result<Vec<FirewalledService>> {
        self.get_json(&[
            "networks",
            network_id,
            "appliance",
            "firewall",
            "firewalledServices",
        ])
        .with_context(|| format!("fetching firewalled services for network {}", network_id))
    }
}
