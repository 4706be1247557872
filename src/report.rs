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

//! Per-network firewalled services report.

use crate::meraki::{Dashboard, FirewalledService, Network};
use anyhow::Result;
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Access value shown when a network does not list a service at all.
pub const UNSUPPORTED: &str = "unsupported";
pub const ALLOWED_SEPARATOR: &str = ",";

pub const COLUMNS: [&str; 7] = [
    "NETWORK NAME",
    "ICMP",
    "ICMP ALLOWED",
    "SNMP ACCESS",
    "SNMP ALLOWED",
    "WEB ACCESS",
    "WEB ALLOWED",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceName {
    Icmp,
    Snmp,
    Web,
}

impl ServiceName {
    /// Report order.
    pub const ALL: [ServiceName; 3] = [ServiceName::Icmp, ServiceName::Snmp, ServiceName::Web];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceName::Icmp => "ICMP",
            ServiceName::Snmp => "SNMP",
            ServiceName::Web => "web",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePolicy {
    pub access: String,
    pub allowed: String,
}

impl ServicePolicy {
    pub fn unsupported() -> Self {
        Self {
            access: UNSUPPORTED.to_string(),
            allowed: String::new(),
        }
    }
}

impl From<&FirewalledService> for ServicePolicy {
    fn from(service: &FirewalledService) -> Self {
        Self {
            access: service.access.clone(),
            allowed: service.allowed_ips.join(ALLOWED_SEPARATOR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub network: String,
    pub icmp: ServicePolicy,
    pub snmp: ServicePolicy,
    pub web: ServicePolicy,
}

impl ReportRow {
    pub fn from_services(network: &str, services: &[FirewalledService]) -> Self {
        let mut by_name: HashMap<ServiceName, &FirewalledService> = HashMap::new();
        for service in services {
            if let Some(name) = ServiceName::from_wire(&service.service) {
                // first entry wins
                by_name.entry(name).or_insert(service);
            }
        }
        let policy = |name: ServiceName| {
            by_name
                .get(&name)
                .map(|s| ServicePolicy::from(*s))
                .unwrap_or_else(ServicePolicy::unsupported)
        };

        Self {
            network: network.to_string(),
            icmp: policy(ServiceName::Icmp),
            snmp: policy(ServiceName::Snmp),
            web: policy(ServiceName::Web),
        }
    }

    /// Cells in [`COLUMNS`] order.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.network.clone(),
            self.icmp.access.clone(),
            self.icmp.allowed.clone(),
            self.snmp.access.clone(),
            self.snmp.allowed.clone(),
            self.web.access.clone(),
            self.web.allowed.clone(),
        ]
    }
}

/// Keep appliance networks only, sorted by name.
pub fn appliance_networks(networks: Vec<Network>) -> Vec<Network> {
    let total = networks.len();
    let mut selected: Vec<Network> = networks.into_iter().filter(Network::is_appliance).collect();
    debug!(
        skipped = total - selected.len(),
        "ignoring networks without an appliance"
    );
    selected.sort_by(|a, b| a.name.cmp(&b.name));
    selected
}

/// Fetch services for each network in order. The first failing request
/// aborts the whole report.
pub fn build_report<D: Dashboard + ?Sized>(
    dashboard: &D,
    networks: &[Network],
    progress: &ProgressBar,
) -> Result<Vec<ReportRow>> {
    let mut rows = Vec::with_capacity(networks.len());
    for network in networks {
        progress.set_message(network.name.clone());
        let services = dashboard.firewalled_services(&network.id)?;
        rows.push(ReportRow::from_services(&network.name, &services));
        progress.inc(1);
    }
    Ok(rows)
}
