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

//! Credential and organization checks.
//!
//! Both checks are plain functions over [`Dashboard`] so they can run
//! against a fake. Console output for the organization listing is the
//! caller's job; [`ParameterError::InvalidOrgId`] carries what to show.

use crate::meraki::{Dashboard, Network, Organization};
use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info};

/// A command-line value that was rejected. Rendered as a bad-parameter
/// diagnostic and mapped to exit status 2.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("Provided API Key can't access the Meraki Dashboard")]
    InvalidApiKey,
    #[error("Provide a valid Organization ID")]
    InvalidOrgId { organizations: Vec<Organization> },
    #[error("no value was provided")]
    MissingValue { option: &'static str },
}

impl ParameterError {
    pub fn option(&self) -> &'static str {
        match self {
            Self::InvalidApiKey => "--apikey",
            Self::InvalidOrgId { .. } => "--orgid",
            Self::MissingValue { option } => *option,
        }
    }
}

/// One low-privilege authenticated call; any failure rejects the key.
pub fn validate_api_key<D: Dashboard + ?Sized>(dashboard: &D) -> Result<()> {
    info!("Validating API Key");
    match dashboard.organizations() {
        Ok(orgs) => {
            debug!(organizations = orgs.len(), "API key accepted");
            info!("API Key is valid");
            Ok(())
        }
        Err(err) => {
            debug!("API key check failed: {:#}", err);
            Err(ParameterError::InvalidApiKey.into())
        }
    }
}

/// Lists the organization's networks. On failure the organizations visible
/// to the key are fetched and returned inside the error; if that discovery
/// call fails too, its error is returned as is.
pub fn validate_org_id<D: Dashboard + ?Sized>(dashboard: &D, org_id: &str) -> Result<Vec<Network>> {
    info!("Validating Organization ID {}", org_id);
    match dashboard.organization_networks(org_id) {
        Ok(networks) => Ok(networks),
        Err(err) => {
            debug!("organization check failed: {:#}", err);
            let organizations = dashboard.organizations()?;
            Err(ParameterError::InvalidOrgId { organizations }.into())
        }
    }
}
