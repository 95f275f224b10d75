//! Compile-time registry of geocoding and routing service configurations.
//!
//! Each provider is defined in a TOML file under `services/`. The registry
//! embeds these at compile time and exposes them via [`all_services`],
//! [`enabled_geocoders`] and [`enabled_router`].

use serde::Deserialize;

use crate::{GeocoderChain, OsrmRouter};

/// A provider configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`, `"osrm"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service is active.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Execution order; lower values run first.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Self-hosted Pelias geocoder.
    Pelias {
        /// API base URL (e.g., `"http://localhost:4000"`).
        base_url: String,
        /// ISO country code for boundary filtering.
        #[serde(default)]
        country_code: Option<String>,
    },
    /// Nominatim / `OpenStreetMap` geocoder.
    Nominatim {
        /// API base URL (e.g., `"https://nominatim.openstreetmap.org/search"`).
        base_url: String,
        /// Minimum delay between requests in milliseconds.
        rate_limit_ms: u64,
        /// Comma-separated ISO country codes to restrict results to.
        #[serde(default)]
        country_codes: Option<String>,
    },
    /// OSRM route service.
    Osrm {
        /// Server base URL (e.g., `"https://router.project-osrm.org"`).
        base_url: String,
        /// Routing profile (e.g., `"driving"`).
        #[serde(default = "default_profile")]
        profile: String,
    },
}

const fn default_true() -> bool {
    true
}

fn default_profile() -> String {
    "driving".to_string()
}

impl GeocodingService {
    /// Returns the provider's base URL regardless of variant.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Pelias { base_url, .. }
            | ProviderConfig::Nominatim { base_url, .. }
            | ProviderConfig::Osrm { base_url, .. } => base_url,
        }
    }

    /// Replaces the provider's base URL.
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        match &mut self.provider {
            ProviderConfig::Pelias { base_url, .. }
            | ProviderConfig::Nominatim { base_url, .. }
            | ProviderConfig::Osrm { base_url, .. } => *base_url = url.into(),
        }
    }

    /// Whether this service computes routes rather than geocoding.
    #[must_use]
    pub const fn is_router(&self) -> bool {
        matches!(self.provider, ProviderConfig::Osrm { .. })
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("pelias", include_str!("../services/pelias.toml")),
    ("nominatim", include_str!("../services/nominatim.toml")),
    ("osrm", include_str!("../services/osrm.toml")),
];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 3;

/// Returns all service configurations (enabled and disabled).
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse service '{name}': {e}"))
        })
        .collect()
}

/// Returns the highest-priority enabled routing service.
#[must_use]
pub fn enabled_router() -> Option<GeocodingService> {
    all_services()
        .into_iter()
        .filter(|s| s.enabled && s.is_router())
        .min_by_key(|s| s.priority)
}

/// Returns the enabled geocoding services, sorted by priority (ascending).
///
/// Pelias is self-hosted, so it is only enabled when `pelias_url` names an
/// instance.
#[must_use]
pub fn enabled_geocoders(pelias_url: Option<&str>) -> Vec<GeocodingService> {
    let mut services: Vec<GeocodingService> = all_services()
        .into_iter()
        .filter(|s| !s.is_router())
        .map(|mut s| {
            if let Some(url) = pelias_url
                && matches!(s.provider, ProviderConfig::Pelias { .. })
            {
                s.set_base_url(url);
                s.enabled = true;
            }
            s
        })
        .filter(|s| s.enabled)
        .collect();
    services.sort_by_key(|s| s.priority);
    services
}

/// Builds the geocoder chain and router from the embedded services.
///
/// `geocoder_url` points at a self-hosted Pelias instance and puts it ahead
/// of Nominatim; `router_url` replaces the OSRM base URL.
///
/// Returns `None` for the router if no routing service is enabled.
#[must_use]
pub fn build_providers(
    client: &reqwest::Client,
    geocoder_url: Option<&str>,
    router_url: Option<&str>,
) -> (GeocoderChain, Option<OsrmRouter>) {
    let geocoders = enabled_geocoders(geocoder_url);

    let router = enabled_router().and_then(|mut svc| {
        if let Some(url) = router_url {
            svc.set_base_url(url);
        }
        match svc.provider {
            ProviderConfig::Osrm { base_url, profile } => {
                Some(OsrmRouter::new(client.clone(), base_url, profile))
            }
            _ => None,
        }
    });

    for svc in &geocoders {
        log::debug!("Geocoder enabled: {} ({})", svc.name, svc.base_url());
    }

    (GeocoderChain::from_services(client, &geocoders), router)
}
