use shared::geo::Coordinates;

/// Client configuration
///
/// # Environment variables
///
/// All settings can be overridden through environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | MARULA_DATA_DIR | ./marula-data | Local database directory |
/// | SERVICE_FEE | 2.0 | Fixed per-order service fee |
/// | DEPOSIT_FRACTION | 1.0 | Share of the total due at order time |
/// | ORDER_REF_PREFIX | WFC | Prefix of user-facing order references |
/// | RESTAURANT_LAT / RESTAURANT_LON | Lusaka site | Restaurant position |
/// | GEOLOCATION_TIMEOUT_MS | 10000 | Position request budget |
/// | GEOLOCATION_MAX_AGE_MS | 60000 | Oldest acceptable cached position |
/// | GEOCODER_BASE_URL | https://nominatim.openstreetmap.org | Reverse geocoding service |
/// | ROUTING_BASE_URL | https://router.project-osrm.org | Routing service |
/// | SAVED_LOCATIONS_CAP | 20 | Delivery-location history bound |
/// | RECENTLY_VIEWED_CAP | 12 | Recently-viewed history bound |
/// | ENVIRONMENT | development | Runtime environment |
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the local redb database
    pub data_dir: String,
    /// Fixed service fee in currency units
    pub service_fee: f64,
    /// Fraction of the total charged as deposit (1.0 = full prepayment)
    pub deposit_fraction: f64,
    /// Prefix of formatted order references
    pub order_ref_prefix: String,
    /// Restaurant position; fee distances and the geolocation fallback
    /// are computed against it
    pub restaurant_location: Coordinates,
    /// Bounded wait for a device position (milliseconds)
    pub geolocation_timeout_ms: u64,
    /// Cached positions older than this are treated as failures
    pub geolocation_max_age_ms: u64,
    /// Reverse-geocoding service base URL
    pub geocoder_base_url: String,
    /// Routing service base URL
    pub routing_base_url: String,
    /// Bound on the saved delivery-location history
    pub saved_locations_cap: usize,
    /// Bound on the recently-viewed item history
    pub recently_viewed_cap: usize,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("MARULA_DATA_DIR").unwrap_or_else(|_| "./marula-data".into()),
            service_fee: std::env::var("SERVICE_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2.0),
            deposit_fraction: std::env::var("DEPOSIT_FRACTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1.0),
            order_ref_prefix: std::env::var("ORDER_REF_PREFIX").unwrap_or_else(|_| "WFC".into()),
            restaurant_location: Coordinates::new(
                std::env::var("RESTAURANT_LAT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(-15.3875),
                std::env::var("RESTAURANT_LON")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(28.3228),
            ),
            geolocation_timeout_ms: std::env::var("GEOLOCATION_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            geolocation_max_age_ms: std::env::var("GEOLOCATION_MAX_AGE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60_000),
            geocoder_base_url: std::env::var("GEOCODER_BASE_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".into()),
            routing_base_url: std::env::var("ROUTING_BASE_URL")
                .unwrap_or_else(|_| "https://router.project-osrm.org".into()),
            saved_locations_cap: std::env::var("SAVED_LOCATIONS_CAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            recently_viewed_cap: std::env::var("RECENTLY_VIEWED_CAP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(12),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override the data directory, typically for tests.
    pub fn with_data_dir(data_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.data_dir = data_dir.into();
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
