use anyhow::Context;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    /// Origin this service is reachable at; relative endpoints resolve against it
    pub public_base_url: String,
    pub redirect: RedirectConfig,
    pub enrichment: EnrichmentConfig,
    pub client_ip: ClientIpConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectConfig {
    /// Base of the lookup API (`{api_base_url}/redirector/{code}`)
    pub api_base_url: String,
    /// Tracking endpoint that receives one POST per visit
    pub webhook_url: String,
    pub delay_ms: u64,
    /// Optional cap on code length; unset accepts any alphanumeric code
    #[serde(default)]
    pub short_code_max_length: Option<usize>,
    /// Upper bound for the tracking POST
    pub tracking_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub ip_lookup_url: String,
    /// Geolocation service URL with an `{ip}` placeholder
    pub geo_lookup_url: String,
    pub geolocation_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxyMode {
    None,
    Standard,
    Cloudflare,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientIpConfig {
    pub trusted_proxy_mode: TrustedProxyMode,
    #[serde(default)]
    pub trusted_proxies: Vec<IpNet>,
    #[serde(default)]
    pub num_trusted_proxies: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Real lookup backend behind `/api/redirector/{code}`
    pub api_base_url: String,
    #[serde(default)]
    pub external_webhook_url: Option<String>,
}

impl RedirectConfig {
    const fn default_delay_ms() -> u64 {
        1000
    }

    const fn default_tracking_timeout_ms() -> u64 {
        5000
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn tracking_timeout(&self) -> Duration {
        Duration::from_millis(self.tracking_timeout_ms)
    }
}

impl EnrichmentConfig {
    const DEFAULT_IP_LOOKUP_URL: &'static str = "https://api.ipify.org?format=json";
    const DEFAULT_GEO_LOOKUP_URL: &'static str = "https://ipapi.co/{ip}/json/";

    const fn default_geolocation_timeout_ms() -> u64 {
        5000
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }
}

impl Default for ClientIpConfig {
    fn default() -> Self {
        Self {
            trusted_proxy_mode: TrustedProxyMode::None,
            trusted_proxies: Vec::new(),
            num_trusted_proxies: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("REDIRECT_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("REDIRECT_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("REDIRECT_PORT must be a valid port number")?;

        let public_base_url =
            var("PUBLIC_BASE_URL").unwrap_or_else(|| format!("http://{}:{}", host, port));
        let public_base = Url::parse(&public_base_url)
            .with_context(|| format!("PUBLIC_BASE_URL '{}' is not a valid URL", public_base_url))?;

        let api_base_url = resolve_endpoint(
            &public_base,
            &var("REDIRECTOR_API_BASE_URL").unwrap_or_else(|| "/api".to_string()),
        )
        .context("REDIRECTOR_API_BASE_URL is invalid")?;
        let webhook_url = resolve_endpoint(
            &public_base,
            &var("REDIRECTOR_WEBHOOK_URL").unwrap_or_else(|| "/api/callback".to_string()),
        )
        .context("REDIRECTOR_WEBHOOK_URL is invalid")?;

        let delay_ms = parse_or(&var, "REDIRECT_DELAY_MS", RedirectConfig::default_delay_ms())?;
        let short_code_max_length = var("SHORT_CODE_MAX_LENGTH")
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.trim()
                    .parse::<usize>()
                    .context("SHORT_CODE_MAX_LENGTH must be a non-negative integer")
            })
            .transpose()?;
        let tracking_timeout_ms = parse_or(
            &var,
            "TRACKING_TIMEOUT_MS",
            RedirectConfig::default_tracking_timeout_ms(),
        )?;

        let enrichment_enabled = var("ENRICHMENT_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(true);
        let ip_lookup_url = var("IP_LOOKUP_URL")
            .unwrap_or_else(|| EnrichmentConfig::DEFAULT_IP_LOOKUP_URL.to_string());
        let geo_lookup_url = var("GEO_LOOKUP_URL")
            .unwrap_or_else(|| EnrichmentConfig::DEFAULT_GEO_LOOKUP_URL.to_string());
        let geolocation_timeout_ms = parse_or(
            &var,
            "GEOLOCATION_TIMEOUT_MS",
            EnrichmentConfig::default_geolocation_timeout_ms(),
        )?;

        let trusted_proxy_mode = match var("TRUSTED_PROXY_MODE")
            .unwrap_or_else(|| "none".to_string())
            .to_lowercase()
            .as_str()
        {
            "none" => TrustedProxyMode::None,
            "standard" => TrustedProxyMode::Standard,
            "cloudflare" => TrustedProxyMode::Cloudflare,
            other => {
                tracing::warn!(
                    "Unknown TRUSTED_PROXY_MODE '{other}', falling back to 'none'. Supported values: none, standard, cloudflare"
                );
                TrustedProxyMode::None
            }
        };

        let trusted_proxies = var("TRUSTED_PROXIES")
            .map(|list| parse_cidr_list(&list))
            .transpose()?
            .unwrap_or_default();
        let num_trusted_proxies = var("NUM_TRUSTED_PROXIES")
            .map(|v| {
                v.parse::<usize>()
                    .context("NUM_TRUSTED_PROXIES must be a non-negative integer")
            })
            .transpose()?;

        let backend_api_base_url =
            var("API_BASE_URL").unwrap_or_else(|| "http://fis-backend.test/api".to_string());
        let external_webhook_url = var("EXTERNAL_WEBHOOK_URL").filter(|v| !v.trim().is_empty());

        Ok(Config {
            server: ServerConfig { host, port },
            public_base_url,
            redirect: RedirectConfig {
                api_base_url,
                webhook_url,
                delay_ms,
                short_code_max_length,
                tracking_timeout_ms,
            },
            enrichment: EnrichmentConfig {
                enabled: enrichment_enabled,
                ip_lookup_url,
                geo_lookup_url,
                geolocation_timeout_ms,
            },
            client_ip: ClientIpConfig {
                trusted_proxy_mode,
                trusted_proxies,
                num_trusted_proxies,
            },
            backend: BackendConfig {
                api_base_url: backend_api_base_url,
                external_webhook_url,
            },
        })
    }
}

/// Resolve `value` against `base` so same-origin relative paths work
pub fn resolve_endpoint(base: &Url, value: &str) -> anyhow::Result<String> {
    let resolved = base
        .join(value.trim())
        .with_context(|| format!("'{}' is not a valid URL or path", value))?;
    Ok(resolved.as_str().trim_end_matches('/').to_string())
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}

fn parse_cidr_list(list: &str) -> anyhow::Result<Vec<IpNet>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if let Ok(net) = s.parse::<IpNet>() {
                return Ok(net);
            }
            let ip = s
                .parse::<std::net::IpAddr>()
                .with_context(|| format!("TRUSTED_PROXIES entry '{}' is not a CIDR or IP", s))?;
            let host_prefix = if ip.is_ipv4() { 32 } else { 128 };
            IpNet::new(ip, host_prefix).context("invalid host prefix")
        })
        .collect()
}
