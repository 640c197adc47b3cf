// Wire types for the WP Engine API and the reshaped listing built from them.
//
// `Api*` types mirror the JSON the API returns; `Site` / `Install` are the
// nested, name-keyed view the CLI and CGI responder emit.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Base of the WP Engine user portal; install links hang off this.
pub const PORTAL_INSTALLS_URL: &str = "https://my.wpengine.com/installs";

// ── Raw API shapes ──────────────────────────────────────────────────

/// Paginated list envelope: `{ previous, next, count, results }`.
///
/// `next` is the continuation cursor (a URL). Absent or `null` ends the
/// sequence.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountRef {
    pub id: String,
}

/// A site as returned by `GET /sites`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSite {
    pub id: String,
    pub name: String,
    pub account: AccountRef,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub installs: Vec<ApiInstall>,
}

/// The install summary embedded in a site.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInstall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default, rename = "php_version", alias = "php")]
    pub php: Option<String>,
}

// ── Reshaped listing ────────────────────────────────────────────────

/// Site name → site, in the order the API returned them.
pub type SiteListing = IndexMap<String, Site>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    /// Account id.
    pub account: String,
    pub group: Option<String>,
    /// Install name → install. Omitted from output when empty.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub installs: IndexMap<String, Install>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Install {
    pub id: String,
    pub name: String,
    pub environment: Option<String>,
    pub php: Option<String>,
    /// Portal overview page.
    pub view: String,
    /// One-click wp-admin login link.
    pub admin: String,
    /// Portal plugins & themes page.
    pub plugins: String,
}

impl Install {
    /// Build an install entry, deriving the portal links from its name and
    /// the owning site's account id.
    pub fn from_api(raw: ApiInstall, account_id: &str) -> Self {
        let view = format!("{PORTAL_INSTALLS_URL}/{}", raw.name);
        Self {
            admin: format!("{view}/launch_wp_admin?account_id={account_id}"),
            plugins: format!("{view}/plugins_and_themes"),
            view,
            id: raw.id,
            name: raw.name,
            environment: raw.environment,
            php: raw.php,
        }
    }
}

impl From<ApiSite> for Site {
    fn from(raw: ApiSite) -> Self {
        let account = raw.account.id;
        let installs = raw
            .installs
            .into_iter()
            .map(|i| {
                let install = Install::from_api(i, &account);
                (install.name.clone(), install)
            })
            .collect();

        Self {
            id: raw.id,
            name: raw.name,
            account,
            group: raw.group_name,
            installs,
        }
    }
}

// ── Write operations ────────────────────────────────────────────────

/// Body of `POST /installs/{id}/backups`.
#[derive(Debug, Clone, Serialize)]
pub struct BackupRequest<'a> {
    pub description: &'a str,
    pub notification_emails: &'a str,
}

/// Which cache layer a purge targets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CacheType {
    Object,
    Page,
}

/// Responses from purging both cache layers, keyed by layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurgeOutcome {
    pub object: serde_json::Value,
    pub page: serde_json::Value,
}
