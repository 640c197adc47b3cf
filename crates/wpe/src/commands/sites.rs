//! Site command handlers.

use tabled::Tabled;
use wpe_api::{Site, SiteListing, WpEngineClient};

use crate::cli::{GlobalOpts, SitesArgs, SitesCommand, SitesListArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct InstallRow {
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Install")]
    install: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Env")]
    environment: String,
    #[tabled(rename = "PHP")]
    php: String,
    #[tabled(rename = "Admin")]
    admin: String,
}

fn rows(listing: &SiteListing) -> Vec<InstallRow> {
    listing
        .values()
        .flat_map(|site| {
            site.installs.values().map(move |i| InstallRow {
                site: site.name.clone(),
                install: i.name.clone(),
                id: i.id.clone(),
                environment: i.environment.clone().unwrap_or_default(),
                php: i.php.clone().unwrap_or_default(),
                admin: i.admin.clone(),
            })
        })
        .collect()
}

fn install_names(listing: &SiteListing) -> Vec<String> {
    listing
        .values()
        .flat_map(|site| site.installs.keys().cloned())
        .collect()
}

/// Apply `--filter` (site name substring) and `--environment`.
///
/// With an environment filter, sites left without installs are dropped.
fn apply_filters(listing: SiteListing, args: &SitesListArgs) -> SiteListing {
    let needle = args.filter.as_deref().map(str::to_lowercase);
    listing
        .into_iter()
        .filter(|(name, _)| {
            needle
                .as_deref()
                .is_none_or(|n| name.to_lowercase().contains(n))
        })
        .filter_map(|(name, mut site): (String, Site)| {
            if let Some(ref env) = args.environment {
                site.installs.retain(|_, i| {
                    i.environment
                        .as_deref()
                        .is_some_and(|e| e.eq_ignore_ascii_case(env))
                });
                if site.installs.is_empty() {
                    return None;
                }
            }
            Some((name, site))
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &WpEngineClient,
    args: SitesArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SitesCommand::List(list) => {
            let pb = util::spinner("Fetching sites", global.quiet);
            let listing = client.list_sites().await;
            pb.finish_and_clear();

            let listing = apply_filters(listing?, &list);
            let out = output::render_rows(resolved.output, &listing, rows, install_names)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use wpe_api::{ApiSite, Site};

    use super::*;

    fn listing() -> SiteListing {
        let raw: Vec<ApiSite> = serde_json::from_value(serde_json::json!([
            {
                "id": "s1", "name": "demo", "account": { "id": "acc1" },
                "installs": [
                    { "id": "i1", "name": "demo", "environment": "production", "php_version": "8.2" },
                    { "id": "i2", "name": "demostg", "environment": "staging", "php_version": "8.2" }
                ]
            },
            {
                "id": "s2", "name": "blog", "account": { "id": "acc1" },
                "installs": [
                    { "id": "i3", "name": "blogdev", "environment": "development", "php_version": "7.4" }
                ]
            }
        ]))
        .expect("fixture should deserialize");
        raw.into_iter()
            .map(Site::from)
            .map(|s| (s.name.clone(), s))
            .collect()
    }

    #[test]
    fn rows_flatten_every_install() {
        let rows = rows(&listing());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].site, "demo");
        assert_eq!(
            rows[0].admin,
            "https://my.wpengine.com/installs/demo/launch_wp_admin?account_id=acc1"
        );
        assert_eq!(install_names(&listing()), vec!["demo", "demostg", "blogdev"]);
    }

    #[test]
    fn environment_filter_drops_empty_sites() {
        let args = SitesListArgs {
            environment: Some("Production".into()),
            filter: None,
        };
        let filtered = apply_filters(listing(), &args);
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["demo"]);
        assert_eq!(filtered["demo"].installs.len(), 1);
    }

    #[test]
    fn name_filter_is_case_insensitive() {
        let args = SitesListArgs {
            environment: None,
            filter: Some("BLO".into()),
        };
        let filtered = apply_filters(listing(), &args);
        assert_eq!(filtered.keys().collect::<Vec<_>>(), vec!["blog"]);
    }
}
