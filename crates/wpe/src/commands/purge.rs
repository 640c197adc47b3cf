//! Cache purge command handler.

use serde_json::{Value, json};
use wpe_api::{CacheType, WpEngineClient};

use crate::cli::{GlobalOpts, PurgeArgs, PurgeTarget};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &WpEngineClient,
    args: PurgeArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let install = args.install_id.as_str();

    let (resp, summary): (Value, String) = match args.r#type {
        PurgeTarget::All => {
            let outcome = client.purge_cache(install).await?;
            (
                serde_json::to_value(outcome)?,
                format!("Object and page caches purged for {install}"),
            )
        }
        PurgeTarget::Object => single(client, install, CacheType::Object).await?,
        PurgeTarget::Page => single(client, install, CacheType::Page).await?,
    };

    let out = output::render_single(resolved.output, &resp, |_| summary.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn single(
    client: &WpEngineClient,
    install: &str,
    cache: CacheType,
) -> Result<(Value, String), CliError> {
    let resp = client.purge_cache_type(install, cache).await?;
    Ok((
        json!({ cache.to_string(): resp }),
        format!("{cache} cache purged for {install}"),
    ))
}
