//! Raw API access: `wpe api <endpoint> [-X METHOD] [-F key=value]...`

use wpe_api::{Method, WpEngineClient};

use crate::cli::{ApiArgs, GlobalOpts, HttpMethod};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

fn method(m: HttpMethod) -> Method {
    match m {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

pub async fn handle(
    client: &WpEngineClient,
    args: ApiArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let fields = util::parse_fields(&args.fields)?;
    let resp = client
        .request(method(args.method), &args.endpoint, &fields)
        .await?;

    // Raw responses have no table form; fall back to pretty JSON.
    let out = output::render_single(resolved.output, &resp, |v| {
        output::render_json_pretty(v).unwrap_or_default()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
