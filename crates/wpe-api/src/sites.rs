// Site listing endpoints
//
// `GET /sites` is paginated through a `next` cursor. Pages are exposed as a
// lazy stream; `list_sites` drains it into the nested name-keyed listing.

use std::collections::HashSet;

use async_stream::try_stream;
use futures_util::{Stream, TryStreamExt, pin_mut};
use tracing::debug;
use url::Url;

use crate::client::WpEngineClient;
use crate::error::Error;
use crate::models::{ApiSite, Page, Site, SiteListing};

impl WpEngineClient {
    /// Every page of `GET /sites`, fetched one at a time as the stream is
    /// polled. Each call starts again from the first page.
    ///
    /// The sequence ends when a page has no `next` cursor (absent, `null`
    /// or empty). A cursor pointing off the API origin, or one already
    /// visited, yields `Error::Decode` and ends the stream.
    pub fn site_pages(&self) -> impl Stream<Item = Result<Page<ApiSite>, Error>> + '_ {
        try_stream! {
            let mut seen = HashSet::new();
            let mut next = Some(self.url("sites")?);

            while let Some(url) = next.take() {
                seen.insert(url.clone());
                debug!(%url, "fetching sites page");

                let page: Page<ApiSite> = self.get(url).await?;
                next = self.next_cursor(page.next.as_deref(), &seen)?;
                debug!(
                    results = page.results.len(),
                    count = ?page.count,
                    more = next.is_some(),
                    "sites page received"
                );
                yield page;
            }
        }
    }

    /// All sites and their installs, keyed by site name then install name.
    ///
    /// `GET /sites`, following `next` until exhausted.
    pub async fn list_sites(&self) -> Result<SiteListing, Error> {
        let pages = self.site_pages();
        pin_mut!(pages);

        let mut listing = SiteListing::new();
        while let Some(page) = pages.try_next().await? {
            for raw in page.results {
                let site = Site::from(raw);
                listing.insert(site.name.clone(), site);
            }
        }

        debug!(sites = listing.len(), "listed sites");
        Ok(listing)
    }

    fn next_cursor(&self, raw: Option<&str>, seen: &HashSet<Url>) -> Result<Option<Url>, Error> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        // Absolute cursors replace the base; relative ones resolve under it.
        let url = self.base_url().join(raw)?;
        if !self.same_origin(&url) {
            return Err(Error::Decode {
                message: format!("pagination cursor {url} is outside the API origin"),
                body: raw.to_owned(),
            });
        }
        if seen.contains(&url) {
            return Err(Error::Decode {
                message: format!("pagination cursor {url} repeats an earlier page"),
                body: raw.to_owned(),
            });
        }
        Ok(Some(url))
    }
}
