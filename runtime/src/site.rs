//! URLs on the auction data site.

use crate::model::AuctionRequest;
use url::Url;

/// Path of the auction chart page.
pub const AUCTION_PAGE: &str = "nyse-auction-data";

/// The site that publishes the auction charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionSite {
    base: Url,
}

impl AuctionSite {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    /// `<base>/nyse-auction-data?symbol=<TICKER>&date=<MM-DD-YYYY>`
    pub fn url_for(&self, request: &AuctionRequest) -> String {
        let mut url = self
            .base
            .join(AUCTION_PAGE)
            .unwrap_or_else(|_| self.base.clone());
        url.query_pairs_mut()
            .clear()
            .append_pair("symbol", &request.symbol)
            .append_pair("date", &request.date_param());
        url.into()
    }
}
