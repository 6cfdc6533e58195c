use std::fmt;

/// The assets we publish flow tables for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
    Bitcoin,
    Ethereum,
}

impl Asset {
    pub const ALL: [Asset; 2] = [Asset::Bitcoin, Asset::Ethereum];

    /// Lowercase name used as the output file prefix.
    pub fn slug(&self) -> &'static str {
        match self {
            Asset::Bitcoin => "bitcoin",
            Asset::Ethereum => "ethereum",
        }
    }

    /// Farside "all data" page for this asset.
    pub fn url(&self) -> &'static str {
        match self {
            Asset::Bitcoin => "https://farside.co.uk/bitcoin-etf-flow-all-data/",
            Asset::Ethereum => "https://farside.co.uk/ethereum-etf-flow-all-data/",
        }
    }

    pub fn wide_file_name(&self) -> String {
        format!("{}_etf_flows_wide_daily.csv", self.slug())
    }

    pub fn long_file_name(&self) -> String {
        format!("{}_etf_flows_long_daily.csv", self.slug())
    }

    pub fn totals_file_name(&self) -> String {
        format!("{}_etf_totals_daily.csv", self.slug())
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
