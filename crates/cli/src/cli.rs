use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use basar_core::money::parse_price;
use basar_core::{ArticleKey, ArticleNumber, SellerNumber};
use basar_ledger::ScanCode;
use basar_observability::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "basar", version, about = "Bazaar cash point and consignment evaluation")]
pub struct Cli {
    /// Directory holding ledger.xml and sellers.xml
    #[arg(long, default_value = "basar-data", global = true)]
    pub data_dir: PathBuf,

    /// JSON settings file (otherwise BASAR_* environment variables)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output: pretty or json
    #[arg(long, default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import articleList_*.txt files from a directory
    Import {
        dir: PathBuf,
        /// Wipe ledger and sellers before importing
        #[arg(long)]
        clear: bool,
    },
    /// Sell the scanned articles as one transaction
    Sell {
        /// Six-digit codes SSSAAA
        #[arg(required = true)]
        codes: Vec<ScanCode>,
        /// Price for an article, e.g. 120007=3,50
        #[arg(long = "price")]
        prices: Vec<PriceOverride>,
        /// Amount handed over by the customer
        #[arg(long, value_parser = parse_amount)]
        given: Option<Decimal>,
    },
    /// Take back a sold article
    Return {
        seller: SellerNumber,
        article: ArticleNumber,
    },
    /// List finished transactions
    History,
    /// Write the ledger for another cash point
    Export { out: PathBuf },
    /// Merge ledger files exported by other cash points
    Sync {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Write overview, sold and unsold reports as HTML plus CSV payout exports
    Evaluate {
        /// Ledger files of other cash points merged into the evaluation only
        #[arg(long = "merge")]
        merge: Vec<PathBuf>,
        #[arg(long, default_value = "reports")]
        out: PathBuf,
    },
}

/// `CODE=PRICE` from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceOverride {
    pub key: ArticleKey,
    pub price: Decimal,
}

impl FromStr for PriceOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (code, price) = s
            .split_once('=')
            .ok_or_else(|| format!("expected CODE=PRICE, got {s:?}"))?;
        let code: ScanCode = code.parse().map_err(|e| format!("{e}"))?;
        Ok(Self {
            key: code.key(),
            price: parse_amount(price)?,
        })
    }
}

/// Amount with comma or dot decimals; negative amounts are rejected.
pub fn parse_amount(s: &str) -> Result<Decimal, String> {
    match parse_price(s) {
        Some(amount) if amount >= Decimal::ZERO => Ok(amount),
        _ => Err(format!("invalid amount {s:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sell_takes_codes_prices_and_given() {
        let cli = Cli::try_parse_from([
            "basar", "sell", "120007", "120008", "--price", "120008=2,50", "--given", "10",
        ])
        .unwrap();
        let Command::Sell {
            codes,
            prices,
            given,
        } = cli.command
        else {
            panic!("expected sell");
        };
        assert_eq!(codes.len(), 2);
        assert_eq!(prices[0].price, dec!(2.50));
        assert_eq!(prices[0].key, codes[1].key());
        assert_eq!(given, Some(dec!(10)));
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "basar", "history", "--data-dir", "/tmp/x", "--log-format", "json",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/x"));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_codes_are_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["basar", "sell", "12x007"]).is_err());
        assert!(Cli::try_parse_from(["basar", "sell"]).is_err());
        assert!("120007".parse::<PriceOverride>().is_err());
        assert!("120007=-1".parse::<PriceOverride>().is_err());
    }
}
