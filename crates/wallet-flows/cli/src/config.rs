use std::path::PathBuf;

use clap::Args;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use wallet_flows::{Config, default_config};

#[derive(Clone, Args, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// GraphQL endpoint of the wallet backend
    #[arg(long, default_value = "https://api.galoy.io/graphql")]
    pub graphql_url: String,

    /// Base URL of the backend's callable functions
    #[arg(
        long,
        default_value = "https://us-central1-galoyapp.cloudfunctions.net"
    )]
    pub functions_url: String,

    /// Wallet user id
    #[arg(long, default_value = "1234")]
    pub uid: String,

    /// Bearer token sent with backend requests
    #[arg(long)]
    pub auth_token: Option<String>,

    /// Path to the data directory
    #[arg(short, long, default_value = "./.data")]
    pub data_dir: String,

    #[arg(long, default_value = "wallet-flows.conf")]
    pub config: PathBuf,

    /// Log filter, in the env filter format
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl Settings {
    /// Layers the optional TOML config file and `WALLET_FLOWS_` environment
    /// variables over the command line values
    pub fn resolve(self) -> Result<Self, figment::Error> {
        let config_file = std::fs::canonicalize(&self.config).ok();
        let mut figment = Figment::new().merge(Serialized::defaults(self));
        if let Some(config_file) = &config_file {
            figment = figment.merge(Toml::file(config_file));
        }
        figment.merge(Env::prefixed("WALLET_FLOWS_")).extract()
    }

    pub fn flows_config(&self) -> Config {
        let mut config = default_config(self.graphql_url.clone(), self.functions_url.clone());
        config.uid.clone_from(&self.uid);
        config
    }
}
