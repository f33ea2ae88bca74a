use clap::Args;

use crate::cli::print;
use crate::client::Client;
use crate::Result;

/// Print the dashboard counters
#[derive(Args, Debug)]
pub struct OverviewCommand {}

impl OverviewCommand {
    pub async fn run(self, client: &Client) -> Result<()> {
        print(&client.overview().await?)
    }
}
