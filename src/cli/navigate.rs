use clap::Args;

use crate::cli::print;
use crate::client::Client;
use crate::Result;

/// Navigate to a path
#[derive(Args, Debug)]
pub struct NavigateCommand {
    /// Path to navigate to (e.g. /admin)
    #[arg(value_name = "PATH")]
    path: String,
}

impl NavigateCommand {
    pub async fn run(self, client: &Client) -> Result<()> {
        let outcome = client.navigate(self.path).await?;
        print(&outcome)
    }
}
