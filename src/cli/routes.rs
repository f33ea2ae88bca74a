use clap::Args;

use crate::client::Client;
use crate::Result;

/// Print the route table
#[derive(Args, Debug)]
pub struct RoutesCommand {}

impl RoutesCommand {
    pub fn run(self, client: &Client) -> Result<()> {
        for route in client.routes() {
            println!("{}", route);
        }
        Ok(())
    }
}
