use clap::Args;

use crate::cli::print;
use crate::client::Client;
use crate::Result;

/// Print the audit log, newest first
#[derive(Args, Debug)]
pub struct AuditCommand {
    /// Print at most this many records
    #[arg(long, short = 'n')]
    limit: Option<usize>,
}

impl AuditCommand {
    pub async fn run(self, client: &Client) -> Result<()> {
        let outcome = client.audit_logs().await?.map(|mut records| {
            if let Some(limit) = self.limit {
                records.truncate(limit);
            }
            records
        });
        print(&outcome)
    }
}
