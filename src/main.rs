//! luhngen service entry point.

use luhngen::run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run().await
}
