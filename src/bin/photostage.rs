//! Product staging CLI binary entry point
//!
//! Thin wrapper around the CLI module; all functionality lives in the library.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    photostage::cli::main().await
}
