use azure_bastion::Transport;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Do as little as possible in main.rs as it can't contain any tests
    azure_bastion::module::main(Transport::Sdk).await
}
