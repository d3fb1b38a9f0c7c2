use azure_bastion::Transport;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    azure_bastion::module::main(Transport::Rest).await
}
