//! Ask command handler.
//!
//! Runs the answer pipeline once and prints the reply payload.

use clap::Args;
use company_chat_answer::CompanyChat;
use company_chat_core::config::AppConfig;

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to answer
    pub question: String,

    /// Pretty-print the JSON payload
    #[arg(long)]
    pub pretty: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing ask command");

        let chat = CompanyChat::from_config(config)?;
        let reply = chat.answer_company_question(&self.question).await;

        let json = if self.pretty {
            serde_json::to_string_pretty(&reply)?
        } else {
            serde_json::to_string(&reply)?
        };
        println!("{}", json);

        Ok(())
    }
}
