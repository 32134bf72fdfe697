use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use moodtune::config::DEFAULT_CONFIG_PATH;
use moodtune::{load_config, HtmlPresenter, Recommender, ReqwestTransport, TerminalPresenter};

#[derive(Parser)]
#[command(name = "moodtune", about = "Recommend a Spotify track for how you feel")]
struct Cli {
    /// Describe your mood. Read from stdin when omitted.
    text: Vec<String>,

    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Print the final result as an HTML fragment instead of plain text
    #[arg(long)]
    html: bool,
}

fn read_mood() -> io::Result<String> {
    print!("How are you feeling? ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    // Load configuration
    let config = load_config(&cli.config)?;

    let input = if cli.text.is_empty() {
        read_mood()?
    } else {
        cli.text.join(" ")
    };

    let transport = Arc::new(ReqwestTransport::new()?);
    let recommender = Recommender::new(config, transport);

    if cli.html {
        let presenter = HtmlPresenter::new();
        recommender.recommend(&input, &presenter).await;
        println!("{}", presenter.html());
    } else {
        recommender.recommend(&input, &TerminalPresenter).await;
    }

    Ok(())
}
