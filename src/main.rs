use anyhow::Result;
use clap::{Parser, Subcommand};
use spotify_cli::{commands, Config};

#[derive(Parser)]
#[command(name = "spotify-cli")]
#[command(about = "Personal Spotify library tool using the OAuth2 PKCE flow")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authorize in the browser and store the resulting tokens
    Login,
    /// Exchange the stored refresh token for a fresh pair
    Refresh,
    /// Refresh, then print the name of every saved track
    ListTracks,
    /// Print the authenticated user's profile
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Login => commands::login(&config).await?,
        Command::Refresh => commands::refresh(&config).await?,
        Command::ListTracks => commands::list_tracks(&config).await?,
        Command::Whoami => commands::whoami(&config).await?,
    }

    Ok(())
}
