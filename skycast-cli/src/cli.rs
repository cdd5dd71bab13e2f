use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use skycast_core::{
    Config, Coordinates, Dashboard, DisabledGeolocator, FixedGeolocator, GeminiModel, Geolocator,
    InsightModel, IpGeolocator, ProviderId, insight::DEFAULT_GEMINI_MODEL,
    provider::weather_provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather dashboard with AI insights")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Also ask the AI provider for commentary.
    #[arg(long)]
    pub insight: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "openweather" or "gemini".
        provider: String,
    },

    /// Show current weather for a city.
    Show {
        /// City name, optionally with country code ("Paris, FR").
        city: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show current weather for your location.
    Here {
        /// Latitude; skips automatic geolocation when given with --lon.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Interactive dashboard session.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { city, output } => {
                let config = load_config()?;
                let mut dash = build_dashboard(&config);
                if city.trim().is_empty() {
                    bail!("Please enter a city name.");
                }
                dash.search(&city).await;
                print_outcome(&mut dash, &output).await
            }
            Command::Here { lat, lon, output } => {
                let config = load_config()?;
                let mut dash = build_dashboard(&config);
                let geo = geolocator(&config, lat.zip(lon));
                dash.locate(geo.as_ref()).await;
                print_outcome(&mut dash, &output).await
            }
            Command::Interactive => {
                let config = load_config()?;
                interactive(&config).await
            }
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    Ok(Config::load()?.with_env_overrides())
}

/// Build the controller; the AI model exists only when its key is configured.
fn build_dashboard(config: &Config) -> Dashboard {
    let model = GeminiModel::from_config(config).map(|m| {
        tracing::debug!(model = m.model_name(), "AI insights enabled");
        Box::new(m) as Box<dyn InsightModel>
    });
    Dashboard::new(weather_provider_from_config(config), model, config.credentials())
}

fn geolocator(config: &Config, fixed: Option<(f64, f64)>) -> Box<dyn Geolocator> {
    match fixed {
        Some((latitude, longitude)) => Box::new(FixedGeolocator(Coordinates { latitude, longitude })),
        None if !config.geolocation => Box::new(DisabledGeolocator),
        None => match &config.geolocation_url {
            Some(url) => Box::new(IpGeolocator::new(url.clone())),
            None => Box::new(IpGeolocator::default()),
        },
    }
}

async fn print_outcome(dash: &mut Dashboard, output: &OutputArgs) -> anyhow::Result<()> {
    if let Some(message) = &dash.state().error {
        bail!("{message}");
    }

    if output.insight && !dash.request_insight().await {
        eprintln!("(AI insight unavailable)");
    }

    let state = dash.state();
    let Some(snapshot) = &state.weather else {
        bail!("No weather data available.");
    };

    if output.json {
        println!("{}", render::json(snapshot, state.insight.as_ref())?);
        return Ok(());
    }

    println!("{}", render::weather(snapshot));
    if let Some(insight) = &state.insight {
        println!();
        println!("{}", render::insight(insight));
    }
    Ok(())
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("{id} API key:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("API key prompt cancelled")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty.");
    }
    config.upsert_provider_api_key(id, api_key.trim().to_string());

    if id == ProviderId::Gemini {
        let current = config
            .provider_config(id)
            .and_then(|p| p.model.clone())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let model = Text::new("Gemini model:")
            .with_default(&current)
            .prompt()
            .context("Model prompt cancelled")?;
        if let Some(p) = config.providers.get_mut(id.as_str()) {
            p.model = Some(model.trim().to_string()).filter(|m| !m.is_empty());
        }
    }

    config.save()?;
    println!("Saved {id} credentials to {}", Config::config_file_path()?.display());
    Ok(())
}

const SEARCH: &str = "Search a city";
const LOCATE: &str = "Use my location";
const INSIGHT: &str = "Get AI insight";
const QUIT: &str = "Quit";

async fn interactive(config: &Config) -> anyhow::Result<()> {
    let mut dash = build_dashboard(config);
    let geo = geolocator(config, None);

    if !config.is_provider_configured(ProviderId::OpenWeather) {
        eprintln!("No weather API key configured. Run `skycast configure openweather` first.");
    }

    loop {
        let mut options = vec![SEARCH, LOCATE];
        if dash.state().can_request_insight() && dash.state().insight.is_none() {
            options.push(INSIGHT);
        }
        options.push(QUIT);

        let choice = match Select::new("What next?", options).prompt_skippable()? {
            Some(choice) => choice,
            None => return Ok(()),
        };

        match choice {
            SEARCH => {
                let Some(city) = Text::new("City:").prompt_skippable()? else {
                    continue;
                };
                dash.search(&city).await;
            }
            LOCATE => dash.locate(geo.as_ref()).await,
            INSIGHT => {
                if !dash.request_insight().await {
                    println!("Couldn't get an AI insight right now. You can try again.");
                }
            }
            _ => return Ok(()),
        }

        let state = dash.state();
        if let Some(message) = &state.error {
            println!("{message}");
        }
        if let Some(snapshot) = &state.weather {
            println!("{}", render::weather(snapshot));
        }
        if let Some(insight) = &state.insight {
            println!("{}", render::insight(insight));
        }
        println!();
    }
}
